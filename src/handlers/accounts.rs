use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::controller::Address;
use crate::services::snapshot::AccountSnapshot;
use crate::AppState;

pub async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<AccountSnapshot>> {
    let address: Address = address.parse()?;

    let snapshot = state
        .aggregator
        .aggregate(address.as_str(), state.dashboard.symbols())
        .await?;

    Ok(Json(snapshot))
}
