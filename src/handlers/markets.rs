use axum::{extract::State, Json};

use crate::services::symbols::MarketSymbolMap;
use crate::AppState;

pub async fn get_markets(State(state): State<AppState>) -> Json<MarketSymbolMap> {
    Json(state.dashboard.symbols().clone())
}
