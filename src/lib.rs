//! Lighter account dashboard: per-address open positions, balances and
//! recent realized PnL, aggregated from the Lighter explorer and exchange
//! APIs and served as a browser page plus a small JSON API.

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod datasource;
pub mod error;
pub mod handlers;
pub mod services;
pub mod views;

use datasource::DataSource;
use services::aggregator::AccountAggregator;
use services::dashboard::Dashboard;
use services::symbols::SymbolResolver;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<AccountAggregator>,
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    /// Resolves the market symbols once for the session and wires the
    /// services around `datasource`.
    pub async fn bootstrap(datasource: Arc<dyn DataSource>) -> Self {
        let symbols = Arc::new(SymbolResolver::new(datasource.clone()).resolve().await);
        let aggregator = Arc::new(AccountAggregator::new(datasource));
        let dashboard = Arc::new(Dashboard::new(aggregator.clone(), symbols));

        Self {
            aggregator,
            dashboard,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::dashboard::index))
        .route("/show", post(handlers::dashboard::show))
        .route("/refresh", post(handlers::dashboard::refresh))
        .route("/health", get(|| async { "OK" }))
        .route("/api/accounts/{address}", get(handlers::accounts::get_account))
        .route("/api/markets", get(handlers::markets::get_markets))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
