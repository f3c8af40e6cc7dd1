use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lighter_stats::config::Config;
use lighter_stats::datasource::lighter::LighterClient;
use lighter_stats::datasource::DataSource;
use lighter_stats::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lighter_stats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let datasource: Arc<dyn DataSource> = Arc::new(LighterClient::new(
        &config.explorer_url,
        &config.exchange_url,
    ));

    let state = AppState::bootstrap(datasource).await;
    let app = router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting Lighter Stats dashboard on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
