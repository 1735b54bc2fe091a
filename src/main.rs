use tokio::net::TcpListener;
use tracing::{error, info};

use tracker_insights::config::Config;
use tracker_insights::logging;
use tracker_insights::server::{router, AppState};

/// Local HTTP service over the status interpretation engine
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "tracker-insights stopped");
        eprintln!("tracker-insights: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tracker_insights::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    logging::init(&config.logging)?;

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    info!(addr = %config.server.bind, db = ?config.storage.db_path, "server running");

    axum::serve(listener, app).await?;
    Ok(())
}
