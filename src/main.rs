use std::sync::Arc;

use curator::{make_app, utils::logging::init_tracing, AppState, Config};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = Config::init()?;
    init_tracing(&config.log_level);
    info!("Configuration loaded successfully");

    let bind_addr = config.bind_addr.clone();
    let app = make_app(Arc::new(AppState::new(config)));

    // Bind to a TCP listener
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
