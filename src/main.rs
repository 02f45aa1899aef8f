// src/main.rs
use pos_core::adapter::PosCoordinator;
use pos_core::application::dto::parser::parse_register_request;
use pos_core::config::Config;
use pos_core::domain::errors::{AppError, AppResult};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting pos_core v{}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).ok_or_else(|| {
        AppError::Config("Usage: pos_core <request.json>".to_string())
    })?;

    let contents = tokio::fs::read_to_string(&path).await?;
    let request = parse_register_request(&contents)?;

    let coordinator = PosCoordinator::from_config(&config).await?;
    match coordinator.handle(&request).await {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            log::error!("Request {} failed: {}", path, e);
            Err(e.into())
        }
    }
}
