use std::{net::SocketAddr, sync::Arc};

use h5pmake::{Packager, TemplateLoader};
use h5pmake_publish::{Publisher, UploadThing};
use h5pmake_server::{
    AppState,
    config::ServerConfig,
    cors_layer, create_router,
    error::{ApiError, Result},
};
use secrecy::ExposeSecret;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "h5pmake_server=debug,h5pmake_publish=debug,tower_http=debug".to_string()
        }))
        .init();

    // Load configuration; a missing upload token stops startup here
    let config = ServerConfig::from_env()?;
    info!("Starting h5pmake server on {}:{}", config.host, config.port);

    let uploader = UploadThing::from_token(config.upload_token.expose_secret(), config.upload_timeout())
        .map_err(|e| ApiError::Config(e.to_string()))?;
    info!("Uploading to UploadThing app {}", uploader.app_id());

    let publisher = Publisher::new(
        TemplateLoader::new(&config.templates_dir),
        Packager::new(&config.scratch_dir),
        Arc::new(uploader),
        config.upload_timeout(),
    );
    info!("Serving templates from {}", config.templates_dir.display());

    let state = AppState { publisher };
    let app = create_router(state, cors_layer(&config.cors_origins));

    let ip = config
        .host
        .parse::<std::net::IpAddr>()
        .map_err(|_| ApiError::Config(format!("Invalid HOST value: {}", config.host)))?;
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
