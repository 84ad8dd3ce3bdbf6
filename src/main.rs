use attendance_editor::{
    google::GoogleBackend, load_registry, router, AppState, Settings,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::load()?;
    let registry = load_registry(&settings).await?;
    if !settings.credentials_path.is_file() {
        warn!(
            "credentials file {} not found; campus pages will show an error",
            settings.credentials_path.display()
        );
    }
    info!(
        "environment {}, {} campuses",
        settings.environment,
        registry.len()
    );

    let backend = Arc::new(GoogleBackend::new(Arc::new(settings.clone())));
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let app = router(AppState::new(settings, registry, backend));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
