use anyhow::Context;
use pocket_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load PocketLibrary settings")?;
    pocket_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        offline = settings.catalog.offline,
        "pocket-library bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    pocket_library::register_all(&mut registry, &settings)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = pocket_http::start_server(&registry, &settings, shutdown_signal()).await;
    registry.stop_all().await?;
    served
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
