use std::sync::Arc;
use vehicle_insights::{server, AppConfig, ModelStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vehicle_insights=info".into()),
        )
        .init();

    let cfg = AppConfig::from_env()?;
    tracing::info!(
        "config: fuel_type_model={} engine_hp_model={} assets_dir={}",
        cfg.fuel_type_model.display(),
        cfg.engine_hp_model.display(),
        cfg.assets_dir.display()
    );

    let store = Arc::new(ModelStore::new());
    if cfg.preload_models {
        let paths = [cfg.fuel_type_model.as_path(), cfg.engine_hp_model.as_path()];
        for (path, e) in store.preload(paths) {
            // the page for this model will show the error instead
            tracing::warn!("could not preload {}: {}", path.display(), e);
        }
    }

    let app = server::router(server::AppState::new(&cfg, store));

    tracing::info!("listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
