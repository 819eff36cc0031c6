use std::{net::Ipv4Addr, sync::Arc};

use narigudo::{
    config::Config,
    face::FaceAnalyzer,
    server::{self, App},
    storage::Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    narigudo::init_logger!();

    let config = Config::from_env()?;

    // Model loading happens before the listener binds; a missing or broken model file keeps the
    // process from serving at all.
    let analyzer = FaceAnalyzer::load(&config.models_dir)?;
    let storage = Storage::create(&config.uploads_dir)?;

    let app = Arc::new(App {
        analyzer: Arc::new(analyzer),
        storage,
    });
    let router = server::router(app, &config.assets_dir, config.body_limit);

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port)).await?;
    log::info!("listening on http://localhost:{}", config.port);
    axum::serve(listener, router).await?;

    Ok(())
}
