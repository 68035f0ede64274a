use std::sync::Arc;

use langdetect_service::{
    api::{self, AppState},
    classifier::profile,
    config::DetectionConfig,
    detection::DetectionFacade,
    instance::CloudInitProvider,
    logging, server,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let profiles = profile::preload();
    info!(profiles, "language profiles loaded");

    let config = DetectionConfig::from_env()?;
    let classifier = Arc::new(config.classifier()?);
    let instance = Arc::new(CloudInitProvider::new(&config.instance_dir));

    info!(
        languages = ?config.languages,
        instance_dir = %config.instance_dir.display(),
        "starting language detection server"
    );

    let state = AppState::new(DetectionFacade::new(classifier), instance);
    let app = api::build_router(state);

    server::serve(app, &config.server.addr()).await
}
