use std::sync::Arc;

use anyhow::Context;
use burn::backend::NdArray;
use iris_model::{ClassifierArtifact, ModelStore};
use iris_serve::cli::parse_serve_args;
use iris_serve::{ServeState, logging, result_log, routes};

type Backend = NdArray;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_serve_args();
    let config = args.resolve()?;
    logging::init(&config.logging.level);

    let addr = config.listen_addr()?;

    let artifact = ClassifierArtifact::new(&config.model.path);
    let device = Default::default();
    let model = ModelStore::<Backend>::load(&artifact, &device)
        .with_context(|| format!("loading classifier from {}", artifact.stem().display()))?;
    match model.class_names() {
        Some(names) => log::info!("Loaded classifier with classes {names:?}"),
        None => log::info!("Loaded classifier with {} classes", model.num_classes()),
    }

    let result_log = result_log::open(&config.result_log.url)?;
    log::info!("Logging predictions to {}", result_log.name());

    let state = Arc::new(ServeState::new(model, result_log));
    let routes = routes(state, config.server.max_upload_bytes);

    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_err() {
                log::warn!("Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            log::info!("Shutting down");
        })
        .with_context(|| format!("binding {addr}"))?;

    log::info!("Listening on http://{bound}");
    server.await;
    Ok(())
}
