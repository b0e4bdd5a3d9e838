use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use draftscout::observer::TracingObserver;
use draftscout::{Agent, Config};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("draftscout=info")),
        )
        .init();

    let config_path = config_path_from_args();
    let config = match Config::load(&config_path) {
        Ok(config) => {
            info!(path = %config_path.display(), "configuration loaded");
            config
        }
        Err(err) => {
            warn!(%err, path = %config_path.display(), "falling back to default configuration");
            Config::default()
        }
    };

    let (handle, task) = Agent::new(config)
        .with_observer(Arc::new(TracingObserver))
        .start();

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
    handle.shutdown();
    if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
        warn!("supervisor did not stop within the grace period");
    }
}

fn config_path_from_args() -> PathBuf {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return PathBuf::from(path);
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return PathBuf::from(path);
        }
    }
    PathBuf::from("draftscout.json")
}
