use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ratewarden::ratelimit::{AdmissionController, Strategy};

const CALLER: &str = "user123";
const REQUESTS: usize = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Ratewarden admission control demo");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let limiter = AdmissionController::new(5, Duration::from_secs(10), Strategy::Sliding)?;

    for request in 1..=REQUESTS {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let decision = limiter.check(CALLER);
        info!(
            request = request,
            caller = CALLER,
            too_frequent = !decision.admitted,
            remaining = decision.remaining,
            "Request evaluated"
        );
    }

    info!(tracked_callers = limiter.tracked_callers(), "Demo finished");
    Ok(())
}
