//! CLAIMBOT — Textbroker order claimer
//!
//! Entry point. Loads configuration and the dedup store, initialises
//! structured logging, then runs the login → poll → claim loop until one
//! order is claimed. Every fatal error is logged here and mapped to its own
//! exit status.

use std::process::ExitCode;
use tracing::{error, info};

use claimbot::config::AppConfig;
use claimbot::engine::ClaimOrchestrator;
use claimbot::notify;
use claimbot::platforms::textbroker::TextbrokerClient;
use claimbot::platforms::OrderPlatform;
use claimbot::storage::DedupStore;
use claimbot::types::{ClaimError, ClaimOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    match run().await {
        Ok(outcome) => {
            info!(
                order_id = %outcome.order_id,
                price = format!("{:.2}€", outcome.price),
                polls = outcome.polls,
                "CLAIMBOT finished: order claimed"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e
                .downcast_ref::<ClaimError>()
                .map(ClaimError::exit_code)
                .unwrap_or(1);
            error!(error = format!("{e:#}"), exit_code = code, "CLAIMBOT aborted");
            ExitCode::from(code)
        }
    }
}

async fn run() -> anyhow::Result<ClaimOutcome> {
    let cfg = AppConfig::load()?;
    let store = DedupStore::load(&cfg.dedup_file_path)?;

    let platform = TextbrokerClient::from_config(&cfg)
        .map_err(|e| ClaimError::Config(format!("{e:#}")))?;
    let notifier = notify::from_config(&cfg.tuning.notifier);

    info!(
        platform = platform.name(),
        base_url = %cfg.tuning.platform.base_url,
        minimum = %cfg.minimum_amount_order,
        poll_delay_ms = cfg.tuning.poller.poll_delay_ms,
        notifier = ?cfg.tuning.notifier.kind,
        already_claimed = store.claimed().len(),
        "CLAIMBOT starting up"
    );

    let mut orchestrator = ClaimOrchestrator::new(
        platform,
        notifier,
        store,
        cfg.minimum_amount_order,
        cfg.tuning.poller.poll_delay(),
    );

    Ok(orchestrator.run().await?)
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("claimbot=info"));

    let json_logging = std::env::var("CLAIMBOT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
