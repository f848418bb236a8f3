//! Completion signal.
//!
//! Fired once, after a claim has been recorded in the dedup store, to get
//! the operator's attention.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{NotifierConfig, NotifierKind};

/// How long the bell notifier holds before returning, so the cue is heard
/// before the process exits.
const BELL_HOLD: Duration = Duration::from_secs(1);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Signal that `order_id` was claimed. Returns once the signal is done.
    async fn notify(&self, order_id: &str) -> Result<()>;
}

/// Build the notifier selected in the tuning config.
pub fn from_config(cfg: &NotifierConfig) -> Box<dyn Notifier> {
    match cfg.kind {
        NotifierKind::Bell => Box::new(BellNotifier::new(BELL_HOLD)),
        NotifierKind::Command => Box::new(CommandNotifier::new(cfg.command.clone())),
        NotifierKind::Silent => Box::new(SilentNotifier),
    }
}

/// Rings the terminal bell.
pub struct BellNotifier {
    hold: Duration,
}

impl BellNotifier {
    pub fn new(hold: Duration) -> Self {
        Self { hold }
    }
}

#[async_trait]
impl Notifier for BellNotifier {
    async fn notify(&self, order_id: &str) -> Result<()> {
        info!(order_id, "Ringing terminal bell");
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .context("Failed to ring terminal bell")?;
        tokio::time::sleep(self.hold).await;
        Ok(())
    }
}

/// Runs an external player, e.g. `aplay tone.wav`, and waits for it.
pub struct CommandNotifier {
    argv: Vec<String>,
}

impl CommandNotifier {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, order_id: &str) -> Result<()> {
        let (program, args) = self
            .argv
            .split_first()
            .context("Notifier command is empty")?;

        debug!(program = %program, order_id, "Running notifier command");

        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to run notifier command {program}"))?;

        if !status.success() {
            anyhow::bail!("Notifier command {program} exited with {status}");
        }
        Ok(())
    }
}

/// Does nothing. For headless runs.
pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn notify(&self, order_id: &str) -> Result<()> {
        debug!(order_id, "Silent notifier");
        Ok(())
    }
}
