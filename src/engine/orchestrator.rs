//! Claim state machine.
//!
//! `LoggingIn → Polling ⟲ → Claiming → Done`. Each call to [`ClaimOrchestrator::step`]
//! performs exactly one remote call and returns the next state, so there is
//! never more than one request in flight. Polling loops on empty or
//! below-threshold listings after a fixed delay; every error is returned to
//! the caller untouched and ends the run.

use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::selector;
use crate::notify::Notifier;
use crate::platforms::OrderPlatform;
use crate::storage::DedupStore;
use crate::types::{Candidate, ClaimError, ClaimOutcome, SessionState, Stage};

/// What one listing pass calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
    /// Nothing unclaimed on the page.
    Empty,
    /// Best unclaimed order does not pay more than the minimum.
    BelowThreshold(Candidate),
    Claim(Candidate),
}

impl PollDecision {
    pub fn from_best(best: Option<Candidate>, minimum: Decimal) -> Self {
        match best {
            None => PollDecision::Empty,
            Some(c) if c.price > minimum => PollDecision::Claim(c),
            Some(c) => PollDecision::BelowThreshold(c),
        }
    }
}

/// Drives one run from login to a single successful claim.
pub struct ClaimOrchestrator<P: OrderPlatform> {
    platform: P,
    notifier: Box<dyn Notifier>,
    store: DedupStore,
    minimum_amount: Decimal,
    poll_delay: Duration,
    polls: u64,
}

impl<P: OrderPlatform> ClaimOrchestrator<P> {
    pub fn new(
        platform: P,
        notifier: Box<dyn Notifier>,
        store: DedupStore,
        minimum_amount: Decimal,
        poll_delay: Duration,
    ) -> Self {
        Self {
            platform,
            notifier,
            store,
            minimum_amount,
            poll_delay,
            polls: 0,
        }
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Listing requests issued so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Run until an order is claimed or a fatal error occurs.
    pub async fn run(&mut self) -> Result<ClaimOutcome, ClaimError> {
        let mut state = SessionState::LoggingIn;
        loop {
            state = self.step(state).await?;
            if let SessionState::Done { candidate } = state {
                return Ok(ClaimOutcome {
                    order_id: candidate.id,
                    price: candidate.price,
                    polls: self.polls,
                });
            }
        }
    }

    /// Perform the action of `state` and return the state that follows.
    pub async fn step(&mut self, state: SessionState) -> Result<SessionState, ClaimError> {
        debug!(state = %state, "Step");
        match state {
            SessionState::LoggingIn => {
                self.platform
                    .login()
                    .await
                    .map_err(|e| ClaimError::transport(Stage::Login, e))?;
                info!("Login OK");
                Ok(SessionState::Polling)
            }
            SessionState::Polling => self.poll().await,
            SessionState::Claiming { candidate } => self.claim(candidate).await,
            done @ SessionState::Done { .. } => Ok(done),
        }
    }

    async fn poll(&mut self) -> Result<SessionState, ClaimError> {
        self.polls += 1;
        let items = self
            .platform
            .list_orders()
            .await
            .map_err(|e| ClaimError::transport(Stage::Poll, e))?;

        let best = selector::select_best(&items, self.store.claimed())?;

        match PollDecision::from_best(best, self.minimum_amount) {
            PollDecision::Claim(candidate) => {
                info!(
                    order_id = %candidate.id,
                    price = %candidate.price,
                    minimum = %self.minimum_amount,
                    "Best order is above the minimum"
                );
                Ok(SessionState::Claiming { candidate })
            }
            PollDecision::BelowThreshold(candidate) => {
                info!(
                    order_id = %candidate.id,
                    price = %candidate.price,
                    minimum = %self.minimum_amount,
                    "Best order is below the minimum"
                );
                self.wait().await;
                Ok(SessionState::Polling)
            }
            PollDecision::Empty => {
                info!(rows = items.len(), poll = self.polls, "No orders found");
                self.wait().await;
                Ok(SessionState::Polling)
            }
        }
    }

    async fn claim(&mut self, candidate: Candidate) -> Result<SessionState, ClaimError> {
        self.platform
            .claim_order(&candidate.id)
            .await
            .map_err(|e| ClaimError::transport(Stage::Claim, e))?;
        info!(order_id = %candidate.id, price = %candidate.price, "Order claimed");

        self.store.append(&candidate.id)?;

        // The claim is already on record; a silent notifier must not turn
        // it into a failed run.
        if let Err(e) = self.notifier.notify(&candidate.id).await {
            warn!(order_id = %candidate.id, error = %e, "Notification failed");
        }

        Ok(SessionState::Done { candidate })
    }

    async fn wait(&self) {
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
