//! Shared types for the claim agent.
//!
//! These types form the data model used across all modules, so that the
//! platform client, the selector, the store and the orchestrator can depend
//! on them without depending on each other.

use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One row of the order search listing, as scraped from a single poll.
///
/// Both fields are raw: the id may be missing when the platform renders a
/// row without its preview link, and the price text still carries the
/// price range and currency symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub id: Option<String>,
    /// e.g. `"  10.00 - 42.50€ extra"`
    pub raw_price_text: String,
}

impl ListingItem {
    pub fn new(id: impl Into<String>, raw_price_text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            raw_price_text: raw_price_text.into(),
        }
    }

    /// A row whose id could not be extracted.
    pub fn without_id(raw_price_text: impl Into<String>) -> Self {
        Self {
            id: None,
            raw_price_text: raw_price_text.into(),
        }
    }
}

/// An unclaimed order whose price was parsed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    /// Upper bound of the advertised price range, in euros. Never negative.
    pub price: Decimal,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}€)", self.id, self.price)
    }
}

// ---------------------------------------------------------------------------
// Claimed set
// ---------------------------------------------------------------------------

/// Ids of every order claimed so far, across runs.
///
/// Only grows. Mutation goes through [`crate::storage::DedupStore::append`]
/// so that the in-memory set never gets ahead of the file on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedSet {
    ids: HashSet<String>,
}

impl ClaimedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `false` if the id was already present.
    pub(crate) fn insert(&mut self, id: String) -> bool {
        self.ids.insert(id)
    }
}

impl<S: Into<String>> FromIterator<S> for ClaimedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Where the claim protocol currently is. Exactly one is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggingIn,
    Polling,
    Claiming { candidate: Candidate },
    Done { candidate: Candidate },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::LoggingIn => write!(f, "logging-in"),
            SessionState::Polling => write!(f, "polling"),
            SessionState::Claiming { candidate } => write!(f, "claiming {candidate}"),
            SessionState::Done { candidate } => write!(f, "done {candidate}"),
        }
    }
}

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    Poll,
    Claim,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Login => write!(f, "login"),
            Stage::Poll => write!(f, "poll"),
            Stage::Claim => write!(f, "claim"),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub order_id: String,
    pub price: Decimal,
    /// Number of listing requests issued, including the winning one.
    pub polls: u64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Every way a run can end other than a successful claim.
///
/// All variants are fatal. Empty and below-threshold listings are not
/// errors and never show up here. Messages leave out the underlying cause;
/// log with `{:#}` through `anyhow` to get the whole chain.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dedup store error ({path})")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport error during {stage}")]
    Transport {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unparsable price text {raw:?}: {reason}")]
    PriceFormat { raw: String, reason: String },
}

impl ClaimError {
    pub fn transport(stage: Stage, source: anyhow::Error) -> Self {
        ClaimError::Transport { stage, source }
    }

    /// Process exit status for this failure. `0` is reserved for success
    /// and `1` for errors that never reached the typed taxonomy.
    pub fn exit_code(&self) -> u8 {
        match self {
            ClaimError::Config(_) => 2,
            ClaimError::Storage { .. } => 3,
            ClaimError::Transport { .. } => 4,
            ClaimError::PriceFormat { .. } => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
