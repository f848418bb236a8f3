//! Mock platform for integration testing.
//!
//! Provides a deterministic `OrderPlatform` whose listing responses are
//! scripted up front. Every call is recorded so tests can assert on the
//! exact sequence of remote calls. When the script runs out, further
//! listing calls fail like a dropped connection.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use claimbot::notify::Notifier;
use claimbot::platforms::OrderPlatform;
use claimbot::types::ListingItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login,
    ListOrders,
    ClaimOrder(String),
}

/// A scripted order platform.
///
/// Clones share state, so a test can hand one clone to the orchestrator
/// and keep another to inspect calls afterwards.
#[derive(Clone, Default)]
pub struct MockPlatform {
    listings: Arc<Mutex<VecDeque<Result<Vec<ListingItem>, String>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    login_error: Arc<Mutex<Option<String>>>,
    claim_error: Arc<Mutex<Option<String>>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one successful listing response.
    pub fn push_listing(&self, items: Vec<ListingItem>) -> &Self {
        self.listings.lock().unwrap().push_back(Ok(items));
        self
    }

    /// Queue one failed listing response.
    pub fn push_listing_error(&self, msg: &str) -> &Self {
        self.listings.lock().unwrap().push_back(Err(msg.to_string()));
        self
    }

    pub fn fail_login(&self, msg: &str) {
        *self.login_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_claim(&self, msg: &str) {
        *self.claim_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn claims(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ClaimOrder(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn list_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::ListOrders).count()
    }
}

#[async_trait]
impl OrderPlatform for MockPlatform {
    async fn login(&self) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Login);
        if let Some(err) = self.login_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<ListingItem>> {
        self.calls.lock().unwrap().push(Call::ListOrders);
        match self.listings.lock().unwrap().pop_front() {
            Some(Ok(items)) => Ok(items),
            Some(Err(err)) => Err(anyhow!("{}", err)),
            None => Err(anyhow!("script exhausted: connection reset")),
        }
    }

    async fn claim_order(&self, order_id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::ClaimOrder(order_id.to_string()));
        if let Some(err) = self.claim_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Notifier that records which orders it was told about.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notified: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, order_id: &str) -> Result<()> {
        self.notified.lock().unwrap().push(order_id.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_listing_script_in_order() {
        let platform = MockPlatform::new();
        platform
            .push_listing(vec![ListingItem::new("A1", "1 - 2€")])
            .push_listing(Vec::new());

        assert_eq!(platform.list_orders().await.unwrap().len(), 1);
        assert!(platform.list_orders().await.unwrap().is_empty());
        assert!(platform.list_orders().await.is_err());
        assert_eq!(platform.list_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_forced_errors() {
        let platform = MockPlatform::new();
        platform.fail_login("bad credentials");
        platform.fail_claim("already taken");
        platform.push_listing_error("timeout");

        assert!(platform.login().await.is_err());
        assert!(platform.list_orders().await.is_err());
        assert!(platform.claim_order("A1").await.is_err());
        assert_eq!(
            platform.calls(),
            vec![Call::Login, Call::ListOrders, Call::ClaimOrder("A1".into())]
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let platform = MockPlatform::new();
        let observer = platform.clone();
        platform.claim_order("B2").await.unwrap();
        assert_eq!(observer.claims(), vec!["B2".to_string()]);
    }
}
