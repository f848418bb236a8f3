//! Platform integrations.
//!
//! Defines the `OrderPlatform` trait and provides the Textbroker author-area
//! implementation.

pub mod textbroker;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::ListingItem;

/// Abstraction over an order marketplace.
///
/// Implementors keep whatever session state login establishes (cookies,
/// tokens) and reuse it for the later calls. None of the methods retry:
/// a returned error means the call failed at the transport or protocol
/// level and the caller decides what to do.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderPlatform: Send + Sync {
    /// Authenticate once for the lifetime of the client.
    async fn login(&self) -> Result<()>;

    /// Fetch the current listing of open orders.
    async fn list_orders(&self) -> Result<Vec<ListingItem>>;

    /// Request exclusive assignment of `order_id`.
    async fn claim_order(&self, order_id: &str) -> Result<()>;

    /// Platform name for logging and identification.
    fn name(&self) -> &str;
}
