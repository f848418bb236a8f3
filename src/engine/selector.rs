//! Candidate selection.
//!
//! Scans one listing pass, drops rows that were already claimed or have no
//! id, parses the price of every remaining row and keeps the most valuable
//! one. A price that cannot be parsed aborts the pass: it means the page
//! layout changed and any choice made from it could be wrong.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::types::{Candidate, ClaimError, ClaimedSet, ListingItem};

/// Extract the price from text shaped like `"<noise>-<amount>€<noise>"`.
///
/// The amount is whatever sits between the first `-` and the following
/// `€`, trimmed. It must be plain ASCII digits with at most one `.`;
/// signs, exponents, digit separators and commas are rejected.
pub fn parse_price(raw: &str) -> Result<Decimal, ClaimError> {
    let fail = |reason: &str| ClaimError::PriceFormat {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let (_, after_dash) = raw.split_once('-').ok_or_else(|| fail("missing '-'"))?;
    let (amount, _) = after_dash
        .split_once('€')
        .ok_or_else(|| fail("missing '€' after '-'"))?;
    let amount = amount.trim();

    let plain = amount.chars().all(|c| c.is_ascii_digit() || c == '.')
        && amount.matches('.').count() <= 1
        && amount.chars().any(|c| c.is_ascii_digit());
    if !plain {
        return Err(fail(&format!("{amount:?} is not a plain decimal amount")));
    }

    Decimal::from_str(amount)
        .map_err(|e| fail(&format!("{amount:?} is not a decimal number: {e}")))
}

/// Pick the highest-priced unclaimed row.
///
/// Returns `Ok(None)` when nothing is eligible: an empty listing, or one
/// where every row is claimed or lacks an id. Ties go to the row seen first.
pub fn select_best(
    items: &[ListingItem],
    claimed: &ClaimedSet,
) -> Result<Option<Candidate>, ClaimError> {
    let mut best: Option<Candidate> = None;

    for item in items {
        let Some(id) = item.id.as_deref() else {
            warn!(price_text = %item.raw_price_text.trim(), "Listing row without order id, skipping");
            continue;
        };

        if claimed.contains(id) {
            info!(order_id = id, "Found one order already claimed");
            continue;
        }

        let price = parse_price(&item.raw_price_text)?;
        debug!(order_id = id, price = %price, "Found one order");

        let better = match &best {
            Some(current) => price > current.price,
            None => true,
        };
        if better {
            best = Some(Candidate {
                id: id.to_string(),
                price,
            });
        }
    }

    Ok(best)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
