//! Atomic transfer between storages

use crate::storage::Storage;
use burning_transaction::{Transaction, TransactionManager};
use burning_types::{DurationLookup, Quantity};
use tracing::{debug, trace, warn};

/// Move up to `max_amount` from `source` to `target`
///
/// The source is first probed in a scope that is always aborted. The probed
/// amount is then inserted into the target, and exactly what the target
/// accepted is extracted from the source, both in a second scope. That scope
/// commits only if both sides agree; otherwise it is aborted and nothing moves.
///
/// Returns the amount moved, or `max_amount.zero()` when nothing moved.
pub fn transfer(
    source: Option<&dyn Storage>,
    target: Option<&dyn Storage>,
    max_amount: &Quantity,
    lookup: &dyn DurationLookup,
    transaction: &Transaction<'_>,
) -> Quantity {
    let (Some(source), Some(target)) = (source, target) else {
        return max_amount.zero();
    };
    if !source.supports_extraction() || !target.supports_insertion() {
        trace!("Transfer skipped: storages do not support it");
        return max_amount.zero();
    }

    let extracted = {
        let probe = transaction.open_nested();
        source.extract(max_amount, lookup, &probe)
    };
    if extracted.is_zero() {
        return max_amount.zero();
    }

    let scope = transaction.open_nested();
    let inserted = target.insert(&extracted, lookup, &scope);
    let confirmed = source.extract(&inserted, lookup, &scope);

    if inserted == confirmed {
        scope.commit();
        debug!("Transferred {} (requested {})", inserted, max_amount);
        inserted
    } else {
        warn!(
            "Transfer rolled back: target accepted {} but source gave {}",
            inserted, confirmed
        );
        scope.abort();
        max_amount.zero()
    }
}

/// [`transfer`] in its own outer transaction
///
/// The transaction commits when something moved and is aborted otherwise.
///
/// # Panics
///
/// If `manager` already has an open transaction.
pub fn transfer_outer(
    source: Option<&dyn Storage>,
    target: Option<&dyn Storage>,
    max_amount: &Quantity,
    lookup: &dyn DurationLookup,
    manager: &TransactionManager,
) -> Quantity {
    let transaction = manager.open_outer();
    let moved = transfer(source, target, max_amount, lookup, &transaction);
    if moved.is_zero() {
        transaction.abort();
    } else {
        transaction.commit();
    }
    moved
}
