//! The storage contract

use burning_transaction::Transaction;
use burning_types::{DurationLookup, Quantity};

/// Stateful holder of burning energy
///
/// `insert` and `extract` must be called with the innermost open transaction and
/// must journal their state before mutating it, so that aborting that
/// transaction undoes them. Both return the amount actually moved, in the kind
/// of the requested quantity and never more than requested.
pub trait Storage {
    /// Whether `insert` can ever accept anything
    fn supports_insertion(&self) -> bool {
        true
    }

    /// Whether `extract` can ever provide anything
    fn supports_extraction(&self) -> bool {
        true
    }

    /// Insert up to `quantity`, returning the accepted portion
    fn insert(
        &self,
        quantity: &Quantity,
        lookup: &dyn DurationLookup,
        transaction: &Transaction<'_>,
    ) -> Quantity;

    /// Extract up to `quantity`, returning the extracted portion
    fn extract(
        &self,
        quantity: &Quantity,
        lookup: &dyn DurationLookup,
        transaction: &Transaction<'_>,
    ) -> Quantity;

    /// Energy currently held
    fn current_quantity(&self, lookup: &dyn DurationLookup) -> Quantity;

    /// Whether any energy is held
    fn is_burning(&self, lookup: &dyn DurationLookup) -> bool {
        !self.current_quantity(lookup).is_zero()
    }
}
