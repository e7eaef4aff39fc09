//! Stateless storages
//!
//! None of these hold journaled state, so they never register with a transaction.

use crate::storage::Storage;
use burning_transaction::Transaction;
use burning_types::{DurationLookup, Quantity, ResourceKind};
use std::fmt;
use std::rc::Rc;

/// Storage that never holds anything
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStorage {
    zero: Quantity,
}

impl EmptyStorage {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            zero: Quantity::zero_of(kind),
        }
    }
}

impl Storage for EmptyStorage {
    fn supports_insertion(&self) -> bool {
        false
    }

    fn supports_extraction(&self) -> bool {
        false
    }

    fn insert(&self, quantity: &Quantity, _: &dyn DurationLookup, _: &Transaction<'_>) -> Quantity {
        quantity.zero()
    }

    fn extract(&self, quantity: &Quantity, _: &dyn DurationLookup, _: &Transaction<'_>) -> Quantity {
        quantity.zero()
    }

    fn current_quantity(&self, _: &dyn DurationLookup) -> Quantity {
        self.zero.clone()
    }
}

/// Endless source that hands out whatever is requested
#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteStorage {
    one: Quantity,
}

impl InfiniteStorage {
    /// `kind` is only reported when the lookup has no fuel at all
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            one: Quantity::one_of(kind),
        }
    }
}

impl Storage for InfiniteStorage {
    fn supports_insertion(&self) -> bool {
        false
    }

    fn insert(&self, quantity: &Quantity, _: &dyn DurationLookup, _: &Transaction<'_>) -> Quantity {
        quantity.zero()
    }

    fn extract(&self, quantity: &Quantity, _: &dyn DurationLookup, _: &Transaction<'_>) -> Quantity {
        quantity.clone()
    }

    fn current_quantity(&self, lookup: &dyn DurationLookup) -> Quantity {
        Quantity::max_value(lookup).unwrap_or_else(|| self.one.clone())
    }

    fn is_burning(&self, _: &dyn DurationLookup) -> bool {
        true
    }
}

/// Endless sink that swallows whatever is inserted
#[derive(Debug, Clone, PartialEq)]
pub struct VoidStorage {
    zero: Quantity,
}

impl VoidStorage {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            zero: Quantity::zero_of(kind),
        }
    }
}

impl Storage for VoidStorage {
    fn supports_extraction(&self) -> bool {
        false
    }

    fn insert(&self, quantity: &Quantity, _: &dyn DurationLookup, _: &Transaction<'_>) -> Quantity {
        quantity.clone()
    }

    fn extract(&self, quantity: &Quantity, _: &dyn DurationLookup, _: &Transaction<'_>) -> Quantity {
        quantity.zero()
    }

    fn current_quantity(&self, _: &dyn DurationLookup) -> Quantity {
        self.zero.clone()
    }
}

/// Resolves the storage to forward to, if any
pub type StorageSupplier = Box<dyn Fn() -> Option<Rc<dyn Storage>>>;

/// Storage that delegates every call to a target resolved on each call
///
/// Behaves like an [`EmptyStorage`] while no target resolves.
pub struct ForwardingStorage {
    supplier: StorageSupplier,
    fallback: EmptyStorage,
}

impl ForwardingStorage {
    pub fn new(kind: ResourceKind, supplier: impl Fn() -> Option<Rc<dyn Storage>> + 'static) -> Self {
        Self {
            supplier: Box::new(supplier),
            fallback: EmptyStorage::new(kind),
        }
    }

    /// Forward to a fixed target
    pub fn to(kind: ResourceKind, target: Rc<dyn Storage>) -> Self {
        Self::new(kind, move || Some(target.clone()))
    }

    fn with_target<R>(&self, f: impl FnOnce(&dyn Storage) -> R) -> R {
        match (self.supplier)() {
            Some(target) => f(target.as_ref()),
            None => f(&self.fallback),
        }
    }
}

impl Storage for ForwardingStorage {
    fn supports_insertion(&self) -> bool {
        self.with_target(|target| target.supports_insertion())
    }

    fn supports_extraction(&self) -> bool {
        self.with_target(|target| target.supports_extraction())
    }

    fn insert(
        &self,
        quantity: &Quantity,
        lookup: &dyn DurationLookup,
        transaction: &Transaction<'_>,
    ) -> Quantity {
        self.with_target(|target| target.insert(quantity, lookup, transaction))
    }

    fn extract(
        &self,
        quantity: &Quantity,
        lookup: &dyn DurationLookup,
        transaction: &Transaction<'_>,
    ) -> Quantity {
        self.with_target(|target| target.extract(quantity, lookup, transaction))
    }

    fn current_quantity(&self, lookup: &dyn DurationLookup) -> Quantity {
        self.with_target(|target| target.current_quantity(lookup))
    }

    fn is_burning(&self, lookup: &dyn DurationLookup) -> bool {
        self.with_target(|target| target.is_burning(lookup))
    }
}

impl fmt::Debug for ForwardingStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardingStorage")
            .field("resolved", &(self.supplier)().is_some())
            .finish()
    }
}
