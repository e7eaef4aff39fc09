//! Burning Storage - Transactional holders of burning energy
//!
//! A [`Storage`] accepts and hands out [`Quantity`]s inside a [`Transaction`].
//! Every mutation is journaled, so aborting the transaction restores the
//! storage exactly. [`transfer`] moves energy between two storages with a
//! probe-then-commit protocol that never leaves a partial change behind.
//!
//! ```
//! use burning_storage::{transfer, FuelTable, Quantity, ResourceKind, SimpleStorage, Storage, TransactionManager};
//!
//! let lookup = FuelTable::vanilla();
//! let manager = TransactionManager::new();
//! let source = SimpleStorage::new(ResourceKind::coal());
//! let target = SimpleStorage::new(ResourceKind::coal());
//!
//! let coal = Quantity::one_of(ResourceKind::coal());
//! let tx = manager.open_outer();
//! source.insert(&coal, &lookup, &tx);
//! let moved = transfer(Some(&source), Some(&target), &coal, &lookup, &tx);
//! tx.commit();
//!
//! assert_eq!(moved, coal);
//! assert!(!source.is_burning());
//! assert!(target.is_burning());
//! ```

pub mod base;
pub mod simple;
pub mod storage;
pub mod transfer;

pub use base::*;
pub use simple::*;
pub use storage::*;
pub use transfer::*;

pub use burning_transaction::{Transaction, TransactionManager, TransactionResult};
pub use burning_types::{
    DurationFn, DurationLookup, FuelTable, FuelTableConfig, Overridden, Quantity, ResourceKind,
};
