//! Burning Transaction - Nested transactions with snapshot rollback
//!
//! Storage mutations happen inside a [`Transaction`]. Transactions nest, close
//! in stack order, and roll back every registered participant when aborted.
//!
//! # Invariants
//!
//! 1. Only the innermost open transaction may be mutated through or nested from
//! 2. Aborting restores every participant to its state when the transaction opened
//! 3. A nested commit is provisional until the outer transaction commits
//! 4. Final-commit hooks run once, after every close callback of the outer transaction

pub mod manager;
pub mod participant;

pub use manager::*;
pub use participant::*;
