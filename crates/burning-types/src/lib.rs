//! Burning Types - Canonical value types for burning fuel
//!
//! This crate contains the foundational types with zero dependencies on other
//! burning crates:
//!
//! - Resource kinds (the fuel identifiers)
//! - Duration lookups (fuel-ness and burn duration per kind, with overrides)
//! - The fractional [`Quantity`] and its arithmetic
//! - Fuel table configuration and errors
//!
//! # Invariants
//!
//! 1. A quantity's fraction is always within `[0, 1]`
//! 2. A fuel always has a positive duration; anything else is not a fuel
//! 3. Arithmetic never fails: out-of-range results clamp, non-fuels are `None`

pub mod kind;
pub mod lookup;
pub mod quantity;
pub mod config;
pub mod error;

pub use kind::*;
pub use lookup::*;
pub use quantity::*;
pub use config::*;
pub use error::*;
