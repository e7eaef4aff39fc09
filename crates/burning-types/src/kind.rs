//! Resource kinds
//!
//! A resource kind names one fuel-like resource (an item type in the host world).
//! Kinds are compared and ordered by name so that every tie-break between two
//! kinds is deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a fuel-like resource
///
/// Cloning is a reference-count bump, so quantities can carry their kind by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(Arc<str>);

impl ResourceKind {
    /// Create a kind from its name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Get the name of this kind
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Check whether two handles share the same interned name
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // Convenience constructors for the built-in furnace fuels

    /// Coal (1600 ticks in the vanilla table)
    pub fn coal() -> Self {
        Self::new("coal")
    }

    /// Charcoal (1600 ticks in the vanilla table)
    pub fn charcoal() -> Self {
        Self::new("charcoal")
    }

    /// Blaze rod (2400 ticks in the vanilla table)
    pub fn blaze_rod() -> Self {
        Self::new("blaze_rod")
    }

    /// Lava bucket (20000 ticks in the vanilla table)
    pub fn lava_bucket() -> Self {
        Self::new("lava_bucket")
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}
