//! Duration lookups
//!
//! A [`DurationLookup`] answers two questions about a [`ResourceKind`]: is it a
//! fuel at all, and how many ticks does one unit of it burn for. Quantities
//! never store absolute tick counts, so swapping the lookup (for instance to
//! model a device that burns twice as fast) changes every derived value without
//! touching the quantities themselves.

use crate::ResourceKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Override applied on top of a source lookup
///
/// Receives the kind and the duration the source reports for it, and returns
/// the duration to use instead.
pub type DurationFn = Arc<dyn Fn(&ResourceKind, u32) -> u32 + Send + Sync>;

/// Capability answering fuel-ness and burn duration per resource kind
///
/// Implementations must be pure: the same kind always yields the same answer
/// for the lifetime of the lookup. Kinds that are not fuel report a duration of 0,
/// and fuels always report a positive duration.
pub trait DurationLookup: Send + Sync {
    /// Check whether `kind` counts as fuel
    fn is_fuel(&self, kind: &ResourceKind) -> bool;

    /// Get the burn duration of one unit of `kind`, in ticks
    fn duration(&self, kind: &ResourceKind) -> u32;

    /// Enumerate every kind this lookup knows about
    fn kinds(&self) -> Vec<ResourceKind>;

    /// The fuel with the largest duration
    ///
    /// Ties between equal durations go to the kind that sorts first.
    fn largest_fuel(&self) -> Option<ResourceKind> {
        self.kinds()
            .into_iter()
            .filter(|kind| self.is_fuel(kind))
            .max_by(|a, b| match self.duration(a).cmp(&self.duration(b)) {
                Ordering::Equal => b.cmp(a),
                ordering => ordering,
            })
    }

    /// Derive a lookup whose durations go through `duration`
    ///
    /// Fuel-ness is still answered by this lookup.
    fn with(&self, duration: DurationFn) -> Overridden
    where
        Self: Clone + Sized + 'static,
    {
        Overridden::new(Arc::new(self.clone()), duration)
    }
}

/// Fuel durations for the built-in furnace fuels
const VANILLA_FUELS: &[(&str, u32)] = &[
    ("lava_bucket", 20000),
    ("coal_block", 16000),
    ("dried_kelp_block", 4001),
    ("blaze_rod", 2400),
    ("coal", 1600),
    ("charcoal", 1600),
    ("boat", 1200),
    ("bookshelf", 300),
    ("crafting_table", 300),
    ("log", 300),
    ("planks", 300),
    ("wooden_slab", 150),
    ("stick", 100),
    ("sapling", 100),
    ("bamboo", 50),
    ("scaffolding", 50),
];

/// Map-backed lookup between kinds and burn durations
///
/// Kinds that are absent, or mapped to 0, are not fuel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelTable {
    durations: BTreeMap<ResourceKind, u32>,
}

impl FuelTable {
    /// Create an empty table (nothing is fuel)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the built-in furnace fuels
    pub fn vanilla() -> Self {
        VANILLA_FUELS
            .iter()
            .map(|(name, ticks)| (ResourceKind::new(name), *ticks))
            .collect()
    }

    /// Set the duration of a kind, returning the previous one
    pub fn insert(&mut self, kind: ResourceKind, duration: u32) -> Option<u32> {
        self.durations.insert(kind, duration)
    }

    /// Remove a kind from the table
    pub fn remove(&mut self, kind: &ResourceKind) -> Option<u32> {
        self.durations.remove(kind)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Iterate over entries in kind order
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, u32)> {
        self.durations.iter().map(|(kind, ticks)| (kind, *ticks))
    }
}

impl FromIterator<(ResourceKind, u32)> for FuelTable {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, u32)>>(iter: I) -> Self {
        Self {
            durations: iter.into_iter().collect(),
        }
    }
}

impl DurationLookup for FuelTable {
    fn is_fuel(&self, kind: &ResourceKind) -> bool {
        self.duration(kind) > 0
    }

    fn duration(&self, kind: &ResourceKind) -> u32 {
        self.durations.get(kind).copied().unwrap_or(0)
    }

    fn kinds(&self) -> Vec<ResourceKind> {
        self.durations.keys().cloned().collect()
    }
}

/// A lookup answering durations through an override
///
/// Built by [`DurationLookup::with`]. Calling [`Overridden::with`] again replaces
/// the override on the same source instead of stacking a second layer. Use
/// [`Overridden::chain`] to apply one override on top of another.
#[derive(Clone)]
pub struct Overridden {
    source: Arc<dyn DurationLookup>,
    duration: DurationFn,
}

impl Overridden {
    /// Wrap `source`, answering durations through `duration`
    pub fn new(source: Arc<dyn DurationLookup>, duration: DurationFn) -> Self {
        Self { source, duration }
    }

    /// The lookup being overridden
    pub fn source(&self) -> &Arc<dyn DurationLookup> {
        &self.source
    }

    /// Apply `duration` on top of this override
    pub fn chain(&self, duration: DurationFn) -> Overridden {
        Overridden::new(Arc::new(self.clone()), duration)
    }
}

impl DurationLookup for Overridden {
    /// A source fuel stays fuel unless the override brings its duration to 0.
    fn is_fuel(&self, kind: &ResourceKind) -> bool {
        self.duration(kind) > 0
    }

    fn duration(&self, kind: &ResourceKind) -> u32 {
        if self.source.is_fuel(kind) {
            (self.duration)(kind, self.source.duration(kind))
        } else {
            0
        }
    }

    fn kinds(&self) -> Vec<ResourceKind> {
        self.source.kinds()
    }

    fn with(&self, duration: DurationFn) -> Overridden {
        Overridden::new(self.source.clone(), duration)
    }
}

impl fmt::Debug for Overridden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overridden")
            .field("kinds", &self.source.kinds().len())
            .finish_non_exhaustive()
    }
}

/// Override halving every duration
pub fn halved() -> DurationFn {
    Arc::new(|_: &ResourceKind, ticks: u32| ticks / 2)
}

/// Override squaring every duration (saturating)
pub fn squared() -> DurationFn {
    Arc::new(|_: &ResourceKind, ticks: u32| ticks.saturating_mul(ticks))
}

/// Override scaling every duration to `percent`% (saturating)
///
/// `scaled_percent(50)` burns twice as fast, `scaled_percent(200)` twice as slow.
pub fn scaled_percent(percent: u32) -> DurationFn {
    Arc::new(move |_: &ResourceKind, ticks: u32| {
        let scaled = u64::from(ticks) * u64::from(percent) / 100;
        u32::try_from(scaled).unwrap_or(u32::MAX)
    })
}
