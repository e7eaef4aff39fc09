//! Tick-counting storage
//!
//! [`SimpleStorage`] keeps two raw counters, the ticks currently held and the
//! capacity of the active fuel kind, plus the zero quantity naming that kind.
//! The counters live behind a [`BurnerAdapter`] so a host object can own them.

use crate::storage::Storage;
use burning_transaction::{Journal, SnapshotParticipant, Transaction};
use burning_types::{DurationFn, DurationLookup, Quantity, ResourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Raw burn counters of a host object
pub trait BurnerAdapter {
    /// Ticks currently held
    fn current(&self) -> u32;

    fn set_current(&mut self, ticks: u32);

    /// Capacity in ticks of the active fuel kind
    fn max(&self) -> u32;

    fn set_max(&mut self, ticks: u32);

    /// Called once after an outer transaction that changed the counters commits
    fn on_final_commit(&mut self, _burning: bool) {}
}

/// Plain in-memory counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnCounters {
    pub current: u32,
    pub max: u32,
}

impl BurnerAdapter for BurnCounters {
    fn current(&self) -> u32 {
        self.current
    }

    fn set_current(&mut self, ticks: u32) {
        self.current = ticks;
    }

    fn max(&self) -> u32 {
        self.max
    }

    fn set_max(&mut self, ticks: u32) {
        self.max = ticks;
    }
}

/// Persistable state of a [`SimpleStorage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// Ticks held
    pub current: u32,
    /// Capacity of the active kind
    pub max: u32,
    /// Zero quantity of the active kind
    pub zero: Quantity,
}

impl StorageSnapshot {
    pub fn is_burning(&self) -> bool {
        self.current > 0
    }
}

/// Observer of committed storage changes
///
/// Listeners run while the storage is being finalized and must not call back into it.
pub trait StorageListener {
    fn on_commit(&self, state: &StorageSnapshot);
}

struct Burner<A> {
    adapter: A,
    zero: Quantity,
    listeners: Vec<Rc<dyn StorageListener>>,
}

impl<A: BurnerAdapter> SnapshotParticipant for Burner<A> {
    type Snapshot = StorageSnapshot;

    fn create_snapshot(&self) -> StorageSnapshot {
        StorageSnapshot {
            current: self.adapter.current(),
            max: self.adapter.max(),
            zero: self.zero.clone(),
        }
    }

    fn read_snapshot(&mut self, snapshot: StorageSnapshot) {
        self.adapter.set_max(snapshot.max);
        self.adapter.set_current(snapshot.current);
        self.zero = snapshot.zero;
    }

    fn on_final_commit(&mut self) {
        let state = self.create_snapshot();
        debug!(
            current = state.current,
            max = state.max,
            kind = %state.zero.kind(),
            "Storage committed"
        );
        self.adapter.on_final_commit(state.is_burning());
        for listener in &self.listeners {
            listener.on_commit(&state);
        }
    }
}

/// Per-storage duration scaling on top of a caller's lookup
struct Scaled<'a> {
    inner: &'a dyn DurationLookup,
    scaling: Option<&'a DurationFn>,
}

impl DurationLookup for Scaled<'_> {
    fn is_fuel(&self, kind: &ResourceKind) -> bool {
        self.duration(kind) > 0
    }

    fn duration(&self, kind: &ResourceKind) -> u32 {
        if !self.inner.is_fuel(kind) {
            return 0;
        }
        let duration = self.inner.duration(kind);
        match self.scaling {
            Some(scaling) => scaling(kind, duration),
            None => duration,
        }
    }

    fn kinds(&self) -> Vec<ResourceKind> {
        self.inner.kinds()
    }
}

/// Storage counting ticks of a single active fuel kind
///
/// Inserting a kind with a smaller duration, or overflowing the current
/// capacity, switches the active kind to the inserted one. Extracting down to
/// within a smaller kind's duration switches to that kind.
pub struct SimpleStorage<A: BurnerAdapter + 'static = BurnCounters> {
    burner: Journal<Burner<A>>,
    scaling: Option<DurationFn>,
}

/// Storage backed by a host object's counters
pub type AdapterStorage<A> = SimpleStorage<A>;

impl SimpleStorage<BurnCounters> {
    /// Create an empty storage of `kind`
    pub fn new(kind: ResourceKind) -> Self {
        Self::with_adapter(BurnCounters::default(), kind)
    }

    /// Create a storage from persisted state
    pub fn from_snapshot(snapshot: StorageSnapshot) -> Self {
        let storage = Self::new(snapshot.zero.kind().clone());
        storage.read_snapshot(snapshot);
        storage
    }
}

impl<A: BurnerAdapter + 'static> SimpleStorage<A> {
    /// Create a storage over existing counters, denominated in `kind`
    pub fn with_adapter(adapter: A, kind: ResourceKind) -> Self {
        Self {
            burner: Journal::new(Burner {
                adapter,
                zero: Quantity::zero_of(kind),
                listeners: Vec::new(),
            }),
            scaling: None,
        }
    }

    /// Scale every duration seen by this storage
    pub fn with_scaling(mut self, scaling: DurationFn) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Ticks currently held
    pub fn current(&self) -> u32 {
        self.burner.borrow().adapter.current()
    }

    /// Capacity of the active kind
    pub fn max(&self) -> u32 {
        self.burner.borrow().adapter.max()
    }

    /// Zero quantity of the active kind
    pub fn zero(&self) -> Quantity {
        self.burner.borrow().zero.clone()
    }

    /// Overwrite the held ticks, clamped to the capacity
    ///
    /// Host-side write outside of any transaction; it is never rolled back.
    pub fn set_current(&self, ticks: u32) {
        let mut burner = self.burner.untracked_mut();
        let ticks = ticks.min(burner.adapter.max());
        burner.adapter.set_current(ticks);
    }

    /// Overwrite the capacity, clamping the held ticks down to it
    ///
    /// Host-side write outside of any transaction; it is never rolled back.
    pub fn set_max(&self, ticks: u32) {
        let mut burner = self.burner.untracked_mut();
        burner.adapter.set_max(ticks);
        if burner.adapter.current() > ticks {
            burner.adapter.set_current(ticks);
        }
    }

    pub fn is_burning(&self) -> bool {
        self.current() > 0
    }

    pub fn add_listener(&self, listener: Rc<dyn StorageListener>) {
        self.burner.untracked_mut().listeners.push(listener);
    }

    /// Remove a listener previously added, compared by identity
    pub fn remove_listener(&self, listener: &Rc<dyn StorageListener>) -> bool {
        let mut burner = self.burner.untracked_mut();
        let before = burner.listeners.len();
        burner.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        burner.listeners.len() != before
    }

    /// Capture the persistable state
    pub fn create_snapshot(&self) -> StorageSnapshot {
        self.burner.borrow().create_snapshot()
    }

    /// Restore persisted state outside of any transaction
    pub fn read_snapshot(&self, snapshot: StorageSnapshot) {
        self.burner.untracked_mut().read_snapshot(snapshot);
    }

    /// Read-only access to the adapter
    pub fn with_adapter_ref<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.burner.borrow().adapter)
    }

    fn lookup<'a>(&'a self, lookup: &'a dyn DurationLookup) -> Scaled<'a> {
        Scaled {
            inner: lookup,
            scaling: self.scaling.as_ref(),
        }
    }
}

impl<A: BurnerAdapter + 'static> Storage for SimpleStorage<A> {
    fn insert(
        &self,
        quantity: &Quantity,
        lookup: &dyn DurationLookup,
        transaction: &Transaction<'_>,
    ) -> Quantity {
        transaction.assert_current();
        let lookup = self.lookup(lookup);
        if !lookup.is_fuel(quantity.kind()) {
            return quantity.zero();
        }
        let requested = quantity.ticks(&lookup);
        let duration = quantity.duration(&lookup);

        let mut burner = self.burner.update(transaction);
        let current = burner.adapter.current();
        let max = burner.adapter.max();
        let accepted = max.max(duration).saturating_sub(current).min(requested);
        let current = current + accepted;

        if (max > duration && current <= duration) || current > max {
            burner.adapter.set_max(duration);
            burner.zero = quantity.zero();
        }
        burner.adapter.set_current(current);
        trace!(
            kind = %quantity.kind(),
            requested,
            accepted,
            current,
            "Inserted"
        );

        quantity.with_value(i64::from(accepted), &lookup)
    }

    fn extract(
        &self,
        quantity: &Quantity,
        lookup: &dyn DurationLookup,
        transaction: &Transaction<'_>,
    ) -> Quantity {
        transaction.assert_current();
        let lookup = self.lookup(lookup);
        if !lookup.is_fuel(quantity.kind()) {
            return quantity.zero();
        }
        let requested = quantity.ticks(&lookup);
        let duration = quantity.duration(&lookup);

        let mut burner = self.burner.update(transaction);
        let current = burner.adapter.current();
        let max = burner.adapter.max();
        let extracted = current.min(requested);
        let current = current - extracted;

        if max > duration && current <= duration {
            burner.adapter.set_max(duration);
            burner.zero = quantity.zero();
        }
        burner.adapter.set_current(current);
        trace!(
            kind = %quantity.kind(),
            requested,
            extracted,
            current,
            "Extracted"
        );

        quantity.with_value(i64::from(extracted), &lookup)
    }

    fn current_quantity(&self, lookup: &dyn DurationLookup) -> Quantity {
        let lookup = self.lookup(lookup);
        let burner = self.burner.borrow();
        burner
            .zero
            .with_value(i64::from(burner.adapter.current()), &lookup)
    }

    fn is_burning(&self, _lookup: &dyn DurationLookup) -> bool {
        self.current() > 0
    }
}

impl<A: BurnerAdapter + 'static> fmt::Debug for SimpleStorage<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.create_snapshot();
        f.debug_struct("SimpleStorage")
            .field("current", &state.current)
            .field("max", &state.max)
            .field("kind", state.zero.kind())
            .field("scaled", &self.scaling.is_some())
            .finish()
    }
}
