//! Snapshot journaling
//!
//! A [`Journal`] wraps state that may only change inside transactions. The
//! first mutation at each depth records a snapshot. Aborting a transaction
//! restores that snapshot, and a nested commit hands it to the parent so that
//! a later abort further out still rolls back. Once the outer transaction
//! commits, [`SnapshotParticipant::on_final_commit`] runs exactly once.

use crate::manager::{CloseCallback, Closing, Transaction, TransactionResult};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// State that can be captured and restored
pub trait SnapshotParticipant {
    /// Captured state
    type Snapshot;

    /// Capture the current state
    fn create_snapshot(&self) -> Self::Snapshot;

    /// Restore a previously captured state
    fn read_snapshot(&mut self, snapshot: Self::Snapshot);

    /// Run once after the outer transaction that changed this state commits
    fn on_final_commit(&mut self) {}
}

struct JournalCell<P: SnapshotParticipant> {
    state: RefCell<P>,
    /// One slot per transaction depth
    snapshots: RefCell<Vec<Option<P::Snapshot>>>,
}

/// Transactional cell around a [`SnapshotParticipant`]
pub struct Journal<P: SnapshotParticipant> {
    cell: Rc<JournalCell<P>>,
}

impl<P: SnapshotParticipant + 'static> Journal<P> {
    pub fn new(state: P) -> Self {
        Self {
            cell: Rc::new(JournalCell {
                state: RefCell::new(state),
                snapshots: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Read the current state
    pub fn borrow(&self) -> Ref<'_, P> {
        self.cell.state.borrow()
    }

    /// Mutate the state inside `transaction`
    ///
    /// # Panics
    ///
    /// If `transaction` is not the innermost open transaction.
    pub fn update(&self, transaction: &Transaction<'_>) -> RefMut<'_, P> {
        self.update_snapshots(transaction);
        self.cell.state.borrow_mut()
    }

    /// Record a snapshot for `transaction` unless one already exists at its depth
    pub fn update_snapshots(&self, transaction: &Transaction<'_>) {
        transaction.assert_current();
        let depth = transaction.depth();

        let mut snapshots = self.cell.snapshots.borrow_mut();
        if snapshots.len() <= depth {
            snapshots.resize_with(depth + 1, || None);
        }
        if snapshots[depth].is_some() {
            return;
        }
        snapshots[depth] = Some(self.cell.state.borrow().create_snapshot());
        drop(snapshots);

        transaction.add_close_callback(self.cell.clone());
        trace!(depth, "Recorded snapshot");
    }

    /// Mutate the state outside of any transaction
    ///
    /// Changes made this way are never rolled back.
    pub fn untracked_mut(&self) -> RefMut<'_, P> {
        self.cell.state.borrow_mut()
    }

    /// Check whether any open transaction holds a snapshot of this state
    pub fn is_journaled(&self) -> bool {
        self.cell.snapshots.borrow().iter().any(Option::is_some)
    }
}

impl<P: SnapshotParticipant> CloseCallback for JournalCell<P>
where
    P: 'static,
{
    fn on_close(self: Rc<Self>, closing: &Closing<'_>, result: TransactionResult) {
        let depth = closing.depth();
        let Some(snapshot) = self
            .snapshots
            .borrow_mut()
            .get_mut(depth)
            .and_then(Option::take)
        else {
            return;
        };

        match result {
            TransactionResult::Aborted => {
                self.state.borrow_mut().read_snapshot(snapshot);
            }
            TransactionResult::Committed if depth > 0 => {
                // The parent keeps its own older snapshot if it has one.
                let mut snapshots = self.snapshots.borrow_mut();
                if snapshots[depth - 1].is_none() {
                    snapshots[depth - 1] = Some(snapshot);
                    drop(snapshots);
                    closing.add_parent_close_callback(self);
                }
            }
            TransactionResult::Committed => {
                closing.add_outer_close_callback(Box::new(move |_| {
                    self.state.borrow_mut().on_final_commit();
                }));
            }
        }
    }
}

impl<P: SnapshotParticipant + fmt::Debug> fmt::Debug for Journal<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("state", &*self.cell.state.borrow())
            .finish()
    }
}
