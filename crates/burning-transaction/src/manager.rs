//! Transaction scopes
//!
//! A [`TransactionManager`] is a stack of open frames. Every [`Transaction`]
//! handle is an index into that stack. Handles close in strict stack order:
//! committing consumes the handle, and dropping an uncommitted handle aborts it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// How a transaction was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionResult {
    Committed,
    Aborted,
}

impl TransactionResult {
    pub fn was_committed(self) -> bool {
        self == Self::Committed
    }
}

/// Participant notified when a transaction it registered with closes
pub trait CloseCallback {
    /// Called once the frame of the closing transaction has been popped.
    ///
    /// `closing` can still reach the parent frame and the outer close callbacks.
    fn on_close(self: Rc<Self>, closing: &Closing<'_>, result: TransactionResult);
}

/// Callback run after the outer transaction closes
pub type OuterCloseCallback = Box<dyn FnOnce(TransactionResult)>;

#[derive(Default)]
struct Frame {
    callbacks: Vec<Rc<dyn CloseCallback>>,
}

/// Arena of open transaction frames
///
/// Single-threaded by construction (`!Sync`); every participant that mutates
/// during a transaction registers here to be restored on abort.
#[derive(Default)]
pub struct TransactionManager {
    frames: RefCell<Vec<Frame>>,
    outer_callbacks: RefCell<Vec<OuterCloseCallback>>,
    closing: Cell<bool>,
}

impl TransactionManager {
    /// Create a manager with no open transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a root transaction
    ///
    /// # Panics
    ///
    /// If a transaction is already open on this manager, or if called from a close callback.
    pub fn open_outer(&self) -> Transaction<'_> {
        self.assert_not_closing();
        let mut frames = self.frames.borrow_mut();
        if !frames.is_empty() {
            panic!("An outer transaction is already open; open a nested transaction instead");
        }
        frames.push(Frame::default());
        trace!("Opened outer transaction");
        Transaction {
            manager: self,
            depth: 0,
            closed: false,
        }
    }

    /// Open a transaction, nested under `parent` when given
    pub fn open<'m>(&'m self, parent: Option<&Transaction<'m>>) -> Transaction<'m> {
        match parent {
            Some(parent) => {
                assert!(
                    std::ptr::eq(parent.manager, self),
                    "Parent transaction belongs to another manager"
                );
                parent.open_nested()
            }
            None => self.open_outer(),
        }
    }

    /// Check whether any transaction is open
    pub fn is_open(&self) -> bool {
        !self.frames.borrow().is_empty()
    }

    /// Depth of the innermost open transaction
    pub fn current_depth(&self) -> Option<usize> {
        self.frames.borrow().len().checked_sub(1)
    }

    fn assert_not_closing(&self) {
        if self.closing.get() {
            panic!("Cannot open a transaction from a close callback");
        }
    }
}

impl fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionManager")
            .field("open", &self.frames.borrow().len())
            .field("closing", &self.closing.get())
            .finish()
    }
}

/// Handle to one open transaction
///
/// Not `Clone`: committing consumes the handle, so a transaction can only be
/// committed once. Dropping an uncommitted handle aborts it.
pub struct Transaction<'m> {
    manager: &'m TransactionManager,
    depth: usize,
    closed: bool,
}

impl<'m> Transaction<'m> {
    /// Nesting depth, 0 for the outer transaction
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The manager owning this transaction
    pub fn manager(&self) -> &'m TransactionManager {
        self.manager
    }

    /// Check whether this is the innermost open transaction
    pub fn is_current(&self) -> bool {
        !self.closed
            && !self.manager.closing.get()
            && self.manager.frames.borrow().len() == self.depth + 1
    }

    /// # Panics
    ///
    /// If this is not the innermost open transaction.
    pub fn assert_current(&self) {
        if !self.is_current() {
            panic!(
                "Transaction at depth {} is not the innermost open transaction",
                self.depth
            );
        }
    }

    /// Open a transaction nested in this one
    ///
    /// # Panics
    ///
    /// If this is not the innermost open transaction.
    pub fn open_nested(&self) -> Transaction<'m> {
        self.assert_current();
        self.manager.frames.borrow_mut().push(Frame::default());
        trace!(depth = self.depth + 1, "Opened nested transaction");
        Transaction {
            manager: self.manager,
            depth: self.depth + 1,
            closed: false,
        }
    }

    /// Register a callback run when this transaction closes
    ///
    /// Callbacks run in reverse registration order.
    pub fn add_close_callback(&self, callback: Rc<dyn CloseCallback>) {
        let mut frames = self.manager.frames.borrow_mut();
        match frames.get_mut(self.depth) {
            Some(frame) if !self.closed => frame.callbacks.push(callback),
            _ => panic!("Transaction at depth {} is not open", self.depth),
        }
    }

    /// Register a callback run after the outer transaction closes
    pub fn add_outer_close_callback(&self, callback: OuterCloseCallback) {
        self.manager.outer_callbacks.borrow_mut().push(callback);
    }

    /// Commit this transaction
    ///
    /// Nested commits hand their changes to the parent; only the outer commit is final.
    pub fn commit(mut self) {
        self.close(TransactionResult::Committed);
    }

    /// Abort this transaction, same as dropping it
    pub fn abort(mut self) {
        self.close(TransactionResult::Aborted);
    }

    fn close(&mut self, result: TransactionResult) {
        self.closed = true;
        let manager = self.manager;

        let callbacks = {
            let mut frames = manager.frames.borrow_mut();
            if frames.len() != self.depth + 1 || manager.closing.get() {
                drop(frames);
                if std::thread::panicking() {
                    return;
                }
                panic!(
                    "Transaction at depth {} closed while a nested transaction is still open",
                    self.depth
                );
            }
            frames.pop().map(|frame| frame.callbacks).unwrap_or_default()
        };

        let closing = Closing {
            manager,
            depth: self.depth,
        };
        manager.closing.set(true);
        for callback in callbacks.into_iter().rev() {
            callback.on_close(&closing, result);
        }
        manager.closing.set(false);

        if self.depth > 0 {
            trace!(depth = self.depth, ?result, "Closed nested transaction");
            return;
        }

        debug!(?result, "Closed outer transaction");
        let outer = std::mem::take(&mut *manager.outer_callbacks.borrow_mut());
        for callback in outer {
            callback(result);
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.close(TransactionResult::Aborted);
        }
    }
}

impl fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("depth", &self.depth)
            .field("closed", &self.closed)
            .finish()
    }
}

/// View of a transaction while its close callbacks run
pub struct Closing<'m> {
    manager: &'m TransactionManager,
    depth: usize,
}

impl Closing<'_> {
    /// Depth of the closing transaction
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Register a callback with the parent of the closing transaction
    ///
    /// # Panics
    ///
    /// If the closing transaction is the outer one.
    pub fn add_parent_close_callback(&self, callback: Rc<dyn CloseCallback>) {
        let parent = self
            .depth
            .checked_sub(1)
            .expect("The outer transaction has no parent");
        let mut frames = self.manager.frames.borrow_mut();
        frames[parent].callbacks.push(callback);
    }

    /// Register a callback run after the outer transaction closes
    pub fn add_outer_close_callback(&self, callback: OuterCloseCallback) {
        self.manager.outer_callbacks.borrow_mut().push(callback);
    }
}
