//! C4 — read/write transactions over a store snapshot. Grounded in the
//! teacher's write-ticket + snapshot discipline (`engine/mod.rs`'s
//! `SharedResourceState` guards), de-asynced to `std::sync` per SPEC_FULL
//! §4.3/§5 since this crate has no I/O to overlap with lock contention.

use std::sync::Arc;

use crate::contiguous::find_set;
use crate::error::Error;
use crate::interval::Interval;
use crate::scan::{Direction, RangeScan};
use crate::store::{Snapshot, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Open,
    Committed,
    Aborted,
}

/// A read or write view over a store snapshot (spec §4.3). State machine:
/// `Open -> Committed` or `Open -> Aborted`; every operation after
/// termination fails with `Error::TxClosed`.
pub struct Transaction<P> {
    store: Store<P>,
    write: bool,
    state: TxState,
    /// Read transactions: the fixed snapshot they see for their whole
    /// lifetime. Write transactions: the base snapshot `working` was cloned
    /// from, kept only for reference.
    base: Arc<Snapshot<P>>,
    /// `Some` only for write transactions — the in-progress, not-yet-
    /// published copy of the indexes. Kept as an `Arc` so handing a
    /// snapshot reference to a `RangeScan` is a cheap refcount bump;
    /// `Arc::make_mut` clones the underlying indexes only if a scan is
    /// still holding a reference to them, the copy-on-write behavior spec
    /// §5 asks for.
    working: Option<Arc<Snapshot<P>>>,
}

impl<P: Clone> Store<P> {
    /// Open a read or write transaction over the store's current snapshot
    /// (spec §6). Write transactions block here until the previous writer
    /// commits or aborts — "only one write transaction may be in flight at
    /// a time" (spec §5).
    pub fn new_tx(&self, write: bool) -> Transaction<P> {
        if write {
            self.acquire_write_ticket();
        }
        let base = self.current_snapshot();
        let working = if write { Some(base.cloned_for_write()) } else { None };
        tracing::debug!(write, "transaction opened");
        Transaction { store: self.clone(), write, state: TxState::Open, base, working }
    }
}

impl<P: Clone> Transaction<P> {
    fn check_open(&self) -> Result<(), Error> {
        if self.state != TxState::Open {
            return Err(Error::TxClosed);
        }
        Ok(())
    }

    /// Insert `iv`. Fails with `Conflict` if it overlaps a stored busy
    /// interval, `DuplicateId` if `iv.id` is already present, `LimitExceeded`
    /// if `iv.duration()` is wider than the store's `max_span_duration`. A
    /// failed add leaves the transaction open and otherwise unchanged (spec
    /// §7).
    pub fn add(&mut self, iv: Interval<P>) -> Result<(), Error> {
        self.check_open()?;
        assert!(self.write, "add called on a read-only transaction");
        let max = self.store.limits().max_span_duration;
        let duration = iv.duration();
        if duration > max {
            let err = Error::LimitExceeded { limit: "max_span_duration", requested: duration, max };
            tracing::debug!(id = iv.id, error = %err, "add rejected");
            return Err(err);
        }
        let working = self.working.as_mut().expect("write transaction always has a working snapshot");
        let id = iv.id;
        let result = Arc::make_mut(working).insert_checked(iv);
        if let Err(ref e) = result {
            tracing::debug!(id, error = %e, "add rejected");
        }
        result
    }

    /// Remove the stored interval with the same id as `iv`. Fails with
    /// `NotFound` if no such id exists.
    pub fn delete(&mut self, iv: &Interval<P>) -> Result<(), Error> {
        self.check_open()?;
        assert!(self.write, "delete called on a read-only transaction");
        let working = self.working.as_mut().expect("write transaction always has a working snapshot");
        match Arc::make_mut(working).remove(iv.id) {
            Some(_) => Ok(()),
            None => {
                tracing::debug!(id = iv.id, "delete rejected");
                Err(Error::NotFound(iv.id))
            }
        }
    }

    /// Materialized forward scan (ascending by end), see `find_fwd_iter`.
    pub fn find_fwd(&self, min_start: i64, max_end: i64, max_priority: f64) -> Result<Vec<Interval<P>>, Error> {
        Ok(self.find_fwd_iter(min_start, max_end, max_priority)?.collect())
    }

    /// Materialized reverse scan (descending by start), see `find_rev_iter`.
    pub fn find_rev(&self, min_start: i64, max_end: i64, max_priority: f64) -> Result<Vec<Interval<P>>, Error> {
        Ok(self.find_rev_iter(min_start, max_end, max_priority)?.collect())
    }

    /// C5 — lazy forward range-scan iterator, ascending by `end`, emitting
    /// stored and synthetic free intervals over `[min_start, max_end)`.
    /// Fails with `LimitExceeded` if the window is wider than the store's
    /// `max_query_window`.
    pub fn find_fwd_iter(&self, min_start: i64, max_end: i64, max_priority: f64) -> Result<RangeScan<P>, Error> {
        self.check_query_window(min_start, max_end)?;
        RangeScan::new(self.snapshot_arc(), Direction::Forward, min_start, max_end, max_priority)
    }

    /// C5 — lazy reverse range-scan iterator, descending by `start`.
    pub fn find_rev_iter(&self, min_start: i64, max_end: i64, max_priority: f64) -> Result<RangeScan<P>, Error> {
        self.check_query_window(min_start, max_end)?;
        RangeScan::new(self.snapshot_arc(), Direction::Reverse, min_start, max_end, max_priority)
    }

    /// C6 — the earliest (`first = true`) or latest maximal touching chain
    /// whose summed duration meets `min_duration`.
    pub fn find_set(
        &self,
        first: bool,
        min_start: i64,
        max_end: i64,
        min_duration: i64,
        max_priority: f64,
    ) -> Result<Vec<Interval<P>>, Error> {
        self.check_query_window(min_start, max_end)?;
        let direction = if first { Direction::Forward } else { Direction::Reverse };
        let scan = RangeScan::new(self.snapshot_arc(), direction, min_start, max_end, max_priority)?;
        Ok(find_set(scan, min_duration))
    }

    /// `LimitExceeded` if `[min_start, max_end)` is wider than the store's
    /// `max_query_window` (C10).
    fn check_query_window(&self, min_start: i64, max_end: i64) -> Result<(), Error> {
        let max = self.store.limits().max_query_window;
        let width = max_end - min_start;
        if width > max {
            return Err(Error::LimitExceeded { limit: "max_query_window", requested: width, max });
        }
        Ok(())
    }

    /// A cloned `Arc` of the snapshot this transaction is reading against —
    /// shared with any `RangeScan` the transaction hands out, matching
    /// spec §5's "iterators hold a reference to the snapshot of their
    /// originating transaction." Cheap: just a refcount bump.
    fn snapshot_arc(&self) -> Arc<Snapshot<P>> {
        match &self.working {
            Some(w) => w.clone(),
            None => self.base.clone(),
        }
    }

    /// Write transactions: publish the in-progress snapshot, making
    /// changes visible to subsequently opened transactions. Read
    /// transactions: release the snapshot reference (no-op beyond state).
    pub fn commit(&mut self) -> Result<(), Error> {
        self.check_open()?;
        if self.write {
            let working = self.working.take().expect("write transaction always has a working snapshot");
            self.store.publish(working);
            self.store.release_write_ticket();
            tracing::debug!("write transaction committed");
        } else {
            tracing::debug!("read transaction committed");
        }
        self.state = TxState::Committed;
        Ok(())
    }

    /// Discard any in-progress changes and release the snapshot reference.
    pub fn abort(&mut self) -> Result<(), Error> {
        self.check_open()?;
        if self.write {
            self.working = None;
            self.store.release_write_ticket();
            tracing::debug!("write transaction aborted");
        } else {
            tracing::debug!("read transaction aborted");
        }
        self.state = TxState::Aborted;
        Ok(())
    }
}

impl<P> Drop for Transaction<P> {
    /// An open write transaction dropped without commit/abort releases its
    /// write ticket — otherwise the store would deadlock on the next
    /// writer. This mirrors RAII guard drop semantics; it does not replace
    /// an explicit `abort()` call, which also resets transaction state.
    fn drop(&mut self) {
        if self.write && self.state == TxState::Open {
            self.store.release_write_ticket();
        }
    }
}
