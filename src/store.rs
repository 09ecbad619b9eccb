//! C3 — the indexed interval store: a `by_id` map plus three ordered
//! secondary indexes (`by_start`, `by_end`, `by_priority`), published as
//! copy-on-write snapshots. Grounded in the teacher's `Engine`
//! (`engine/mod.rs`) — a `DashMap`-sharded, WAL-backed, async actor over
//! many resources — collapsed to a single `Arc<RwLock<Arc<Snapshot>>>` plus
//! a write-ticket mutex, since this crate has exactly one logical table and
//! no persistence layer (spec §4.3, §5).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Condvar, Mutex, RwLock};

use crate::error::Error;
use crate::interval::Interval;
use crate::keys::{encode_float, encode_time, IndexKey};
use crate::limits::Limits;
use crate::Id;

/// An immutable logical copy of all four indexes at a commit boundary.
#[derive(Debug)]
pub(crate) struct Snapshot<P> {
    pub(crate) by_id: HashMap<Id, Interval<P>>,
    pub(crate) by_start: BTreeMap<IndexKey, Id>,
    pub(crate) by_end: BTreeMap<IndexKey, Id>,
    pub(crate) by_priority: BTreeMap<IndexKey, Vec<Id>>,
}

impl<P> Snapshot<P> {
    fn empty() -> Self {
        Self {
            by_id: HashMap::new(),
            by_start: BTreeMap::new(),
            by_end: BTreeMap::new(),
            by_priority: BTreeMap::new(),
        }
    }
}

/// The teacher's indexes live behind per-resource `Arc<RwLock<_>>` guards
/// and are mutated in place under that lock; without a structural-sharing
/// map crate in this pack's dependency surface, the equivalent here is a
/// full clone whenever a write transaction needs its own copy (via
/// `Arc::make_mut`, only when a concurrent reader still holds the old
/// `Arc`). See DESIGN.md for why this is an accepted simplification, not
/// true path-sharing copy-on-write.
impl<P: Clone> Clone for Snapshot<P> {
    fn clone(&self) -> Self {
        Self {
            by_id: self.by_id.clone(),
            by_start: self.by_start.clone(),
            by_end: self.by_end.clone(),
            by_priority: self.by_priority.clone(),
        }
    }
}

impl<P: Clone> Snapshot<P> {
    /// Insert with the full `add` contract: `DuplicateId` if the id already
    /// exists, `Conflict` if it overlaps an existing busy interval.
    pub(crate) fn insert_checked(&mut self, iv: Interval<P>) -> Result<(), Error> {
        if self.by_id.contains_key(&iv.id) {
            return Err(Error::DuplicateId(iv.id));
        }
        if let Some(other) = self.find_conflict(&iv) {
            return Err(Error::Conflict { with: other });
        }
        self.insert_unchecked(iv);
        Ok(())
    }

    fn insert_unchecked(&mut self, iv: Interval<P>) {
        let start_key = encode_time(iv.start);
        let end_key = encode_time(iv.end);
        let prio_key = encode_float(iv.priority);
        self.by_start.insert(start_key, iv.id);
        self.by_end.insert(end_key, iv.id);
        self.by_priority.entry(prio_key).or_default().push(iv.id);
        self.by_id.insert(iv.id, iv);
    }

    /// Remove the stored interval with the given id, keeping all four
    /// indexes consistent.
    pub(crate) fn remove(&mut self, id: Id) -> Option<Interval<P>> {
        let iv = self.by_id.remove(&id)?;
        self.by_start.remove(&encode_time(iv.start));
        self.by_end.remove(&encode_time(iv.end));
        let prio_key = encode_float(iv.priority);
        if let Some(ids) = self.by_priority.get_mut(&prio_key) {
            ids.retain(|&x| x != id);
            if ids.is_empty() {
                self.by_priority.remove(&prio_key);
            }
        }
        Some(iv)
    }

    /// A stored interval that `iv` conflicts with under the literal `add`
    /// contract (spec §4.3): overlap AND both priorities `> 0`. A free
    /// (`priority == 0`) `iv` never conflicts, since `Interval::conflicts`
    /// with `include_free = false` requires both sides to be busy. Two
    /// stored busy intervals can never share an identical `start` or `end`
    /// value (either would force them to overlap, which `add` already
    /// rejects), so a scan bounded by `by_start < iv.end` is exact, not just
    /// an approximation.
    fn find_conflict(&self, iv: &Interval<P>) -> Option<Id> {
        for (_, id) in self.by_start.range(..encode_time(iv.end)) {
            if let Some(existing) = self.by_id.get(id)
                && iv.conflicts(existing, false) {
                    return Some(*id);
                }
        }
        None
    }
}

/// RAII write-ticket: a binary semaphore guarding "only one write
/// transaction in flight at a time" (spec §5), implemented with a
/// condition variable rather than a held `MutexGuard` so the ticket can be
/// acquired in one call and released in another without fighting Rust's
/// guard lifetimes.
#[derive(Debug, Default)]
struct WriteTicket {
    held: Mutex<bool>,
    free: Condvar,
}

impl WriteTicket {
    fn acquire(&self) {
        let mut held = self.held.lock().unwrap();
        while *held {
            held = self.free.wait(held).unwrap();
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = self.held.lock().unwrap();
        *held = false;
        self.free.notify_one();
    }
}

struct StoreInner<P> {
    current: RwLock<Arc<Snapshot<P>>>,
    write_ticket: WriteTicket,
    limits: Limits,
}

/// The indexed interval store. Cheaply `Clone`-able (an `Arc` handle), so
/// callers can hand copies to multiple transactions the way the teacher
/// hands out `SharedResourceState` handles.
pub struct Store<P>(Arc<StoreInner<P>>);

impl<P> Clone for Store<P> {
    fn clone(&self) -> Self {
        Store(self.0.clone())
    }
}

impl<P> Store<P> {
    /// Create an empty store with default limits.
    pub fn open() -> Self {
        Self::open_with_limits(Limits::default())
    }

    /// Create an empty store with caller-supplied limits (C10).
    pub fn open_with_limits(limits: Limits) -> Self {
        Store(Arc::new(StoreInner {
            current: RwLock::new(Arc::new(Snapshot::empty())),
            write_ticket: WriteTicket::default(),
            limits,
        }))
    }

    /// Release resources. A pure in-memory store has nothing to flush or
    /// close, but the entry point is part of the public contract (spec §6)
    /// so callers following the open/close discipline have somewhere to put
    /// the call.
    pub fn close(self) {
        tracing::debug!("store closed");
    }

    pub fn limits(&self) -> Limits {
        self.0.limits
    }

    pub(crate) fn current_snapshot(&self) -> Arc<Snapshot<P>> {
        self.0.current.read().unwrap().clone()
    }

    pub(crate) fn acquire_write_ticket(&self) {
        self.0.write_ticket.acquire();
    }

    pub(crate) fn release_write_ticket(&self) {
        self.0.write_ticket.release();
    }

    pub(crate) fn publish(&self, snapshot: Arc<Snapshot<P>>) {
        *self.0.current.write().unwrap() = snapshot;
    }
}

impl<P: Clone> Snapshot<P> {
    pub(crate) fn cloned_for_write(self: &Arc<Self>) -> Arc<Self> {
        Arc::new((**self).clone())
    }
}
