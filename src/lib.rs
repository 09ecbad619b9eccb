//! A transactional, priority-aware store of half-open time intervals:
//! ordered range queries, synthetic free-gap generation on read, and
//! contiguous-set discovery over a direction-aware scan. Grounded in the
//! resource-scheduling engine this crate descends from (see DESIGN.md for
//! the full ledger), minus its wire protocol, WAL, and SQL surface — this
//! crate is the in-memory core, embedded directly by a host process.

mod contiguous;
mod error;
mod interval;
mod keys;
mod limits;
mod scan;
mod store;
mod transaction;

/// Identifies a stored interval. `0` is reserved for synthetic free
/// intervals and is never assigned to a caller-inserted one.
pub type Id = u64;

pub use error::Error;
pub use interval::{overlap_duration, Interval, Nanos, FREE_ID};
pub use keys::{decode_float, decode_time, decode_uint, encode_checked, encode_float, encode_time, encode_uint, IndexKey, KeyKind, KeyValue};
pub use limits::Limits;
pub use scan::RangeScan;
pub use store::Store;
pub use transaction::Transaction;
