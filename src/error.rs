//! Stable error vocabulary (spec §7). Manual `Display`/`Error` impls,
//! matching the teacher's `EngineError` — this crate pulls in no
//! `thiserror`, same as the engine it's grounded on.

use crate::Id;

#[derive(Debug)]
pub enum Error {
    /// Construction with `end <= start`.
    InvalidInterval,
    /// `min_start >= max_end` on a range-scan call.
    InvalidRange,
    /// A typed index received a value of incompatible type.
    InvalidKeyType,
    /// `add` would violate the non-overlap invariant among busy intervals.
    Conflict { with: Id },
    /// `add` with an `id` already present.
    DuplicateId(Id),
    /// `delete` with an `id` not present.
    NotFound(Id),
    /// Operation on a transaction that already committed or aborted.
    TxClosed,
    /// A string-constructor timestamp failed to parse as RFC 3339 / ISO 8601.
    InvalidTimestamp(String),
    /// A requested span or query window exceeds the store's configured
    /// `Limits` (C10): `iv.duration()` wider than `max_span_duration` on
    /// `add`, or `max_end - min_start` wider than `max_query_window` on a
    /// range-scan or `find_set` call.
    LimitExceeded { limit: &'static str, requested: i64, max: i64 },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInterval => write!(f, "invalid interval: end must be strictly after start"),
            Error::InvalidRange => write!(f, "invalid range: min_start must be before max_end"),
            Error::InvalidKeyType => write!(f, "invalid key type for this index"),
            Error::Conflict { with } => write!(f, "conflicts with existing interval {with}"),
            Error::DuplicateId(id) => write!(f, "id {id} already exists"),
            Error::NotFound(id) => write!(f, "id {id} not found"),
            Error::TxClosed => write!(f, "transaction already committed or aborted"),
            Error::InvalidTimestamp(s) => write!(f, "invalid timestamp: {s}"),
            Error::LimitExceeded { limit, requested, max } => {
                write!(f, "{limit} limit exceeded: requested {requested}, max {max}")
            }
        }
    }
}

impl std::error::Error for Error {}
