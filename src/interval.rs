//! C1 — the interval value model: an immutable half-open `[start, end)`
//! interval with priority and an opaque payload, plus its geometric
//! predicates. Grounded in the teacher's `Span`/`Interval` (`model.rs`),
//! generalized from `Ms`-only bookings to a priority-bearing, generically
//! payloaded value per spec §3.

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::Id;

/// Nanoseconds since the Unix epoch. A plain signed integer, same idiom as
/// the teacher's `pub type Ms = i64` — sorts correctly and serializes
/// compactly, and (unlike `std::time::Duration`) represents instants before
/// the epoch without extra ceremony.
pub type Nanos = i64;

/// `id = 0` is reserved for synthetic free intervals (spec §3) and must
/// never be used for a stored interval.
pub const FREE_ID: Id = 0;

/// An immutable half-open interval `[start, end)` with priority and an
/// opaque payload. `priority == 0.0` means free (only ever true for
/// synthetic intervals produced by the range-scan iterator); `priority >
/// 0.0` means busy.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval<P> {
    pub id: Id,
    pub start: Nanos,
    pub end: Nanos,
    pub priority: f64,
    pub payload: Option<P>,
}

/// One second of tolerance, expressed in nanoseconds, for `Interval::equal`.
const EQUAL_TOLERANCE_NANOS: Nanos = 1_000_000_000;

impl<P> Interval<P> {
    /// Construct an interval, rejecting non-positive duration (spec §4.1).
    pub fn new(id: Id, start: Nanos, end: Nanos, priority: f64, payload: Option<P>) -> Result<Self, Error> {
        if end <= start {
            return Err(Error::InvalidInterval);
        }
        Ok(Self { id, start, end, priority, payload })
    }

    /// A synthetic free interval: `id = 0`, `priority = 0`, no payload.
    pub(crate) fn synthetic_free(start: Nanos, end: Nanos) -> Self {
        Self { id: FREE_ID, start, end, priority: 0.0, payload: None }
    }

    pub fn duration(&self) -> Nanos {
        self.end - self.start
    }

    pub fn busy(&self) -> bool {
        self.priority > 0.0
    }

    /// Half-open overlap: `self.start < other.end && other.start < self.end`.
    /// Does not consider priority.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `overlaps` AND (`include_free` OR both priorities are busy).
    pub fn conflicts(&self, other: &Self, include_free: bool) -> bool {
        self.overlaps(other) && (include_free || (self.busy() && other.busy()))
    }

    /// Inclusive-at-both-ends wrap: `self.start <= other.start && self.end
    /// >= other.end`.
    pub fn wraps(&self, other: &Self) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Equal-by-extent: start and end each match within ±1 second. Used for
    /// deletion lookup and test assertions; callers needing exact equality
    /// should compare `start`/`end` directly.
    pub fn equal(&self, other: &Self) -> bool {
        (self.start - other.start).abs() <= EQUAL_TOLERANCE_NANOS
            && (self.end - other.end).abs() <= EQUAL_TOLERANCE_NANOS
    }

    pub fn contains_time(&self, t: Nanos) -> bool {
        self.start <= t && t < self.end
    }

    pub fn is_before_time(&self, t: Nanos) -> bool {
        self.end <= t
    }

    pub fn is_after_time(&self, t: Nanos) -> bool {
        self.start >= t
    }
}

/// Zero when disjoint; otherwise `min(end, b_end) - max(start, b_start)`.
/// Free function (not a method) because it compares an interval's extent
/// against a raw `[b_start, b_end)` window rather than another `Interval`.
pub fn overlap_duration(start: Nanos, end: Nanos, b_start: Nanos, b_end: Nanos) -> Nanos {
    let lo = start.max(b_start);
    let hi = end.min(b_end);
    if hi > lo {
        hi - lo
    } else {
        0
    }
}

impl<P> Interval<P> {
    /// Parse RFC 3339 / ISO 8601 timestamps, normalizing to UTC nanoseconds,
    /// per spec §6's string constructors for testing. Propagates parse
    /// errors as `Error::InvalidTimestamp`.
    pub fn from_str_parts(
        id: Id,
        start: &str,
        end: &str,
        priority: f64,
        payload: Option<P>,
    ) -> Result<Self, Error> {
        let start_nanos = parse_rfc3339_nanos(start)?;
        let end_nanos = parse_rfc3339_nanos(end)?;
        Self::new(id, start_nanos, end_nanos, priority, payload)
    }
}

fn parse_rfc3339_nanos(s: &str) -> Result<Nanos, Error> {
    let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::InvalidTimestamp(format!("{s}: {e}")))?
        .with_timezone(&Utc);
    parsed
        .timestamp_nanos_opt()
        .ok_or_else(|| Error::InvalidTimestamp(format!("{s}: out of nanosecond-representable range")))
}
