//! Caller-tunable limits (C10). The teacher hardcodes these as `const`s in
//! a `crate::limits` module referenced from `engine/conflict.rs` and
//! `engine/queries.rs`; a standalone library has no config file to source
//! constants from, so here they're a `Store::open_with_limits` parameter
//! instead, with a `Default` matching the teacher's implied defaults.

use crate::interval::Nanos;

#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Longest duration a single interval may span.
    pub max_span_duration: Nanos,
    /// Widest `[min_start, max_end)` window a range-scan call may request.
    pub max_query_window: Nanos,
}

const ONE_YEAR_NANOS: Nanos = 365 * 24 * 3_600 * 1_000_000_000;

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_span_duration: ONE_YEAR_NANOS,
            max_query_window: 10 * ONE_YEAR_NANOS,
        }
    }
}
