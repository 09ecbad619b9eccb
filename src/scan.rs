//! C5 — the range-scan iterator: a bounded, directional, lazy walk over a
//! store snapshot that interleaves stored intervals with synthetic free
//! gaps. Grounded in the teacher's `availability.rs` sweep (`merge_overlapping`,
//! `subtract_intervals`), reshaped per design note §9 from a batch
//! `Vec<Span>` computation into a pull-based `Iterator` — no channels, no
//! upfront materialization of the whole answer.

use std::ops::Bound;
use std::sync::Arc;

use crate::error::Error;
use crate::interval::Interval;
use crate::keys::{encode_time, IndexKey};
use crate::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Reverse,
}

/// A single-pass, finite, not-restartable iterator over `[min_start,
/// max_end)`. Does no I/O and never errors after construction (spec §4.4).
pub struct RangeScan<P> {
    snapshot: Arc<Snapshot<P>>,
    direction: Direction,
    min_start: i64,
    max_end: i64,
    max_priority: f64,
    /// The index key last handed out by `fetch_raw`, used to resume the
    /// underlying `BTreeMap::range` scan on the next call without holding a
    /// live borrow across `next()` calls (which would make this type
    /// self-referential).
    cursor: Option<IndexKey>,
    /// Forward: the end of the last emitted interval (or `min_start`
    /// initially). Reverse: the start of the last emitted interval (or
    /// `max_end` initially).
    mark: i64,
    /// A candidate already pulled from the index and found to qualify, but
    /// whose preceding free gap was emitted on the previous call; staged
    /// here to be emitted on the next one.
    staged: Option<Interval<P>>,
    done: bool,
}

impl<P: Clone> RangeScan<P> {
    pub(crate) fn new(
        snapshot: Arc<Snapshot<P>>,
        direction: Direction,
        min_start: i64,
        max_end: i64,
        max_priority: f64,
    ) -> Result<Self, Error> {
        if min_start >= max_end {
            return Err(Error::InvalidRange);
        }
        let mark = match direction {
            Direction::Forward => min_start,
            Direction::Reverse => max_end,
        };
        Ok(Self {
            snapshot,
            direction,
            min_start,
            max_end,
            max_priority,
            cursor: None,
            mark,
            staged: None,
            done: false,
        })
    }

    /// The direction this scan walks in — used by the contiguous-set finder
    /// to decide which side of a candidate must touch the running chain.
    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    /// Pull the next raw candidate from the appropriate index in emission
    /// order, without any window or priority filtering yet.
    fn fetch_raw(&mut self) -> Option<Interval<P>> {
        let (key, id) = match self.direction {
            Direction::Forward => {
                let lower = match &self.cursor {
                    Some(k) => Bound::Excluded(k.clone()),
                    None => Bound::Excluded(encode_time(self.min_start)),
                };
                let (k, id) = self.snapshot.by_end.range((lower, Bound::Unbounded)).next()?;
                (k.clone(), *id)
            }
            Direction::Reverse => {
                let upper = match &self.cursor {
                    Some(k) => Bound::Excluded(k.clone()),
                    None => Bound::Excluded(encode_time(self.max_end)),
                };
                let (k, id) = self.snapshot.by_start.range((Bound::Unbounded, upper)).next_back()?;
                (k.clone(), *id)
            }
        };
        self.cursor = Some(key);
        self.snapshot.by_id.get(&id).cloned()
    }

    fn final_gap(&mut self) -> Option<Interval<P>> {
        self.done = true;
        match self.direction {
            Direction::Forward if self.mark < self.max_end => {
                Some(Interval::synthetic_free(self.mark, self.max_end))
            }
            Direction::Reverse if self.mark > self.min_start => {
                Some(Interval::synthetic_free(self.min_start, self.mark))
            }
            _ => None,
        }
    }
}

impl<P: Clone> Iterator for RangeScan<P> {
    type Item = Interval<P>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(iv) = self.staged.take() {
            self.mark = match self.direction {
                Direction::Forward => iv.end,
                Direction::Reverse => iv.start,
            };
            return Some(iv);
        }

        loop {
            let Some(c) = self.fetch_raw() else {
                return self.final_gap();
            };

            let out_of_window = match self.direction {
                Direction::Forward => c.is_after_time(self.max_end),
                Direction::Reverse => c.is_before_time(self.min_start),
            };
            if out_of_window {
                // The seek to the lower/upper bound landed on an interval
                // entirely outside the window — treat it the same as index
                // exhaustion (spec §4.4: "the next candidate has start >=
                // max_end" / symmetric reverse case).
                return self.final_gap();
            }

            if c.priority > self.max_priority {
                // Invisible: no free interval stands in for it, and its
                // extent does not reappear folded into a later gap either —
                // a skipped region is simply absent from the emitted union
                // (worked example: skipping the middle of three adjacent
                // stored intervals yields exactly the other two, no gap
                // between them). That requires `mark` to jump past the
                // skipped extent here.
                self.mark = match self.direction {
                    Direction::Forward => c.end.max(self.mark),
                    Direction::Reverse => c.start.min(self.mark),
                };
                continue;
            }

            return match self.direction {
                Direction::Forward => {
                    if c.start > self.mark {
                        let gap = Interval::synthetic_free(self.mark, c.start.min(self.max_end));
                        self.staged = Some(c);
                        Some(gap)
                    } else {
                        self.mark = c.end;
                        Some(c)
                    }
                }
                Direction::Reverse => {
                    if c.end < self.mark {
                        let gap = Interval::synthetic_free(c.end.max(self.min_start), self.mark);
                        self.staged = Some(c);
                        Some(gap)
                    } else {
                        self.mark = c.start;
                        Some(c)
                    }
                }
            };
        }
    }
}
