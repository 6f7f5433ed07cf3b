//! Slot bookkeeping for one aggregate.

use tracing::warn;

use crate::error::{Error, FetchError};
use crate::types::FetchOutcome;

/// Why a settlement was not recorded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredSettlement {
    /// Position is outside the slot range
    UnknownPosition,
    /// The slot already holds an outcome
    AlreadySettled,
    /// The terminal result was already taken
    AlreadyFinished,
}

/// Effect of recording one outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// Recorded; this many slots are still empty
    Pending {
        /// Slots still waiting for an outcome
        remaining: usize,
    },
    /// Recorded; every slot now holds an outcome
    Complete,
    /// Not recorded
    Ignored(IgnoredSettlement),
}

/// Ordered result slots of one aggregate
///
/// Until [`finish`](Self::finish) hands the outcomes out, `settled_count`
/// equals the number of filled slots. Each slot is written at most once, and
/// `finish` yields the terminal result exactly once, only after every slot
/// is filled.
#[derive(Debug)]
pub struct AggregationState<T> {
    slots: Vec<Option<FetchOutcome<T>>>,
    len: usize,
    settled_count: usize,
    finished: bool,
}

impl<T> AggregationState<T> {
    /// Empty state with `len` slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            len,
            settled_count: 0,
            finished: false,
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the aggregate has no slots at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots holding an outcome
    pub fn settled_count(&self) -> usize {
        self.settled_count
    }

    /// Slots still waiting for an outcome
    pub fn remaining(&self) -> usize {
        self.len - self.settled_count
    }

    /// Whether every slot holds an outcome
    pub fn is_settled(&self) -> bool {
        self.settled_count == self.len
    }

    /// Number of slots currently holding an outcome
    pub fn filled_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the terminal result was already taken
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Record the outcome for `position`
    pub fn settle(&mut self, position: usize, outcome: FetchOutcome<T>) -> Settlement {
        if self.finished {
            warn!(position, "settlement after aggregate finished, ignoring");
            return Settlement::Ignored(IgnoredSettlement::AlreadyFinished);
        }
        let Some(slot) = self.slots.get_mut(position) else {
            warn!(
                position,
                len = self.len,
                "settlement for unknown position, ignoring"
            );
            return Settlement::Ignored(IgnoredSettlement::UnknownPosition);
        };
        if slot.is_some() {
            warn!(position, "slot settled twice, ignoring");
            return Settlement::Ignored(IgnoredSettlement::AlreadySettled);
        }

        *slot = Some(outcome);
        self.settled_count += 1;

        if self.is_settled() {
            Settlement::Complete
        } else {
            Settlement::Pending {
                remaining: self.remaining(),
            }
        }
    }

    /// Take the terminal result
    ///
    /// Returns `None` while slots are pending and on every call after the
    /// first successful one. Otherwise yields the outcomes in slot order, or
    /// [`Error::AllFetchesFailed`] when there was at least one slot and every
    /// slot failed. An aggregate with no slots completes with an empty list.
    pub fn finish(&mut self) -> Option<Result<Vec<FetchOutcome<T>>, Error>> {
        if self.finished || !self.is_settled() {
            return None;
        }
        self.finished = true;

        let outcomes: Vec<FetchOutcome<T>> =
            std::mem::take(&mut self.slots).into_iter().flatten().collect();

        if !outcomes.is_empty() && outcomes.iter().all(FetchOutcome::is_failure) {
            let first_error = outcomes
                .iter()
                .find_map(FetchOutcome::failure)
                .map(FetchError::to_string)
                .unwrap_or_default();
            return Some(Err(Error::AllFetchesFailed {
                count: outcomes.len(),
                first_error,
            }));
        }

        Some(Ok(outcomes))
    }
}
