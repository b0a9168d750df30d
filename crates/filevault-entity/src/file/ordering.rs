//! Position bookkeeping for an owner's file collection.
//!
//! A reorder is a shift-range move: the records between the old and the new
//! position slide one slot towards the vacated position, then the moved
//! record takes the new position. [`MovePlan`] computes that range without
//! touching any store so every repository executes the same arithmetic.

use serde::{Deserialize, Serialize};

use filevault_core::error::AppError;

/// An inclusive position range whose records move by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Lowest affected position.
    pub from: i64,
    /// Highest affected position.
    pub to: i64,
    /// `-1` when moving a record down the list, `+1` when moving it up.
    pub delta: i64,
}

impl Shift {
    /// Whether `position` falls inside the shifted range.
    pub fn contains(&self, position: i64) -> bool {
        position >= self.from && position <= self.to
    }
}

/// The effect of moving one record to a new position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    /// Position of the moved record before the move.
    pub current: i64,
    /// Position of the moved record after the move.
    pub target: i64,
    /// Range of other records to shift, if any.
    pub shift: Option<Shift>,
}

impl MovePlan {
    /// Plan a move of the record at `current` to `requested`.
    ///
    /// `max_position` is the highest position in the owner's collection.
    /// Requests past the end are clamped to the last slot and `0` to the
    /// first; negative requests are rejected.
    pub fn compute(current: i64, requested: i64, max_position: i64) -> Result<Self, AppError> {
        if requested < 0 {
            return Err(AppError::validation(
                "Position must be a non-negative integer",
            ));
        }

        let upper = max_position.max(current).max(1);
        let target = requested.clamp(1, upper);

        let shift = if target > current {
            Some(Shift {
                from: current + 1,
                to: target,
                delta: -1,
            })
        } else if target < current {
            Some(Shift {
                from: target,
                to: current - 1,
                delta: 1,
            })
        } else {
            None
        };

        Ok(Self {
            current,
            target,
            shift,
        })
    }

    /// Whether the move changes nothing.
    pub fn is_noop(&self) -> bool {
        self.shift.is_none()
    }

    /// New position of a record other than the moved one.
    pub fn shifted(&self, position: i64) -> i64 {
        match self.shift {
            Some(shift) if shift.contains(position) => position + shift.delta,
            _ => position,
        }
    }
}
