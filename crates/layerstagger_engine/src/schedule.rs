// SPDX-License-Identifier: MIT OR Apache-2.0
//! Offsets at which staggered copies start, and where their tracks go.

use crate::range::RangeWindow;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unit the velocity is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedUnit {
    /// Copies per second
    #[default]
    PerSecond,
    /// Copies per minute
    Bpm,
}

impl SpeedUnit {
    /// Unit for a persisted setting value
    pub fn from_index(index: i64) -> Self {
        if index == 1 {
            Self::Bpm
        } else {
            Self::PerSecond
        }
    }

    /// Persisted setting value
    pub fn index(self) -> i64 {
        match self {
            Self::PerSecond => 0,
            Self::Bpm => 1,
        }
    }
}

/// How the multiplier combines with the speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedOperator {
    /// speed × multiplier
    #[default]
    Multiply,
    /// speed ÷ multiplier
    Divide,
}

impl SpeedOperator {
    /// Operator for a persisted setting value
    pub fn from_index(index: i64) -> Self {
        if index == 1 {
            Self::Divide
        } else {
            Self::Multiply
        }
    }

    /// Persisted setting value
    pub fn index(self) -> i64 {
        match self {
            Self::Multiply => 0,
            Self::Divide => 1,
        }
    }
}

/// Copy rate for velocity scheduling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// Base rate
    pub speed: f64,
    /// Rate unit
    pub unit: SpeedUnit,
    /// Multiplier operator
    pub operator: SpeedOperator,
    /// Multiplier
    pub multiplier: f64,
}

impl Velocity {
    /// Copies per second after applying the multiplier and unit
    pub fn effective(&self) -> f64 {
        let scaled = match self.operator {
            SpeedOperator::Multiply => self.speed * self.multiplier,
            SpeedOperator::Divide => {
                let divisor = if self.multiplier == 0.0 { 1.0 } else { self.multiplier };
                self.speed / divisor
            }
        };
        match self.unit {
            SpeedUnit::PerSecond => scaled,
            SpeedUnit::Bpm => scaled / 60.0,
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self {
            speed: 2.0,
            unit: SpeedUnit::PerSecond,
            operator: SpeedOperator::Multiply,
            multiplier: 1.0,
        }
    }
}

/// How many copies to make
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScheduleMode {
    /// A fixed number of copies spread evenly over the window
    FixedCount(u32),
    /// As many copies as the rate fits into the window
    FixedVelocity(Velocity),
}

impl ScheduleMode {
    /// Whether this is the fixed-count mode
    pub fn is_fixed_count(&self) -> bool {
        matches!(self, Self::FixedCount(_))
    }
}

/// One staggered copy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Physical slot, `count` down to 1; slot `k` lands on the `k`-th child track
    pub index: usize,
    /// Time ordinal after applying reverse
    pub ordinal: usize,
    /// Clip-local offset where this copy starts
    pub time: f64,
    /// The copy that keeps the clip's original start
    pub is_base: bool,
}

/// The ordered slots for one clip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Slots from physical index `count` down to 1
    pub slots: Vec<ScheduleSlot>,
}

impl Schedule {
    /// Number of copies
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Whether no copy is made
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Compute the copy offsets over a window
pub fn compute_schedule(mode: &ScheduleMode, window: RangeWindow, reverse: bool) -> Schedule {
    let span = window.length();
    let count = match mode {
        ScheduleMode::FixedCount(count) => *count as usize,
        ScheduleMode::FixedVelocity(velocity) => {
            let speed = velocity.effective();
            if speed <= 0.0 {
                debug!(speed, "non-positive velocity, no copies");
                return Schedule::default();
            }
            let n = (speed * span / 1000.0 + 1.0).floor();
            if n.is_finite() && n > 0.0 {
                n as usize
            } else {
                0
            }
        }
    };

    if count <= 1 {
        debug!(count, "degenerate copy count, no copies");
        return Schedule::default();
    }

    let n = count as f64;
    let slots = (1..=count)
        .rev()
        .map(|index| {
            let ordinal = if reverse { count - index + 1 } else { index };
            let steps = (count - ordinal) as f64;
            let offset = match mode {
                ScheduleMode::FixedCount(_) => span * steps / (n - 1.0),
                ScheduleMode::FixedVelocity(velocity) => steps * 1000.0 / velocity.effective(),
            };
            ScheduleSlot {
                index,
                ordinal,
                time: (offset + window.start).min(window.end),
                is_base: ordinal == count,
            }
        })
        .collect();

    Schedule { slots }
}

/// Where a slot's track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTrack {
    /// Reuse the existing child track at this position in the child run
    Existing(usize),
    /// Insert a new track at this display index
    Insert(usize),
}

/// Pick the track for physical slot `index` (1-based).
///
/// Slots are visited from the highest index down, so repeated inserts at the
/// same display index leave slot `k` on the `k`-th track below the parent.
pub fn place_slot(parent_index: usize, existing_children: usize, index: usize) -> SlotTrack {
    if index > existing_children {
        SlotTrack::Insert(parent_index + existing_children + 1)
    } else {
        SlotTrack::Existing(index.saturating_sub(1))
    }
}
