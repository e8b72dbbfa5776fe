//! One calendar day's timeline.
//!
//! A [`DaySchedule`] owns the blocks placed on its date, kept sorted by
//! start time, plus the day's own minimum gap and working-hour limit.
//!
//! # Placement rules
//! - Breaks are rejected when they overlap a rigid or flexible block.
//!   Breaks may overlap each other.
//! - Rigid activities are rejected when they overlap any block
//!   ([`PlacementError::Conflict`]). They never fail on capacity.
//! - Flexible activities must keep `min_gap_minutes` from every block and
//!   must fit in the remaining working minutes
//!   ([`PlacementError::WorkingLimitExceeded`]).

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ActivityId, BlockSource, Break, CalendarDate, FlexibleActivity, RigidActivity, Time24, TimeBlock};

/// Why a single placement attempt on a day failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("'{name}' conflicts with '{existing}' on {date}")]
    Conflict {
        name: String,
        existing: String,
        date: CalendarDate,
    },

    #[error("'{name}' needs {requested} minutes on {date} but only {available} working minutes remain")]
    WorkingLimitExceeded {
        name: String,
        date: CalendarDate,
        requested: u32,
        available: u32,
    },

    #[error("'{name}' would run past midnight on {date}")]
    PastMidnight { name: String, date: CalendarDate },
}

/// The timeline of a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: CalendarDate,
    pub weekday: Weekday,
    pub min_gap_minutes: u32,
    pub working_hours_limit: u32,
    time_blocks: Vec<TimeBlock>,
}

impl DaySchedule {
    /// Creates an empty day.
    pub fn new(date: CalendarDate, min_gap_minutes: u32, working_hours_limit: u32) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            min_gap_minutes,
            working_hours_limit,
            time_blocks: Vec::new(),
        }
    }

    /// Restores a day from previously placed blocks, as-is.
    pub fn from_blocks(
        date: CalendarDate,
        min_gap_minutes: u32,
        working_hours_limit: u32,
        blocks: Vec<TimeBlock>,
    ) -> Self {
        let mut day = Self::new(date, min_gap_minutes, working_hours_limit);
        for block in blocks {
            day.insert(block);
        }
        day
    }

    /// All blocks, sorted by start time.
    pub fn time_blocks(&self) -> &[TimeBlock] {
        &self.time_blocks
    }

    /// Non-break blocks.
    pub fn activities(&self) -> impl Iterator<Item = &TimeBlock> {
        self.time_blocks.iter().filter(|b| !b.is_break())
    }

    pub fn breaks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.time_blocks.iter().filter(|b| b.is_break())
    }

    /// Minutes taken by non-break blocks.
    pub fn working_minutes(&self) -> u32 {
        self.activities().map(|b| b.duration_minutes).sum()
    }

    /// Minutes taken by all blocks, breaks included.
    pub fn occupied_minutes(&self) -> u32 {
        self.time_blocks.iter().map(|b| b.duration_minutes).sum()
    }

    pub fn working_limit_minutes(&self) -> u32 {
        self.working_hours_limit.saturating_mul(60)
    }

    /// Working minutes still available under the limit.
    pub fn remaining_minutes(&self) -> u32 {
        self.working_limit_minutes()
            .saturating_sub(self.working_minutes())
    }

    /// Whether `[start, end)` keeps `min_gap_minutes` from every block.
    pub fn is_free(&self, start: Time24, end: Time24) -> bool {
        !self
            .time_blocks
            .iter()
            .any(|b| b.too_close(start, end, self.min_gap_minutes))
    }

    /// Places a break at its declared time.
    pub fn place_break(&mut self, brk: &Break) -> Result<(), PlacementError> {
        if let Some(existing) = self.activities().find(|b| b.overlaps(brk.start, brk.end)) {
            return Err(PlacementError::Conflict {
                name: brk.name.clone(),
                existing: existing.name.clone(),
                date: self.date,
            });
        }
        self.insert(TimeBlock::for_break(brk, self.date));
        Ok(())
    }

    /// Places a rigid activity at its declared time.
    pub fn place_rigid(&mut self, activity: &RigidActivity) -> Result<(), PlacementError> {
        if let Some(existing) = self
            .time_blocks
            .iter()
            .find(|b| b.overlaps(activity.start, activity.end))
        {
            return Err(PlacementError::Conflict {
                name: activity.name.clone(),
                existing: existing.name.clone(),
                date: self.date,
            });
        }
        self.insert(TimeBlock::rigid(activity));
        Ok(())
    }

    /// Places a flexible activity starting at `start`.
    pub fn place_flexible(
        &mut self,
        activity: &FlexibleActivity,
        start: Time24,
    ) -> Result<(), PlacementError> {
        let available = self.remaining_minutes();
        if activity.duration_minutes > available {
            return Err(PlacementError::WorkingLimitExceeded {
                name: activity.name.clone(),
                date: self.date,
                requested: activity.duration_minutes,
                available,
            });
        }

        let block = TimeBlock::flexible(activity, self.date, start).ok_or_else(|| {
            PlacementError::PastMidnight {
                name: activity.name.clone(),
                date: self.date,
            }
        })?;

        if let Some(existing) = self
            .time_blocks
            .iter()
            .find(|b| b.too_close(block.start, block.end, self.min_gap_minutes))
        {
            return Err(PlacementError::Conflict {
                name: activity.name.clone(),
                existing: existing.name.clone(),
                date: self.date,
            });
        }

        self.insert(block);
        Ok(())
    }

    /// The block placed for `id` with the given source, if any.
    pub fn block(&self, id: ActivityId, source: BlockSource) -> Option<&TimeBlock> {
        self.time_blocks
            .iter()
            .find(|b| b.activity_id == id && b.source == source)
    }

    pub fn block_mut(&mut self, id: ActivityId, source: BlockSource) -> Option<&mut TimeBlock> {
        self.time_blocks
            .iter_mut()
            .find(|b| b.activity_id == id && b.source == source)
    }

    /// Removes and returns the block for `id` with the given source.
    pub fn remove_block(&mut self, id: ActivityId, source: BlockSource) -> Option<TimeBlock> {
        let idx = self
            .time_blocks
            .iter()
            .position(|b| b.activity_id == id && b.source == source)?;
        Some(self.time_blocks.remove(idx))
    }

    /// Removes every incomplete flexible block, returning them in timeline
    /// order. Completed blocks stay.
    pub fn take_incomplete_flexible(&mut self) -> Vec<TimeBlock> {
        let (taken, kept): (Vec<TimeBlock>, Vec<TimeBlock>) = std::mem::take(&mut self.time_blocks)
            .into_iter()
            .partition(|b| b.source == BlockSource::Flexible && !b.completed);
        self.time_blocks = kept;
        taken
    }

    fn insert(&mut self, block: TimeBlock) {
        let idx = self
            .time_blocks
            .partition_point(|b| (b.start, b.end) <= (block.start, block.end));
        self.time_blocks.insert(idx, block);
    }
}
