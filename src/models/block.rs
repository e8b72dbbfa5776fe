//! Placed occurrences.
//!
//! A [`TimeBlock`] is what actually lives in a day's timeline: an activity
//! or break committed to a concrete date and time. Once placed a block is
//! only moved by removing it and placing it again (rescheduling); the one
//! field callers may flip is `completed`.

use serde::{Deserialize, Serialize};

use super::{
    Activity, ActivityId, Break, CalendarDate, FlexibleActivity, Priority, RigidActivity, Time24,
};

/// Where a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSource {
    Rigid,
    Flexible,
    Break,
}

/// An activity or break placed on a specific day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Id of the activity or break this block materializes.
    pub activity_id: ActivityId,
    pub name: String,
    pub date: CalendarDate,
    pub activity_type: String,
    /// Set for flexible blocks only.
    pub priority: Option<Priority>,
    pub start: Time24,
    pub end: Time24,
    pub duration_minutes: u32,
    pub completed: bool,
    pub source: BlockSource,
    /// Deadline for flexible blocks; the placement date otherwise.
    pub reference: CalendarDate,
}

impl TimeBlock {
    /// Block for a rigid activity at its declared date and time.
    pub fn rigid(activity: &RigidActivity) -> Self {
        Self {
            activity_id: activity.id,
            name: activity.name.clone(),
            date: activity.date,
            activity_type: activity.activity_type.clone(),
            priority: None,
            start: activity.start,
            end: activity.end,
            duration_minutes: activity.duration_minutes(),
            completed: false,
            source: BlockSource::Rigid,
            reference: activity.date,
        }
    }

    /// Block for a flexible activity placed at `start` on `date`.
    ///
    /// Returns `None` if the activity would run past midnight.
    pub fn flexible(activity: &FlexibleActivity, date: CalendarDate, start: Time24) -> Option<Self> {
        let end = start.checked_add_minutes(activity.duration_minutes)?;
        Some(Self {
            activity_id: activity.id,
            name: activity.name.clone(),
            date,
            activity_type: activity.activity_type.clone(),
            priority: Some(activity.priority),
            start,
            end,
            duration_minutes: activity.duration_minutes,
            completed: false,
            source: BlockSource::Flexible,
            reference: activity.deadline,
        })
    }

    /// Block for a break on `date`.
    pub fn for_break(brk: &Break, date: CalendarDate) -> Self {
        Self {
            activity_id: brk.id,
            name: brk.name.clone(),
            date,
            activity_type: "break".to_string(),
            priority: None,
            start: brk.start,
            end: brk.end,
            duration_minutes: brk.duration_minutes(),
            completed: false,
            source: BlockSource::Break,
            reference: date,
        }
    }

    pub fn is_break(&self) -> bool {
        self.source == BlockSource::Break
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Whether `[start, end)` intersects this block.
    pub fn overlaps(&self, start: Time24, end: Time24) -> bool {
        start < self.end && self.start < end
    }

    /// Whether `[start, end)` overlaps this block or comes within `gap`
    /// minutes of it on either side.
    pub fn too_close(&self, start: Time24, end: Time24, gap: u32) -> bool {
        let (s, e) = (start.minute_of_day(), end.minute_of_day());
        s < self.end.minute_of_day().saturating_add(gap)
            && self.start.minute_of_day() < e.saturating_add(gap)
    }

    /// Rebuilds the flexible activity this block was placed from.
    pub fn to_flexible(&self) -> Option<FlexibleActivity> {
        (self.source == BlockSource::Flexible).then(|| FlexibleActivity {
            id: self.activity_id,
            name: self.name.clone(),
            activity_type: self.activity_type.clone(),
            duration_minutes: self.duration_minutes,
            priority: self.priority.unwrap_or_default(),
            deadline: self.reference,
        })
    }

    /// Rebuilds the rigid activity this block was placed from.
    pub fn to_rigid(&self) -> Option<RigidActivity> {
        (self.source == BlockSource::Rigid).then(|| RigidActivity {
            id: self.activity_id,
            name: self.name.clone(),
            activity_type: self.activity_type.clone(),
            date: self.date,
            start: self.start,
            end: self.end,
        })
    }

    /// Rebuilds the break this block was placed from.
    pub fn to_break(&self) -> Option<Break> {
        self.is_break().then(|| Break {
            id: self.activity_id,
            name: self.name.clone(),
            start: self.start,
            end: self.end,
        })
    }
}
