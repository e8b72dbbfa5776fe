//! Activity model.
//!
//! Three kinds of occupancy can be put on a calendar:
//! - **Rigid**: caller-fixed date and time, placed verbatim.
//! - **Flexible**: a duration, priority and deadline; a strategy picks the
//!   date and time.
//! - **Break**: a non-activity occupancy, either on one date or repeated on
//!   every day of the calendar.
//!
//! # Identity
//! Every item carries an [`ActivityId`]. Dependency graphs, block lookups
//! and rescheduling all key on the id, so two activities may share a name.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalendarDate, Time24};
use crate::error::{PlannerError, Result};

/// Stable identifier of an activity or break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(Uuid);

impl ActivityId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Importance of a flexible activity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Capabilities shared by rigid and flexible activities.
pub trait Activity {
    fn id(&self) -> ActivityId;
    fn name(&self) -> &str;
    /// Free-form category (e.g. "study", "work", "exercise").
    fn activity_type(&self) -> &str;
    fn duration_minutes(&self) -> u32;
}

/// An activity with a fixed date and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigidActivity {
    pub id: ActivityId,
    pub name: String,
    pub activity_type: String,
    pub date: CalendarDate,
    pub start: Time24,
    pub end: Time24,
}

impl RigidActivity {
    /// Creates a rigid activity. Fails if `end` is not after `start`.
    pub fn new(
        name: impl Into<String>,
        date: CalendarDate,
        start: Time24,
        end: Time24,
    ) -> Result<Self> {
        let name = name.into();
        if end <= start {
            return Err(PlannerError::InvalidActivity(format!(
                "'{name}' ends at {end}, not after its start {start}"
            )));
        }
        Ok(Self {
            id: ActivityId::new(),
            name,
            activity_type: String::new(),
            date,
            start,
            end,
        })
    }

    /// Sets the activity type.
    pub fn with_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    /// Replaces the generated id (e.g. when restoring persisted data).
    pub fn with_id(mut self, id: ActivityId) -> Self {
        self.id = id;
        self
    }
}

impl Activity for RigidActivity {
    fn id(&self) -> ActivityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn activity_type(&self) -> &str {
        &self.activity_type
    }

    fn duration_minutes(&self) -> u32 {
        self.start.minutes_until(self.end).unsigned_abs() as u32
    }
}

/// An activity whose date and time are chosen by a strategy.
///
/// It must finish on or before `deadline` (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexibleActivity {
    pub id: ActivityId,
    pub name: String,
    pub activity_type: String,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub deadline: CalendarDate,
}

impl FlexibleActivity {
    /// Creates a flexible activity with medium priority.
    pub fn new(name: impl Into<String>, duration_minutes: u32, deadline: CalendarDate) -> Self {
        Self {
            id: ActivityId::new(),
            name: name.into(),
            activity_type: String::new(),
            duration_minutes,
            priority: Priority::Medium,
            deadline,
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the activity type.
    pub fn with_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = activity_type.into();
        self
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: ActivityId) -> Self {
        self.id = id;
        self
    }
}

impl Activity for FlexibleActivity {
    fn id(&self) -> ActivityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn activity_type(&self) -> &str {
        &self.activity_type
    }

    fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }
}

/// A break. Takes calendar time and participates in gap checks, but does
/// not count toward the working-hour limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub id: ActivityId,
    pub name: String,
    pub start: Time24,
    pub end: Time24,
}

impl Break {
    /// Creates a break named "Break". Fails if `end` is not after `start`.
    pub fn new(start: Time24, end: Time24) -> Result<Self> {
        if end <= start {
            return Err(PlannerError::InvalidActivity(format!(
                "break ends at {end}, not after its start {start}"
            )));
        }
        Ok(Self {
            id: ActivityId::new(),
            name: "Break".to_string(),
            start,
            end,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_id(mut self, id: ActivityId) -> Self {
        self.id = id;
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.start.minutes_until(self.end).unsigned_abs() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hhmm: u32) -> Time24 {
        Time24::from_hhmm(hhmm).unwrap()
    }

    fn d(day: u32) -> CalendarDate {
        CalendarDate::new(day, 4, 2024).unwrap()
    }

    #[test]
    fn test_rigid_activity_builder() {
        let act = RigidActivity::new("Lecture", d(2), t(1000), t(1130))
            .unwrap()
            .with_type("study");

        assert_eq!(act.name(), "Lecture");
        assert_eq!(act.activity_type(), "study");
        assert_eq!(act.duration_minutes(), 90);
        assert_eq!(act.date, d(2));
    }

    #[test]
    fn test_rigid_activity_rejects_inverted_times() {
        assert!(RigidActivity::new("Bad", d(1), t(1100), t(1000)).is_err());
        assert!(RigidActivity::new("Empty", d(1), t(1000), t(1000)).is_err());
    }

    #[test]
    fn test_flexible_activity_builder() {
        let act = FlexibleActivity::new("Essay", 120, d(5))
            .with_priority(Priority::High)
            .with_type("writing");

        assert_eq!(act.duration_minutes(), 120);
        assert_eq!(act.priority, Priority::High);
        assert_eq!(act.deadline, d(5));
        assert_eq!(act.activity_type(), "writing");
    }

    #[test]
    fn test_ids_are_unique_even_with_equal_names() {
        let a = FlexibleActivity::new("Read", 30, d(3));
        let b = FlexibleActivity::new("Read", 30, d(3));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_break() {
        let b = Break::new(t(1200), t(1245)).unwrap().with_name("Lunch");
        assert_eq!(b.duration_minutes(), 45);
        assert_eq!(b.name, "Lunch");
        assert!(Break::new(t(1300), t(1200)).is_err());
    }
}
