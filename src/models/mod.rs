//! Planner domain models.
//!
//! Provides the data types for describing what to plan (activities, breaks,
//! dependencies) and what was planned (time blocks, days, calendars).
//!
//! # Layering
//!
//! | Type | Role |
//! |------|------|
//! | `Time24`, `CalendarDate`, `Moment` | Clock and date primitives |
//! | `RigidActivity`, `FlexibleActivity`, `Break` | Inputs |
//! | `DependencyGraph` | Prerequisite relation between inputs |
//! | `TimeBlock` | A placed occurrence |
//! | `DaySchedule` | One date's timeline |
//! | `Calendar` | The whole multi-day plan |

mod activity;
mod block;
mod calendar;
mod date;
mod day;
mod dependency;
mod time;

pub use activity::{Activity, ActivityId, Break, FlexibleActivity, Priority, RigidActivity};
pub use block::{BlockSource, TimeBlock};
pub use calendar::{Calendar, CalendarParams, StrategyKind, Unscheduled, UnscheduledReason};
pub use date::CalendarDate;
pub use day::{DaySchedule, PlacementError};
pub use dependency::{DependencyEntry, DependencyGraph};
pub use time::{Moment, Time24, MINUTES_PER_DAY};
