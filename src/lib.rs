//! Multi-day activity planner.
//!
//! Places fixed and flexible activities, plus one-off and repeated breaks,
//! onto a calendar of consecutive days. Placement honors a daily working
//! limit, a minimum gap between blocks, per-activity deadlines and
//! prerequisite relationships between activities.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Time24`, `CalendarDate`, `RigidActivity`,
//!   `FlexibleActivity`, `Break`, `DependencyGraph`, `TimeBlock`,
//!   `DaySchedule`, `Calendar`
//! - **`scheduler`**: The three placement strategies, the `Scheduler`
//!   facade, the `Rescheduler` and calendar KPIs
//! - **`validation`**: Input integrity checks and calendar audits
//! - **`config`**: Layered configuration (defaults, TOML, environment)
//! - **`error`**: `PlannerError` and the crate `Result` alias
//!
//! # Quick start
//!
//! ```
//! use u_planner::models::{CalendarDate, FlexibleActivity, Moment, Time24};
//! use u_planner::scheduler::{Rescheduler, Scheduler};
//!
//! let first = CalendarDate::new(3, 3, 2025).unwrap();
//! let mut scheduler = Scheduler::new(5, first);
//! scheduler.add_flexible_activity(FlexibleActivity::new("Read chapter 4", 90, first));
//! let mut calendar = scheduler.create_schedule("deadline-oriented", 900, 1700).unwrap();
//!
//! let noon = Moment::new(first, Time24::from_hhmm(1200).unwrap());
//! let report = Rescheduler::new(noon)
//!     .strategy_switch(&mut calendar, "earliest-fit")
//!     .unwrap();
//! assert_eq!(report.replaced, 1);
//! ```
//!
//! # Logging
//!
//! Emits `tracing` events (placement decisions at `debug`, unscheduled
//! activities at `warn`, pass summaries at `info`). No subscriber is
//! installed by the library.

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{PlannerError, Result};
