//! Placement strategies, the scheduler facade, rescheduling and metrics.
//!
//! # Strategies
//!
//! | Strategy | Day order | Slot | Dependency walk |
//! |----------|-----------|------|-----------------|
//! | [`EarliestFit`] | chronological | earliest | prerequisites first |
//! | [`BalancedWork`] | least loaded first | earliest | prerequisites first |
//! | [`DeadlineOriented`] | reverse chronological | latest | dependents first |
//!
//! All three are greedy and share one search ([`slot`]). None backtracks:
//! an activity is placed once per pass or reported as unscheduled.
//!
//! # Flow
//!
//! Generation: [`Scheduler`] -> strategy -> `Calendar`.
//! Rescheduling: `Calendar` -> [`Rescheduler`] -> strategy -> `Calendar`.

mod balanced;
mod builder;
mod deadline;
mod earliest;
mod kpi;
mod rescheduler;
pub mod slot;
mod strategy;

pub use balanced::BalancedWork;
pub use builder::Scheduler;
pub use deadline::DeadlineOriented;
pub use earliest::EarliestFit;
pub use kpi::CalendarKpi;
pub use rescheduler::{CalendarContents, NewItems, RescheduleReport, Rescheduler};
pub use strategy::{strategy_for, SchedulingStrategy};
