//! Deadline-oriented strategy.
//!
//! # Algorithm
//! 1. Reverse the topological order, so terminal dependents are resolved
//!    before the prerequisites that feed them.
//! 2. An activity nothing depends on searches backward from its own
//!    deadline (at window end).
//! 3. A prerequisite searches backward from the earliest start among its
//!    already placed dependents (earliest date, then earliest time),
//!    capped by its own deadline.
//! 4. Days are visited latest first, and the latest fitting slot wins.
//!
//! Work is pushed as close to its deadline as the constraints allow.

use super::strategy::{run_pass, DayOrder, SchedulingStrategy, WalkDirection};
use crate::error::Result;
use crate::models::{Calendar, FlexibleActivity, Moment, StrategyKind, Unscheduled};

/// Places each activity as late as its deadline and dependents allow.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlineOriented;

impl SchedulingStrategy for DeadlineOriented {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DeadlineOriented
    }

    fn place(
        &self,
        calendar: &mut Calendar,
        activities: &[FlexibleActivity],
        floor: Moment,
    ) -> Result<Vec<Unscheduled>> {
        run_pass(
            calendar,
            activities,
            floor,
            DayOrder::ReverseChronological,
            WalkDirection::DependentsFirst,
        )
    }
}
