//! Earliest-fit strategy.
//!
//! # Algorithm
//! 1. Order flexible activities topologically (prerequisites first).
//! 2. For each activity, scan days chronologically from the later of the
//!    pass floor and its prerequisites' end, up to its deadline.
//! 3. Take the first day with a fitting slot, and the earliest slot in it.
//!
//! Greedy and deterministic; it fills the front of the calendar first.

use super::strategy::{run_pass, DayOrder, SchedulingStrategy, WalkDirection};
use crate::error::Result;
use crate::models::{Calendar, FlexibleActivity, Moment, StrategyKind, Unscheduled};

/// Places each activity at the earliest feasible day and time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarliestFit;

impl SchedulingStrategy for EarliestFit {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EarliestFit
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
            DayOrder::Chronological,
            WalkDirection::PrerequisitesFirst,
        )
    }
}
