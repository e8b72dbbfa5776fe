//! Balanced-work strategy.
//!
//! Same dependency handling as [`EarliestFit`](super::EarliestFit), but at
//! every decision the candidate days are sorted by their current occupied
//! minutes (least loaded first, ties chronological). The load is read at
//! decision time, so leveling emerges from placement order rather than
//! from a post-pass.

use super::strategy::{run_pass, DayOrder, SchedulingStrategy, WalkDirection};
use crate::error::Result;
use crate::models::{Calendar, FlexibleActivity, Moment, StrategyKind, Unscheduled};

/// Places each activity on the least-loaded feasible day.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedWork;

impl SchedulingStrategy for BalancedWork {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BalancedWork
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
            DayOrder::LeastLoaded,
            WalkDirection::PrerequisitesFirst,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarDate, CalendarParams, DependencyGraph, RigidActivity, Time24};

    fn t(hhmm: u32) -> Time24 {
        Time24::from_hhmm(hhmm).unwrap()
    }

    fn d(day: u32) -> CalendarDate {
        CalendarDate::new(day, 10, 2024).unwrap()
    }

    fn calendar(days: usize, graph: DependencyGraph) -> Calendar {
        let params =
            CalendarParams::new(0, 8, t(800), t(1700), StrategyKind::BalancedWork).unwrap();
        Calendar::new(d(1), days, params, graph).unwrap()
    }

    #[test]
    fn test_spreads_across_days() {
        let mut cal = calendar(3, DependencyGraph::new());
        let acts: Vec<FlexibleActivity> = (0..3)
            .map(|i| FlexibleActivity::new(format!("A{i}"), 60, d(3)))
            .collect();

        BalancedWork.schedule(&mut cal, &acts).unwrap();
        for day in cal.days() {
            assert_eq!(day.working_minutes(), 60);
        }
        assert_eq!(cal.locate_activity(acts[0].id).unwrap().date, d(1));
        assert_eq!(cal.locate_activity(acts[1].id).unwrap().date, d(2));
        assert_eq!(cal.locate_activity(acts[2].id).unwrap().date, d(3));
    }

    #[test]
    fn test_avoids_busy_day() {
        let mut cal = calendar(2, DependencyGraph::new());
        let busy = RigidActivity::new("Busy", d(1), t(900), t(1200)).unwrap();
        cal.day_for_mut(d(1)).unwrap().place_rigid(&busy).unwrap();

        let a = FlexibleActivity::new("A", 60, d(2));
        BalancedWork.schedule(&mut cal, &[a.clone()]).unwrap();
        assert_eq!(cal.locate_activity(a.id).unwrap().date, d(2));
    }

    #[test]
    fn test_respects_prerequisite_day() {
        // Least-loaded day is day 1, but the prerequisite ends on day 2.
        let pre = RigidActivity::new("Pre", d(2), t(800), t(1600)).unwrap();
        let a = FlexibleActivity::new("A", 30, d(3));
        let mut graph = DependencyGraph::new();
        graph.add_dependency(&a, &pre).unwrap();
        let mut cal = calendar(3, graph);
        cal.day_for_mut(d(2)).unwrap().place_rigid(&pre).unwrap();

        BalancedWork.schedule(&mut cal, &[a.clone()]).unwrap();
        assert_eq!(cal.locate_activity(a.id).unwrap().date, d(3));
    }
}
