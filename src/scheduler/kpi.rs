//! Calendar quality metrics (KPIs).
//!
//! Summarizes how work is spread over a generated calendar.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total working minutes | Sum of non-break block durations |
//! | Day load | Non-break minutes per day |
//! | Load spread | Max day load - min day load |
//! | Avg utilization | Mean of day load / working limit |
//! | Completion rate | Completed / placed non-break blocks |
//! | Avg deadline slack | Mean days between a flexible block and its deadline |
//! | Unscheduled | Activities the last pass could not place |

use crate::models::{BlockSource, Calendar, CalendarDate};

/// Calendar performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarKpi {
    pub total_working_minutes: u32,
    /// Non-break minutes per day, in date order.
    pub working_minutes_by_day: Vec<(CalendarDate, u32)>,
    pub max_day_minutes: u32,
    pub min_day_minutes: u32,
    /// `max_day_minutes - min_day_minutes`; lower is more balanced.
    pub load_spread_minutes: u32,
    /// Average fraction of the working limit used (0.0..1.0).
    pub avg_utilization: f64,
    /// Fraction of placed activities marked completed (0.0..1.0).
    pub completion_rate: f64,
    /// Average days of slack between flexible blocks and their deadlines.
    pub avg_deadline_slack_days: f64,
    pub unscheduled_count: usize,
}

impl CalendarKpi {
    /// Computes KPIs for `calendar`.
    pub fn calculate(calendar: &Calendar) -> Self {
        let working_minutes_by_day: Vec<(CalendarDate, u32)> = calendar
            .days()
            .iter()
            .map(|day| (day.date, day.working_minutes()))
            .collect();
        let loads = working_minutes_by_day.iter().map(|&(_, m)| m);
        let total_working_minutes: u32 = loads.clone().sum();
        let max_day_minutes = loads.clone().max().unwrap_or(0);
        let min_day_minutes = loads.min().unwrap_or(0);

        let utilizations: Vec<f64> = calendar
            .days()
            .iter()
            .map(|day| match day.working_limit_minutes() {
                0 => 0.0,
                limit => day.working_minutes() as f64 / limit as f64,
            })
            .collect();
        let avg_utilization = mean(&utilizations).unwrap_or(0.0);

        let placed: Vec<_> = calendar.blocks().filter(|b| !b.is_break()).collect();
        let completion_rate = if placed.is_empty() {
            1.0
        } else {
            placed.iter().filter(|b| b.completed).count() as f64 / placed.len() as f64
        };

        let slack: Vec<f64> = placed
            .iter()
            .filter(|b| b.source == BlockSource::Flexible)
            .map(|b| b.date.days_until(b.reference) as f64)
            .collect();
        let avg_deadline_slack_days = mean(&slack).unwrap_or(0.0);

        Self {
            total_working_minutes,
            working_minutes_by_day,
            max_day_minutes,
            min_day_minutes,
            load_spread_minutes: max_day_minutes - min_day_minutes,
            avg_utilization,
            completion_rate,
            avg_deadline_slack_days,
            unscheduled_count: calendar.unscheduled().len(),
        }
    }

    /// Whether the calendar meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_spread_minutes: u32, max_unscheduled: usize) -> bool {
        self.load_spread_minutes <= max_spread_minutes && self.unscheduled_count <= max_unscheduled
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Break, FlexibleActivity, RigidActivity, Time24};
    use crate::scheduler::Scheduler;

    fn t(hhmm: u32) -> Time24 {
        Time24::from_hhmm(hhmm).unwrap()
    }

    fn d(day: u32) -> CalendarDate {
        CalendarDate::new(day, 3, 2025).unwrap()
    }

    #[test]
    fn test_kpi_basic() {
        // 2 days, 4h limit: 60 rigid + 120 flexible on day 1, nothing on day 2
        let mut scheduler = Scheduler::new(2, d(3)).with_min_gap(0).with_working_hours_limit(4);
        scheduler.add_repeated_break(Break::new(t(1200), t(1300)).unwrap());
        scheduler.add_rigid_activity(RigidActivity::new("Lab", d(3), t(800), t(900)).unwrap());
        scheduler.add_flexible_activity(FlexibleActivity::new("Essay", 120, d(4)));
        let cal = scheduler.create_schedule("earliest-fit", 800, 1700).unwrap();

        let kpi = CalendarKpi::calculate(&cal);
        assert_eq!(kpi.total_working_minutes, 180);
        assert_eq!(kpi.working_minutes_by_day, vec![(d(3), 180), (d(4), 0)]);
        assert_eq!(kpi.max_day_minutes, 180);
        assert_eq!(kpi.min_day_minutes, 0);
        assert_eq!(kpi.load_spread_minutes, 180);
        // (180/240 + 0) / 2
        assert!((kpi.avg_utilization - 0.375).abs() < 1e-10);
        assert!((kpi.completion_rate - 0.0).abs() < 1e-10);
        assert!((kpi.avg_deadline_slack_days - 1.0).abs() < 1e-10);
        assert_eq!(kpi.unscheduled_count, 0);
    }

    #[test]
    fn test_kpi_completion_rate() {
        let lab = RigidActivity::new("Lab", d(3), t(800), t(900)).unwrap();
        let mut scheduler = Scheduler::new(1, d(3)).with_min_gap(0);
        scheduler.add_rigid_activity(lab.clone());
        scheduler.add_flexible_activity(FlexibleActivity::new("Essay", 30, d(3)));
        let mut cal = scheduler.create_schedule("earliest-fit", 800, 1700).unwrap();
        cal.set_completed(lab.id, d(3), true);

        let kpi = CalendarKpi::calculate(&cal);
        assert!((kpi.completion_rate - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty_calendar() {
        let cal = Scheduler::new(3, d(3))
            .create_schedule("balanced-work", 800, 1700)
            .unwrap();
        let kpi = CalendarKpi::calculate(&cal);
        assert_eq!(kpi.total_working_minutes, 0);
        assert_eq!(kpi.load_spread_minutes, 0);
        assert!((kpi.completion_rate - 1.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
        assert!(kpi.meets_thresholds(0, 0));
    }

    #[test]
    fn test_meets_thresholds() {
        let mut scheduler = Scheduler::new(2, d(3));
        scheduler.add_flexible_activity(FlexibleActivity::new("Late", 30, d(1)));
        let cal = scheduler.create_schedule("earliest-fit", 800, 1700).unwrap();

        let kpi = CalendarKpi::calculate(&cal);
        assert_eq!(kpi.unscheduled_count, 1);
        assert!(kpi.meets_thresholds(0, 1));
        assert!(!kpi.meets_thresholds(0, 0));
    }
}
