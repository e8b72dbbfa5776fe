//! Scheduler facade.
//!
//! [`Scheduler`] accumulates inputs and is consumed by
//! [`create_schedule`](Scheduler::create_schedule), which builds the
//! calendar and runs the chosen strategy.
//!
//! # Generation
//! 1. Validate the strategy tag, window and inputs.
//! 2. Create one empty day per date.
//! 3. Place breaks (one-off by date, repeated on every day).
//! 4. Place rigid activities verbatim.
//! 5. Hand flexible activities to the strategy.

use tracing::info;

use super::strategy::{commit_fixed_items, strategy_for};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::models::{
    Break, Calendar, CalendarDate, CalendarParams, DependencyGraph, FlexibleActivity,
    RigidActivity, StrategyKind, Time24,
};
use crate::validation::{validate_input, ValidationResult};

/// Input accumulator for one calendar generation.
///
/// # Example
///
/// ```
/// use u_planner::models::{CalendarDate, FlexibleActivity, RigidActivity, Time24};
/// use u_planner::scheduler::Scheduler;
///
/// let monday = CalendarDate::new(6, 1, 2025).unwrap();
/// let mut scheduler = Scheduler::new(5, monday)
///     .with_min_gap(15)
///     .with_working_hours_limit(6);
/// let (nine, quarter_past) = (Time24::from_hhmm(900).unwrap(), Time24::from_hhmm(915).unwrap());
/// scheduler.add_rigid_activity(RigidActivity::new("Standup", monday, nine, quarter_past).unwrap());
/// scheduler.add_flexible_activity(FlexibleActivity::new("Report", 90, monday));
///
/// let calendar = scheduler.create_schedule("earliest-fit", 800, 1700).unwrap();
/// assert_eq!(calendar.num_days(), 5);
/// assert!(calendar.unscheduled().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    num_days: usize,
    first_date: CalendarDate,
    min_gap_minutes: u32,
    working_hours_limit: u32,
    breaks: Vec<(CalendarDate, Break)>,
    repeated_breaks: Vec<Break>,
    rigid_activities: Vec<RigidActivity>,
    flexible_activities: Vec<FlexibleActivity>,
    dependency_graph: DependencyGraph,
}

impl Scheduler {
    /// Creates a scheduler for `num_days` days from `first_date`, with the
    /// default gap and working limit.
    pub fn new(num_days: usize, first_date: CalendarDate) -> Self {
        let defaults = PlannerConfig::default();
        Self {
            num_days,
            first_date,
            min_gap_minutes: defaults.min_gap_minutes,
            working_hours_limit: defaults.working_hours_limit,
            breaks: Vec::new(),
            repeated_breaks: Vec::new(),
            rigid_activities: Vec::new(),
            flexible_activities: Vec::new(),
            dependency_graph: DependencyGraph::new(),
        }
    }

    /// Creates a scheduler from configuration.
    pub fn from_config(config: &PlannerConfig, first_date: CalendarDate) -> Self {
        Self::new(config.num_days, first_date)
            .with_min_gap(config.min_gap_minutes)
            .with_working_hours_limit(config.working_hours_limit)
    }

    /// Sets the minimum gap between blocks (minutes).
    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_minutes = minutes;
        self
    }

    /// Sets the daily working-hour limit.
    pub fn with_working_hours_limit(mut self, hours: u32) -> Self {
        self.working_hours_limit = hours;
        self
    }

    /// Sets the dependency graph.
    pub fn with_dependency_graph(mut self, graph: DependencyGraph) -> Self {
        self.dependency_graph = graph;
        self
    }

    pub fn add_rigid_activity(&mut self, activity: RigidActivity) {
        self.rigid_activities.push(activity);
    }

    pub fn add_flexible_activity(&mut self, activity: FlexibleActivity) {
        self.flexible_activities.push(activity);
    }

    /// Adds a break on one date.
    pub fn add_break(&mut self, date: CalendarDate, brk: Break) {
        self.breaks.push((date, brk));
    }

    /// Adds a break applied to every day.
    pub fn add_repeated_break(&mut self, brk: Break) {
        self.repeated_breaks.push(brk);
    }

    /// Replaces the dependency graph.
    pub fn set_dependency_graph(&mut self, graph: DependencyGraph) {
        self.dependency_graph = graph;
    }

    pub fn dependency_graph_mut(&mut self) -> &mut DependencyGraph {
        &mut self.dependency_graph
    }

    /// Checks the accumulated inputs without generating.
    pub fn validate(&self) -> ValidationResult {
        validate_input(
            &self.rigid_activities,
            &self.flexible_activities,
            &self.dependency_graph,
        )
    }

    /// Generates a calendar.
    ///
    /// `strategy` is one of `"earliest-fit"`, `"balanced-work"`,
    /// `"deadline-oriented"`. Window bounds are `HHMM` integers.
    ///
    /// # Errors
    /// - [`PlannerError::UnknownStrategy`] for an unrecognized tag
    /// - [`PlannerError::InvalidTime`] / [`PlannerError::InvalidWindow`]
    /// - [`PlannerError::InvalidInput`] when [`validate`](Self::validate) fails
    /// - [`PlannerError::Placement`] when two rigid activities overlap
    pub fn create_schedule(
        self,
        strategy: &str,
        window_start: u32,
        window_end: u32,
    ) -> Result<Calendar> {
        let kind: StrategyKind = strategy.parse()?;
        self.create_schedule_with(
            kind,
            Time24::from_hhmm(window_start)?,
            Time24::from_hhmm(window_end)?,
        )
    }

    /// Typed form of [`create_schedule`](Self::create_schedule).
    pub fn create_schedule_with(
        self,
        strategy: StrategyKind,
        window_start: Time24,
        window_end: Time24,
    ) -> Result<Calendar> {
        let params = CalendarParams::new(
            self.min_gap_minutes,
            self.working_hours_limit,
            window_start,
            window_end,
            strategy,
        )?;
        self.validate().map_err(PlannerError::InvalidInput)?;

        let Self {
            num_days,
            first_date,
            breaks,
            repeated_breaks,
            rigid_activities,
            flexible_activities,
            dependency_graph,
            ..
        } = self;

        let mut calendar = Calendar::new(first_date, num_days, params, dependency_graph)?;
        let mut unscheduled =
            commit_fixed_items(&mut calendar, &breaks, &repeated_breaks, &rigid_activities)?;
        unscheduled.extend(strategy_for(strategy).schedule(&mut calendar, &flexible_activities)?);

        info!(
            strategy = %strategy,
            days = calendar.num_days(),
            rigid = rigid_activities.len(),
            flexible = flexible_activities.len(),
            unscheduled = unscheduled.len(),
            "generated calendar"
        );
        calendar.set_unscheduled(unscheduled);
        Ok(calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockSource, UnscheduledReason};
    use crate::validation::ValidationErrorKind;

    fn t(hhmm: u32) -> Time24 {
        Time24::from_hhmm(hhmm).unwrap()
    }

    fn d(day: u32) -> CalendarDate {
        CalendarDate::new(day, 2, 2025).unwrap()
    }

    #[test]
    fn test_unknown_strategy() {
        let scheduler = Scheduler::new(3, d(3));
        assert!(matches!(
            scheduler.create_schedule("fastest-first", 800, 1700),
            Err(PlannerError::UnknownStrategy(tag)) if tag == "fastest-first"
        ));
    }

    #[test]
    fn test_invalid_window() {
        assert!(matches!(
            Scheduler::new(3, d(3)).create_schedule("earliest-fit", 1700, 800),
            Err(PlannerError::InvalidWindow { .. })
        ));
        assert!(matches!(
            Scheduler::new(3, d(3)).create_schedule("earliest-fit", 800, 2400),
            Err(PlannerError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_huge_gap_rejected() {
        assert!(matches!(
            Scheduler::new(3, d(3))
                .with_min_gap(u32::MAX)
                .create_schedule("earliest-fit", 800, 1700),
            Err(PlannerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_invalid_input_rejected() {
        let mut scheduler = Scheduler::new(3, d(3));
        scheduler.add_flexible_activity(FlexibleActivity::new("Nothing", 0, d(4)));
        match scheduler.create_schedule("earliest-fit", 800, 1700) {
            Err(PlannerError::InvalidInput(errors)) => {
                assert_eq!(errors[0].kind, ValidationErrorKind::EmptyDuration)
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_breaks_and_rigid_placed() {
        let lunch = Break::new(t(1200), t(1300)).unwrap().with_name("Lunch");
        let gym = Break::new(t(1800), t(1900)).unwrap().with_name("Gym");
        let lecture = RigidActivity::new("Lecture", d(4), t(900), t(1030)).unwrap();

        let mut scheduler = Scheduler::new(3, d(3)).with_min_gap(0);
        scheduler.add_repeated_break(lunch.clone());
        scheduler.add_break(d(5), gym.clone());
        scheduler.add_rigid_activity(lecture.clone());

        let cal = scheduler.create_schedule("balanced-work", 800, 1700).unwrap();
        assert_eq!(cal.strategy(), StrategyKind::BalancedWork);
        for day in cal.days() {
            assert!(day.block(lunch.id, BlockSource::Break).is_some());
        }
        assert!(cal.day_for(d(5)).unwrap().block(gym.id, BlockSource::Break).is_some());
        let block = cal.locate_block_for(lecture.id, BlockSource::Rigid).unwrap();
        assert_eq!((block.date, block.start, block.end), (d(4), t(900), t(1030)));
    }

    #[test]
    fn test_rigid_conflict_fails_generation() {
        let mut scheduler = Scheduler::new(3, d(3));
        scheduler.add_rigid_activity(RigidActivity::new("A", d(3), t(900), t(1000)).unwrap());
        scheduler.add_rigid_activity(RigidActivity::new("B", d(3), t(950), t(1100)).unwrap());
        assert!(matches!(
            scheduler.create_schedule("earliest-fit", 800, 1700),
            Err(PlannerError::Placement(_))
        ));
    }

    #[test]
    fn test_unscheduled_collected() {
        let mut scheduler = Scheduler::new(2, d(3));
        scheduler.add_rigid_activity(RigidActivity::new("Trip", d(20), t(900), t(1000)).unwrap());
        scheduler.add_flexible_activity(FlexibleActivity::new("Overdue", 30, d(1)));

        let cal = scheduler.create_schedule("deadline-oriented", 800, 1700).unwrap();
        let reasons: Vec<&UnscheduledReason> = cal.unscheduled().iter().map(|u| &u.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &UnscheduledReason::OutsideCalendar(d(20)),
                &UnscheduledReason::DeadlineUnreachable
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = PlannerConfig {
            num_days: 2,
            min_gap_minutes: 5,
            working_hours_limit: 3,
            ..PlannerConfig::default()
        };
        let cal = Scheduler::from_config(&config, d(3))
            .create_schedule(&config.strategy, config.window_start, config.window_end)
            .unwrap();
        assert_eq!(cal.num_days(), 2);
        assert_eq!(cal.params().min_gap_minutes, 5);
        assert_eq!(cal.params().working_hours_limit, 3);
    }
}
