//! Multi-day calendar (the generated schedule).
//!
//! A [`Calendar`] owns one [`DaySchedule`] per date in its range, the
//! generation window applied every day, the strategy that produced it, and
//! the dependency graph its flexible activities were ordered by. The set of
//! dates is fixed when the calendar is built; days are never added or
//! removed afterwards.
//!
//! # Diagnostics
//! Activities that found no slot are recorded in
//! [`unscheduled`](Calendar::unscheduled), replaced by every generation or
//! rescheduling pass.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{
    ActivityId, BlockSource, CalendarDate, DaySchedule, DependencyGraph, FlexibleActivity, Moment,
    Time24, TimeBlock, MINUTES_PER_DAY,
};
use crate::error::{PlannerError, Result};

/// Placement strategy tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Earliest feasible day and slot.
    #[default]
    EarliestFit,
    /// Least-loaded feasible day.
    BalancedWork,
    /// Latest feasible slot before the deadline.
    DeadlineOriented,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::EarliestFit,
        StrategyKind::BalancedWork,
        StrategyKind::DeadlineOriented,
    ];

    /// Boundary tag (`"earliest-fit"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::EarliestFit => "earliest-fit",
            StrategyKind::BalancedWork => "balanced-work",
            StrategyKind::DeadlineOriented => "deadline-oriented",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = PlannerError;

    fn from_str(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == tag)
            .ok_or_else(|| PlannerError::UnknownStrategy(tag.to_string()))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar parameters shared by every day of a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarParams {
    pub min_gap_minutes: u32,
    pub working_hours_limit: u32,
    /// Earliest time a flexible activity may start on any day.
    pub window_start: Time24,
    /// Latest time a flexible activity may end on any day.
    pub window_end: Time24,
    pub strategy: StrategyKind,
}

impl CalendarParams {
    /// Creates parameters.
    ///
    /// # Errors
    /// - [`PlannerError::InvalidWindow`] if the window is empty
    /// - [`PlannerError::InvalidParameter`] if the gap exceeds a day or the
    ///   working limit exceeds 24 hours
    pub fn new(
        min_gap_minutes: u32,
        working_hours_limit: u32,
        window_start: Time24,
        window_end: Time24,
        strategy: StrategyKind,
    ) -> Result<Self> {
        if window_end <= window_start {
            return Err(PlannerError::InvalidWindow {
                start: window_start.to_string(),
                end: window_end.to_string(),
            });
        }
        if min_gap_minutes > MINUTES_PER_DAY {
            return Err(PlannerError::InvalidParameter(format!(
                "minimum gap of {min_gap_minutes} minutes exceeds one day"
            )));
        }
        if working_hours_limit > 24 {
            return Err(PlannerError::InvalidParameter(format!(
                "working limit of {working_hours_limit} hours exceeds one day"
            )));
        }
        Ok(Self {
            min_gap_minutes,
            working_hours_limit,
            window_start,
            window_end,
            strategy,
        })
    }
}

/// Why an activity is absent from the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// No day in the allowed range had a fitting slot.
    NoSlot,
    /// The allowed range is empty (deadline before the earliest moment).
    DeadlineUnreachable,
    /// A prerequisite is neither placed nor being placed.
    PrerequisiteUnplaced(ActivityId),
    /// A rigid activity or break dated outside the calendar.
    OutsideCalendar(CalendarDate),
}

/// An activity that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unscheduled {
    pub activity_id: ActivityId,
    pub name: String,
    pub reason: UnscheduledReason,
    /// The flexible activity itself, kept so later passes can retry it.
    /// `None` for rigid activities and breaks.
    pub activity: Option<FlexibleActivity>,
}

impl Unscheduled {
    /// A rigid activity or break that was not committed.
    pub fn new(activity_id: ActivityId, name: impl Into<String>, reason: UnscheduledReason) -> Self {
        Self {
            activity_id,
            name: name.into(),
            reason,
            activity: None,
        }
    }

    /// A flexible activity that found no slot.
    pub fn flexible(activity: &FlexibleActivity, reason: UnscheduledReason) -> Self {
        Self {
            activity_id: activity.id,
            name: activity.name.clone(),
            reason,
            activity: Some(activity.clone()),
        }
    }
}

/// A contiguous run of days with their placed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    first_date: CalendarDate,
    /// Sorted by date, no duplicates.
    days: Vec<DaySchedule>,
    params: CalendarParams,
    dependency_graph: DependencyGraph,
    unscheduled: Vec<Unscheduled>,
}

impl Calendar {
    /// Creates `num_days` empty days starting at `first_date`.
    pub fn new(
        first_date: CalendarDate,
        num_days: usize,
        params: CalendarParams,
        dependency_graph: DependencyGraph,
    ) -> Result<Self> {
        if num_days == 0 {
            return Err(PlannerError::InvalidDate(
                "a calendar needs at least one day".to_string(),
            ));
        }
        let days = first_date
            .range(num_days)
            .into_iter()
            .map(|date| DaySchedule::new(date, params.min_gap_minutes, params.working_hours_limit))
            .collect();
        Ok(Self {
            first_date,
            days,
            params,
            dependency_graph,
            unscheduled: Vec::new(),
        })
    }

    /// Rebuilds a calendar from pre-built days (e.g. loaded from storage).
    ///
    /// Days are taken as-is; blocks are not re-validated.
    pub fn from_days(
        mut days: Vec<DaySchedule>,
        params: CalendarParams,
        dependency_graph: DependencyGraph,
    ) -> Result<Self> {
        days.sort_by_key(|d| d.date);
        if days.windows(2).any(|w| w[0].date == w[1].date) {
            return Err(PlannerError::InvalidDate(
                "duplicate day in restored calendar".to_string(),
            ));
        }
        let first_date = days
            .first()
            .map(|d| d.date)
            .ok_or_else(|| PlannerError::InvalidDate("a calendar needs at least one day".to_string()))?;
        Ok(Self {
            first_date,
            days,
            params,
            dependency_graph,
            unscheduled: Vec::new(),
        })
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    pub fn first_date(&self) -> CalendarDate {
        self.first_date
    }

    pub fn last_date(&self) -> CalendarDate {
        self.days.last().map(|d| d.date).unwrap_or(self.first_date)
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_date.weekday()
    }

    pub fn params(&self) -> &CalendarParams {
        &self.params
    }

    pub fn strategy(&self) -> StrategyKind {
        self.params.strategy
    }

    pub fn set_strategy(&mut self, strategy: StrategyKind) {
        self.params.strategy = strategy;
    }

    pub fn window_start(&self) -> Time24 {
        self.params.window_start
    }

    pub fn window_end(&self) -> Time24 {
        self.params.window_end
    }

    /// Earliest moment anything may be placed: first day at window start.
    pub fn start_moment(&self) -> Moment {
        Moment::new(self.first_date, self.params.window_start)
    }

    /// Dates in chronological order.
    pub fn dates_in_order(&self) -> Vec<CalendarDate> {
        self.days.iter().map(|d| d.date).collect()
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }

    pub fn contains_date(&self, date: CalendarDate) -> bool {
        self.index_of(date).is_some()
    }

    pub fn day_for(&self, date: CalendarDate) -> Option<&DaySchedule> {
        self.index_of(date).map(|idx| &self.days[idx])
    }

    pub fn day_for_mut(&mut self, date: CalendarDate) -> Option<&mut DaySchedule> {
        self.index_of(date).map(move |idx| &mut self.days[idx])
    }

    pub(crate) fn days_mut(&mut self) -> impl Iterator<Item = &mut DaySchedule> {
        self.days.iter_mut()
    }

    /// Every block across all days, in date then time order.
    pub fn blocks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.days.iter().flat_map(|d| d.time_blocks().iter())
    }

    /// First block placed for `id` with the given source.
    pub fn locate_block_for(&self, id: ActivityId, source: BlockSource) -> Option<&TimeBlock> {
        self.blocks()
            .find(|b| b.activity_id == id && b.source == source)
    }

    /// The rigid or flexible block placed for `id`.
    pub fn locate_activity(&self, id: ActivityId) -> Option<&TimeBlock> {
        self.blocks().find(|b| b.activity_id == id && !b.is_break())
    }

    /// Marks the non-break block for `id` on `date`. Returns whether a
    /// block was found.
    pub fn set_completed(&mut self, id: ActivityId, date: CalendarDate, completed: bool) -> bool {
        let Some(day) = self.day_for_mut(date) else {
            return false;
        };
        [BlockSource::Flexible, BlockSource::Rigid]
            .into_iter()
            .find_map(|source| day.block_mut(id, source).map(|b| b.set_completed(completed)))
            .is_some()
    }

    /// Removes the first block placed for `id` with the given source.
    pub fn remove_block(&mut self, id: ActivityId, source: BlockSource) -> Option<TimeBlock> {
        self.days
            .iter_mut()
            .find_map(|d| d.remove_block(id, source))
    }

    /// Removes every incomplete flexible block from every day.
    pub fn take_incomplete_flexible(&mut self) -> Vec<TimeBlock> {
        self.days
            .iter_mut()
            .flat_map(|d| d.take_incomplete_flexible())
            .collect()
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependency_graph
    }

    /// Mutable graph, for declaring dependencies of items about to be
    /// added through rescheduling.
    pub fn dependency_graph_mut(&mut self) -> &mut DependencyGraph {
        &mut self.dependency_graph
    }

    /// Activities the most recent pass could not place.
    pub fn unscheduled(&self) -> &[Unscheduled] {
        &self.unscheduled
    }

    pub(crate) fn set_unscheduled(&mut self, unscheduled: Vec<Unscheduled>) {
        self.unscheduled = unscheduled;
    }

    fn index_of(&self, date: CalendarDate) -> Option<usize> {
        self.days.binary_search_by_key(&date, |d| d.date).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlexibleActivity, RigidActivity};

    fn t(hhmm: u32) -> Time24 {
        Time24::from_hhmm(hhmm).unwrap()
    }

    fn d(day: u32) -> CalendarDate {
        CalendarDate::new(day, 1, 2024).unwrap()
    }

    fn params() -> CalendarParams {
        CalendarParams::new(15, 8, t(800), t(1700), StrategyKind::EarliestFit).unwrap()
    }

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!("earliest-fit".parse::<StrategyKind>().unwrap(), StrategyKind::EarliestFit);
        assert_eq!("balanced-work".parse::<StrategyKind>().unwrap(), StrategyKind::BalancedWork);
        assert_eq!(
            "deadline-oriented".parse::<StrategyKind>().unwrap(),
            StrategyKind::DeadlineOriented
        );
        assert!(matches!(
            "random".parse::<StrategyKind>(),
            Err(PlannerError::UnknownStrategy(tag)) if tag == "random"
        ));
        assert_eq!(StrategyKind::BalancedWork.to_string(), "balanced-work");
    }

    #[test]
    fn test_params_reject_empty_window() {
        assert!(CalendarParams::new(0, 8, t(1700), t(800), StrategyKind::EarliestFit).is_err());
        assert!(CalendarParams::new(0, 8, t(800), t(800), StrategyKind::EarliestFit).is_err());
    }

    #[test]
    fn test_params_reject_out_of_range_gap_and_limit() {
        let make = |gap, limit| CalendarParams::new(gap, limit, t(800), t(1700), StrategyKind::EarliestFit);
        assert!(matches!(make(u32::MAX, 8), Err(PlannerError::InvalidParameter(_))));
        assert!(matches!(make(15, 25), Err(PlannerError::InvalidParameter(_))));
        assert!(make(MINUTES_PER_DAY, 24).is_ok());
    }

    #[test]
    fn test_new_calendar_dates() {
        let cal = Calendar::new(d(30), 4, params(), DependencyGraph::new()).unwrap();
        let dates = cal.dates_in_order();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[0], d(30));
        assert_eq!(dates[3], CalendarDate::new(2, 2, 2024).unwrap());
        assert_eq!(cal.last_date(), CalendarDate::new(2, 2, 2024).unwrap());
        assert_eq!(cal.first_day_of_week(), Weekday::Tue);
        assert!(cal.day_for(d(31)).is_some());
        assert!(cal.day_for(d(29)).is_none());
    }

    #[test]
    fn test_zero_days_rejected() {
        assert!(Calendar::new(d(1), 0, params(), DependencyGraph::new()).is_err());
    }

    #[test]
    fn test_locate_and_complete() {
        let mut cal = Calendar::new(d(1), 3, params(), DependencyGraph::new()).unwrap();
        let rigid = RigidActivity::new("Exam", d(2), t(900), t(1100)).unwrap();
        cal.day_for_mut(d(2)).unwrap().place_rigid(&rigid).unwrap();

        let block = cal.locate_block_for(rigid.id, BlockSource::Rigid).unwrap();
        assert_eq!(block.date, d(2));
        assert!(cal.locate_block_for(rigid.id, BlockSource::Flexible).is_none());

        assert!(cal.set_completed(rigid.id, d(2), true));
        assert!(cal.locate_activity(rigid.id).unwrap().completed);
        assert!(!cal.set_completed(rigid.id, d(3), true));
    }

    #[test]
    fn test_remove_block() {
        let mut cal = Calendar::new(d(1), 3, params(), DependencyGraph::new()).unwrap();
        let rigid = RigidActivity::new("Exam", d(3), t(900), t(1100)).unwrap();
        cal.day_for_mut(d(3)).unwrap().place_rigid(&rigid).unwrap();

        assert!(cal.remove_block(rigid.id, BlockSource::Flexible).is_none());
        let removed = cal.remove_block(rigid.id, BlockSource::Rigid).unwrap();
        assert_eq!(removed.date, d(3));
        assert!(cal.locate_activity(rigid.id).is_none());
    }

    #[test]
    fn test_from_days_round_trip() {
        let mut cal = Calendar::new(d(1), 2, params(), DependencyGraph::new()).unwrap();
        let act = FlexibleActivity::new("Read", 45, d(2));
        cal.day_for_mut(d(2)).unwrap().place_flexible(&act, t(900)).unwrap();

        let mut days = cal.days().to_vec();
        days.reverse();
        let restored =
            Calendar::from_days(days, cal.params().clone(), cal.dependency_graph().clone()).unwrap();
        assert_eq!(restored, cal);
    }

    #[test]
    fn test_from_days_rejects_duplicates_and_empty() {
        let day = DaySchedule::new(d(1), 0, 8);
        assert!(Calendar::from_days(vec![day.clone(), day], params(), DependencyGraph::new()).is_err());
        assert!(Calendar::from_days(vec![], params(), DependencyGraph::new()).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut cal = Calendar::new(d(1), 2, params(), DependencyGraph::new()).unwrap();
        let act = FlexibleActivity::new("Read", 45, d(2));
        cal.day_for_mut(d(1)).unwrap().place_flexible(&act, t(900)).unwrap();

        let json = serde_json::to_string(&cal).unwrap();
        let back: Calendar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cal);
    }
}
