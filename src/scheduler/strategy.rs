//! Strategy trait and the placement machinery shared by all strategies.
//!
//! # Placement pass
//! 1. Order the pending flexible activities by the dependency graph.
//! 2. Walk them with an explicit worklist so that whatever an activity
//!    waits on (prerequisites for forward strategies, dependents for the
//!    backward one) is placed first.
//! 3. For each activity compute its search range:
//!    - lower bound: the pass floor and the end of every placed
//!      prerequisite;
//!    - upper bound: its deadline at window end, and the start of every
//!      placed, incomplete dependent.
//! 4. Visit candidate days in the strategy's order and run the slot search.
//!    A day over its working limit is skipped; any other placement error
//!    aborts the pass.
//!
//! Activities with no fitting day are returned as [`Unscheduled`]. When a
//! backward pass leaves a prerequisite unplaced, the dependents it already
//! placed are taken back and reported too, so every strategy leaves a
//! dependent unscheduled when its prerequisite is.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use tracing::{debug, warn};

use super::slot::{find_earliest_slot, find_latest_slot};
use super::{BalancedWork, DeadlineOriented, EarliestFit};
use crate::error::Result;
use crate::models::{
    ActivityId, BlockSource, Break, Calendar, CalendarDate, DependencyGraph, FlexibleActivity, Moment,
    PlacementError, RigidActivity, StrategyKind, Time24, Unscheduled, UnscheduledReason,
};

/// A placement strategy for flexible activities.
///
/// Implementations only decide *where* flexible activities go. Breaks and
/// rigid activities are committed beforehand by the caller.
pub trait SchedulingStrategy: Debug {
    /// Tag of this strategy.
    fn kind(&self) -> StrategyKind;

    /// Places `activities` on `calendar`, never before `floor`.
    ///
    /// Returns the activities that found no slot.
    fn place(
        &self,
        calendar: &mut Calendar,
        activities: &[FlexibleActivity],
        floor: Moment,
    ) -> Result<Vec<Unscheduled>>;

    /// Places activities on a freshly generated calendar.
    fn schedule(
        &self,
        calendar: &mut Calendar,
        activities: &[FlexibleActivity],
    ) -> Result<Vec<Unscheduled>> {
        let floor = calendar.start_moment();
        self.place(calendar, activities, floor)
    }

    /// Places activities into an existing calendar, not before `from`.
    fn reschedule(
        &self,
        calendar: &mut Calendar,
        activities: &[FlexibleActivity],
        from: Moment,
    ) -> Result<Vec<Unscheduled>> {
        let floor = from.max(calendar.start_moment());
        self.place(calendar, activities, floor)
    }
}

/// Returns the strategy implementation for a tag.
pub fn strategy_for(kind: StrategyKind) -> Box<dyn SchedulingStrategy> {
    match kind {
        StrategyKind::EarliestFit => Box::new(EarliestFit),
        StrategyKind::BalancedWork => Box::new(BalancedWork),
        StrategyKind::DeadlineOriented => Box::new(DeadlineOriented),
    }
}

/// Commits breaks and rigid activities verbatim.
///
/// Items dated outside the calendar are reported, not placed. A rigid
/// activity overlapping any block, or a break overlapping an activity,
/// aborts with [`PlacementError::Conflict`].
pub(crate) fn commit_fixed_items(
    calendar: &mut Calendar,
    breaks: &[(CalendarDate, Break)],
    repeated_breaks: &[Break],
    rigid: &[RigidActivity],
) -> Result<Vec<Unscheduled>> {
    let mut unscheduled = Vec::new();

    for (date, brk) in breaks {
        match calendar.day_for_mut(*date) {
            Some(day) => day.place_break(brk)?,
            None => {
                warn!(name = %brk.name, date = %date, "break dated outside the calendar");
                unscheduled.push(Unscheduled::new(
                    brk.id,
                    &brk.name,
                    UnscheduledReason::OutsideCalendar(*date),
                ));
            }
        }
    }

    for brk in repeated_breaks {
        for day in calendar.days_mut() {
            day.place_break(brk)?;
        }
    }

    for activity in rigid {
        match calendar.day_for_mut(activity.date) {
            Some(day) => day.place_rigid(activity)?,
            None => {
                warn!(name = %activity.name, date = %activity.date, "rigid activity dated outside the calendar");
                unscheduled.push(Unscheduled::new(
                    activity.id,
                    &activity.name,
                    UnscheduledReason::OutsideCalendar(activity.date),
                ));
            }
        }
    }

    Ok(unscheduled)
}

/// Order in which candidate days are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayOrder {
    /// Earliest date first, earliest slot in the day.
    Chronological,
    /// Least occupied day first (ties chronological), earliest slot.
    LeastLoaded,
    /// Latest date first, latest slot in the day.
    ReverseChronological,
}

/// Which way the worklist resolves waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkDirection {
    /// Prerequisites before dependents.
    PrerequisitesFirst,
    /// Dependents before prerequisites.
    DependentsFirst,
}

/// Runs one placement pass over `activities`.
pub(crate) fn run_pass(
    calendar: &mut Calendar,
    activities: &[FlexibleActivity],
    floor: Moment,
    day_order: DayOrder,
    walk: WalkDirection,
) -> Result<Vec<Unscheduled>> {
    let graph = calendar.dependency_graph().clone();
    let pending: HashMap<ActivityId, &FlexibleActivity> =
        activities.iter().map(|a| (a.id, a)).collect();

    let mut order: Vec<ActivityId> = graph
        .topological_order(activities)
        .into_iter()
        .map(|a| a.id)
        .collect();
    if walk == WalkDirection::DependentsFirst {
        order.reverse();
    }

    let blockers = |id: ActivityId| -> Vec<ActivityId> {
        let neighbours = match walk {
            WalkDirection::PrerequisitesFirst => graph.dependencies_of(id).to_vec(),
            WalkDirection::DependentsFirst => graph.dependents_of(id),
        };
        neighbours
            .into_iter()
            .filter(|n| pending.contains_key(n))
            .collect()
    };

    let mut unscheduled = Vec::new();
    walk_dependency_first(&order, blockers, |id| {
        let Some(activity) = pending.get(&id) else {
            return Ok(());
        };
        let skip_pending = walk == WalkDirection::DependentsFirst;
        if let Some(miss) =
            place_one(calendar, &graph, activity, floor, day_order, &pending, skip_pending)?
        {
            warn!(
                activity = %miss.name,
                reason = ?miss.reason,
                "activity left unscheduled"
            );
            unscheduled.push(miss);
        }
        Ok(())
    })?;

    if walk == WalkDirection::DependentsFirst {
        withdraw_orphaned_dependents(calendar, &graph, &pending, &mut unscheduled);
    }
    Ok(unscheduled)
}

/// Takes back dependents placed in this pass whose prerequisite found no
/// slot, transitively, and reports them as
/// [`UnscheduledReason::PrerequisiteUnplaced`].
fn withdraw_orphaned_dependents(
    calendar: &mut Calendar,
    graph: &DependencyGraph,
    pending: &HashMap<ActivityId, &FlexibleActivity>,
    unscheduled: &mut Vec<Unscheduled>,
) {
    let mut missing: Vec<ActivityId> = unscheduled.iter().map(|u| u.activity_id).collect();
    while let Some(prerequisite) = missing.pop() {
        for dependent in graph.dependents_of(prerequisite) {
            let Some(activity) = pending.get(&dependent) else {
                continue;
            };
            if calendar
                .remove_block(dependent, BlockSource::Flexible)
                .is_none()
            {
                continue;
            }
            warn!(
                activity = %activity.name,
                prerequisite = %prerequisite,
                "withdrew activity whose prerequisite was left unscheduled"
            );
            unscheduled.push(Unscheduled::flexible(
                activity,
                UnscheduledReason::PrerequisiteUnplaced(prerequisite),
            ));
            missing.push(dependent);
        }
    }
}

/// Visits every id in `order`, first visiting whatever `blockers` reports
/// for it. Uses an explicit stack; the graph is acyclic so it terminates.
pub(crate) fn walk_dependency_first<B, V>(
    order: &[ActivityId],
    blockers: B,
    mut visit: V,
) -> Result<()>
where
    B: Fn(ActivityId) -> Vec<ActivityId>,
    V: FnMut(ActivityId) -> Result<()>,
{
    let mut done: HashSet<ActivityId> = HashSet::new();
    for &root in order {
        let mut stack = vec![root];
        while let Some(&id) = stack.last() {
            if done.contains(&id) {
                stack.pop();
                continue;
            }
            let waiting: Vec<ActivityId> = blockers(id)
                .into_iter()
                .filter(|b| !done.contains(b))
                .collect();
            if waiting.is_empty() {
                stack.pop();
                done.insert(id);
                visit(id)?;
            } else {
                stack.extend(waiting.into_iter().rev());
            }
        }
    }
    Ok(())
}

/// Allowed placement interval for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchRange {
    pub lower: Moment,
    pub upper: Moment,
}

/// Computes the search range of `activity`.
///
/// With `skip_pending`, prerequisites that are still waiting to be placed
/// in this pass do not count as missing.
pub(crate) fn search_range(
    calendar: &Calendar,
    graph: &DependencyGraph,
    activity: &FlexibleActivity,
    floor: Moment,
    pending: &HashMap<ActivityId, &FlexibleActivity>,
    skip_pending: bool,
) -> std::result::Result<SearchRange, UnscheduledReason> {
    let mut lower = floor;
    for &prerequisite in graph.dependencies_of(activity.id) {
        match calendar.locate_activity(prerequisite) {
            Some(block) => lower = lower.max(Moment::new(block.date, block.end)),
            None if skip_pending && pending.contains_key(&prerequisite) => {}
            None => return Err(UnscheduledReason::PrerequisiteUnplaced(prerequisite)),
        }
    }

    let mut upper = Moment::new(
        activity.deadline.min(calendar.last_date()),
        calendar.window_end(),
    );
    let earliest_dependent = graph
        .dependents_of(activity.id)
        .into_iter()
        .filter_map(|d| calendar.locate_activity(d))
        .filter(|b| !b.completed)
        .map(|b| Moment::new(b.date, b.start))
        .min();
    if let Some(bound) = earliest_dependent {
        upper = upper.min(bound);
    }

    if upper.date < lower.date.max(calendar.first_date()) || upper < lower {
        return Err(UnscheduledReason::DeadlineUnreachable);
    }
    Ok(SearchRange { lower, upper })
}

fn place_one(
    calendar: &mut Calendar,
    graph: &DependencyGraph,
    activity: &FlexibleActivity,
    floor: Moment,
    day_order: DayOrder,
    pending: &HashMap<ActivityId, &FlexibleActivity>,
    skip_pending: bool,
) -> Result<Option<Unscheduled>> {
    let range = match search_range(calendar, graph, activity, floor, pending, skip_pending) {
        Ok(range) => range,
        Err(reason) => return Ok(Some(Unscheduled::flexible(activity, reason))),
    };

    let mut dates: Vec<CalendarDate> = calendar
        .dates_in_order()
        .into_iter()
        .filter(|d| *d >= range.lower.date && *d <= range.upper.date)
        .collect();
    match day_order {
        DayOrder::Chronological => {}
        DayOrder::LeastLoaded => dates.sort_by_key(|d| {
            calendar
                .day_for(*d)
                .map(|day| day.occupied_minutes())
                .unwrap_or(u32::MAX)
        }),
        DayOrder::ReverseChronological => dates.reverse(),
    }

    let backward = day_order == DayOrder::ReverseChronological;
    let (window_start, window_end) = (calendar.window_start(), calendar.window_end());
    for date in dates {
        let earliest = if date == range.lower.date {
            range.lower.time.max(window_start)
        } else {
            window_start
        };
        let latest_end = if date == range.upper.date {
            range.upper.time.min(window_end)
        } else {
            window_end
        };
        if try_place(calendar, activity, date, earliest, latest_end, backward)? {
            return Ok(None);
        }
    }

    Ok(Some(Unscheduled::flexible(activity, UnscheduledReason::NoSlot)))
}

/// Searches one day and commits the slot found. `Ok(false)` means "try
/// another day".
fn try_place(
    calendar: &mut Calendar,
    activity: &FlexibleActivity,
    date: CalendarDate,
    earliest: Time24,
    latest_end: Time24,
    backward: bool,
) -> Result<bool> {
    let Some(day) = calendar.day_for_mut(date) else {
        return Ok(false);
    };
    let slot = if backward {
        find_latest_slot(day, activity.duration_minutes, earliest, latest_end)
    } else {
        find_earliest_slot(day, activity.duration_minutes, earliest, latest_end)
    };
    let Some(start) = slot else {
        return Ok(false);
    };

    match day.place_flexible(activity, start) {
        Ok(()) => {
            debug!(activity = %activity.name, date = %date, start = %start, "placed flexible activity");
            Ok(true)
        }
        Err(PlacementError::WorkingLimitExceeded {
            requested,
            available,
            ..
        }) => {
            debug!(
                activity = %activity.name,
                date = %date,
                requested,
                available,
                "working limit reached, trying another day"
            );
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
