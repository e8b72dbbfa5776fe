//! Rescheduling of an already generated calendar.
//!
//! Three operations mutate a [`Calendar`] in place:
//! - [`missed_task_shifting`](Rescheduler::missed_task_shifting): move every
//!   incomplete flexible activity to the earliest position from now on.
//! - [`add_new_time_blocks`](Rescheduler::add_new_time_blocks): merge new
//!   items without moving existing ones.
//! - [`strategy_switch`](Rescheduler::strategy_switch): re-place every
//!   incomplete flexible activity with another strategy.
//!
//! Completed blocks, rigid activities and breaks are never moved. Each
//! operation works on a copy and commits it only when it succeeds.
//!
//! Flexible activities an earlier pass left unscheduled stay in
//! [`Calendar::unscheduled`] and are retried by every operation that
//! re-places activities.
//!
//! # Determinism
//! Pulled activities are sorted by (deadline, priority high first, name,
//! id) before being handed to the strategy, so the result depends on the
//! calendar contents only, not on where the blocks used to sit. Shifting
//! twice with the same "now" leaves the calendar unchanged the second time,
//! misses included.

use std::cmp::Reverse;

use tracing::info;

use super::strategy::{commit_fixed_items, strategy_for};
use crate::error::{PlannerError, Result};
use crate::models::{
    ActivityId, Break, Calendar, CalendarDate, DependencyGraph, FlexibleActivity, Moment,
    RigidActivity, StrategyKind, TimeBlock, Unscheduled,
};
use crate::validation::validate_input;

/// Items merged into an existing calendar.
#[derive(Debug, Clone, Default)]
pub struct NewItems {
    pub rigid: Vec<RigidActivity>,
    pub flexible: Vec<FlexibleActivity>,
    /// One-off breaks with their date.
    pub breaks: Vec<(CalendarDate, Break)>,
    /// Breaks applied to every day.
    pub repeated_breaks: Vec<Break>,
    /// Extra `(event, prerequisite)` edges for the calendar's graph.
    pub dependencies: Vec<(ActivityId, ActivityId)>,
}

impl NewItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rigid(mut self, activity: RigidActivity) -> Self {
        self.rigid.push(activity);
        self
    }

    pub fn with_flexible(mut self, activity: FlexibleActivity) -> Self {
        self.flexible.push(activity);
        self
    }

    pub fn with_break(mut self, date: CalendarDate, brk: Break) -> Self {
        self.breaks.push((date, brk));
        self
    }

    pub fn with_repeated_break(mut self, brk: Break) -> Self {
        self.repeated_breaks.push(brk);
        self
    }

    /// Declares that `event` requires `prerequisite`.
    pub fn with_dependency(mut self, event: ActivityId, prerequisite: ActivityId) -> Self {
        self.dependencies.push((event, prerequisite));
        self
    }
}

/// Inputs rebuilt from a calendar's blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarContents {
    /// Every break block with its date (repeated breaks appear once per day).
    pub breaks: Vec<(CalendarDate, Break)>,
    pub rigid: Vec<RigidActivity>,
    pub flexible: Vec<FlexibleActivity>,
}

/// Outcome of one rescheduling operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RescheduleReport {
    /// Flexible activities placed by this operation.
    pub replaced: usize,
    /// Everything left unscheduled after this operation, earlier misses
    /// included.
    pub unscheduled: Vec<Unscheduled>,
}

/// Applies rescheduling operations relative to a reference moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rescheduler {
    now: Moment,
}

impl Rescheduler {
    /// Reschedules as if the current moment were `now`.
    pub fn new(now: Moment) -> Self {
        Self { now }
    }

    /// Reschedules from the local wall clock.
    pub fn at_current_time() -> Self {
        Self::new(Moment::now())
    }

    pub fn now(&self) -> Moment {
        self.now
    }

    /// Rebuilds breaks, rigid and flexible activities from the blocks of
    /// `calendar`, in date then time order.
    pub fn extract(&self, calendar: &Calendar) -> CalendarContents {
        let mut contents = CalendarContents::default();
        for block in calendar.blocks() {
            if let Some(brk) = block.to_break() {
                contents.breaks.push((block.date, brk));
            } else if let Some(rigid) = block.to_rigid() {
                contents.rigid.push(rigid);
            } else if let Some(flexible) = block.to_flexible() {
                contents.flexible.push(flexible);
            }
        }
        contents
    }

    /// Moves every incomplete flexible activity to the earliest position
    /// allowed by the calendar's strategy, not before now.
    pub fn missed_task_shifting(&self, calendar: &mut Calendar) -> Result<RescheduleReport> {
        let mut draft = calendar.clone();
        let (pulled, carried) = pull_pending(&mut draft);
        let strategy = draft.strategy();
        let report = self.replace(&mut draft, strategy, &pulled, carried)?;
        *calendar = draft;
        info!(
            now = %self.now,
            pulled = pulled.len(),
            replaced = report.replaced,
            unscheduled = report.unscheduled.len(),
            "shifted missed tasks"
        );
        Ok(report)
    }

    /// Merges `items` into `calendar`.
    ///
    /// Breaks and rigid activities are committed at their declared
    /// positions; flexible activities go through the calendar's strategy
    /// from now on. Existing blocks do not move.
    ///
    /// # Errors
    /// - [`PlannerError::InvalidInput`] for malformed new activities
    /// - [`PlannerError::CircularDependency`] if a new edge closes a cycle
    /// - [`PlannerError::Placement`] if a new rigid activity overlaps
    ///
    /// On error the calendar is left untouched.
    pub fn add_new_time_blocks(
        &self,
        calendar: &mut Calendar,
        items: NewItems,
    ) -> Result<RescheduleReport> {
        validate_input(&items.rigid, &items.flexible, &DependencyGraph::new())
            .map_err(PlannerError::InvalidInput)?;

        let mut draft = calendar.clone();
        for &(event, prerequisite) in &items.dependencies {
            draft
                .dependency_graph_mut()
                .add_dependency_ids(event, prerequisite)?;
        }
        let mut carried = draft.unscheduled().to_vec();
        carried.extend(commit_fixed_items(
            &mut draft,
            &items.breaks,
            &items.repeated_breaks,
            &items.rigid,
        )?);

        let flexible = canonical_order(items.flexible.clone());
        let strategy = draft.strategy();
        let report = self.replace(&mut draft, strategy, &flexible, carried)?;

        *calendar = draft;
        info!(
            now = %self.now,
            rigid = items.rigid.len(),
            flexible = items.flexible.len(),
            breaks = items.breaks.len() + items.repeated_breaks.len(),
            unscheduled = report.unscheduled.len(),
            "merged new items"
        );
        Ok(report)
    }

    /// Re-places every incomplete flexible activity with the strategy named
    /// by `tag`, from now on.
    ///
    /// # Errors
    /// [`PlannerError::UnknownStrategy`] for an unrecognized tag; the
    /// calendar is not touched in that case.
    pub fn strategy_switch(&self, calendar: &mut Calendar, tag: &str) -> Result<RescheduleReport> {
        let kind: StrategyKind = tag.parse()?;
        let previous = calendar.strategy();

        let mut draft = calendar.clone();
        let (pulled, carried) = pull_pending(&mut draft);
        draft.set_strategy(kind);
        let report = self.replace(&mut draft, kind, &pulled, carried)?;
        *calendar = draft;
        info!(
            from = %previous,
            to = %kind,
            replaced = report.replaced,
            unscheduled = report.unscheduled.len(),
            "switched strategy"
        );
        Ok(report)
    }

    fn replace(
        &self,
        calendar: &mut Calendar,
        kind: StrategyKind,
        activities: &[FlexibleActivity],
        mut unscheduled: Vec<Unscheduled>,
    ) -> Result<RescheduleReport> {
        let missed = strategy_for(kind).reschedule(calendar, activities, self.now)?;
        let replaced = activities.len().saturating_sub(missed.len());
        unscheduled.extend(missed);
        calendar.set_unscheduled(unscheduled.clone());
        Ok(RescheduleReport {
            replaced,
            unscheduled,
        })
    }
}

/// Sorts by deadline, priority (high first), name, id.
fn canonical_order(mut activities: Vec<FlexibleActivity>) -> Vec<FlexibleActivity> {
    activities.sort_by(|a, b| {
        (a.deadline, Reverse(a.priority), &a.name, a.id)
            .cmp(&(b.deadline, Reverse(b.priority), &b.name, b.id))
    });
    activities
}

/// Removes every incomplete flexible block and gathers the flexible
/// activities earlier passes left unscheduled. Returns them in canonical
/// order, along with the unscheduled rigid items and breaks to carry over.
fn pull_pending(calendar: &mut Calendar) -> (Vec<FlexibleActivity>, Vec<Unscheduled>) {
    let (retry, carried): (Vec<Unscheduled>, Vec<Unscheduled>) = calendar
        .unscheduled()
        .iter()
        .cloned()
        .partition(|u| u.activity.is_some());

    let mut activities: Vec<FlexibleActivity> = calendar
        .take_incomplete_flexible()
        .iter()
        .filter_map(TimeBlock::to_flexible)
        .collect();
    activities.extend(retry.into_iter().filter_map(|u| u.activity));

    let mut activities = canonical_order(activities);
    activities.dedup_by_key(|a| a.id);
    (activities, carried)
}
