//! Input and calendar validation.
//!
//! Two checks:
//! - [`validate_input`] runs before generation and detects structural
//!   problems in the activities fed to a scheduler (duplicate IDs, empty
//!   durations, prerequisites that refer to nothing).
//! - [`validate_calendar`] audits a generated or restored calendar against
//!   the placement invariants (no overlap, minimum gap, working limit,
//!   precedence, deadlines, generation window).
//!
//! Both collect every problem instead of stopping at the first.

use std::collections::HashSet;

use crate::models::{ActivityId, BlockSource, Calendar, DependencyGraph, FlexibleActivity, Moment, RigidActivity};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two inputs share the same ID.
    DuplicateId,
    /// A flexible activity lasts zero minutes.
    EmptyDuration,
    /// A dependency references an activity that isn't among the inputs.
    InvalidPrerequisite,
    /// Two blocks on the same day overlap.
    Overlap,
    /// Two blocks are closer than the day's minimum gap.
    GapTooSmall,
    /// A day's non-break minutes exceed its working limit.
    WorkingLimitExceeded,
    /// An activity starts before one of its prerequisites ends.
    PrecedenceViolation,
    /// A flexible activity is placed after its deadline.
    DeadlineMissed,
    /// A flexible activity lies outside the generation window.
    OutsideWindow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates scheduler inputs.
///
/// Checks:
/// 1. No duplicate IDs across rigid and flexible activities
/// 2. No zero-duration flexible activity
/// 3. Every event and prerequisite in the graph is one of the inputs
pub fn validate_input(
    rigid: &[RigidActivity],
    flexible: &[FlexibleActivity],
    graph: &DependencyGraph,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids: HashSet<ActivityId> = HashSet::new();
    let all = rigid
        .iter()
        .map(|a| (a.id, a.name.as_str()))
        .chain(flexible.iter().map(|a| (a.id, a.name.as_str())));
    for (id, name) in all {
        if !ids.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate activity ID: {id} ('{name}')"),
            ));
        }
    }

    for act in flexible {
        if act.duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyDuration,
                format!("Activity '{}' has zero duration", act.name),
            ));
        }
    }

    for entry in graph.entries() {
        for id in std::iter::once(&entry.event).chain(entry.prerequisites.iter()) {
            if !ids.contains(id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPrerequisite,
                    format!("Dependency references unknown activity {id}"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Audits a calendar against the placement invariants.
///
/// Checks, per day:
/// 1. Non-break blocks do not overlap each other or breaks
/// 2. Blocks keep the minimum gap (break-to-break pairs excepted)
/// 3. Non-break minutes stay within the working limit
/// 4. Flexible blocks lie inside the generation window and before their deadline
///
/// and across days:
/// 5. Every placed prerequisite ends before its placed dependent starts
pub fn validate_calendar(calendar: &Calendar) -> ValidationResult {
    let mut errors = Vec::new();
    let (window_start, window_end) = (calendar.window_start(), calendar.window_end());

    for day in calendar.days() {
        let blocks = day.time_blocks();
        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                if a.is_break() && b.is_break() {
                    continue;
                }
                if a.overlaps(b.start, b.end) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::Overlap,
                        format!("'{}' overlaps '{}' on {}", a.name, b.name, day.date),
                    ));
                } else if a.too_close(b.start, b.end, day.min_gap_minutes) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::GapTooSmall,
                        format!(
                            "'{}' and '{}' are closer than {} minutes on {}",
                            a.name, b.name, day.min_gap_minutes, day.date
                        ),
                    ));
                }
            }
        }

        if day.working_minutes() > day.working_limit_minutes() {
            errors.push(ValidationError::new(
                ValidationErrorKind::WorkingLimitExceeded,
                format!(
                    "{} has {} working minutes, limit {}",
                    day.date,
                    day.working_minutes(),
                    day.working_limit_minutes()
                ),
            ));
        }

        for block in blocks.iter().filter(|b| b.source == BlockSource::Flexible) {
            if block.date > block.reference {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DeadlineMissed,
                    format!(
                        "'{}' placed on {} after its deadline {}",
                        block.name, block.date, block.reference
                    ),
                ));
            }
            if block.start < window_start || block.end > window_end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutsideWindow,
                    format!(
                        "'{}' at {}-{} lies outside {}-{}",
                        block.name, block.start, block.end, window_start, window_end
                    ),
                ));
            }
        }
    }

    for entry in calendar.dependency_graph().entries() {
        let Some(event) = calendar.locate_activity(entry.event) else {
            continue;
        };
        let starts = Moment::new(event.date, event.start);
        for &prerequisite in &entry.prerequisites {
            if let Some(pre) = calendar.locate_activity(prerequisite) {
                if Moment::new(pre.date, pre.end) > starts {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::PrecedenceViolation,
                        format!("'{}' starts before '{}' ends", event.name, pre.name),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
