//! Error types for planner operations.
//!
//! Two layers:
//! - [`PlacementError`](crate::models::PlacementError): the outcome of a
//!   single attempt to commit a block to a day. Strategies absorb
//!   `WorkingLimitExceeded` and move on to the next candidate day.
//! - [`PlannerError`]: caller-visible failures that abort the operation
//!   in progress (cycles, unknown strategies, malformed input).
//!
//! An activity that finds no slot is *not* an error; it is reported in
//! [`Calendar::unscheduled`](crate::models::Calendar::unscheduled).

use thiserror::Error;

use crate::models::{ActivityId, PlacementError};
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("circular dependency: {event} cannot depend on {prerequisite}")]
    CircularDependency {
        event: ActivityId,
        prerequisite: ActivityId,
    },

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("unknown scheduling strategy: {0}")]
    UnknownStrategy(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid scheduling window: {start} is not before {end}")]
    InvalidWindow { start: String, end: String },

    #[error("invalid activity: {0}")]
    InvalidActivity(String),

    #[error("invalid calendar parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for PlannerError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("none")
}

pub type Result<T> = std::result::Result<T, PlannerError>;
