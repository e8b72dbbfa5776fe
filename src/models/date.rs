//! Calendar dates.
//!
//! A [`CalendarDate`] is always a valid Gregorian date. It is backed by
//! `chrono::NaiveDate`, so month lengths and leap years follow chrono.
//! At the crate boundary dates travel as `{day, month, year}` triples.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// A valid Gregorian date, ordered by (year, month, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateParts", into = "DateParts")]
pub struct CalendarDate(NaiveDate);

/// Wire form of a date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DateParts {
    day: u32,
    month: u32,
    year: i32,
}

impl CalendarDate {
    /// Creates a date, rejecting impossible triples (e.g. 30 February).
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| PlannerError::InvalidDate(format!("{day}/{month}/{year}")))
    }

    /// Today's local date.
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    #[inline]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// The following day. `None` only at the end of chrono's date range.
    pub fn next_date(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding day.
    pub fn previous_date(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// `count` consecutive dates starting at `self`.
    pub fn range(&self, count: usize) -> Vec<CalendarDate> {
        std::iter::successors(Some(*self), |d| d.next_date())
            .take(count)
            .collect()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl TryFrom<DateParts> for CalendarDate {
    type Error = PlannerError;

    fn try_from(parts: DateParts) -> Result<Self> {
        Self::new(parts.day, parts.month, parts.year)
    }
}

impl From<CalendarDate> for DateParts {
    fn from(date: CalendarDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
