//! Clock primitives.
//!
//! [`Time24`] is a minute-of-day on a 24-hour clock. At the crate boundary
//! it travels as an `HHMM` integer (`930` = 09:30, `1730` = 17:30).
//!
//! # Midnight
//! Arithmetic never wraps. `checked_add_minutes` past 23:59 and
//! `checked_sub_minutes` before 00:00 return `None`; slot search treats
//! that as crossing the day boundary and stops.

use std::fmt;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::CalendarDate;
use crate::error::{PlannerError, Result};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Time24 {
    minute_of_day: u32,
}

impl Time24 {
    /// 00:00.
    pub const MIDNIGHT: Time24 = Time24 { minute_of_day: 0 };
    /// 23:59, the last representable minute.
    pub const LAST_MINUTE: Time24 = Time24 {
        minute_of_day: MINUTES_PER_DAY - 1,
    };

    /// Creates a time from hour and minute.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(PlannerError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self {
            minute_of_day: hour * 60 + minute,
        })
    }

    /// Parses an `HHMM` integer such as `930` or `1730`.
    pub fn from_hhmm(hhmm: u32) -> Result<Self> {
        Self::new(hhmm / 100, hhmm % 100)
            .map_err(|_| PlannerError::InvalidTime(format!("{hhmm} is not a valid HHMM value")))
    }

    /// Creates a time from a minute-of-day in `[0, 1440)`.
    pub fn from_minutes(minute_of_day: u32) -> Option<Self> {
        (minute_of_day < MINUTES_PER_DAY).then_some(Self { minute_of_day })
    }

    /// Current local wall-clock time, truncated to the minute.
    pub fn now() -> Self {
        let now = chrono::Local::now();
        Self {
            minute_of_day: now.hour() * 60 + now.minute(),
        }
    }

    #[inline]
    pub fn hour(&self) -> u32 {
        self.minute_of_day / 60
    }

    #[inline]
    pub fn minute(&self) -> u32 {
        self.minute_of_day % 60
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minute_of_day(&self) -> u32 {
        self.minute_of_day
    }

    /// `HHMM` integer form.
    pub fn to_hhmm(&self) -> u32 {
        self.hour() * 100 + self.minute()
    }

    /// Adds minutes; `None` if the result would pass 23:59.
    pub fn checked_add_minutes(&self, minutes: u32) -> Option<Self> {
        self.minute_of_day
            .checked_add(minutes)
            .and_then(Self::from_minutes)
    }

    /// Subtracts minutes; `None` if the result would precede 00:00.
    pub fn checked_sub_minutes(&self, minutes: u32) -> Option<Self> {
        self.minute_of_day
            .checked_sub(minutes)
            .and_then(Self::from_minutes)
    }

    /// Signed number of minutes from `self` to `other`.
    pub fn minutes_until(&self, other: Time24) -> i64 {
        i64::from(other.minute_of_day) - i64::from(self.minute_of_day)
    }
}

impl TryFrom<u32> for Time24 {
    type Error = PlannerError;

    fn try_from(hhmm: u32) -> Result<Self> {
        Self::from_hhmm(hhmm)
    }
}

impl From<Time24> for u32 {
    fn from(time: Time24) -> u32 {
        time.to_hhmm()
    }
}

impl fmt::Display for Time24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A point on the calendar: a date plus a time of day.
///
/// Ordered by date, then time. Used as a search bound: "not before now",
/// "after the prerequisite ends", "before the dependent starts".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Moment {
    pub date: CalendarDate,
    pub time: Time24,
}

impl Moment {
    pub fn new(date: CalendarDate, time: Time24) -> Self {
        Self { date, time }
    }

    /// Current local date and time.
    pub fn now() -> Self {
        Self::new(CalendarDate::today(), Time24::now())
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}
