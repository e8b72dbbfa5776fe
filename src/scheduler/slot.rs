//! Slot search within one day.
//!
//! # Algorithm
//! Candidates are tested on a fixed 5-minute grid. A candidate
//! `[start, start + duration)` is rejected if it overlaps, or comes within
//! the day's `min_gap_minutes` of, any block already on the day.
//!
//! - [`find_earliest_slot`] walks forward from `earliest` and returns the
//!   first fit.
//! - [`find_latest_slot`] walks backward from `latest_end - duration` and
//!   returns the last fit.
//!
//! Both give up once the window edge or midnight is crossed. The result is
//! the earliest (or latest) feasible slot on the grid, not an optimum.
//!
//! # Complexity
//! O(s * b) per day, s = grid steps in the window (at most 288),
//! b = blocks on the day.

use crate::models::{DaySchedule, Time24};

/// Grid step of the search, in minutes.
pub const SLOT_STEP_MINUTES: u32 = 5;

/// First start time in `[earliest, latest_end - duration]` that fits.
pub fn find_earliest_slot(
    day: &DaySchedule,
    duration_minutes: u32,
    earliest: Time24,
    latest_end: Time24,
) -> Option<Time24> {
    let mut start = earliest;
    loop {
        let end = start.checked_add_minutes(duration_minutes)?;
        if end > latest_end {
            return None;
        }
        if day.is_free(start, end) {
            return Some(start);
        }
        start = start.checked_add_minutes(SLOT_STEP_MINUTES)?;
    }
}

/// Last start time in `[earliest, latest_end - duration]` that fits.
pub fn find_latest_slot(
    day: &DaySchedule,
    duration_minutes: u32,
    earliest: Time24,
    latest_end: Time24,
) -> Option<Time24> {
    let mut start = latest_end.checked_sub_minutes(duration_minutes)?;
    loop {
        if start < earliest {
            return None;
        }
        let end = start.checked_add_minutes(duration_minutes)?;
        if day.is_free(start, end) {
            return Some(start);
        }
        start = start.checked_sub_minutes(SLOT_STEP_MINUTES)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Break, CalendarDate, RigidActivity};

    fn t(hhmm: u32) -> Time24 {
        Time24::from_hhmm(hhmm).unwrap()
    }

    fn day_with(gap: u32, busy: &[(u32, u32)]) -> DaySchedule {
        let date = CalendarDate::new(1, 7, 2024).unwrap();
        let mut day = DaySchedule::new(date, gap, 8);
        for (i, &(s, e)) in busy.iter().enumerate() {
            let act = RigidActivity::new(format!("R{i}"), date, t(s), t(e)).unwrap();
            day.place_rigid(&act).unwrap();
        }
        day
    }

    #[test]
    fn test_earliest_on_empty_day() {
        let day = day_with(0, &[]);
        assert_eq!(find_earliest_slot(&day, 60, t(800), t(1700)), Some(t(800)));
    }

    #[test]
    fn test_earliest_skips_block_with_gap() {
        // Busy 08:30-09:30 with 30-minute gap → next start at 10:00
        let day = day_with(30, &[(830, 930)]);
        assert_eq!(find_earliest_slot(&day, 60, t(800), t(1700)), Some(t(1000)));
        // 15-minute task fits before? 08:00-08:15 + 30 gap = 08:45 > 08:30 → no
        assert_eq!(find_earliest_slot(&day, 15, t(800), t(1700)), Some(t(1000)));
    }

    #[test]
    fn test_earliest_fits_between_blocks() {
        let day = day_with(10, &[(800, 900), (1100, 1200)]);
        assert_eq!(find_earliest_slot(&day, 60, t(800), t(1700)), Some(t(910)));
        assert_eq!(find_earliest_slot(&day, 110, t(800), t(1700)), Some(t(1210)));
    }

    #[test]
    fn test_earliest_respects_window_end() {
        let day = day_with(0, &[]);
        assert_eq!(find_earliest_slot(&day, 60, t(1630), t(1700)), None);
        assert_eq!(find_earliest_slot(&day, 30, t(1630), t(1700)), Some(t(1630)));
    }

    #[test]
    fn test_earliest_unaligned_start_keeps_offset() {
        let day = day_with(0, &[(1000, 1010)]);
        assert_eq!(find_earliest_slot(&day, 10, t(957), t(1700)), Some(t(1012)));
    }

    #[test]
    fn test_earliest_stops_at_midnight() {
        let day = day_with(0, &[]);
        assert_eq!(find_earliest_slot(&day, 120, t(2300), Time24::LAST_MINUTE), None);
    }

    #[test]
    fn test_latest_on_empty_day() {
        let day = day_with(0, &[]);
        assert_eq!(find_latest_slot(&day, 60, t(800), t(1700)), Some(t(1600)));
    }

    #[test]
    fn test_latest_backs_off_block_with_gap() {
        let day = day_with(30, &[(1530, 1700)]);
        assert_eq!(find_latest_slot(&day, 60, t(800), t(1700)), Some(t(1400)));
    }

    #[test]
    fn test_latest_respects_window_start() {
        let day = day_with(0, &[(900, 1700)]);
        assert_eq!(find_latest_slot(&day, 60, t(800), t(1700)), Some(t(800)));
        assert_eq!(find_latest_slot(&day, 61, t(800), t(1700)), None);
    }

    #[test]
    fn test_latest_duration_longer_than_day_part() {
        let day = day_with(0, &[]);
        assert_eq!(find_latest_slot(&day, 120, Time24::MIDNIGHT, t(100)), None);
    }

    #[test]
    fn test_breaks_take_part_in_gap_checks() {
        let mut day = day_with(15, &[]);
        day.place_break(&Break::new(t(800), t(900)).unwrap()).unwrap();
        assert_eq!(find_earliest_slot(&day, 30, t(800), t(1700)), Some(t(915)));
    }
}
