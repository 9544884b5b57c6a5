//! # Wake scheduling
//!
//! Decides when the device should next wake up.
//!
//! Inside the active window the device wakes every [`ActiveWindow::interval_minutes`]. Outside
//! of it there is nothing worth sampling, so the only wake up is at the start of the next active
//! window; either later the same day or tomorrow.

use crate::calendar::CalendarTime;

/// The hours of the day during which the humidity is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveWindow {
    start_hour: u8,
    end_hour: u8,
    interval_minutes: u16,
}

impl ActiveWindow {
    /// Sample every `interval_minutes` from `start_hour:00` up to (but not including)
    /// `end_hour:00`.
    ///
    /// Panics (at compile time when used in a constant) if the window is empty, ends after
    /// midnight or the interval is zero.
    pub const fn new(start_hour: u8, end_hour: u8, interval_minutes: u16) -> Self {
        assert!(start_hour < end_hour, "active window must not be empty");
        assert!(end_hour <= 24, "active window must end by midnight");
        assert!(interval_minutes > 0, "sample interval must be non-zero");

        Self {
            start_hour,
            end_hour,
            interval_minutes,
        }
    }

    pub const fn start_hour(&self) -> u8 {
        self.start_hour
    }

    /// First hour no longer part of the window
    pub const fn end_hour(&self) -> u8 {
        self.end_hour
    }

    pub const fn interval_minutes(&self) -> u16 {
        self.interval_minutes
    }

    /// Whether `time` falls inside the window
    pub const fn contains(&self, time: &CalendarTime) -> bool {
        self.start_hour <= time.hour() && time.hour() < self.end_hour
    }
}

/// Compute the next wake up time. The seconds of the result are always zero.
///
/// The result of stepping forward inside the window is not checked against the window again, so
/// the final wake of the day can land just past its end. That wake finds itself outside the
/// window and schedules the next day.
pub fn next_wake(now: CalendarTime, window: &ActiveWindow) -> CalendarTime {
    if window.contains(&now) {
        return now
            .truncate_to_minute()
            .add_minutes(window.interval_minutes);
    }

    if now.hour() < window.start_hour {
        return now.at_hour(window.start_hour);
    }

    now.next_day().at_hour(window.start_hour)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: ActiveWindow = ActiveWindow::new(7, 18, 2);

    fn at(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> CalendarTime {
        CalendarTime::new(year, month, day, hour, minute, second).unwrap()
    }

    #[test]
    fn window_bounds() {
        assert!(!WINDOW.contains(&at(2024, 6, 1, 6, 59, 59)));
        assert!(WINDOW.contains(&at(2024, 6, 1, 7, 0, 0)));
        assert!(WINDOW.contains(&at(2024, 6, 1, 17, 59, 59)));
        assert!(!WINDOW.contains(&at(2024, 6, 1, 18, 0, 0)));
    }

    #[test]
    #[should_panic]
    fn empty_window_is_rejected() {
        let _ = ActiveWindow::new(7, 7, 2);
    }

    #[test]
    fn inside_window_steps_by_interval() {
        assert_eq!(next_wake(at(2024, 6, 1, 7, 0, 0), &WINDOW), at(2024, 6, 1, 7, 2, 0));
        assert_eq!(next_wake(at(2024, 6, 1, 12, 58, 0), &WINDOW), at(2024, 6, 1, 13, 0, 0));
    }

    #[test]
    fn inside_window_drops_seconds() {
        assert_eq!(next_wake(at(2024, 6, 1, 9, 30, 47), &WINDOW), at(2024, 6, 1, 9, 32, 0));
    }

    #[test]
    fn last_step_may_leave_window() {
        // 17:59 is still inside, the result is not checked again
        assert_eq!(next_wake(at(2024, 6, 1, 17, 59, 0), &WINDOW), at(2024, 6, 1, 18, 1, 0));
    }

    #[test]
    fn before_window_wakes_at_start_same_day() {
        assert_eq!(next_wake(at(2024, 6, 1, 6, 0, 0), &WINDOW), at(2024, 6, 1, 7, 0, 0));
        assert_eq!(next_wake(at(2024, 6, 1, 0, 0, 0), &WINDOW), at(2024, 6, 1, 7, 0, 0));
        assert_eq!(next_wake(at(2024, 6, 1, 6, 59, 59), &WINDOW), at(2024, 6, 1, 7, 0, 0));
    }

    #[test]
    fn after_window_wakes_at_start_next_day() {
        assert_eq!(next_wake(at(2024, 6, 1, 18, 0, 0), &WINDOW), at(2024, 6, 2, 7, 0, 0));
        assert_eq!(next_wake(at(2024, 6, 1, 23, 30, 0), &WINDOW), at(2024, 6, 2, 7, 0, 0));
    }

    #[test]
    fn after_window_rolls_over_month_and_year() {
        assert_eq!(next_wake(at(2024, 12, 31, 23, 30, 0), &WINDOW), at(2025, 1, 1, 7, 0, 0));
        assert_eq!(next_wake(at(2023, 2, 28, 23, 30, 0), &WINDOW), at(2023, 3, 1, 7, 0, 0));
        assert_eq!(next_wake(at(2024, 2, 28, 23, 30, 0), &WINDOW), at(2024, 2, 29, 7, 0, 0));
        assert_eq!(next_wake(at(2024, 2, 29, 23, 30, 0), &WINDOW), at(2024, 3, 1, 7, 0, 0));
        assert_eq!(next_wake(at(2024, 4, 30, 19, 0, 0), &WINDOW), at(2024, 5, 1, 7, 0, 0));
    }

    #[test]
    fn inside_window_carries_across_midnight() {
        let late = ActiveWindow::new(20, 24, 45);
        assert_eq!(next_wake(at(2024, 12, 31, 23, 30, 0), &late), at(2025, 1, 1, 0, 15, 0));
    }

    #[test]
    fn never_wakes_inside_inactive_hours() {
        // Walking a whole day minute by minute, every wake is either inside the window, the first
        // minutes just past its end, or exactly at its start
        let mut now = at(2024, 2, 28, 0, 0, 0);

        for _ in 0..(24 * 60) {
            let next = next_wake(now, &WINDOW);
            assert!(next > now);
            assert_eq!(next.second(), 0);

            let at_start = next.hour() == WINDOW.start_hour() && next.minute() == 0;
            let overshoot = next.hour() == WINDOW.end_hour() && next.minute() < 2;
            assert!(WINDOW.contains(&next) || at_start || overshoot, "{now:?} -> {next:?}");

            now = now.add_minutes(1);
        }
    }
}
