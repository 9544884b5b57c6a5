//! # Calendar time
//!
//! A Gregorian date and 24 hour time of day, as kept by the RTC.
//!
//! [`CalendarTime`] can only be built through [`CalendarTime::new`], which rejects impossible
//! dates, and every operation on it carries overflow upwards (seconds into minutes, minutes into
//! hours and so on) so that an invalid value can never be produced.

/// Length of each month in a common year
const MONTH_DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap year rule
pub const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`. Returns 0 for an invalid month.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => MONTH_DAYS[month as usize - 1],
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    // Field order matters, the derived ordering is chronological
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CalendarTime {
    /// Build a calendar time, returning `None` if any field is out of range
    pub const fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Option<Self> {
        if month < 1 || month > 12 {
            return None;
        }

        if day < 1 || day > days_in_month(year, month) {
            return None;
        }

        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }

        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }

    /// The same instant with the seconds dropped
    pub const fn truncate_to_minute(self) -> Self {
        Self { second: 0, ..self }
    }

    /// The start of `hour` on the same day.
    ///
    /// `hour` must be in the range 0-23, larger values wrap.
    pub const fn at_hour(self, hour: u8) -> Self {
        debug_assert!(hour < 24);

        Self {
            hour: hour % 24,
            minute: 0,
            second: 0,
            ..self
        }
    }

    /// The same time of day on the following day, rolling over the month and year as needed
    pub const fn next_day(self) -> Self {
        let mut next = self;

        if next.day < days_in_month(next.year, next.month) {
            next.day += 1;
            return next;
        }

        next.day = 1;

        if next.month < 12 {
            next.month += 1;
        } else {
            next.month = 1;
            next.year = next.year.wrapping_add(1);
        }

        next
    }

    /// Add a number of minutes, carrying into the hour, day, month and year
    pub fn add_minutes(self, minutes: u16) -> Self {
        let total = self.minute as u32 + minutes as u32;
        let mut hours = self.hour as u32 + total / 60;

        let mut next = Self {
            minute: (total % 60) as u8,
            ..self
        };

        while hours >= 24 {
            hours -= 24;
            next = next.next_day();
        }

        next.hour = hours as u8;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> CalendarTime {
        CalendarTime::new(year, month, day, hour, minute, 0).unwrap()
    }

    fn is_valid(t: &CalendarTime) -> bool {
        CalendarTime::new(t.year(), t.month(), t.day(), t.hour(), t.minute(), t.second()).is_some()
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));

        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(2100));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 0), 0);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn rejects_invalid_fields() {
        assert!(CalendarTime::new(2023, 2, 29, 0, 0, 0).is_none());
        assert!(CalendarTime::new(2024, 4, 31, 0, 0, 0).is_none());
        assert!(CalendarTime::new(2024, 0, 1, 0, 0, 0).is_none());
        assert!(CalendarTime::new(2024, 13, 1, 0, 0, 0).is_none());
        assert!(CalendarTime::new(2024, 1, 0, 0, 0, 0).is_none());
        assert!(CalendarTime::new(2024, 1, 1, 24, 0, 0).is_none());
        assert!(CalendarTime::new(2024, 1, 1, 0, 60, 0).is_none());
        assert!(CalendarTime::new(2024, 1, 1, 0, 0, 60).is_none());

        assert!(CalendarTime::new(2024, 2, 29, 23, 59, 59).is_some());
    }

    #[test]
    fn next_day_rolls_over_month_and_year() {
        assert_eq!(at(2024, 1, 31, 7, 0).next_day(), at(2024, 2, 1, 7, 0));
        assert_eq!(at(2023, 2, 28, 7, 0).next_day(), at(2023, 3, 1, 7, 0));
        assert_eq!(at(2024, 2, 28, 7, 0).next_day(), at(2024, 2, 29, 7, 0));
        assert_eq!(at(2024, 2, 29, 7, 0).next_day(), at(2024, 3, 1, 7, 0));
        assert_eq!(at(2024, 12, 31, 7, 0).next_day(), at(2025, 1, 1, 7, 0));
    }

    #[test]
    fn add_minutes_carries() {
        assert_eq!(at(2024, 6, 1, 7, 0).add_minutes(2), at(2024, 6, 1, 7, 2));
        assert_eq!(at(2024, 6, 1, 7, 59).add_minutes(2), at(2024, 6, 1, 8, 1));
        assert_eq!(at(2024, 6, 1, 23, 59).add_minutes(1), at(2024, 6, 2, 0, 0));
        assert_eq!(at(2024, 12, 31, 23, 58).add_minutes(5), at(2025, 1, 1, 0, 3));
        assert_eq!(at(2024, 2, 28, 23, 30).add_minutes(60), at(2024, 2, 29, 0, 30));

        // Several days worth of minutes
        assert_eq!(at(2024, 6, 1, 12, 0).add_minutes(3 * 24 * 60), at(2024, 6, 4, 12, 0));
    }

    #[test]
    fn add_minutes_keeps_seconds() {
        let t = CalendarTime::new(2024, 6, 1, 7, 0, 42).unwrap();
        assert_eq!(t.add_minutes(1).second(), 42);
        assert_eq!(t.truncate_to_minute().second(), 0);
    }

    #[test]
    fn add_minutes_matches_repeated_single_minutes() {
        let starts = [
            at(2023, 2, 28, 22, 17),
            at(2024, 2, 28, 23, 45),
            at(2024, 12, 31, 20, 1),
            at(2100, 2, 28, 23, 59),
        ];

        for start in starts {
            let mut stepped = start;

            for minutes in 0..=600u16 {
                let jumped = start.add_minutes(minutes);

                assert!(is_valid(&jumped));
                assert_eq!(jumped, stepped, "{start:?} + {minutes} minutes");

                stepped = stepped.add_minutes(1);
            }
        }
    }

    #[test]
    fn add_minutes_is_monotonic() {
        let start = at(2024, 2, 27, 0, 0);
        let mut previous = start;

        for minutes in (1..=u16::MAX).step_by(97) {
            let next = start.add_minutes(minutes);
            assert!(next > previous);
            assert!(is_valid(&next));
            previous = next;
        }
    }

    #[test]
    fn at_hour_clears_minutes_and_seconds() {
        let t = CalendarTime::new(2024, 6, 1, 5, 12, 34).unwrap();
        assert_eq!(t.at_hour(7), at(2024, 6, 1, 7, 0));
    }
}
