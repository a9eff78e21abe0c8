//! Calendar clock used to stamp attendance marks.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Source of the local calendar date and time of day.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Time of day truncated to whole seconds, the precision stored per mark.
    fn time_of_day(&self) -> NaiveTime {
        let time = self.now().time();
        time.with_nanosecond(0).unwrap_or(time)
    }
}

/// Local wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Returns `None` for an invalid calendar date or time.
    pub fn at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(|time| Self(date.and_time(time)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn fixed_clock_splits_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
        let clock = FixedClock::at(date, 9, 5, 0).unwrap();
        assert_eq!(clock.today(), date);
        assert_eq!(
            clock.time_of_day(),
            NaiveTime::from_hms_opt(9, 5, 0).unwrap()
        );
    }

    #[test]
    fn time_of_day_drops_subsecond_precision() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
        let precise = date.and_hms_milli_opt(9, 5, 7, 640).unwrap();
        let clock = FixedClock(precise);
        assert_eq!(
            clock.time_of_day(),
            NaiveTime::from_hms_opt(9, 5, 7).unwrap()
        );
    }

    #[test]
    fn rejects_invalid_time() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
        assert!(FixedClock::at(date, 25, 0, 0).is_none());
    }
}
