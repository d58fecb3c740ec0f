use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone};

/// 1-based day of the year: January 1 is 1, December 31 is 365 or 366.
///
/// Works on calendar dates only, so daylight-saving transitions cannot shift
/// the result the way millisecond differences would.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Day of the year for a timestamp, truncated to its own local midnight.
pub fn day_of_year_at<Tz: TimeZone>(instant: &DateTime<Tz>) -> u32 {
    day_of_year(instant.date_naive())
}

/// Source of "today" for the resolvers.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a date; can be moved forward to simulate midnight.
#[derive(Debug)]
pub struct FixedClock {
    days_from_ce: AtomicI32,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            days_from_ce: AtomicI32::new(date.num_days_from_ce()),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.days_from_ce
            .store(date.num_days_from_ce(), Ordering::Relaxed);
    }

    pub fn advance(&self, days: u64) {
        if let Some(next) = self.today().checked_add_days(Days::new(days)) {
            self.set(next);
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        let days = self.days_from_ce.load(Ordering::Relaxed);
        NaiveDate::from_num_days_from_ce_opt(days).unwrap_or_default()
    }
}
