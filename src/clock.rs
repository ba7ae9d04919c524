use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now" for everything that depends on calendar days or expiry.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Device-local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
    use super::Clock;
    use chrono::{DateTime, Duration, Local, TimeZone};
    use std::cell::Cell;

    /// Test clock pinned to a settable instant.
    pub struct FixedClock {
        now: Cell<DateTime<Local>>,
    }

    impl FixedClock {
        /// Noon local time on the given day, clear of DST transitions.
        pub fn at(year: i32, month: u32, day: u32) -> Self {
            let now = Local
                .with_ymd_and_hms(year, month, day, 12, 0, 0)
                .single()
                .expect("unambiguous local noon");
            Self { now: Cell::new(now) }
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }

        pub fn advance_days(&self, days: i64) {
            self.advance(Duration::days(days));
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.now.get()
        }
    }
}
