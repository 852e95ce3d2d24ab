use crate::domain::ports::Clock;
use chrono::{Days, Local, NaiveDate};
use std::sync::RwLock;

/// Reads the calendar date from the local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a date that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    date: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: RwLock::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        let mut current = self.date.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = date;
    }

    /// Moves the clock forward; saturates at the last representable date.
    pub fn advance_days(&self, days: u64) {
        let mut current = self.date.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = current.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
