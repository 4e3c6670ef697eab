use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate};

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to. Used to drive debounce and banner
/// expiry deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `DD/MM/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `HH:MM:SS DD/MM/YYYY`, the check-in stamp written next to a present student
pub fn format_check_in(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S %d/%m/%Y").to_string()
}
