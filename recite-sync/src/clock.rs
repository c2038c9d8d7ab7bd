//! Wall-clock abstraction used to name run destinations.
//!
//! Provides a trait for getting local time, with real and fixed
//! implementations so destination names are deterministic in tests.

use chrono::{Local, NaiveDateTime};

/// Destination name format: `YYYYMMDD-HHMM`.
pub const DESTINATION_FORMAT: &str = "%Y%m%d-%H%M";

/// Source of the current local wall-clock time.
pub trait Clock {
    fn now_local(&self) -> NaiveDateTime;
}

/// Real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: NaiveDateTime,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now_local(&self) -> NaiveDateTime {
        self.at
    }
}

/// Minute-granularity destination name for `at`.
pub fn destination_name(at: NaiveDateTime) -> String {
    at.format(DESTINATION_FORMAT).to_string()
}
