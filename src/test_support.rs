//! Deterministic clock shared by unit tests.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

/// Clock that advances by a fixed step after every reading.
#[derive(Debug)]
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SteppingClock {
    /// Starts at 2024-01-01T00:00:00Z and advances one millisecond per read.
    #[must_use]
    pub fn new() -> Self {
        Self::with_step(TimeDelta::milliseconds(1))
    }

    /// Starts at 2024-01-01T00:00:00Z and advances by `step` per read.
    #[must_use]
    pub fn with_step(step: TimeDelta) -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            now: Mutex::new(start),
            step,
        }
    }

    /// Moves the clock forward without reading it.
    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += delta;
        }
    }

    /// Returns the current instant without advancing.
    #[must_use]
    pub fn peek(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(mut now) => {
                let current = *now;
                *now += self.step;
                current
            }
            Err(_) => Utc::now(),
        }
    }
}
