// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Local, TimeZone};
use dbsnap_core::Clock;

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    /// Local wall-clock time `y-m-d h:m:s`.
    ///
    /// # Panics
    /// If the time does not exist in the local timezone.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Self(
            Local
                .with_ymd_and_hms(year, month, day, hour, min, sec)
                .earliest()
                .expect("valid local time"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
