/*
 *  engine/clock.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Injected time sources (monotonic ticks and wall clock)
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use chrono::{Local, NaiveTime, Timelike};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Where the engine reads "now" from.
///
/// The monotonic instant drives fades, tick deltas and blink phase; the
/// local time is only consulted by `timenow`.
pub trait TimeSource: Send {
    fn instant(&self) -> Instant;
    fn local_time(&self) -> NaiveTime;
}

/// Real clocks: `Instant::now()` and the local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn instant(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> NaiveTime {
        let now = Local::now();
        NaiveTime::from_hms_opt(now.hour(), now.minute(), now.second()).unwrap_or(NaiveTime::MIN)
    }
}

#[derive(Debug)]
struct ManualState {
    instant: Instant,
    local: NaiveTime,
}

/// Hand-cranked clock for tests and replays. Clones share the same state.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new(local: NaiveTime) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState { instant: Instant::now(), local })),
        }
    }

    /// Move both the monotonic and the wall clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.instant += by;
            let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
            let (local, _) = s.local.overflowing_add_signed(by);
            s.local = local;
        }
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    pub fn set_local_time(&self, local: NaiveTime) {
        if let Ok(mut s) = self.state.lock() {
            s.local = local;
        }
    }
}

impl TimeSource for ManualClock {
    fn instant(&self) -> Instant {
        self.state.lock().map(|s| s.instant).unwrap_or_else(|p| p.into_inner().instant)
    }

    fn local_time(&self) -> NaiveTime {
        self.state.lock().map(|s| s.local).unwrap_or_else(|p| p.into_inner().local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_clocks() {
        let clock = ManualClock::new(NaiveTime::from_hms_opt(23, 59, 30).unwrap());
        let start = clock.instant();
        clock.advance_secs(45.0);
        assert_eq!(clock.instant() - start, Duration::from_secs(45));
        assert_eq!(clock.local_time(), NaiveTime::from_hms_opt(0, 0, 15).unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let a = ManualClock::new(NaiveTime::MIN);
        let b = a.clone();
        a.advance_secs(1.5);
        assert_eq!(a.instant(), b.instant());
    }
}
