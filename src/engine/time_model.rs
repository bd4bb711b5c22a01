/*
 *  engine/time_model.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Simulated time of day: dilation, freeze and wraparound
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

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::fmt;

use super::error::{EngineError, EngineResult};

const MINUTES_PER_DAY: i64 = 24 * 60;
const SECONDS_PER_DAY: f64 = (MINUTES_PER_DAY * 60) as f64;

/// Displayed hour and minute. Always well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SimulatedTime {
    hour: u8,
    minute: u8,
}

impl SimulatedTime {
    pub fn new(hour: i64, minute: i64) -> EngineResult<Self> {
        if !(0..24).contains(&hour) {
            return Err(EngineError::invalid(format!("hour {hour} outside 0..=23")));
        }
        if !(0..60).contains(&minute) {
            return Err(EngineError::invalid(format!("minute {minute} outside 0..=59")));
        }
        Ok(Self { hour: hour as u8, minute: minute as u8 })
    }

    pub fn from_wall(wall: NaiveTime) -> Self {
        Self::from_minute_of_day(wall.hour() as i64 * 60 + wall.minute() as i64)
    }

    fn from_minute_of_day(m: i64) -> Self {
        let m = m.rem_euclid(MINUTES_PER_DAY);
        Self { hour: (m / 60) as u8, minute: (m % 60) as u8 }
    }

    fn minute_of_day(&self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The four displayed digits, `HHMM`.
    pub fn digits(&self) -> [u8; 4] {
        [self.hour / 10, self.hour % 10, self.minute / 10, self.minute % 10]
    }
}

impl fmt::Display for SimulatedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Owns the displayed time and the rule for moving it.
///
/// Seconds are accumulated but never shown; anything that sets or shifts
/// the time drops them back to zero.
#[derive(Debug, Clone)]
pub struct TimeModel {
    time: SimulatedTime,
    seconds: f64,
    dilation: f64,
    frozen: bool,
}

impl TimeModel {
    pub fn new(start: SimulatedTime) -> Self {
        Self { time: start, seconds: 0.0, dilation: 1.0, frozen: false }
    }

    /// Move by `elapsed_real_secs * dilation` simulated seconds, unless frozen.
    pub fn advance(&mut self, elapsed_real_secs: f64) {
        if self.frozen || !elapsed_real_secs.is_finite() {
            return;
        }
        let delta = elapsed_real_secs * self.dilation;
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        // reduce first so huge deltas stay finite
        let total = (self.time.minute_of_day() as f64 * 60.0 + self.seconds
            + delta.rem_euclid(SECONDS_PER_DAY))
        .rem_euclid(SECONDS_PER_DAY);
        if !total.is_finite() {
            return;
        }
        let minute_of_day = (total / 60.0).floor() as i64;
        self.time = SimulatedTime::from_minute_of_day(minute_of_day);
        // rem_euclid can land on the upper bound for tiny negative inputs
        self.seconds = (total - minute_of_day as f64 * 60.0).clamp(0.0, 60.0 - f64::EPSILON);
    }

    pub fn set_time(&mut self, time: SimulatedTime) {
        self.time = time;
        self.seconds = 0.0;
    }

    pub fn increment_minutes(&mut self, delta: i64) {
        let delta = delta.rem_euclid(MINUTES_PER_DAY);
        self.time = SimulatedTime::from_minute_of_day(self.time.minute_of_day() + delta);
        self.seconds = 0.0;
    }

    pub fn set_dilation(&mut self, factor: f64) -> EngineResult<()> {
        if !factor.is_finite() {
            return Err(EngineError::invalid(format!("dilation factor {factor} is not finite")));
        }
        self.dilation = factor;
        self.seconds = 0.0;
        Ok(())
    }

    pub fn set_freeze(&mut self, frozen: bool) {
        self.frozen = frozen;
        self.seconds = 0.0;
    }

    /// Copy hour and minute from the wall clock.
    pub fn sync_to(&mut self, wall: NaiveTime) {
        self.time = SimulatedTime::from_wall(wall);
        self.seconds = 0.0;
    }

    pub fn time(&self) -> SimulatedTime {
        self.time
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn dilation(&self) -> f64 {
        self.dilation
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: i64, m: i64) -> TimeModel {
        TimeModel::new(SimulatedTime::new(h, m).unwrap())
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(SimulatedTime::new(24, 0).is_err());
        assert!(SimulatedTime::new(-1, 0).is_err());
        assert!(SimulatedTime::new(0, 60).is_err());
        assert!(SimulatedTime::new(23, 59).is_ok());
    }

    #[test]
    fn test_forward_wrap_at_midnight() {
        let mut t = at(23, 59);
        t.advance(60.0);
        assert_eq!(t.time().to_string(), "00:00");
        assert!(t.seconds().abs() < 1e-6);
    }

    #[test]
    fn test_backward_wrap_at_midnight() {
        let mut t = at(0, 0);
        t.set_dilation(-1.0).unwrap();
        t.advance(1.0);
        assert_eq!(t.time().to_string(), "23:59");
        assert!((t.seconds() - 59.0).abs() < 1e-6);
    }

    #[test]
    fn test_dilation_scales_elapsed_time() {
        let mut t = at(10, 0);
        t.set_dilation(60.0).unwrap();
        t.advance(90.0);
        assert_eq!(t.time().to_string(), "11:30");

        let mut t = at(10, 0);
        t.set_dilation(0.0).unwrap();
        t.advance(3600.0);
        assert_eq!(t.time().to_string(), "10:00");
    }

    #[test]
    fn test_many_small_steps_accumulate() {
        let mut t = at(12, 0);
        for _ in 0..1210 {
            t.advance(0.05);
        }
        assert_eq!(t.time().to_string(), "12:01");
    }

    #[test]
    fn test_freeze_is_hard_override() {
        let mut t = at(8, 30);
        t.set_dilation(100.0).unwrap();
        t.set_freeze(true);
        t.advance(1000.0);
        assert_eq!(t.time().to_string(), "08:30");
        t.set_freeze(false);
        t.advance(60.0);
        assert_eq!(t.time().to_string(), "09:30");
    }

    #[test]
    fn test_mutations_reset_seconds() {
        let mut t = at(1, 0);
        t.advance(30.0);
        assert!(t.seconds() > 29.0);
        t.increment_minutes(-61);
        assert_eq!(t.time().to_string(), "23:59");
        assert_eq!(t.seconds(), 0.0);

        t.advance(30.0);
        t.set_dilation(2.0).unwrap();
        assert_eq!(t.seconds(), 0.0);

        t.advance(10.0);
        t.set_time(SimulatedTime::new(5, 5).unwrap());
        assert_eq!(t.seconds(), 0.0);
    }

    #[test]
    fn test_non_finite_dilation_rejected() {
        let mut t = at(1, 0);
        t.advance(15.0);
        assert!(t.set_dilation(f64::NAN).is_err());
        assert_eq!(t.dilation(), 1.0);
        assert!(t.seconds() > 14.0);
    }

    #[test]
    fn test_extreme_increments_wrap() {
        let mut t = at(12, 0);
        t.increment_minutes(i64::MAX);
        // i64::MAX % 1440 == 1087
        assert_eq!(t.time().to_string(), "06:07");
        // i64::MIN rem_euclid 1440 == 352
        t.increment_minutes(i64::MIN);
        assert_eq!(t.time().to_string(), "11:59");
    }

    #[test]
    fn test_overflowing_dilation_leaves_time_alone() {
        let mut t = at(12, 0);
        t.set_dilation(1e308).unwrap();
        t.advance(2.0);
        assert_eq!(t.time().to_string(), "12:00");
        assert_eq!(t.seconds(), 0.0);

        t.set_dilation(1e300).unwrap();
        t.advance(1.0);
        assert!(t.seconds().is_finite());
        assert!((0.0..60.0).contains(&t.seconds()));
    }

    #[test]
    fn test_digits() {
        assert_eq!(SimulatedTime::new(9, 15).unwrap().digits(), [0, 9, 1, 5]);
    }
}
