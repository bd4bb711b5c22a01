/*
 *  engine/fade.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Linear fades for colors and brightness
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

use std::time::{Duration, Instant};

use super::color::Rgb;

/// Values that can be linearly interpolated.
pub trait Blend: Copy + PartialEq {
    fn blend(from: Self, to: Self, t: f64) -> Self;
}

impl Blend for Rgb {
    fn blend(from: Self, to: Self, t: f64) -> Self {
        Rgb::lerp(from, to, t)
    }
}

impl Blend for f64 {
    fn blend(from: Self, to: Self, t: f64) -> Self {
        from + (to - from) * t.clamp(0.0, 1.0)
    }
}

/// A value with an optional fade in flight.
///
/// While fading, `current` holds the value at the moment the fade began.
#[derive(Debug, Clone)]
pub struct Fade<T> {
    current: T,
    target: T,
    started: Option<Instant>,
    duration: Duration,
}

impl<T: Blend> Fade<T> {
    pub fn new(value: T) -> Self {
        Self { current: value, target: value, started: None, duration: Duration::ZERO }
    }

    /// Retarget. A fade already running is abandoned and the new one starts
    /// from the value it had reached at `now`.
    pub fn set_target(&mut self, target: T, fade: Duration, now: Instant) {
        self.current = self.resolve(now);
        self.target = target;
        if !fade.is_zero() {
            self.started = Some(now);
            self.duration = fade;
        } else {
            self.snap(target);
        }
    }

    /// Jump straight to `value`, dropping any fade.
    pub fn snap(&mut self, value: T) {
        self.current = value;
        self.target = value;
        self.started = None;
        self.duration = Duration::ZERO;
    }

    /// Fraction of the fade window elapsed at `now`, if fading.
    pub fn progress(&self, now: Instant) -> Option<f64> {
        let started = self.started?;
        if self.duration.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(started);
        Some((elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0))
    }

    pub fn resolve(&self, now: Instant) -> T {
        match self.progress(now) {
            Some(t) => T::blend(self.current, self.target, t),
            None => self.current,
        }
    }

    /// Settle a finished fade. Returns true on the call that completes it.
    pub fn step(&mut self, now: Instant) -> bool {
        match self.progress(now) {
            Some(t) if t >= 1.0 => {
                let target = self.target;
                self.snap(target);
                true
            }
            _ => false,
        }
    }

    pub fn is_fading(&self) -> bool {
        self.started.is_some()
    }

    pub fn target(&self) -> T {
        self.target
    }
}
