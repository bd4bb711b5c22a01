/*
 *  pacer.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Frame pacing for the tick loop
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

/// Schedules ticks `frame` apart. A late tick pushes the schedule back
/// instead of bursting to catch up.
pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

impl Pacer {
    pub fn new(frame: Duration, now: Instant) -> Self {
        Self { next_deadline: now, frame: frame.max(Duration::from_millis(1)) }
    }

    /// New interval; applies from the next scheduled tick.
    #[inline]
    pub fn set_frame(&mut self, frame: Duration) {
        self.frame = frame.max(Duration::from_millis(1));
    }

    #[inline]
    pub fn frame(&self) -> Duration {
        self.frame
    }

    #[inline]
    pub fn deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Returns true if a tick is due; if so, also schedules the next deadline.
    #[inline]
    pub fn should_tick(&mut self, now: Instant) -> bool {
        if now >= self.next_deadline {
            self.next_deadline = now + self.frame;
            true
        } else {
            false
        }
    }
}
