/*
 *  display/console.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Console painter: logs frames as text
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

use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::FramePainter;
use crate::engine::Frame;

/// Stands in for panel hardware: renders each frame as a one line summary
/// and logs it when it differs from the previous one.
#[derive(Debug, Default)]
pub struct ConsolePainter {
    last: Option<String>,
    painted: u64,
}

impl ConsolePainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames handed to this painter so far.
    pub fn painted(&self) -> u64 {
        self.painted
    }

    pub fn last_line(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl FramePainter for ConsolePainter {
    fn name(&self) -> &str {
        "console"
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!("console painter ready, frame changes are logged at debug level");
        Ok(())
    }

    fn paint(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.painted += 1;
        let line = frame.to_string();
        // dirty check, only log changes
        if self.last.as_deref() != Some(line.as_str()) {
            debug!("frame {}: {}", self.painted, line);
            self.last = Some(line);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.last = None;
        debug!("panel cleared");
        Ok(())
    }
}
