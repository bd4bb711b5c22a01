/*
 *  display/traits.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Painter boundary between the engine and panel hardware
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

use crate::display::error::DisplayError;
use crate::engine::Frame;

/// Takes resolved frames and puts them on a panel.
///
/// Glyph rasterization and brightness scaling are the painter's job; it sees
/// nothing of the engine beyond the frame record.
pub trait FramePainter: Send {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Prepare the panel. Called once before the first frame.
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Paint one frame.
    fn paint(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Blank the panel, e.g. on shutdown.
    fn clear(&mut self) -> Result<(), DisplayError>;
}
