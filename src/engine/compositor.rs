/*
 *  engine/compositor.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Frame compositor: merges time, overlays, blink and colors
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

use std::time::Duration;

use super::effects::{BlinkState, CellOverlay, FrameEffects, CELLS};
use super::frame::{Cell, Frame, FrameContent, Glyph};
use super::mode::DisplayOverride;
use super::resolver::Palette;
use super::time_model::SimulatedTime;

/// Engine state as seen by the compositor for one tick.
pub struct Scene<'a> {
    pub display: &'a DisplayOverride,
    pub scroll_offset: u32,
    pub time: SimulatedTime,
    pub effects: &'a FrameEffects,
    pub x_mask: [bool; CELLS],
    pub blink: BlinkState,
    /// Real time since the engine started; only the sub-second part matters.
    pub since_start: Duration,
    pub palette: Palette,
    pub brightness: f64,
    /// Brightness is at zero and staying there.
    pub dark: bool,
}

/// Glyphs are lit during the first half of every real second.
pub fn blink_on(since_start: Duration) -> bool {
    since_start.subsec_millis() < 500
}

/// Build the frame for `scene`. Pure: reads only what it is given.
pub fn compose(scene: &Scene<'_>) -> Frame {
    let background = scene.palette.background;
    let brightness = scene.brightness;

    if scene.dark {
        return Frame { content: FrameContent::Dark, background, brightness };
    }

    if let Some(text) = scene.display.payload() {
        return Frame {
            content: FrameContent::Text {
                text: text.to_string(),
                offset: scene.scroll_offset,
                color: scene.palette.digits,
            },
            background,
            brightness,
        };
    }

    let digits = scene.time.digits();
    let mut cells = [Cell { glyph: Glyph::Blank, color: scene.palette.digits }; CELLS];
    for (i, cell) in cells.iter_mut().enumerate() {
        *cell = match scene.effects.overlay[i] {
            Some(CellOverlay::X(color)) => {
                Cell { glyph: Glyph::X, color: color.unwrap_or(scene.palette.digits) }
            }
            Some(CellOverlay::Digit(d)) => {
                Cell { glyph: Glyph::Digit(d), color: scene.palette.digits }
            }
            None if scene.x_mask[i] => Cell { glyph: Glyph::X, color: scene.palette.x },
            None => Cell { glyph: Glyph::Digit(digits[i]), color: scene.palette.digits },
        };
    }

    let lit = blink_on(scene.since_start);
    let mut colon = true;
    if scene.blink.all && !lit {
        for cell in cells.iter_mut() {
            cell.glyph = Glyph::Blank;
        }
        colon = false;
    }
    if scene.blink.dots && !lit {
        colon = false;
    }

    Frame {
        content: FrameContent::Clock { cells, colon, colon_color: scene.palette.digits },
        background,
        brightness,
    }
}
