/*
 *  engine/frame.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Resolved per-frame display instruction
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

use serde::Serialize;
use std::fmt;

use super::color::Rgb;
use super::effects::CELLS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    Digit(u8),
    X,
    Blank,
}

impl Glyph {
    pub fn as_char(&self) -> char {
        match self {
            Glyph::Digit(d) => char::from_digit(*d as u32, 10).unwrap_or('?'),
            Glyph::X => 'X',
            Glyph::Blank => ' ',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameContent {
    /// Four digit cells and the colon between cells 1 and 2.
    Clock { cells: [Cell; CELLS], colon: bool, colon_color: Rgb },
    /// Scrolling payload; `offset` pixels scrolled in from the right edge.
    Text { text: String, offset: u32, color: Rgb },
    /// Nothing lit; the painter should clear the panel.
    Dark,
}

/// Everything the painter gets for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub content: FrameContent,
    pub background: Rgb,
    /// 0 to 100
    pub brightness: f64,
}

impl Frame {
    pub fn glyphs(&self) -> Option<[Glyph; CELLS]> {
        match &self.content {
            FrameContent::Clock { cells, .. } => Some(cells.map(|c| c.glyph)),
            _ => None,
        }
    }

    pub fn colon(&self) -> bool {
        matches!(self.content, FrameContent::Clock { colon: true, .. })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            FrameContent::Clock { cells, colon, .. } => {
                let c = |i: usize| cells[i].glyph.as_char();
                let sep = if *colon { ':' } else { ' ' };
                write!(f, "{}{}{}{}{} @{:.0}%", c(0), c(1), sep, c(2), c(3), self.brightness)
            }
            FrameContent::Text { text, offset, .. } => {
                write!(f, "[{}] +{}px @{:.0}%", text, offset, self.brightness)
            }
            FrameContent::Dark => write!(f, "(dark)"),
        }
    }
}
