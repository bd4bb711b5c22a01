/*
 *  engine/mode.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Display override: clock, IP address or scrolling text
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

/// Top level render mode. Exactly one is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayOverride {
    #[default]
    Normal,
    ShowIp(String),
    ScrollText(String),
}

impl DisplayOverride {
    /// Text to scroll, if the override replaces the clock.
    pub fn payload(&self) -> Option<&str> {
        match self {
            DisplayOverride::Normal => None,
            DisplayOverride::ShowIp(addr) => Some(addr),
            DisplayOverride::ScrollText(text) => Some(text),
        }
    }

    pub fn kind(&self) -> OverrideKind {
        match self {
            DisplayOverride::Normal => OverrideKind::Clock,
            DisplayOverride::ShowIp(_) => OverrideKind::ShowIp,
            DisplayOverride::ScrollText(_) => OverrideKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Clock,
    ShowIp,
    Text,
}

/// Panel geometry needed to know when scrolled text has left the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollGeometry {
    pub panel_width: u32,
    pub glyph_width: u32,
}

impl Default for ScrollGeometry {
    fn default() -> Self {
        Self { panel_width: 64, glyph_width: 6 }
    }
}

/// Pixel offset of the scrolling payload. Text enters from the right edge.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    text: String,
    offset: u32,
}

impl ScrollState {
    /// Only a different text restarts the scroll.
    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.offset = 0;
        }
    }

    /// One pixel per frame, wrapping once the text is fully off the left edge.
    pub fn update(&mut self, geometry: ScrollGeometry) {
        if self.text.is_empty() {
            return;
        }
        let text_width = self.text.chars().count() as u32 * geometry.glyph_width;
        self.offset += 1;
        if self.offset > text_width + geometry.panel_width {
            self.offset = 0;
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_wraps_after_text_leaves_panel() {
        let geometry = ScrollGeometry { panel_width: 10, glyph_width: 2 };
        let mut s = ScrollState::default();
        s.set_text("abc");
        for _ in 0..16 {
            s.update(geometry);
        }
        assert_eq!(s.offset(), 16);
        s.update(geometry);
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_same_text_keeps_offset() {
        let mut s = ScrollState::default();
        s.set_text("hello");
        s.update(ScrollGeometry::default());
        s.set_text("hello");
        assert_eq!(s.offset(), 1);
        s.set_text("bye");
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_payload() {
        assert_eq!(DisplayOverride::Normal.payload(), None);
        assert_eq!(DisplayOverride::ShowIp("10.0.0.2".into()).payload(), Some("10.0.0.2"));
        assert_eq!(DisplayOverride::ScrollText("hi".into()).kind(), OverrideKind::Text);
    }
}
