/*
 *  engine/color.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	RGB colors, named color table and color parsing
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

use serde::{Serialize, Serializer};
use std::fmt;

use super::error::{EngineError, EngineResult};

/// 24-bit color as painted on the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HTML 4 color keywords plus `orange` (CSS 2.1).
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("aqua", Rgb::new(0x00, 0xff, 0xff)),
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("blue", Rgb::new(0x00, 0x00, 0xff)),
    ("fuchsia", Rgb::new(0xff, 0x00, 0xff)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("lime", Rgb::new(0x00, 0xff, 0x00)),
    ("maroon", Rgb::new(0x80, 0x00, 0x00)),
    ("navy", Rgb::new(0x00, 0x00, 0x80)),
    ("olive", Rgb::new(0x80, 0x80, 0x00)),
    ("orange", Rgb::new(0xff, 0xa5, 0x00)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
    ("red", Rgb::new(0xff, 0x00, 0x00)),
    ("silver", Rgb::new(0xc0, 0xc0, 0xc0)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("white", Rgb::new(0xff, 0xff, 0xff)),
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
];

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color name (case-insensitive) or six hex digits, with or
    /// without a leading `#`.
    pub fn parse(value: &str) -> EngineResult<Rgb> {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
            return Ok(*rgb);
        }

        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EngineError::UnknownColor(value.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| EngineError::UnknownColor(value.to_string()))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase hex without `#`, the form the status document reports.
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation, `t` clamped to 0..=1.
    pub fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Independently colored parts of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorElement {
    /// Digits and the colon
    Digits,
    /// 'X' glyphs from masks and glitches
    X,
    Background,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_with_and_without_hash() {
        assert_eq!(Rgb::parse("29B6F6").unwrap(), Rgb::new(0x29, 0xb6, 0xf6));
        assert_eq!(Rgb::parse("#c70000").unwrap(), Rgb::new(0xc7, 0, 0));
    }

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!(Rgb::parse("Red").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::parse("navy").unwrap(), Rgb::new(0, 0, 0x80));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for bad in ["", "#fff", "12345", "1234567", "zzzzzz", "notacolor"] {
            assert!(
                matches!(Rgb::parse(bad), Err(EngineError::UnknownColor(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(100, 100, 0);
        assert_eq!(Rgb::lerp(a, b, 0.0), a);
        assert_eq!(Rgb::lerp(a, b, 1.0), b);
        assert_eq!(Rgb::lerp(a, b, 0.5), Rgb::new(50, 100, 100));
        assert_eq!(Rgb::lerp(a, b, 7.0), b);
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Rgb::new(0x29, 0xb6, 0xf6).to_hex(), "29b6f6");
        assert_eq!(Rgb::BLACK.to_string(), "#000000");
    }
}
