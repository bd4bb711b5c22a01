/*
 *  engine/status.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Serializable snapshot of engine state
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

use super::color::Rgb;
use super::mode::OverrideKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub time: TimeStatus,
    pub appearance: AppearanceStatus,
    pub effects: EffectsStatus,
    pub glitches: GlitchStatus,
    /// Cells forced to 'X' by the persistent mask
    pub x_positions: Vec<usize>,
    pub display: OverrideKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStatus {
    pub hour: u8,
    pub minute: u8,
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppearanceStatus {
    pub brightness: u8,
    pub text_color: Rgb,
    pub x_color: Rgb,
    pub background: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectsStatus {
    pub time_dilation: f64,
    pub blink_dots: bool,
    pub blink_all: bool,
    pub framerate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlitchStatus {
    pub random_glitch_freq: u32,
    pub x_glitch_freq: u32,
    pub x_glitch_count: usize,
    pub x_glitch_length: u32,
}
