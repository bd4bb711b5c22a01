/*
 *  engine/resolver.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Color and brightness resolver
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

use super::color::{ColorElement, Rgb};
use super::fade::Fade;

/// Resolved colors for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub digits: Rgb,
    pub x: Rgb,
    pub background: Rgb,
}

pub struct Resolver {
    digits: Fade<Rgb>,
    x: Fade<Rgb>,
    background: Fade<Rgb>,
    brightness: Fade<f64>,
}

impl Resolver {
    pub fn new(palette: Palette, brightness: f64) -> Self {
        Self {
            digits: Fade::new(palette.digits),
            x: Fade::new(palette.x),
            background: Fade::new(palette.background),
            brightness: Fade::new(brightness.clamp(0.0, 100.0)),
        }
    }

    fn fade_for(&mut self, element: ColorElement) -> &mut Fade<Rgb> {
        match element {
            ColorElement::Digits => &mut self.digits,
            ColorElement::X => &mut self.x,
            ColorElement::Background => &mut self.background,
        }
    }

    pub fn set_color(&mut self, element: ColorElement, color: Rgb, fade: Duration, now: Instant) {
        self.fade_for(element).set_target(color, fade, now);
    }

    pub fn set_brightness(&mut self, target: f64, fade: Duration, now: Instant) {
        self.brightness.set_target(target.clamp(0.0, 100.0), fade, now);
    }

    pub fn snap_brightness(&mut self, value: f64) {
        self.brightness.snap(value.clamp(0.0, 100.0));
    }

    pub fn color(&self, element: ColorElement, now: Instant) -> Rgb {
        match element {
            ColorElement::Digits => self.digits.resolve(now),
            ColorElement::X => self.x.resolve(now),
            ColorElement::Background => self.background.resolve(now),
        }
    }

    pub fn palette(&self, now: Instant) -> Palette {
        Palette {
            digits: self.digits.resolve(now),
            x: self.x.resolve(now),
            background: self.background.resolve(now),
        }
    }

    pub fn brightness(&self, now: Instant) -> f64 {
        self.brightness.resolve(now)
    }

    pub fn brightness_target(&self) -> f64 {
        self.brightness.target()
    }

    pub fn is_brightness_fading(&self) -> bool {
        self.brightness.is_fading()
    }

    /// Settle finished fades. Returns true when the brightness fade ended on
    /// this call.
    pub fn step(&mut self, now: Instant) -> bool {
        self.digits.step(now);
        self.x.step(now);
        self.background.step(now);
        self.brightness.step(now)
    }
}
