/*
 *  engine/effects.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Overlay effects: X masks, glitches, blinking and fadesnap bookkeeping
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

use arrayvec::ArrayVec;
use log::{debug, error};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::color::Rgb;
use super::error::{EngineError, EngineResult};
use super::time_model::SimulatedTime;

pub const CELLS: usize = 4;

/// Glitch probabilities are expressed out of this many.
pub const FREQ_SCALE: u32 = 10_000;

pub type CellSet = ArrayVec<usize, CELLS>;

/// Which slot a transient glitch lives in. Installing into an occupied
/// slot replaces the occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchSlot {
    RandomX,
    SingleX,
    Rolling,
}

const SLOTS: usize = 3;

/// A time-bounded overlay counted in frames.
#[derive(Debug, Clone, PartialEq)]
pub enum TransientGlitch {
    /// Cells replaced by 'X'. `color: None` inherits the digit color.
    XOut { slot: GlitchSlot, cells: CellSet, remaining: u32, color: Option<Rgb> },
    /// Every digit shows a fresh random value each frame; the time jumps
    /// to `target` once the frames run out. `None` once an explicit time
    /// change has superseded it.
    Rolling { remaining: u32, target: Option<SimulatedTime> },
}

impl TransientGlitch {
    fn slot(&self) -> GlitchSlot {
        match self {
            TransientGlitch::XOut { slot, .. } => *slot,
            TransientGlitch::Rolling { .. } => GlitchSlot::Rolling,
        }
    }

    fn remaining_mut(&mut self) -> &mut u32 {
        match self {
            TransientGlitch::XOut { remaining, .. }
            | TransientGlitch::Rolling { remaining, .. } => remaining,
        }
    }
}

/// What a glitch contributes to one cell for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOverlay {
    Digit(u8),
    X(Option<Rgb>),
}

/// Parameters of the probabilistic X glitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomX {
    pub freq: u32,
    pub count: usize,
    pub length: u32,
    pub color: Option<Rgb>,
}

impl RandomX {
    pub fn new(freq: i64, count: i64, length: i64, color: Option<Rgb>) -> EngineResult<Self> {
        Ok(Self {
            freq: check_freq(freq)?,
            count: check_count(count)?,
            length: check_length(length)?,
            color,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkState {
    pub dots: bool,
    pub all: bool,
}

impl Default for BlinkState {
    fn default() -> Self {
        Self { dots: true, all: false }
    }
}

/// Deferred half of a fadesnap: applied when the fade to black completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSnap {
    pub target: SimulatedTime,
    pub restore_brightness: f64,
    pub clear_x: bool,
}

/// Result of aging the effects by one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameEffects {
    pub overlay: [Option<CellOverlay>; CELLS],
    /// A rolling glitch finished; the time lands here on the next frame.
    pub jump: Option<SimulatedTime>,
}

pub fn check_freq(freq: i64) -> EngineResult<u32> {
    if !(0..=FREQ_SCALE as i64).contains(&freq) {
        return Err(EngineError::invalid(format!("frequency {freq} outside 0..={FREQ_SCALE}")));
    }
    Ok(freq as u32)
}

pub fn check_count(count: i64) -> EngineResult<usize> {
    if !(1..=CELLS as i64).contains(&count) {
        return Err(EngineError::invalid(format!("count {count} outside 1..={CELLS}")));
    }
    Ok(count as usize)
}

pub fn check_length(frames: i64) -> EngineResult<u32> {
    if frames < 1 || frames > u32::MAX as i64 {
        return Err(EngineError::invalid(format!("length {frames} must be at least one frame")));
    }
    Ok(frames as u32)
}

/// Parse a four character mask; `X` forces the cell, anything else clears it.
pub fn parse_mask(mask: &str) -> EngineResult<[bool; CELLS]> {
    let chars: Vec<char> = mask.chars().collect();
    if chars.len() != CELLS {
        return Err(EngineError::invalid(format!(
            "mask {mask:?} must be exactly {CELLS} characters"
        )));
    }
    let mut out = [false; CELLS];
    for (slot, c) in out.iter_mut().zip(chars) {
        *slot = c == 'X';
    }
    Ok(out)
}

/// Every overlay effect and its lifecycle.
pub struct EffectRegistry {
    x_mask: [bool; CELLS],
    glitches: ArrayVec<TransientGlitch, SLOTS>,
    random_glitch_freq: u32,
    random_x: Option<RandomX>,
    blink: BlinkState,
    fadesnap: Option<FadeSnap>,
    rng: StdRng,
}

impl EffectRegistry {
    pub fn new(rng: StdRng) -> Self {
        Self {
            x_mask: [false; CELLS],
            glitches: ArrayVec::new(),
            random_glitch_freq: 0,
            random_x: None,
            blink: BlinkState::default(),
            fadesnap: None,
            rng,
        }
    }

    fn install(&mut self, glitch: TransientGlitch) {
        let slot = glitch.slot();
        self.glitches.retain(|g| g.slot() != slot);
        if let Err(e) = self.glitches.try_push(glitch) {
            error!("glitch slots exhausted, dropping {:?}", e.element());
        }
    }

    fn pick_cells(&mut self, count: usize) -> CellSet {
        let mut cells: CellSet = (0..CELLS).collect();
        cells.shuffle(&mut self.rng);
        cells.truncate(count);
        cells.sort_unstable();
        cells
    }

    fn roll(&mut self, freq: u32) -> bool {
        freq > 0 && self.rng.random_range(0..FREQ_SCALE) < freq
    }

    pub fn set_random_glitch(&mut self, freq: i64) -> EngineResult<()> {
        self.random_glitch_freq = check_freq(freq)?;
        Ok(())
    }

    /// `freq == 0` turns the random X glitch off.
    pub fn set_random_x(&mut self, params: RandomX) {
        if params.freq == 0 {
            self.random_x = None;
            self.glitches.retain(|g| g.slot() != GlitchSlot::RandomX);
        } else {
            self.random_x = Some(params);
        }
    }

    pub fn single_x(&mut self, count: i64, length: i64, color: Option<Rgb>) -> EngineResult<()> {
        let count = check_count(count)?;
        let length = check_length(length)?;
        let cells = self.pick_cells(count);
        debug!("single X glitch on cells {:?} for {} frames", cells, length);
        self.install(TransientGlitch::XOut {
            slot: GlitchSlot::SingleX,
            cells,
            remaining: length,
            color,
        });
        Ok(())
    }

    pub fn glitch_to(&mut self, target: SimulatedTime, frames: i64) -> EngineResult<()> {
        let frames = check_length(frames)?;
        self.install(TransientGlitch::Rolling { remaining: frames, target: Some(target) });
        Ok(())
    }

    /// Keep any rolling digits running but forget where they were headed.
    pub fn cancel_jump(&mut self) {
        for glitch in self.glitches.iter_mut() {
            if let TransientGlitch::Rolling { target, .. } = glitch {
                *target = None;
            }
        }
    }

    /// Replace the persistent mask outright. Random X glitching stops too.
    pub fn set_x_mask(&mut self, mask: [bool; CELLS]) {
        self.x_mask = mask;
        self.random_x = None;
        self.glitches.retain(|g| !matches!(g, TransientGlitch::XOut { .. }));
    }

    pub fn clear_x_mask(&mut self) {
        self.x_mask = [false; CELLS];
    }

    pub fn set_blink_dots(&mut self, enabled: bool) {
        self.blink.dots = enabled;
    }

    pub fn set_blink_all(&mut self, enabled: bool) {
        self.blink.all = enabled;
    }

    pub fn set_fadesnap(&mut self, snap: Option<FadeSnap>) {
        self.fadesnap = snap;
    }

    pub fn take_fadesnap(&mut self) -> Option<FadeSnap> {
        self.fadesnap.take()
    }

    /// Drop every glitch, mask and blink tweak. A rolling glitch that is cut
    /// short still hands back its target time.
    pub fn clear(&mut self) -> Option<SimulatedTime> {
        let jump = self.glitches.iter().find_map(|g| match g {
            TransientGlitch::Rolling { target, .. } => *target,
            _ => None,
        });
        self.glitches.clear();
        self.x_mask = [false; CELLS];
        self.random_glitch_freq = 0;
        self.random_x = None;
        self.blink = BlinkState::default();
        jump
    }

    /// Age every effect by one frame and work out this frame's overlay.
    ///
    /// A glitch is drawn on the frame its counter reaches zero and is gone
    /// before the next one.
    pub fn tick(&mut self) -> FrameEffects {
        let mut fx = FrameEffects::default();

        let mut glitches = std::mem::take(&mut self.glitches);
        for glitch in glitches.iter_mut() {
            match glitch {
                TransientGlitch::XOut { cells, color, .. } => {
                    for &c in cells.iter() {
                        fx.overlay[c] = Some(CellOverlay::X(*color));
                    }
                }
                TransientGlitch::Rolling { .. } => {
                    for cell in fx.overlay.iter_mut() {
                        *cell = Some(CellOverlay::Digit(self.rng.random_range(0..10)));
                    }
                }
            }
            let remaining = glitch.remaining_mut();
            *remaining = remaining.saturating_sub(1);
        }
        for glitch in glitches.iter() {
            if let TransientGlitch::Rolling { remaining: 0, target: Some(target) } = glitch {
                fx.jump = Some(*target);
            }
        }
        glitches.retain(|g| match g {
            TransientGlitch::XOut { remaining, .. }
            | TransientGlitch::Rolling { remaining, .. } => *remaining > 0,
        });
        self.glitches = glitches;

        if let Some(rx) = self.random_x {
            let active = self.glitches.iter().any(|g| g.slot() == GlitchSlot::RandomX);
            if !active && self.roll(rx.freq) {
                let cells = self.pick_cells(rx.count);
                for &c in cells.iter() {
                    fx.overlay[c] = Some(CellOverlay::X(rx.color));
                }
                if rx.length > 1 {
                    self.install(TransientGlitch::XOut {
                        slot: GlitchSlot::RandomX,
                        cells,
                        remaining: rx.length - 1,
                        color: rx.color,
                    });
                }
            }
        }

        let freq = self.random_glitch_freq;
        for i in 0..CELLS {
            if fx.overlay[i].is_none() && self.roll(freq) {
                fx.overlay[i] = Some(CellOverlay::Digit(self.rng.random_range(0..10)));
            }
        }

        fx
    }

    pub fn x_mask(&self) -> [bool; CELLS] {
        self.x_mask
    }

    pub fn glitches(&self) -> &[TransientGlitch] {
        &self.glitches
    }

    pub fn random_glitch_freq(&self) -> u32 {
        self.random_glitch_freq
    }

    pub fn random_x(&self) -> Option<RandomX> {
        self.random_x
    }

    pub fn blink(&self) -> BlinkState {
        self.blink
    }

    pub fn fadesnap(&self) -> Option<FadeSnap> {
        self.fadesnap
    }
}
