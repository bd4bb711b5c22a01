/*
 *  engine/mod.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Time & effects engine: simulated time, overlays and frame output
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

pub mod clock;
pub mod color;
pub mod command;
pub mod compositor;
pub mod effects;
pub mod error;
pub mod fade;
pub mod frame;
pub mod host;
pub mod mode;
pub mod resolver;
pub mod status;
pub mod time_model;

use log::{debug, warn};
use rand::rngs::StdRng;
use serde_json::Value;
use std::time::{Duration, Instant};

pub use clock::{ManualClock, SystemTimeSource, TimeSource};
pub use color::{ColorElement, Rgb};
pub use command::Command;
pub use effects::{BlinkState, EffectRegistry, FadeSnap, RandomX, TransientGlitch, CELLS};
pub use error::{EngineError, EngineResult};
pub use frame::{Cell, Frame, FrameContent, Glyph};
pub use host::{AddressSource, FixedAddress};
pub use mode::{DisplayOverride, OverrideKind, ScrollGeometry};
pub use resolver::Palette;
pub use status::Status;
pub use time_model::{SimulatedTime, TimeModel};

use compositor::{compose, Scene};
use mode::ScrollState;
use resolver::Resolver;
use status::{AppearanceStatus, EffectsStatus, GlitchStatus, TimeStatus};

/// Slowest accepted tick interval, in seconds.
pub const MAX_FRAME_INTERVAL: f64 = 1.0;
pub const DEFAULT_FRAMERATE: f64 = 0.05;

/// Startup state of the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Seconds per tick
    pub framerate: f64,
    pub palette: Palette,
    /// 0 to 100
    pub brightness: u8,
    /// Fade in from black over this many seconds; 0 starts fully lit.
    pub startup_fade_secs: f64,
    pub scroll: ScrollGeometry,
    /// `None` starts from the wall clock.
    pub start_time: Option<SimulatedTime>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            framerate: DEFAULT_FRAMERATE,
            palette: Palette {
                digits: Rgb::new(0x29, 0xb6, 0xf6),
                x: Rgb::new(0xc7, 0x00, 0x00),
                background: Rgb::BLACK,
            },
            brightness: 100,
            startup_fade_secs: 0.0,
            scroll: ScrollGeometry::default(),
            start_time: None,
        }
    }
}

/// What a successfully applied command hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Done,
    Status(Status),
}

/// Fade or transition length in seconds. Negative, non-finite and
/// unrepresentably long values are rejected.
pub fn fade_duration(secs: f64, what: &str) -> EngineResult<Duration> {
    if secs < 0.0 {
        return Err(EngineError::invalid(format!("{what} {secs} must not be negative")));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| {
            EngineError::invalid(format!("{what} {secs} is not a usable number of seconds"))
        })
}

fn parse_color(value: Option<String>) -> EngineResult<Option<Rgb>> {
    value.filter(|s| !s.trim().is_empty()).map(|s| Rgb::parse(&s)).transpose()
}

/// The whole clock state. One owner, one writer: commands and ticks must
/// never interleave.
pub struct Engine {
    clock: Box<dyn TimeSource>,
    address: Box<dyn AddressSource>,
    time: TimeModel,
    effects: EffectRegistry,
    resolver: Resolver,
    display: DisplayOverride,
    scroll: ScrollState,
    geometry: ScrollGeometry,
    framerate: f64,
    epoch: Instant,
    last_tick: Instant,
    frames: u64,
    /// Where a finished glitch_to lands on the next tick.
    landing: Option<SimulatedTime>,
}

impl Engine {
    pub fn new(
        settings: EngineSettings,
        clock: Box<dyn TimeSource>,
        address: Box<dyn AddressSource>,
        rng: StdRng,
    ) -> Self {
        let now = clock.instant();
        let start = settings
            .start_time
            .unwrap_or_else(|| SimulatedTime::from_wall(clock.local_time()));

        let brightness = settings.brightness.min(100) as f64;
        let startup_fade = fade_duration(settings.startup_fade_secs, "startup fade")
            .unwrap_or_else(|e| {
                warn!("{}, starting fully lit", e);
                Duration::ZERO
            });
        let mut resolver;
        if !startup_fade.is_zero() {
            resolver = Resolver::new(settings.palette, 0.0);
            resolver.set_brightness(brightness, startup_fade, now);
        } else {
            resolver = Resolver::new(settings.palette, brightness);
        }

        let framerate = if settings.framerate > 0.0 && settings.framerate <= MAX_FRAME_INTERVAL {
            settings.framerate
        } else {
            DEFAULT_FRAMERATE
        };

        Self {
            clock,
            address,
            time: TimeModel::new(start),
            effects: EffectRegistry::new(rng),
            resolver,
            display: DisplayOverride::Normal,
            scroll: ScrollState::default(),
            geometry: settings.scroll,
            framerate,
            epoch: now,
            last_tick: now,
            frames: 0,
            landing: None,
        }
    }

    /// Decode and apply a named command with positional arguments.
    pub fn dispatch(&mut self, name: &str, args: &[Value]) -> EngineResult<Reply> {
        let command = Command::parse(name, args)?;
        self.apply(command)
    }

    /// Apply one command. Arguments are checked before anything changes, so
    /// an error leaves the engine exactly as it was.
    pub fn apply(&mut self, command: Command) -> EngineResult<Reply> {
        let now = self.clock.instant();
        match command {
            Command::Time { hour, minute } => {
                let t = SimulatedTime::new(hour, minute)?;
                self.cancel_landing();
                self.jump_to(t);
            }
            Command::IncrementTime { minutes } => {
                self.cancel_landing();
                self.time.increment_minutes(minutes);
            }
            Command::TimeDilation { factor } => self.time.set_dilation(factor)?,
            Command::Freeze { enabled } => self.time.set_freeze(enabled),
            Command::TimeNow { reset_dilation } => {
                if reset_dilation {
                    self.time.set_dilation(1.0)?;
                }
                self.cancel_landing();
                self.time.sync_to(self.clock.local_time());
            }
            Command::Normal => {
                let rolling = self.effects.clear();
                if let Some(target) = self.landing.take().or(rolling) {
                    self.time.set_time(target);
                }
                self.time.set_freeze(false);
                self.time.set_dilation(1.0)?;
            }
            Command::RandomGlitch { freq } => self.effects.set_random_glitch(freq)?,
            Command::RandomXGlitch { freq, count, length, color } => {
                let color = parse_color(color)?;
                let params = RandomX::new(freq, count, length, color)?;
                self.effects.set_random_x(params);
            }
            Command::SingleXGlitch { count, length, color } => {
                let color = parse_color(color)?;
                self.effects.single_x(count, length, color)?;
            }
            Command::XPositions { mask, color } => {
                let mask = effects::parse_mask(&mask)?;
                let color = parse_color(color)?;
                if let Some(color) = color {
                    self.resolver.set_color(ColorElement::X, color, Duration::ZERO, now);
                }
                self.effects.set_x_mask(mask);
            }
            Command::XColor { color, fade } => self.set_color(ColorElement::X, &color, fade, now)?,
            Command::Color { color, fade } => {
                self.set_color(ColorElement::Digits, &color, fade, now)?
            }
            Command::Background { color, fade } => {
                self.set_color(ColorElement::Background, &color, fade, now)?
            }
            Command::Brightness { target, duration } => {
                if !(0..=100).contains(&target) {
                    return Err(EngineError::invalid(format!(
                        "brightness {target} outside 0..=100"
                    )));
                }
                let duration = fade_duration(duration, "duration")?;
                if self.effects.take_fadesnap().is_some() {
                    debug!("brightness change cancels pending fadesnap");
                }
                self.resolver.set_brightness(target as f64, duration, now);
            }
            Command::FadeSnap { hour, minute, duration, clear_x } => {
                let target = SimulatedTime::new(hour, minute)?;
                let duration = fade_duration(duration, "duration")?;
                // a fadesnap issued mid-fadesnap still restores the original level
                let restore = self
                    .effects
                    .fadesnap()
                    .map(|s| s.restore_brightness)
                    .unwrap_or_else(|| self.resolver.brightness(now));
                self.time.set_freeze(false);
                let snap = FadeSnap { target, restore_brightness: restore, clear_x };
                if !duration.is_zero() {
                    self.effects.set_fadesnap(Some(snap));
                    self.resolver.set_brightness(0.0, duration, now);
                } else {
                    self.effects.set_fadesnap(None);
                    self.finish_fadesnap(snap);
                }
            }
            Command::GlitchTo { hour, minute, frames } => {
                let target = SimulatedTime::new(hour, minute)?;
                self.effects.glitch_to(target, frames)?;
            }
            Command::BlinkDots { enabled } => self.effects.set_blink_dots(enabled),
            Command::BlinkAll { enabled } => self.effects.set_blink_all(enabled),
            Command::Framerate { rate } => {
                if !(rate > 0.0 && rate <= MAX_FRAME_INTERVAL) {
                    return Err(EngineError::invalid(format!(
                        "framerate {rate} must be within (0, {MAX_FRAME_INTERVAL}] seconds"
                    )));
                }
                warn!(
                    "framerate {} -> {}s per frame; frame-counted effects change length",
                    self.framerate, rate
                );
                self.framerate = rate;
            }
            Command::DisplayText { text } => {
                if text.is_empty() {
                    self.display = DisplayOverride::Normal;
                } else {
                    self.scroll.set_text(&text);
                    self.display = DisplayOverride::ScrollText(text);
                }
            }
            Command::ShowIp { enabled } => {
                if enabled {
                    let addr = self.address.address();
                    self.scroll.set_text(&addr);
                    self.display = DisplayOverride::ShowIp(addr);
                } else {
                    self.display = DisplayOverride::Normal;
                }
            }
            Command::Status => return Ok(Reply::Status(self.status())),
        }
        Ok(Reply::Done)
    }

    fn set_color(
        &mut self,
        element: ColorElement,
        value: &str,
        fade: f64,
        now: Instant,
    ) -> EngineResult<()> {
        let color = Rgb::parse(value)?;
        let fade = fade_duration(fade, "fade")?;
        self.resolver.set_color(element, color, fade, now);
        Ok(())
    }

    fn jump_to(&mut self, target: SimulatedTime) {
        self.time.set_freeze(false);
        self.time.set_time(target);
    }

    /// An explicit time change wins over a glitch_to still in flight.
    fn cancel_landing(&mut self) {
        self.effects.cancel_jump();
        self.landing = None;
    }

    fn finish_fadesnap(&mut self, snap: FadeSnap) {
        debug!("fadesnap to {} restoring brightness {:.0}", snap.target, snap.restore_brightness);
        self.jump_to(snap.target);
        if snap.clear_x {
            self.effects.clear_x_mask();
        }
        self.resolver.snap_brightness(snap.restore_brightness);
    }

    /// Advance by the real time since the previous tick, age every effect by
    /// one frame and return the resolved frame.
    pub fn tick(&mut self) -> Frame {
        let now = self.clock.instant();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.frames += 1;

        self.time.advance(elapsed.as_secs_f64());
        if let Some(target) = self.landing.take() {
            debug!("glitch_to landed on {}", target);
            self.jump_to(target);
        }

        if self.resolver.step(now) {
            if let Some(snap) = self.effects.take_fadesnap() {
                self.finish_fadesnap(snap);
            }
        }

        let fx = self.effects.tick();
        if fx.jump.is_some() {
            self.landing = fx.jump;
        }

        if self.display.payload().is_some() {
            self.scroll.update(self.geometry);
        }

        let brightness = self.resolver.brightness(now);
        let scene = Scene {
            display: &self.display,
            scroll_offset: self.scroll.offset(),
            time: self.time.time(),
            effects: &fx,
            x_mask: self.effects.x_mask(),
            blink: self.effects.blink(),
            since_start: now.saturating_duration_since(self.epoch),
            palette: self.resolver.palette(now),
            brightness,
            dark: brightness <= 0.0 && !self.resolver.is_brightness_fading(),
        };
        compose(&scene)
    }

    pub fn status(&self) -> Status {
        let now = self.clock.instant();
        let t = self.time.time();
        let palette = self.resolver.palette(now);
        let blink = self.effects.blink();
        let random_x = self.effects.random_x();
        Status {
            time: TimeStatus { hour: t.hour(), minute: t.minute(), frozen: self.time.is_frozen() },
            appearance: AppearanceStatus {
                brightness: self.resolver.brightness(now).round().clamp(0.0, 100.0) as u8,
                text_color: palette.digits,
                x_color: palette.x,
                background: palette.background,
            },
            effects: EffectsStatus {
                time_dilation: self.time.dilation(),
                blink_dots: blink.dots,
                blink_all: blink.all,
                framerate: self.framerate,
            },
            glitches: GlitchStatus {
                random_glitch_freq: self.effects.random_glitch_freq(),
                x_glitch_freq: random_x.map(|r| r.freq).unwrap_or(0),
                x_glitch_count: random_x.map(|r| r.count).unwrap_or(0),
                x_glitch_length: random_x.map(|r| r.length).unwrap_or(0),
            },
            x_positions: self
                .effects
                .x_mask()
                .iter()
                .enumerate()
                .filter_map(|(i, x)| x.then_some(i))
                .collect(),
            display: self.display.kind(),
        }
    }

    /// Current tick interval.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.framerate)
    }

    pub fn time_model(&self) -> &TimeModel {
        &self.time
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn display(&self) -> &DisplayOverride {
        &self.display
    }

    pub fn brightness(&self) -> f64 {
        self.resolver.brightness(self.clock.instant())
    }

    pub fn color(&self, element: ColorElement) -> Rgb {
        self.resolver.color(element, self.clock.instant())
    }

    /// Ticks processed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
