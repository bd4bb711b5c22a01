/*
 *  engine/command.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Command names, argument coercion and defaults
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

use serde_json::Value;
use std::fmt;

use super::error::{EngineError, EngineResult};

/// A decoded control command, arguments coerced but not range checked.
///
/// Range checks happen in `Engine::apply` before any state is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Time { hour: i64, minute: i64 },
    IncrementTime { minutes: i64 },
    TimeDilation { factor: f64 },
    Freeze { enabled: bool },
    TimeNow { reset_dilation: bool },
    Normal,
    RandomGlitch { freq: i64 },
    RandomXGlitch { freq: i64, count: i64, length: i64, color: Option<String> },
    SingleXGlitch { count: i64, length: i64, color: Option<String> },
    XPositions { mask: String, color: Option<String> },
    XColor { color: String, fade: f64 },
    Color { color: String, fade: f64 },
    Background { color: String, fade: f64 },
    Brightness { target: i64, duration: f64 },
    FadeSnap { hour: i64, minute: i64, duration: f64, clear_x: bool },
    GlitchTo { hour: i64, minute: i64, frames: i64 },
    BlinkDots { enabled: bool },
    BlinkAll { enabled: bool },
    Framerate { rate: f64 },
    DisplayText { text: String },
    ShowIp { enabled: bool },
    Status,
}

/// Positional argument reader for one command.
struct Args<'a> {
    command: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(command: &'a str, values: &'a [Value], max: usize) -> EngineResult<Self> {
        if values.len() > max {
            return Err(EngineError::invalid(format!(
                "{command} takes at most {max} arguments, got {}",
                values.len()
            )));
        }
        Ok(Self { command, values })
    }

    fn get(&self, i: usize) -> Option<&'a Value> {
        self.values.get(i).filter(|v| !v.is_null())
    }

    fn bad(&self, what: &str, v: &Value) -> EngineError {
        EngineError::invalid(format!("{}: {what} expects a number, got {v}", self.command))
    }

    fn missing(&self, what: &str) -> EngineError {
        EngineError::invalid(format!("{}: missing {what}", self.command))
    }

    fn int_opt(&self, i: usize, what: &str) -> EngineResult<Option<i64>> {
        let Some(v) = self.get(i) else { return Ok(None) };
        let n = match v {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::Bool(b) => Some(*b as i64),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        n.map(Some).ok_or_else(|| self.bad(what, v))
    }

    fn int(&self, i: usize, what: &str) -> EngineResult<i64> {
        self.int_opt(i, what)?.ok_or_else(|| self.missing(what))
    }

    fn int_or(&self, i: usize, what: &str, default: i64) -> EngineResult<i64> {
        Ok(self.int_opt(i, what)?.unwrap_or(default))
    }

    fn float_or(&self, i: usize, what: &str, default: f64) -> EngineResult<f64> {
        let Some(v) = self.get(i) else { return Ok(default) };
        let f = match v {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        f.filter(|f| f.is_finite()).ok_or_else(|| self.bad(what, v))
    }

    /// Flags are "on" only for exactly 1 / true.
    fn flag_or(&self, i: usize, what: &str, default: bool) -> EngineResult<bool> {
        Ok(self.int_opt(i, what)?.map(|n| n == 1).unwrap_or(default))
    }

    fn text_opt(&self, i: usize) -> Option<String> {
        self.get(i).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn text(&self, i: usize, what: &str) -> EngineResult<String> {
        self.text_opt(i).ok_or_else(|| self.missing(what))
    }

    fn text_or(&self, i: usize, default: &str) -> String {
        self.text_opt(i).unwrap_or_else(|| default.to_string())
    }
}

impl Command {
    /// Decode `name` (an OSC style path is fine; only the last segment
    /// counts) and its positional arguments.
    pub fn parse(name: &str, args: &[Value]) -> EngineResult<Command> {
        let name = name.rsplit('/').next().unwrap_or(name).trim();
        let cmd = match name {
            "time" => {
                let a = Args::new(name, args, 2)?;
                Command::Time { hour: a.int(0, "hour")?, minute: a.int(1, "minute")? }
            }
            "increment_time" => {
                let a = Args::new(name, args, 1)?;
                Command::IncrementTime { minutes: a.int(0, "minutes")? }
            }
            "time_dilation" => {
                let a = Args::new(name, args, 1)?;
                Command::TimeDilation { factor: a.float_or(0, "factor", 1.0)? }
            }
            "freeze" => {
                let a = Args::new(name, args, 1)?;
                Command::Freeze { enabled: a.int_or(0, "enabled", 1)? != 0 }
            }
            "timenow" => {
                let a = Args::new(name, args, 1)?;
                Command::TimeNow { reset_dilation: a.int_or(0, "reset_dilation", 0)? != 0 }
            }
            "normal" => {
                Args::new(name, args, 0)?;
                Command::Normal
            }
            "random_glitch" => {
                // a second `intensity` argument is accepted for older senders and unused
                let a = Args::new(name, args, 2)?;
                Command::RandomGlitch { freq: a.int_or(0, "freq", 100)? }
            }
            "random_x_glitch" => {
                let a = Args::new(name, args, 4)?;
                Command::RandomXGlitch {
                    freq: a.int(0, "freq")?,
                    count: a.int_or(1, "count", 1)?,
                    length: a.int_or(2, "length", 1)?,
                    color: a.text_opt(3),
                }
            }
            "single_x_glitch" => {
                let a = Args::new(name, args, 3)?;
                Command::SingleXGlitch {
                    count: a.int_or(0, "count", 1)?,
                    length: a.int_or(1, "length", 1)?,
                    color: a.text_opt(2),
                }
            }
            "x_positions" => {
                let a = Args::new(name, args, 2)?;
                Command::XPositions { mask: a.text_or(0, "0000"), color: a.text_opt(1) }
            }
            "x_color" | "color" | "bg" => {
                let a = Args::new(name, args, 2)?;
                let color = a.text(0, "color")?;
                let fade = a.float_or(1, "fade", 0.0)?;
                match name {
                    "x_color" => Command::XColor { color, fade },
                    "color" => Command::Color { color, fade },
                    _ => Command::Background { color, fade },
                }
            }
            "brightness" => {
                let a = Args::new(name, args, 2)?;
                Command::Brightness {
                    target: a.int(0, "target")?,
                    duration: a.float_or(1, "duration", 0.0)?,
                }
            }
            "fadesnap" => {
                let a = Args::new(name, args, 4)?;
                Command::FadeSnap {
                    hour: a.int(0, "hour")?,
                    minute: a.int(1, "minute")?,
                    duration: a.float_or(2, "duration", 1.0)?,
                    clear_x: a.flag_or(3, "clear_x", false)?,
                }
            }
            "glitch_to" => {
                let a = Args::new(name, args, 3)?;
                Command::GlitchTo {
                    hour: a.int(0, "hour")?,
                    minute: a.int(1, "minute")?,
                    frames: a.int_or(2, "frames", 5)?,
                }
            }
            "blink_dots" => {
                let a = Args::new(name, args, 1)?;
                Command::BlinkDots { enabled: a.flag_or(0, "enabled", true)? }
            }
            "blink_all" => {
                let a = Args::new(name, args, 1)?;
                Command::BlinkAll { enabled: a.flag_or(0, "enabled", true)? }
            }
            "framerate" => {
                let a = Args::new(name, args, 1)?;
                Command::Framerate { rate: a.float_or(0, "rate", 0.05)? }
            }
            "display_text" => {
                // free text; extra words are joined back together
                let text = args
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                Command::DisplayText { text }
            }
            "showip" => {
                let a = Args::new(name, args, 1)?;
                Command::ShowIp { enabled: a.int_or(0, "enabled", 1)? != 0 }
            }
            "status" => Command::Status,
            other => return Err(EngineError::UnknownCommand(other.to_string())),
        };
        Ok(cmd)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Time { .. } => "time",
            Command::IncrementTime { .. } => "increment_time",
            Command::TimeDilation { .. } => "time_dilation",
            Command::Freeze { .. } => "freeze",
            Command::TimeNow { .. } => "timenow",
            Command::Normal => "normal",
            Command::RandomGlitch { .. } => "random_glitch",
            Command::RandomXGlitch { .. } => "random_x_glitch",
            Command::SingleXGlitch { .. } => "single_x_glitch",
            Command::XPositions { .. } => "x_positions",
            Command::XColor { .. } => "x_color",
            Command::Color { .. } => "color",
            Command::Background { .. } => "bg",
            Command::Brightness { .. } => "brightness",
            Command::FadeSnap { .. } => "fadesnap",
            Command::GlitchTo { .. } => "glitch_to",
            Command::BlinkDots { .. } => "blink_dots",
            Command::BlinkAll { .. } => "blink_all",
            Command::Framerate { .. } => "framerate",
            Command::DisplayText { .. } => "display_text",
            Command::ShowIp { .. } => "showip",
            Command::Status => "status",
        }
    }

    /// Read-only commands do not go to the command log.
    pub fn is_query(&self) -> bool {
        matches!(self, Command::Status)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
