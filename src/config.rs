/*
 *  config.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Layered configuration: defaults, YAML file, CLI overrides
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

use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::engine::{
    fade_duration, EngineSettings, Palette, Rgb, ScrollGeometry, DEFAULT_FRAMERATE,
    MAX_FRAME_INTERVAL,
};

pub const DEFAULT_PORT: u16 = 1337;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_GPIO_PIN: u8 = 25;
pub const DEFAULT_STARTUP_FADE_SECS: f64 = 10.0;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Unset fields fall back to the defaults above.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// seconds per frame, (0, 1]
    pub framerate: Option<f64>,
    pub show_ip: Option<bool>,
    pub gpio_pin: Option<u8>,          // BCM numbering
    pub no_gpio: Option<bool>,
    pub control: Option<ControlConfig>,
    pub appearance: Option<AppearanceConfig>,
    pub scroll: Option<ScrollConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ControlConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppearanceConfig {
    pub text_color: Option<String>,  // name or RRGGBB
    pub x_color: Option<String>,
    pub background: Option<String>,
    pub brightness: Option<u8>,      // 0-100
    pub startup_fade_secs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScrollConfig {
    pub panel_width: Option<u32>,
    pub glyph_width: Option<u32>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "xclock", about = "Remote controlled LED matrix clock", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Seconds per frame
    #[arg(long)]
    pub framerate: Option<f64>,
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Show the host IP address instead of the time at startup
    #[arg(long, action = ArgAction::SetTrue)]
    pub show_ip: bool,
    #[arg(long)]
    pub gpio_pin: Option<u8>,
    /// Do not read the show-IP switch
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_gpio: bool,
    #[arg(long)]
    pub text_color: Option<String>,
    #[arg(long)]
    pub x_color: Option<String>,
    #[arg(long)]
    pub background: Option<String>,
    #[arg(long)]
    pub brightness: Option<u8>,
    #[arg(long)]
    pub startup_fade_secs: Option<f64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // effective config, defaults filled in
        let s = serde_yaml::to_string(&cfg.resolved())?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, YAML and `cli`, then validate.
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/xclock/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/xclock/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/xclock.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["xclock.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()  { dst.log_level = src.log_level; }
    if src.framerate.is_some()  { dst.framerate = src.framerate; }
    if src.show_ip.is_some()    { dst.show_ip = src.show_ip; }
    if src.gpio_pin.is_some()   { dst.gpio_pin = src.gpio_pin; }
    if src.no_gpio.is_some()    { dst.no_gpio = src.no_gpio; }
    match (&mut dst.control, src.control) {
        (None, Some(c)) => dst.control = Some(c),
        (Some(d), Some(s)) => {
            if s.bind.is_some() { d.bind = s.bind; }
            if s.port.is_some() { d.port = s.port; }
        }
        _ => {}
    }
    match (&mut dst.appearance, src.appearance) {
        (None, Some(a)) => dst.appearance = Some(a),
        (Some(d), Some(s)) => merge_appearance(d, s),
        _ => {}
    }
    match (&mut dst.scroll, src.scroll) {
        (None, Some(c)) => dst.scroll = Some(c),
        (Some(d), Some(s)) => {
            if s.panel_width.is_some() { d.panel_width = s.panel_width; }
            if s.glyph_width.is_some() { d.glyph_width = s.glyph_width; }
        }
        _ => {}
    }
}

fn merge_appearance(dst: &mut AppearanceConfig, src: AppearanceConfig) {
    if src.text_color.is_some()        { dst.text_color = src.text_color; }
    if src.x_color.is_some()           { dst.x_color = src.x_color; }
    if src.background.is_some()        { dst.background = src.background; }
    if src.brightness.is_some()        { dst.brightness = src.brightness; }
    if src.startup_fade_secs.is_some() { dst.startup_fade_secs = src.startup_fade_secs; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.framerate.is_some() { cfg.framerate = cli.framerate; }
    if cli.gpio_pin.is_some()  { cfg.gpio_pin = cli.gpio_pin; }
    if cli.show_ip             { cfg.show_ip = Some(true); }
    if cli.no_gpio             { cfg.no_gpio = Some(true); }

    if cli.bind.is_some() || cli.port.is_some() {
        let control = cfg.control.get_or_insert_with(ControlConfig::default);
        if cli.bind.is_some() { control.bind = cli.bind.clone(); }
        if cli.port.is_some() { control.port = cli.port; }
    }

    let any_appearance = cli.text_color.is_some()
        || cli.x_color.is_some()
        || cli.background.is_some()
        || cli.brightness.is_some()
        || cli.startup_fade_secs.is_some();
    if any_appearance {
        let overrides = AppearanceConfig {
            text_color: cli.text_color.clone(),
            x_color: cli.x_color.clone(),
            background: cli.background.clone(),
            brightness: cli.brightness,
            startup_fade_secs: cli.startup_fade_secs,
        };
        match cfg.appearance.as_mut() {
            Some(a) => merge_appearance(a, overrides),
            None => cfg.appearance = Some(overrides),
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(rate) = cfg.framerate {
        if !(rate > 0.0 && rate <= MAX_FRAME_INTERVAL) {
            return Err(ConfigError::Validation(format!(
                "framerate must be in (0, {MAX_FRAME_INTERVAL}] seconds"
            )));
        }
    }
    if let Some(control) = cfg.control.as_ref() {
        if let Some(bind) = control.bind.as_deref() {
            if bind.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "control bind address must not be empty".into(),
                ));
            }
        }
    }
    if let Some(appearance) = cfg.appearance.as_ref() {
        if let Some(b) = appearance.brightness {
            if b > 100 {
                return Err(ConfigError::Validation("brightness must be 0..=100".into()));
            }
        }
        if let Some(secs) = appearance.startup_fade_secs {
            fade_duration(secs, "startup_fade_secs")
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        for (name, value) in [
            ("text_color", &appearance.text_color),
            ("x_color", &appearance.x_color),
            ("background", &appearance.background),
        ] {
            if let Some(v) = value {
                Rgb::parse(v).map_err(|e| ConfigError::Validation(format!("{name}: {e}")))?;
            }
        }
    }
    if let Some(scroll) = cfg.scroll.as_ref() {
        if scroll.panel_width == Some(0) || scroll.glyph_width == Some(0) {
            return Err(ConfigError::Validation("scroll widths must be > 0".into()));
        }
    }
    Ok(())
}

fn color_or(value: Option<&String>, fallback: Rgb) -> Rgb {
    // validated on load
    value.and_then(|v| Rgb::parse(v).ok()).unwrap_or(fallback)
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn framerate(&self) -> f64 {
        self.framerate.unwrap_or(DEFAULT_FRAMERATE)
    }

    pub fn bind(&self) -> &str {
        self.control.as_ref().and_then(|c| c.bind.as_deref()).unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.control.as_ref().and_then(|c| c.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn show_ip(&self) -> bool {
        self.show_ip.unwrap_or(false)
    }

    pub fn gpio_pin(&self) -> u8 {
        self.gpio_pin.unwrap_or(DEFAULT_GPIO_PIN)
    }

    pub fn use_gpio(&self) -> bool {
        !self.no_gpio.unwrap_or(false)
    }

    /// Every field filled in with its effective value.
    pub fn resolved(&self) -> Config {
        let settings = self.to_engine_settings();
        Config {
            log_level: Some(self.log_level().to_string()),
            framerate: Some(settings.framerate),
            show_ip: Some(self.show_ip()),
            gpio_pin: Some(self.gpio_pin()),
            no_gpio: Some(!self.use_gpio()),
            control: Some(ControlConfig {
                bind: Some(self.bind().to_string()),
                port: Some(self.port()),
            }),
            appearance: Some(AppearanceConfig {
                text_color: Some(settings.palette.digits.to_hex()),
                x_color: Some(settings.palette.x.to_hex()),
                background: Some(settings.palette.background.to_hex()),
                brightness: Some(settings.brightness),
                startup_fade_secs: Some(settings.startup_fade_secs),
            }),
            scroll: Some(ScrollConfig {
                panel_width: Some(settings.scroll.panel_width),
                glyph_width: Some(settings.scroll.glyph_width),
            }),
        }
    }

    pub fn to_engine_settings(&self) -> EngineSettings {
        let defaults = EngineSettings::default();
        let appearance = self.appearance.clone().unwrap_or_default();
        let scroll = self.scroll.clone().unwrap_or_default();
        EngineSettings {
            framerate: self.framerate(),
            palette: Palette {
                digits: color_or(appearance.text_color.as_ref(), defaults.palette.digits),
                x: color_or(appearance.x_color.as_ref(), defaults.palette.x),
                background: color_or(appearance.background.as_ref(), defaults.palette.background),
            },
            brightness: appearance.brightness.unwrap_or(defaults.brightness),
            startup_fade_secs: appearance.startup_fade_secs.unwrap_or(DEFAULT_STARTUP_FADE_SECS),
            scroll: ScrollGeometry {
                panel_width: scroll.panel_width.unwrap_or(defaults.scroll.panel_width),
                glyph_width: scroll.glyph_width.unwrap_or(defaults.scroll.glyph_width),
            },
            start_time: None,
        }
    }
}
