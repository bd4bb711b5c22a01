/*
 *  tests/engine_integration.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Engine behaviour driven through named commands on a manual clock
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

use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::time::Duration;

use xclock::engine::{
    ColorElement, Engine, EngineError, EngineSettings, FixedAddress, Frame, FrameContent, Glyph,
    ManualClock, OverrideKind, Reply, Rgb, SimulatedTime, Status,
};

struct Rig {
    clock: ManualClock,
    engine: Engine,
}

impl Rig {
    fn at(hour: i64, minute: i64) -> Self {
        Self::with(EngineSettings {
            start_time: Some(SimulatedTime::new(hour, minute).unwrap()),
            ..EngineSettings::default()
        })
    }

    fn with(settings: EngineSettings) -> Self {
        let clock = ManualClock::new(NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        let engine = Engine::new(
            settings,
            Box::new(clock.clone()),
            Box::new(FixedAddress("192.168.1.20".into())),
            StdRng::seed_from_u64(42),
        );
        Self { clock, engine }
    }

    fn send(&mut self, name: &str, args: Value) -> Result<Reply, EngineError> {
        let args = args.as_array().cloned().unwrap_or_default();
        self.engine.dispatch(name, &args)
    }

    fn ok(&mut self, name: &str, args: Value) {
        self.send(name, args).unwrap();
    }

    fn tick_after(&mut self, secs: f64) -> Frame {
        self.clock.advance_secs(secs);
        self.engine.tick()
    }

    fn hhmm(&self) -> (u8, u8) {
        let t = self.engine.time_model().time();
        (t.hour(), t.minute())
    }

    fn status(&mut self) -> Status {
        match self.send("status", json!([])).unwrap() {
            Reply::Status(s) => s,
            other => panic!("expected status, got {other:?}"),
        }
    }
}

fn digits(frame: &Frame) -> String {
    frame.glyphs().unwrap().iter().map(Glyph::as_char).collect()
}

#[test]
fn test_time_wraps_past_midnight() {
    let mut rig = Rig::at(23, 59);
    rig.tick_after(60.0);
    assert_eq!(rig.hhmm(), (0, 0));

    rig.ok("time_dilation", json!([60]));
    rig.tick_after(1.0);
    assert_eq!(rig.hhmm(), (0, 1));

    rig.ok("increment_time", json!([-2]));
    assert_eq!(rig.hhmm(), (23, 59));
}

#[test]
fn test_set_operations_discard_partial_seconds() {
    let mut rig = Rig::at(10, 0);
    rig.tick_after(59.0);
    rig.ok("increment_time", json!([1]));
    assert_eq!(rig.hhmm(), (10, 1));
    rig.tick_after(59.0);
    assert_eq!(rig.hhmm(), (10, 1));
    rig.tick_after(1.0);
    assert_eq!(rig.hhmm(), (10, 2));
}

#[test]
fn test_freeze_holds_until_time_is_set() {
    let mut rig = Rig::at(7, 30);
    rig.ok("freeze", json!([1]));
    rig.tick_after(600.0);
    assert_eq!(rig.hhmm(), (7, 30));

    rig.ok("time", json!([8, 0]));
    assert!(!rig.status().time.frozen);
    rig.tick_after(60.0);
    assert_eq!(rig.hhmm(), (8, 1));
}

#[test]
fn test_timenow_follows_wall_clock() {
    let mut rig = Rig::at(3, 3);
    rig.ok("time_dilation", json!([4]));
    rig.clock.set_local_time(NaiveTime::from_hms_opt(18, 45, 30).unwrap());
    rig.ok("timenow", json!([1]));
    assert_eq!(rig.hhmm(), (18, 45));
    assert_eq!(rig.status().effects.time_dilation, 1.0);
}

#[test]
fn test_normal_clears_effects_but_keeps_colors() {
    let mut rig = Rig::at(12, 0);
    rig.ok("time_dilation", json!([5]));
    rig.ok("freeze", json!([1]));
    rig.ok("random_glitch", json!([10000]));
    rig.ok("x_positions", json!(["X0X0"]));
    rig.ok("blink_all", json!([1]));
    rig.ok("blink_dots", json!([0]));
    rig.ok("color", json!(["red"]));

    rig.ok("normal", json!([]));
    let s = rig.status();
    assert_eq!(s.effects.time_dilation, 1.0);
    assert!(!s.time.frozen);
    assert!(s.x_positions.is_empty());
    assert_eq!(s.glitches.random_glitch_freq, 0);
    assert!(s.effects.blink_dots);
    assert!(!s.effects.blink_all);
    assert_eq!(s.appearance.text_color, Rgb::new(255, 0, 0));

    let frame = rig.tick_after(0.1);
    assert_eq!(digits(&frame), "1200");
}

#[test]
fn test_random_x_every_frame_then_off() {
    let mut rig = Rig::at(12, 34);
    rig.ok("random_x_glitch", json!([10000, 1, 1]));
    for _ in 0..20 {
        let frame = rig.tick_after(0.05);
        let xs = frame.glyphs().unwrap().iter().filter(|g| **g == Glyph::X).count();
        assert_eq!(xs, 1);
    }

    rig.ok("random_x_glitch", json!([0]));
    for _ in 0..20 {
        let frame = rig.tick_after(0.05);
        assert_eq!(digits(&frame), "1234");
    }
}

#[test]
fn test_glitch_to_lands_after_frames() {
    let mut rig = Rig::at(9, 0);
    rig.ok("glitch_to", json!([14, 30, 5]));
    for _ in 0..5 {
        rig.tick_after(0.05);
        assert_eq!(rig.hhmm(), (9, 0));
    }
    let frame = rig.tick_after(0.05);
    assert_eq!(digits(&frame), "1430");
}

#[test]
fn test_glitch_to_lands_exactly_under_dilation() {
    let mut rig = Rig::at(9, 0);
    // one simulated minute per 0.05s tick
    rig.ok("time_dilation", json!([1200]));
    rig.ok("glitch_to", json!([14, 30, 5]));
    for _ in 0..5 {
        rig.tick_after(0.05);
    }
    assert_eq!(rig.hhmm(), (9, 5));
    let frame = rig.tick_after(0.05);
    assert_eq!(digits(&frame), "1430");
    assert_eq!(rig.hhmm(), (14, 30));
    rig.tick_after(0.05);
    assert_eq!(rig.hhmm(), (14, 31));
}

#[test]
fn test_explicit_time_wins_over_rolling_glitch() {
    let mut rig = Rig::at(9, 0);
    rig.ok("glitch_to", json!([14, 30, 5]));
    rig.tick_after(0.05);
    rig.tick_after(0.05);
    rig.ok("time", json!([8, 0]));
    for _ in 0..3 {
        let frame = rig.tick_after(0.05);
        assert!(frame.glyphs().unwrap().iter().all(|g| matches!(g, Glyph::Digit(_))));
    }
    let frame = rig.tick_after(0.05);
    assert_eq!(digits(&frame), "0800");
    assert_eq!(rig.hhmm(), (8, 0));
}

#[test]
fn test_fadesnap_dims_jumps_and_restores() {
    let mut rig = Rig::at(20, 0);
    rig.ok("brightness", json!([80]));
    rig.ok("fadesnap", json!([9, 15, 2]));

    let mut last = 80.0;
    for _ in 0..3 {
        let frame = rig.tick_after(0.5);
        assert!(frame.brightness < last, "{} !< {}", frame.brightness, last);
        last = frame.brightness;
        assert_eq!(rig.hhmm(), (20, 0));
    }

    let frame = rig.tick_after(0.5);
    assert_eq!(digits(&frame), "0915");
    assert_eq!(frame.brightness, 80.0);
    rig.tick_after(59.0);
    assert_eq!(rig.hhmm(), (9, 15));
}

#[test]
fn test_brightness_cancels_pending_fadesnap() {
    let mut rig = Rig::at(20, 0);
    rig.ok("brightness", json!([80]));
    rig.ok("fadesnap", json!([9, 15, 2]));
    rig.tick_after(0.5);

    rig.ok("brightness", json!([30]));
    for _ in 0..4 {
        let frame = rig.tick_after(0.5);
        assert_eq!(frame.brightness, 30.0);
    }
    assert_eq!(rig.hhmm(), (20, 0));
}

#[test]
fn test_second_fadesnap_keeps_first_restore_level() {
    let mut rig = Rig::at(20, 0);
    rig.ok("brightness", json!([80]));
    rig.ok("fadesnap", json!([9, 15, 2]));
    let frame = rig.tick_after(1.0);
    assert_eq!(frame.brightness, 40.0);

    rig.ok("fadesnap", json!([10, 20, 1]));
    let frame = rig.tick_after(0.5);
    assert_eq!(frame.brightness, 20.0);
    let frame = rig.tick_after(0.5);
    assert_eq!(digits(&frame), "1020");
    assert_eq!(frame.brightness, 80.0);
}

#[test]
fn test_fadesnap_can_clear_x_mask() {
    let mut rig = Rig::at(1, 1);
    rig.ok("x_positions", json!(["XXXX"]));
    rig.ok("fadesnap", json!([2, 2, 0, 1]));
    assert!(rig.status().x_positions.is_empty());
    assert_eq!(digits(&rig.tick_after(0.05)), "0202");
}

#[test]
fn test_x_mask_replaced_outright() {
    let mut rig = Rig::at(12, 34);
    rig.ok("x_positions", json!(["X0X0"]));
    let frame = rig.tick_after(0.05);
    assert_eq!(digits(&frame), "X2X4");

    let err = rig.send("x_positions", json!(["XX"])).unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
    assert_eq!(rig.status().x_positions, vec![0, 2]);

    rig.ok("x_positions", json!(["ABCD"]));
    assert!(rig.status().x_positions.is_empty());
    assert_eq!(digits(&rig.tick_after(0.05)), "1234");
}

#[test]
fn test_color_fade_restarts_from_current_value() {
    let mut rig = Rig::at(12, 0);
    rig.ok("color", json!(["000000"]));
    rig.ok("color", json!(["ffffff", 2]));
    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.engine.color(ColorElement::Digits), Rgb::new(128, 128, 128));

    rig.ok("color", json!(["black", 2]));
    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.engine.color(ColorElement::Digits), Rgb::new(64, 64, 64));
    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.engine.color(ColorElement::Digits), Rgb::BLACK);
}

#[test]
fn test_rejected_commands_leave_state_alone() {
    let mut rig = Rig::at(6, 6);
    rig.ok("random_x_glitch", json!([200, 2, 3]));
    let before = rig.status();

    assert!(matches!(rig.send("time", json!([25, 0])), Err(EngineError::InvalidArgument(_))));
    assert!(matches!(rig.send("bg", json!(["nope"])), Err(EngineError::UnknownColor(_))));
    assert!(matches!(rig.send("brightness", json!([101])), Err(EngineError::InvalidArgument(_))));
    assert!(matches!(
        rig.send("random_x_glitch", json!([100, 5])),
        Err(EngineError::InvalidArgument(_))
    ));
    assert!(matches!(rig.send("framerate", json!([0])), Err(EngineError::InvalidArgument(_))));
    assert!(matches!(rig.send("fly", json!([])), Err(EngineError::UnknownCommand(_))));
    for (name, args) in [
        ("color", json!(["red", 1e20])),
        ("brightness", json!([50, 1e20])),
        ("fadesnap", json!([9, 15, 1e20])),
        ("bg", json!(["blue", -1])),
    ] {
        assert!(
            matches!(rig.send(name, args), Err(EngineError::InvalidArgument(_))),
            "{name} should be rejected"
        );
    }

    assert_eq!(rig.status(), before);
}

#[test]
fn test_overrides_replace_the_clock() {
    let mut rig = Rig::at(12, 0);
    rig.ok("showip", json!([1]));
    assert_eq!(rig.status().display, OverrideKind::ShowIp);
    match rig.tick_after(0.05).content {
        FrameContent::Text { text, .. } => assert_eq!(text, "192.168.1.20"),
        other => panic!("expected text, got {other:?}"),
    }

    rig.ok("display_text", json!(["hello", "world"]));
    match rig.tick_after(0.05).content {
        FrameContent::Text { text, .. } => assert_eq!(text, "hello world"),
        other => panic!("expected text, got {other:?}"),
    }

    rig.ok("display_text", json!([""]));
    assert_eq!(rig.status().display, OverrideKind::Clock);
    assert!(rig.tick_after(0.05).glyphs().is_some());
}

#[test]
fn test_zero_brightness_goes_dark() {
    let mut rig = Rig::at(12, 0);
    rig.ok("brightness", json!([0, 1]));
    let frame = rig.tick_after(0.5);
    assert!(frame.glyphs().is_some());
    let frame = rig.tick_after(0.5);
    assert_eq!(frame.content, FrameContent::Dark);
}

#[test]
fn test_startup_fade_in() {
    let mut rig = Rig::with(EngineSettings {
        start_time: Some(SimulatedTime::new(5, 0).unwrap()),
        startup_fade_secs: 10.0,
        ..EngineSettings::default()
    });
    assert!(rig.tick_after(5.0).brightness > 49.0);
    assert_eq!(rig.tick_after(5.0).brightness, 100.0);
}

#[test]
fn test_huge_increment_wraps() {
    let mut rig = Rig::at(12, 0);
    rig.ok("increment_time", json!([i64::MAX]));
    assert_eq!(rig.hhmm(), (6, 7));
    rig.ok("increment_time", json!([-1440 * 1000]));
    assert_eq!(rig.hhmm(), (6, 7));
}

#[test]
fn test_osc_style_names() {
    let mut rig = Rig::at(12, 0);
    rig.ok("/clock/time", json!([16, 20]));
    assert_eq!(rig.hhmm(), (16, 20));
    rig.ok("/framerate", json!([0.1]));
    assert_eq!(rig.engine.frame_interval(), Duration::from_millis(100));
}
