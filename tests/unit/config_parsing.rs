//! Unit tests for TOML board configuration parsing.

use focuser_motion::config::{parse_board_config, BoardConfig, BoardKind, SpeedDelays};
use focuser_motion::{FocuserSettings, MotorSpeed, StepMode, StepModeSet};

/// Test parsing a step/dir board with all three microstep pins.
#[test]
fn test_parse_step_dir_board() {
    let toml_str = r#"
name = "DRV8825"
kind = "step_dir"
steps_per_revolution = 200
microstep_pins = 3
pulse_width_us = 5
"#;

    let board = parse_board_config(toml_str).expect("Failed to parse board");

    assert_eq!(board.name.as_str(), "DRV8825");
    assert_eq!(board.kind, BoardKind::StepDir);
    assert_eq!(board.steps_per_revolution, 200);
    assert_eq!(board.pulse_width_us, 5);
    assert_eq!(board.step_modes(), StepModeSet::ALL);
    assert_eq!(board.speed_delays(), SpeedDelays::STEP_DIR);
}

/// Test parsing a coil-sequenced board with its own speed table.
#[test]
fn test_parse_coil_board_with_speed_delays() {
    let toml_str = r#"
name = "ULN2003"
kind = "coil_sequenced"
steps_per_revolution = 2048

[speed_delays]
slow_us = 30000
medium_us = 15000
fast_us = 6000
"#;

    let board = parse_board_config(toml_str).expect("Failed to parse board");

    assert_eq!(board.kind, BoardKind::CoilSequenced);
    assert_eq!(board.step_modes(), StepModeSet::FULL_HALF);
    let delays = board.speed_delays();
    assert_eq!(delays.delay_us(MotorSpeed::Fast), 6_000);
    assert_eq!(delays.classify(15_000), MotorSpeed::Medium);
}

/// Test a board with the step mode wired in hardware.
#[test]
fn test_parse_fixed_step_mode() {
    let toml_str = r#"
name = "TMC2209 standalone"
kind = "step_dir"
steps_per_revolution = 200
fixed_step_mode = 16
"#;

    let board = parse_board_config(toml_str).expect("Failed to parse board");

    assert_eq!(board.fixed_step_mode, Some(StepMode::Sixteenth));
    let modes = board.step_modes();
    assert!(modes.is_fixed());
    assert_eq!(modes.resolve(StepMode::Full), StepMode::Sixteenth);
}

/// Test that a step mode outside 1..32 is rejected at parse time.
#[test]
fn test_parse_rejects_invalid_step_mode() {
    let toml_str = r#"
name = "bad"
kind = "step_dir"
steps_per_revolution = 200
fixed_step_mode = 3
"#;

    assert!(parse_board_config(toml_str).is_err());
}

/// Test that an unknown board kind is rejected.
#[test]
fn test_parse_rejects_unknown_kind() {
    let toml_str = r#"
name = "mystery"
kind = "servo"
steps_per_revolution = 200
"#;

    assert!(parse_board_config(toml_str).is_err());
}

/// Test that the builder constructors agree with parsed defaults.
#[test]
fn test_constructor_matches_parsed_defaults() {
    let parsed = parse_board_config(
        r#"
name = "A4988"
kind = "step_dir"
steps_per_revolution = 200
microstep_pins = 3
"#,
    )
    .unwrap();

    assert_eq!(parsed, BoardConfig::step_dir("A4988", 200, 3));
}

/// Test parsing a hand-written settings document.
#[test]
fn test_parse_settings_document() {
    let toml_str = r#"
max_step = 50000
backlash_out_steps = 12
backlash_out_enabled = true
temp_comp_direction = "outward"
step_mode = 8
motor_speed = "medium"
presets = [100, 200, 300, 0, 0, 0, 0, 0, 0, 0]
"#;

    let settings: FocuserSettings = toml::from_str(toml_str).expect("Failed to parse settings");

    assert_eq!(settings.max_step, 50_000);
    assert_eq!(settings.backlash_out_steps, 12);
    assert!(settings.backlash_out_enabled);
    assert_eq!(settings.step_mode, StepMode::Eighth);
    assert_eq!(settings.motor_speed, MotorSpeed::Medium);
    assert_eq!(settings.presets[2], 300);
    assert_eq!(settings.alpaca_port, 4040);
}
