//! Unit tests for board configuration validation.

use focuser_motion::config::{parse_board_config, validate_board_config, BoardConfig, SpeedDelays};
use focuser_motion::error::{ConfigError, Error};
use focuser_motion::StepMode;

/// Test validation of the stock boards.
#[test]
fn test_stock_boards_pass_validation() {
    assert!(validate_board_config(&BoardConfig::step_dir("DRV8825", 200, 3)).is_ok());
    assert!(validate_board_config(&BoardConfig::step_dir("bare", 200, 0)).is_ok());
    assert!(validate_board_config(&BoardConfig::coil_sequenced("L298N", 200)).is_ok());
    assert!(validate_board_config(&BoardConfig::coil_sequenced("ULN2003", 2048)).is_ok());
}

/// Test validation fails for zero steps per revolution.
#[test]
fn test_zero_steps_per_revolution() {
    let toml_str = r#"
name = "broken"
kind = "coil_sequenced"
steps_per_revolution = 0
"#;

    let result = parse_board_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
    ));
}

/// Test validation fails when fast is not the shortest delay.
#[test]
fn test_speed_delays_out_of_order() {
    let mut board = BoardConfig::step_dir("drv", 200, 3);
    board.speed_delays = Some(SpeedDelays {
        slow_us: 1_000,
        medium_us: 4_000,
        fast_us: 10_000,
    });

    let result = validate_board_config(&board);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidSpeedDelays { .. }))
    ));
}

/// Test validation fails for more than three microstep pins.
#[test]
fn test_too_many_microstep_pins() {
    let board = BoardConfig::step_dir("drv", 200, 4);
    assert!(matches!(
        validate_board_config(&board),
        Err(Error::Config(ConfigError::TooManyMicrostepPins(4)))
    ));
}

/// Test validation fails for a coil board wired to a microstep mode.
#[test]
fn test_coil_board_cannot_fix_microstep_mode() {
    let mut board = BoardConfig::coil_sequenced("L298N", 200);
    board.fixed_step_mode = Some(StepMode::Quarter);

    assert!(matches!(
        validate_board_config(&board),
        Err(Error::Config(ConfigError::UnsupportedStepMode(4)))
    ));

    board.fixed_step_mode = Some(StepMode::Half);
    assert!(validate_board_config(&board).is_ok());
}

/// Test validation fails for a zero-width step pulse.
#[test]
fn test_zero_pulse_width() {
    let mut board = BoardConfig::step_dir("drv", 200, 0);
    board.pulse_width_us = 0;
    assert!(validate_board_config(&board).is_err());
}
