//! Board configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::BoardConfig;

/// Load a board configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use focuser_motion::load_board_config;
///
/// let board = load_board_config("board.toml")?;
/// ```
pub fn load_board_config<P: AsRef<Path>>(path: P) -> Result<BoardConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_board_config(&content)
}

/// Parse a board configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_board_config(content: &str) -> Result<BoardConfig> {
    let config: BoardConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_board_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoardKind, StepMode};

    #[test]
    fn test_parse_minimal_step_dir() {
        let toml = r#"
name = "DRV8825"
kind = "step_dir"
steps_per_revolution = 200
microstep_pins = 3
"#;

        let board = parse_board_config(toml).unwrap();
        assert_eq!(board.kind, BoardKind::StepDir);
        assert_eq!(board.enable_settle_us, 1_000);
        assert!(board.enable_active_low);
    }

    #[test]
    fn test_parse_coil_board_with_delays() {
        let toml = r#"
name = "ULN2003"
kind = "coil_sequenced"
steps_per_revolution = 2048
enable_active_low = false

[speed_delays]
slow_us = 30000
medium_us = 15000
fast_us = 5000
"#;

        let board = parse_board_config(toml).unwrap();
        assert_eq!(board.kind, BoardKind::CoilSequenced);
        assert_eq!(board.speed_delays().fast_us, 5_000);
    }

    #[test]
    fn test_parse_fixed_step_mode() {
        let toml = r#"
name = "TMC2209 fixed"
kind = "step_dir"
steps_per_revolution = 200
fixed_step_mode = 16
"#;

        let board = parse_board_config(toml).unwrap();
        assert_eq!(board.fixed_step_mode, Some(StepMode::Sixteenth));
    }

    #[test]
    fn test_invalid_step_mode_literal_rejected() {
        let toml = r#"
name = "bad"
kind = "step_dir"
steps_per_revolution = 200
fixed_step_mode = 12
"#;

        assert!(matches!(
            parse_board_config(toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }
}
