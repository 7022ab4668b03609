//! Configuration file loading (std only).

use core::fmt::Write;

use crate::config::{validate_config, PlannerConfig};
use crate::error::{ConfigError, Result};

/// Load and validate a planner configuration from a TOML file.
///
/// # Errors
///
/// Returns a config error for I/O failures, parse failures, and invalid
/// limit values.
pub fn load_config(path: &str) -> Result<PlannerConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        let mut msg = heapless::String::<128>::new();
        let _ = write!(msg, "{}", e);
        ConfigError::IoError(msg)
    })?;

    let config: PlannerConfig = toml::from_str(&contents).map_err(|e| {
        let mut msg = heapless::String::<128>::new();
        let _ = write!(msg, "{}", e);
        ConfigError::ParseError(msg)
    })?;

    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use crate::config::{validate_config, PlannerConfig};

    const AXES_TOML: &str = r#"
[[axes]]
max_velocity = 1.0
max_acceleration = 2.0
max_jerk = 10.0

[[axes]]
max_velocity = 0.5
min_velocity = -0.25
max_acceleration = 1.0
max_jerk = 5.0
"#;

    #[test]
    fn test_parse_axes() {
        let config: PlannerConfig = toml::from_str(AXES_TOML).expect("parses");
        assert_eq!(config.axes.len(), 2);
        assert_eq!(config.axes[1].min_velocity, Some(-0.25));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_error() {
        let result: core::result::Result<PlannerConfig, _> = toml::from_str("axes = 3");
        assert!(result.is_err());
    }
}
