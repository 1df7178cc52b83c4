//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all and
//! collects every problem into a single `ConfigError`.

mod agent;
mod helpers;
mod misc;


use crate::schema::MoviConfig;
use movi_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MoviConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    agent::validate_agent(&mut errors, config);
    misc::validate_session(&mut errors, config);
    misc::validate_speech(&mut errors, config);
    misc::validate_routing(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
