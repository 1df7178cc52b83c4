//! Movi configuration system.
//!
//! TOML-based configuration with full validation. All sections use sensible
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use movi_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("agent at {}", config.agent.base_url);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::MoviConfig;

use std::path::Path;

use movi_common::ConfigError;

/// Load config from `path`, or from the platform default path when `None`.
///
/// The default path is created from the documented template if missing.
/// Environment overrides are applied after parsing.
pub fn load_config(path: Option<&Path>) -> Result<MoviConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    config.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movi.toml");
        std::fs::write(&path, "[routing]\nprofile = \"walking\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.routing.profile, "walking");
    }

    #[test]
    fn load_config_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
