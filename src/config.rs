//! Persistent settings for encode/decode sessions.
//!
//! Stored as TOML. The placement seed lives here so that it can be shared
//! together with the key file:
//!
//! ```toml
//! [placement]
//! mode = "permuted"
//! seed = 1234
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::keys::write_private_file;
use crate::stego::Placement;

/// Errors that can occur when reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Session settings shared by encoder and decoder.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StegoConfig {
    /// Where frame bits are placed in the carrier.
    #[serde(default)]
    pub placement: Placement,
}

impl StegoConfig {
    pub fn with_placement(placement: Placement) -> Self {
        Self { placement }
    }

    /// Loads the config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: StegoConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // The seed is key material
        let content = toml::to_string_pretty(self)?;
        write_private_file(path, content.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_sequential() {
        assert_eq!(StegoConfig::default().placement, Placement::Sequential);
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let config = StegoConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, StegoConfig::default());
    }

    #[test]
    fn test_empty_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();

        assert_eq!(StegoConfig::load(&path).unwrap(), StegoConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("pixelveil.toml");

        let config = StegoConfig::with_placement(Placement::Permuted { seed: 31337 });
        config.save(&path).unwrap();

        assert_eq!(StegoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_parse_table_form() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixelveil.toml");
        fs::write(&path, "[placement]\nmode = \"permuted\"\nseed = 5\n").unwrap();

        let config = StegoConfig::load(&path).unwrap();
        assert_eq!(config.placement, Placement::Permuted { seed: 5 });
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixelveil.toml");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        StegoConfig::with_placement(Placement::Permuted { seed: 1 })
            .save(&path)
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[placement]\nmode = \"diagonal\"\n").unwrap();

        assert!(matches!(StegoConfig::load(&path), Err(ConfigError::TomlParseError(_))));
    }
}
