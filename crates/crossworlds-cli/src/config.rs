//! Configuration file loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use crossworlds_core::EditorConfig;
use tracing::{info, warn};

/// Parse an editor configuration from a TOML file
pub fn load(path: &Path) -> Result<EditorConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: EditorConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Load `path`, falling back to defaults when it is missing or unreadable.
///
/// Values that parse but cannot be used (e.g., a zero interval) are an error.
pub fn load_or_default(path: &Path) -> Result<EditorConfig> {
    let config = if path.exists() {
        match load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                EditorConfig::default()
            }
        }
    } else {
        warn!("Config file {} not found, using defaults", path.display());
        EditorConfig::default()
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
process_name = "SonicRacingCrossWorlds"
attach_interval_ms = 500
refresh_interval_ms = 250
auto_refresh = false
"#,
        );

        let config = load(file.path()).unwrap();

        assert_eq!(config.process_name, "SonicRacingCrossWorlds");
        assert_eq!(config.attach_interval_ms, 500);
        assert_eq!(config.refresh_interval_ms, 250);
        assert!(!config.auto_refresh);
    }

    #[test]
    fn test_load_partial_config_keeps_defaults() {
        let file = write_config("refresh_interval_ms = 3000\n");

        let config = load(file.path()).unwrap();

        assert_eq!(config.refresh_interval_ms, 3000);
        assert_eq!(
            config.process_name,
            EditorConfig::default().process_name
        );
        assert!(config.auto_refresh);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let file = write_config("attach_interval_ms = \"soon\"\n");
        assert!(load(file.path()).is_err());
        assert_eq!(
            load_or_default(file.path()).unwrap(),
            EditorConfig::default()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("attach_interval_ms = 0\n");
        assert!(load_or_default(file.path()).is_err());
    }
}
