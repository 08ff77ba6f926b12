//! Configuration management.
//!
//! ## Architecture
//!
//! - `MirrorConfig`: source lookup, host sizing, poll and frame timing
//! - `OverlayConfig`: text format and cursor indicator settings
//!
//! Configuration is read once at startup (JSON, camelCase keys, every field
//! optional) and handed to the components by value. There is no runtime
//! mutation and nothing is written back.

pub mod mirror;
pub mod overlay;

use std::path::Path;

pub use mirror::MirrorConfig;
pub use overlay::OverlayConfig;

use crate::error::{MirrorError, MirrorResult};

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "THUMBMIRROR_CONFIG";

impl MirrorConfig {
    /// Parse a JSON document and clamp it into range.
    pub fn from_json(json: &str) -> MirrorResult<Self> {
        let mut config: MirrorConfig = serde_json::from_str(json)?;
        config.validate();
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> MirrorResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| MirrorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Load the file named by `THUMBMIRROR_CONFIG`, or defaults when unset.
    pub fn load_from_env() -> MirrorResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                log::info!("[Config] Loading {}", Path::new(&path).display());
                Self::from_file(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_partial() {
        let config = MirrorConfig::from_json(
            r#"{ "sourceClass": "Notepad", "pollIntervalMs": 250, "overlay": { "cursorRadius": 8 } }"#,
        )
        .unwrap();

        assert_eq!(config.source_class, "Notepad");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.overlay.cursor_radius, 8.0);
        // Untouched fields keep their defaults
        assert_eq!(config.content_margin, 16);
        assert_eq!(config.overlay.font_family, "Segoe UI");
    }

    #[test]
    fn test_from_json_clamps() {
        let config = MirrorConfig::from_json(r#"{ "pollIntervalMs": 0 }"#).unwrap();
        assert_eq!(config.poll_interval_ms, 50);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = MirrorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MirrorError::Config(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = MirrorConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("here.json"));
    }
}
