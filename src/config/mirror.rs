//! Mirror configuration.
//!
//! Source lookup, host window sizing and the timing of the driver loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::overlay::OverlayConfig;

/// Top-level configuration for a mirror session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MirrorConfig {
    /// Window class of the window to mirror.
    pub source_class: String,

    /// Optional exact window title, narrows the class lookup.
    pub source_title: Option<String>,

    /// Period of the source-size re-check (50-5000 ms).
    /// This is the worst-case lag before a source resize is picked up.
    pub poll_interval_ms: u64,

    /// Sleep between driver ticks (0-100 ms).
    pub frame_interval_ms: u64,

    /// Padding added to the scaled source size when computing the host minimum (0-256 px).
    pub content_margin: i32,

    /// Initial outer size of the host window.
    pub initial_host_width: i32,
    pub initial_host_height: i32,

    /// Minimum host size used while the source size is unknown.
    pub fallback_min_width: i32,
    pub fallback_min_height: i32,

    /// Annotation overlay settings.
    pub overlay: OverlayConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            source_class: "UnrealWindow".to_string(),
            source_title: None,
            poll_interval_ms: 500,
            frame_interval_ms: 1,
            content_margin: 16,
            initial_host_width: 800,
            initial_host_height: 600,
            fallback_min_width: 320,
            fallback_min_height: 240,
            overlay: OverlayConfig::default(),
        }
    }
}

impl MirrorConfig {
    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.poll_interval_ms = self.poll_interval_ms.clamp(50, 5000);
        self.frame_interval_ms = self.frame_interval_ms.min(100);
        self.content_margin = self.content_margin.clamp(0, 256);
        self.fallback_min_width = self.fallback_min_width.max(1);
        self.fallback_min_height = self.fallback_min_height.max(1);
        self.initial_host_width = self.initial_host_width.max(self.fallback_min_width);
        self.initial_host_height = self.initial_host_height.max(self.fallback_min_height);
        self.overlay.validate();
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::default();
        assert_eq!(config.source_class, "UnrealWindow");
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.content_margin, 16);
        assert_eq!((config.initial_host_width, config.initial_host_height), (800, 600));
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = MirrorConfig {
            poll_interval_ms: 1,
            frame_interval_ms: 10_000,
            content_margin: -5,
            initial_host_width: 10,
            ..Default::default()
        };
        config.validate();

        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.frame_interval_ms, 100);
        assert_eq!(config.content_margin, 0);
        assert_eq!(config.initial_host_width, config.fallback_min_width);
    }

    #[test]
    fn test_camel_case_round_trip_fields() {
        let json = serde_json::to_value(MirrorConfig::default()).unwrap();
        assert!(json.get("pollIntervalMs").is_some());
        assert!(json.get("sourceClass").is_some());
        assert!(json["overlay"].get("cursorRadius").is_some());
    }
}
