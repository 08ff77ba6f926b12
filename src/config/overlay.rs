//! Annotation overlay configuration.

use serde::{Deserialize, Serialize};

/// Text and cursor indicator settings for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    /// Font family of the overlay text format.
    pub font_family: String,

    /// Locale name passed to the text format.
    pub locale: String,

    /// Base font size in DIPs (4-200). Individual draws may override it.
    pub font_size: f32,

    /// Radius of the synthetic cursor dot (1-64 px).
    pub cursor_radius: f32,

    /// Stroke width of the cursor dot outline (0.5-16 px).
    pub cursor_outline_width: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_family: "Segoe UI".to_string(),
            locale: "en-us".to_string(),
            font_size: 14.0,
            cursor_radius: 5.0,
            cursor_outline_width: 1.0,
        }
    }
}

impl OverlayConfig {
    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        if self.font_family.trim().is_empty() {
            self.font_family = Self::default().font_family;
        }
        if self.locale.trim().is_empty() {
            self.locale = Self::default().locale;
        }
        self.font_size = self.font_size.clamp(4.0, 200.0);
        self.cursor_radius = self.cursor_radius.clamp(1.0, 64.0);
        self.cursor_outline_width = self.cursor_outline_width.clamp(0.5, 16.0);
    }
}
