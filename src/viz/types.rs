//! Public types and constants for the visualization module.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHART_WIDTH: u32 = 480;
pub const DEFAULT_CHART_HEIGHT: u32 = 320;

/// Canvas size and number formatting for chart output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Locale tag for tick labels (`en`, `de`, `fr`, …).
    pub locale: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            locale: "en".into(),
        }
    }
}
