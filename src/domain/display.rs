use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Candles plus overlays and oscillator panels
    #[default]
    #[strum(to_string = "Market")]
    Market,
    /// Candles plus the forecast line
    #[strum(to_string = "Lab")]
    Lab,
}

impl DisplayMode {
    pub fn watermark(&self) -> &'static str {
        match self {
            DisplayMode::Market => "MARKET VIEW",
            DisplayMode::Lab => "QUANT LAB",
        }
    }
}

/// Host-supplied display flags. Read on every reconciliation, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub show_volume: bool,
    pub show_support_resistance: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Market,
            show_volume: true,
            show_support_resistance: false,
        }
    }
}

impl DisplayConfig {
    pub fn with_mode(mode: DisplayMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}
