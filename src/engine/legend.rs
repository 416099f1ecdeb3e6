//! Crosshair readout for the hovered time bucket.

use std::fmt;

use eframe::egui::Color32;

use crate::config::plot::PLOT_CONFIG;
use crate::engine::registry::{SeriesKey, SeriesRegistry, SeriesValue};
use crate::utils::{epoch_sec_to_date_string, format_price, format_volume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    Close,
    Date,
    Volume,
    Series,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendToken {
    pub text: String,
    pub color: Color32,
    pub role: TokenRole,
}

impl LegendToken {
    fn new(text: String, color: Color32, role: TokenRole) -> Self {
        Self { text, color, role }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    pub tokens: Vec<LegendToken>,
}

impl Legend {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token.text)?;
        }
        Ok(())
    }
}

pub struct LegendReadout;

impl LegendReadout {
    /// Candle close and date, then volume, overlays and panel series in
    /// registry order. Hidden series contribute nothing.
    pub fn compose(registry: &SeriesRegistry, hovered_time: i64) -> Legend {
        let mut tokens = Vec::new();
        for (key, series) in registry.iter() {
            if !series.options.visible {
                continue;
            }
            let Some(value) = series.data.value_at(hovered_time) else {
                continue;
            };
            match (key, value) {
                (SeriesKey::Candles, SeriesValue::Ohlc(bar)) => {
                    tokens.push(LegendToken::new(
                        format_price(bar.close),
                        PLOT_CONFIG.color_text_primary,
                        TokenRole::Close,
                    ));
                    tokens.push(LegendToken::new(
                        epoch_sec_to_date_string(bar.time),
                        PLOT_CONFIG.color_text_subdued,
                        TokenRole::Date,
                    ));
                }
                (SeriesKey::Volume, v) => tokens.push(LegendToken::new(
                    format!("Vol:{}", format_volume(v.scalar())),
                    PLOT_CONFIG.color_text_subdued,
                    TokenRole::Volume,
                )),
                (SeriesKey::Overlay { .. } | SeriesKey::Panel { .. }, v) => tokens.push(LegendToken::new(
                    format!("{}:{:.2}", series.options.title, v.scalar()),
                    series.options.color,
                    TokenRole::Series,
                )),
                // Forecast has its own badge
                _ => {}
            }
        }
        Legend { tokens }
    }
}
