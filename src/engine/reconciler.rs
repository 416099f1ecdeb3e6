//! Brings the surface's series and scale margins in line with one envelope.

use eframe::egui::Color32;
use strum_macros::Display;

use crate::config::DF;
use crate::config::plot::PLOT_CONFIG;
use crate::domain::{
    Bar, DisplayConfig, DisplayMode, MarketEnvelope, SeriesKind, has_volume_data, sorted_points,
};
use crate::engine::events::Signal;
use crate::engine::layout::PanelLayout;
use crate::engine::registry::{
    HistogramBar, PriceLine, SeriesData, SeriesKey, SeriesOptions,
};
use crate::engine::surface::{ChartSurface, ScaleId};

/// Price summary for the host's header. Emitted once per reconciliation
/// with non-empty history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceHeader {
    pub last_price: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Last bar's volume, `None` when the history carries no volume at all
    pub volume: Option<f64>,
}

impl PriceHeader {
    pub fn from_history(sorted: &[Bar]) -> Option<Self> {
        let last = sorted.last()?;
        // A single bar compares against itself
        let prev = sorted.len().checked_sub(2).map_or(last, |i| &sorted[i]);
        let change = last.close - prev.close;
        let change_percent = if prev.close != 0.0 {
            change / prev.close * 100.0
        } else {
            0.0
        };
        Some(Self {
            last_price: last.close,
            change,
            change_percent,
            volume: has_volume_data(sorted).then_some(last.volume),
        })
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            ConfidenceTier::High
        } else if score >= 45.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            ConfidenceTier::High => PLOT_CONFIG.color_confidence_high,
            ConfidenceTier::Medium => PLOT_CONFIG.color_confidence_medium,
            ConfidenceTier::Low => PLOT_CONFIG.color_confidence_low,
        }
    }
}

/// Confidence of the rendered forecast (lab mode only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastBadge {
    pub confidence: f64,
    pub tier: ConfidenceTier,
}

/// Parses an HTML colour string from the envelope.
pub fn parse_series_color(html: &str) -> Color32 {
    match colorgrad::Color::from_html(html) {
        Ok(c) => {
            let rgba8 = c.to_rgba8();
            Color32::from_rgba_unmultiplied(rgba8[0], rgba8[1], rgba8[2], rgba8[3])
        }
        Err(_) => PLOT_CONFIG.fallback_series_color,
    }
}

fn histogram_color(value: f64) -> Color32 {
    if value >= 0.0 {
        PLOT_CONFIG.histogram_positive_color
    } else {
        PLOT_CONFIG.histogram_negative_color
    }
}

#[derive(Default)]
pub struct DataReconciler {
    layout: PanelLayout,
    header: Signal<PriceHeader>,
    last_header: Option<PriceHeader>,
    badge: Option<ForecastBadge>,
}

impl DataReconciler {
    pub fn new(layout: PanelLayout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn on_price_header(&mut self, listener: impl FnMut(&PriceHeader) + 'static) {
        self.header.register(listener);
    }

    pub fn last_header(&self) -> Option<PriceHeader> {
        self.last_header
    }

    pub fn forecast_badge(&self) -> Option<ForecastBadge> {
        self.badge
    }

    /// Wholesale, idempotent update of `surface` from `envelope`.
    pub fn reconcile(&mut self, surface: &mut ChartSurface, envelope: &MarketEnvelope, display: &DisplayConfig) {
        crate::trace_time!("Reconcile envelope", 2000, {
            self.reconcile_inner(surface, envelope, display)
        })
    }

    fn reconcile_inner(&mut self, surface: &mut ChartSurface, envelope: &MarketEnvelope, display: &DisplayConfig) {
        Self::ensure_persistent_series(surface);

        // 1. Candles + price header
        let history = envelope.sorted_history();
        let guides = if display.show_support_resistance {
            range_guides(&history)
        } else {
            Vec::new()
        };
        let registry = surface.registry_mut();
        registry.set_data(&SeriesKey::Candles, SeriesData::Candles(history.clone()));
        registry.apply_options(&SeriesKey::Candles, |o| o.price_lines = guides);

        // Empty history emits nothing but still clears the stale header
        self.last_header = PriceHeader::from_history(&history);
        if let Some(header) = &self.last_header {
            self.header.emit(header);
        }

        // 2. Volume strip
        let volume_shown = display.show_volume && has_volume_data(&history);
        let volume = history
            .iter()
            .map(|b| HistogramBar {
                time: b.time,
                value: b.volume,
                color: volume_color(b),
            })
            .collect();
        registry.set_data(&SeriesKey::Volume, SeriesData::Histogram(volume));
        registry.set_visible(&SeriesKey::Volume, volume_shown);

        // 3. Forecast line
        let prediction = envelope
            .primary_prediction()
            .filter(|_| display.mode == DisplayMode::Lab);
        match prediction {
            Some(pred) => {
                registry.set_data(&SeriesKey::Forecast, SeriesData::Line(pred.forecast_line()));
                registry.set_visible(&SeriesKey::Forecast, true);
                self.badge = pred.confidence_score.map(|c| ForecastBadge {
                    confidence: c,
                    tier: ConfidenceTier::from_score(c),
                });
            }
            None => {
                registry.set_data(&SeriesKey::Forecast, SeriesData::Line(Vec::new()));
                registry.set_visible(&SeriesKey::Forecast, false);
                self.badge = None;
            }
        }

        // 4. Tear down and rebuild overlays + panels
        let removed = registry.remove_where(SeriesKey::is_transient);
        surface.retain_scales(|id| !matches!(id, ScaleId::Panel { .. }));

        let panel_count = match display.mode {
            DisplayMode::Market => {
                self.build_overlays(surface, envelope);
                self.build_panels(surface, envelope, volume_shown)
            }
            DisplayMode::Lab => 0,
        };

        // Margins only after series exist: slot count is this call's final panel count
        self.apply_margins(surface, display.mode, panel_count, volume_shown);

        surface.sync_time_scale();
        surface.refresh_scales();

        if DF.log_reconcile {
            log::info!(
                "Reconciled {} bars [{}]: -{} +{} transient series, {} panels, volume {}",
                history.len(),
                display.mode,
                removed,
                surface.registry().keys().filter(|k| k.is_transient()).count(),
                panel_count,
                if volume_shown { "shown" } else { "hidden" }
            );
        }
    }

    fn ensure_persistent_series(surface: &mut ChartSurface) {
        let registry = surface.registry_mut();
        if !registry.contains(&SeriesKey::Candles) {
            registry.add(
                SeriesKey::Candles,
                SeriesOptions::new("", PLOT_CONFIG.candle_bullish_color, ScaleId::Main),
                SeriesData::Candles(Vec::new()),
            );
        }
        if !registry.contains(&SeriesKey::Volume) {
            registry.add(
                SeriesKey::Volume,
                SeriesOptions::new("Vol", PLOT_CONFIG.color_text_subdued, ScaleId::Volume)
                    .without_last_value()
                    .hidden(),
                SeriesData::Histogram(Vec::new()),
            );
        }
        if !registry.contains(&SeriesKey::Forecast) {
            registry.add(
                SeriesKey::Forecast,
                SeriesOptions::new(PLOT_CONFIG.forecast_title, PLOT_CONFIG.forecast_color, ScaleId::Main)
                    .dashed()
                    .width(PLOT_CONFIG.forecast_line_width)
                    .without_last_value()
                    .hidden(),
                SeriesData::Line(Vec::new()),
            );
        }
    }

    fn build_overlays(&self, surface: &mut ChartSurface, envelope: &MarketEnvelope) {
        let registry = surface.registry_mut();
        for (index, overlay) in envelope.technical_indicators.iter().enumerate() {
            let data = sorted_points(&overlay.data);
            registry.add(
                SeriesKey::Overlay { index },
                SeriesOptions::new(&overlay.name, parse_series_color(&overlay.color), ScaleId::Main)
                    .width(PLOT_CONFIG.overlay_line_width)
                    .without_last_value(),
                SeriesData::Line(data),
            );
        }
    }

    /// Returns the number of panel slots laid out.
    fn build_panels(&self, surface: &mut ChartSurface, envelope: &MarketEnvelope, volume_shown: bool) -> usize {
        let panel_count = envelope.panels.len();
        for (slot, panel) in envelope.panels.iter().enumerate() {
            let scale = ScaleId::Panel {
                slot,
                panel_id: panel.id.clone(),
            };
            for (series_index, s) in panel.series.iter().enumerate() {
                let points = sorted_points(&s.data);
                let data = match s.kind {
                    SeriesKind::Line => SeriesData::Line(points),
                    SeriesKind::Histogram => SeriesData::Histogram(
                        points
                            .into_iter()
                            .map(|p| HistogramBar {
                                time: p.time,
                                value: p.value,
                                color: histogram_color(p.value),
                            })
                            .collect(),
                    ),
                };
                surface.registry_mut().add(
                    SeriesKey::Panel {
                        slot,
                        series: series_index,
                        panel_id: panel.id.clone(),
                    },
                    SeriesOptions::new(&s.name, parse_series_color(&s.color), scale.clone())
                        .width(PLOT_CONFIG.panel_line_width),
                    data,
                );
            }
            surface.set_scale_margins(scale, self.layout.panel_margins(slot, panel_count, volume_shown));
        }
        panel_count
    }

    fn apply_margins(&self, surface: &mut ChartSurface, mode: DisplayMode, panel_count: usize, volume_shown: bool) {
        let main = match mode {
            DisplayMode::Market => self.layout.main_margins(panel_count, volume_shown),
            DisplayMode::Lab => self.layout.simple_main_margins(volume_shown),
        };
        surface.set_scale_margins(ScaleId::Main, main);
        surface.set_scale_margins(ScaleId::Volume, self.layout.volume_margins());

        if DF.log_layout {
            log::info!(
                "Layout: main {:?}, {} panels of {:.3}",
                main,
                panel_count,
                self.layout.effective_panel_height(panel_count, volume_shown)
            );
        }
    }
}

fn volume_color(bar: &Bar) -> Color32 {
    let base = if bar.is_bullish() {
        PLOT_CONFIG.candle_bullish_color
    } else {
        PLOT_CONFIG.candle_bearish_color
    };
    base.gamma_multiply(PLOT_CONFIG.volume_opacity_pct)
}

/// Highest high and lowest low of the received history as dashed guides.
fn range_guides(history: &[Bar]) -> Vec<PriceLine> {
    let Some(first) = history.first() else {
        return Vec::new();
    };
    let (low, high) = history
        .iter()
        .fold((first.low, first.high), |(lo, hi), b| (lo.min(b.low), hi.max(b.high)));
    vec![
        PriceLine {
            price: high,
            color: PLOT_CONFIG.resistance_line_color,
            title: "R".to_string(),
        },
        PriceLine {
            price: low,
            color: PLOT_CONFIG.support_line_color,
            title: "S".to_string(),
        },
    ]
}
