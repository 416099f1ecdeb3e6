//! Chart visualization configuration

use eframe::egui::Color32;

pub struct PlotConfig {
    // --- CANDLESTICKS ---
    pub candle_bullish_color: Color32,
    pub candle_bearish_color: Color32,
    pub candle_width_pct: f32, // 0.0 to 1.0 (relative to bar spacing)
    pub candle_wick_width: f32, // Pixels

    // --- VOLUME STRIP ---
    /// Volume bars reuse candle colors at this opacity
    pub volume_opacity_pct: f32,

    // --- HISTOGRAM PANELS (tinted by sign) ---
    pub histogram_positive_color: Color32,
    pub histogram_negative_color: Color32,

    // --- FORECAST LINE ---
    pub forecast_color: Color32,
    pub forecast_line_width: f32,
    pub forecast_dash_length: f32,
    pub forecast_title: &'static str,

    /// Used when an envelope color string can't be parsed
    pub fallback_series_color: Color32,
    pub overlay_line_width: f32,
    pub panel_line_width: f32,

    // --- PRICE LINES (support/resistance guides) ---
    pub support_line_color: Color32,
    pub resistance_line_color: Color32,
    pub price_line_dash_length: f32,

    // --- ANNOTATIONS ---
    pub annotation_color: Color32,
    pub annotation_preview_color: Color32,
    pub annotation_line_width: f32,
    pub annotation_marker_radius: f32,
    pub annotation_dash_length: f32,
    pub annotation_gap_length: f32,

    // --- TIME SCALE ---
    /// Pixels between consecutive bars before any zoom
    pub default_bar_spacing: f64,
    pub min_bar_spacing: f64,
    pub max_bar_spacing: f64,
    /// Empty bars kept to the right of the last bar
    pub default_right_offset: f64,

    // --- AUTOSCALE ---
    /// Range padding when every value on a scale is identical
    pub flat_range_padding_pct: f64,

    // --- CHROME ---
    pub color_background: Color32,
    pub color_grid: Color32,
    pub color_crosshair: Color32,
    pub color_text_primary: Color32,
    pub color_text_subdued: Color32,
    pub color_watermark: Color32,
    pub color_scale_border: Color32,

    // --- CONFIDENCE BADGE ---
    pub color_confidence_high: Color32,
    pub color_confidence_medium: Color32,
    pub color_confidence_low: Color32,
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    candle_bullish_color: Color32::from_rgb(14, 203, 129), // #0ecb81
    candle_bearish_color: Color32::from_rgb(246, 70, 93),  // #f6465d
    candle_width_pct: 0.8, // 80% width leaves a small gap between candles
    candle_wick_width: 1.0,

    volume_opacity_pct: 0.5,

    histogram_positive_color: Color32::from_rgb(38, 166, 154), // #26a69a
    histogram_negative_color: Color32::from_rgb(239, 83, 80),  // #ef5350

    forecast_color: Color32::from_rgb(252, 213, 53), // #fcd535
    forecast_line_width: 2.0,
    forecast_dash_length: 6.0,
    forecast_title: "AI Forecast",

    fallback_series_color: Color32::from_rgb(204, 204, 204), // #ccc
    overlay_line_width: 1.0,
    panel_line_width: 1.0,

    support_line_color: Color32::from_rgb(38, 166, 154),
    resistance_line_color: Color32::from_rgb(239, 83, 80),
    price_line_dash_length: 8.0,

    annotation_color: Color32::from_rgb(41, 98, 255), // #2962ff
    annotation_preview_color: Color32::from_rgb(120, 150, 255),
    annotation_line_width: 2.0,
    annotation_marker_radius: 3.5,
    annotation_dash_length: 8.0,
    annotation_gap_length: 5.0,

    default_bar_spacing: 8.0,
    min_bar_spacing: 1.0,
    max_bar_spacing: 60.0,
    default_right_offset: 3.0,

    flat_range_padding_pct: 0.01,

    color_background: Color32::from_rgb(11, 14, 17), // #0b0e11
    color_grid: Color32::from_rgb(24, 26, 32),       // #181a20
    color_crosshair: Color32::from_gray(85),
    color_text_primary: Color32::from_rgb(234, 236, 239),
    color_text_subdued: Color32::from_rgb(132, 142, 156), // #848e9c
    color_watermark: Color32::from_rgba_premultiplied(12, 12, 12, 12),
    color_scale_border: Color32::from_rgb(43, 49, 57), // #2b3139

    color_confidence_high: Color32::from_rgb(14, 203, 129),
    color_confidence_medium: Color32::from_rgb(252, 213, 53),
    color_confidence_low: Color32::from_rgb(246, 70, 93),
};
