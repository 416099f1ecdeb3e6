use eframe::egui::{Color32, Frame, Margin, Stroke};

use crate::config::plot::PLOT_CONFIG;

/// UI Colors for consistent theming
#[derive(Clone, Copy, Default)]
pub struct UiColors {
    pub label: Color32,
    pub heading: Color32,
    pub top_panel: Color32,
    pub central_panel: Color32,
    pub tool_selected: Color32,
    pub price_up: Color32,
    pub price_down: Color32,
}

#[derive(Default, Clone, Copy)]
pub struct UiConfig {
    pub colors: UiColors,
    pub legend_font_size: f32,
    pub watermark_font_size: f32,
    pub axis_font_size: f32,
    /// Scroll delta (points) that doubles or halves bar spacing
    pub zoom_scroll_unit: f32,
}

pub static UI_CONFIG: UiConfig = UiConfig {
    colors: UiColors {
        label: Color32::GRAY,
        heading: Color32::from_rgb(234, 236, 239),
        top_panel: Color32::from_rgb(22, 26, 30),
        central_panel: PLOT_CONFIG.color_background,
        tool_selected: Color32::from_rgb(41, 98, 255),
        price_up: PLOT_CONFIG.candle_bullish_color,
        price_down: PLOT_CONFIG.candle_bearish_color,
    },
    legend_font_size: 11.0,
    watermark_font_size: 64.0,
    axis_font_size: 10.0,
    zoom_scroll_unit: 200.0,
};

impl UiConfig {
    /// Frame for the Top Toolbar (Standard padding)
    pub fn top_panel_frame(&self) -> Frame {
        Frame {
            fill: self.colors.top_panel,
            stroke: Stroke::NONE,
            inner_margin: Margin::same(8),
            ..Default::default()
        }
    }

    /// Frame for the drawing toolbar (Tighter vertical padding)
    pub fn tool_panel_frame(&self) -> Frame {
        Frame {
            fill: self.colors.top_panel,
            stroke: Stroke::NONE,
            inner_margin: Margin::symmetric(8, 4),
            ..Default::default()
        }
    }

    pub fn central_panel_frame(&self) -> Frame {
        Frame {
            fill: self.colors.central_panel,
            stroke: Stroke::NONE,
            inner_margin: Margin::ZERO,
            ..Default::default()
        }
    }
}
