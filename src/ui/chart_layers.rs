use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2};

use crate::config::plot::PLOT_CONFIG;
use crate::domain::CandleType;
use crate::engine::{
    ChartSurface, CoordinateSpace, Legend, LineStyle, ScaleId, Series, SeriesData, ShapeGlyph,
};
use crate::ui::UI_CONFIG;
use crate::utils::{epoch_sec_to_date_time_string, format_price};

/// Everything a layer needs to paint one frame.
pub struct LayerContext<'a> {
    pub surface: &'a ChartSurface,
    /// Screen rect of the pane. Engine coordinates are relative to its corner.
    pub rect: Rect,
    pub glyphs: &'a [ShapeGlyph],
    pub legend: Option<&'a Legend>,
    /// Pointer in pane coordinates
    pub pointer: Option<(f64, f64)>,
    pub watermark: &'static str,
}

impl LayerContext<'_> {
    fn to_screen(&self, x: f64, y: f64) -> Pos2 {
        self.rect.min + vec2(x as f32, y as f32)
    }

    fn bar_width(&self) -> f32 {
        (self.surface.time_scale().bar_spacing() as f32 * PLOT_CONFIG.candle_width_pct).max(1.0)
    }

    /// Visible series in registry order.
    fn visible_series(&self) -> impl Iterator<Item = &Series> {
        self.surface
            .registry()
            .iter()
            .map(|(_, s)| s)
            .filter(|s| s.options.visible)
    }

    /// Drops x positions far outside the pane so huge histories stay cheap.
    fn in_view(&self, x: f64) -> bool {
        let margin = self.surface.time_scale().bar_spacing();
        x >= -margin && x <= self.rect.width() as f64 + margin
    }
}

pub trait ChartLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext);
}

fn dashed(painter: &Painter, points: &[Pos2], stroke: Stroke, dash: f32) {
    painter.extend(Shape::dashed_line(points, stroke, dash, PLOT_CONFIG.annotation_gap_length));
}

// ============================================================================
// 1. WATERMARK
// ============================================================================
pub struct WatermarkLayer;

impl ChartLayer for WatermarkLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        painter.text(
            ctx.rect.center(),
            Align2::CENTER_CENTER,
            ctx.watermark,
            FontId::proportional(UI_CONFIG.watermark_font_size),
            PLOT_CONFIG.color_watermark,
        );
    }
}

// ============================================================================
// 2. GRID (horizontal lines on the main scale, labelled at the right edge)
// ============================================================================
pub struct GridLayer;

impl ChartLayer for GridLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        let height = ctx.rect.height() as f64;
        let lines = 6;
        for i in 1..lines {
            let y = height * i as f64 / lines as f64;
            let Some(price) = ctx.surface.y_to_price(y) else {
                continue;
            };
            let left = ctx.to_screen(0.0, y);
            let right = ctx.to_screen(ctx.rect.width() as f64, y);
            painter.line_segment([left, right], Stroke::new(1.0, PLOT_CONFIG.color_grid));
            painter.text(
                right - vec2(4.0, 2.0),
                Align2::RIGHT_BOTTOM,
                format_price(price),
                FontId::monospace(UI_CONFIG.axis_font_size),
                PLOT_CONFIG.color_text_subdued,
            );
        }
    }
}

// ============================================================================
// 3. HISTOGRAMS (volume strip and histogram panels)
// ============================================================================
pub struct HistogramLayer;

impl ChartLayer for HistogramLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        let half = ctx.bar_width() / 2.0;
        for series in ctx.visible_series() {
            let SeriesData::Histogram(bars) = &series.data else {
                continue;
            };
            let scale = &series.options.scale;
            let Some(base_y) = ctx.surface.price_to_y_on(scale, 0.0) else {
                continue;
            };
            for bar in bars {
                let Some(x) = ctx.surface.time_to_x_unclipped(bar.time) else {
                    continue;
                };
                if !ctx.in_view(x) {
                    continue;
                }
                let Some(y) = ctx.surface.price_to_y_on(scale, bar.value) else {
                    continue;
                };
                let a = ctx.to_screen(x, base_y);
                let b = ctx.to_screen(x, y);
                let rect = Rect::from_two_pos(a - vec2(half, 0.0), b + vec2(half, 0.0));
                painter.rect_filled(rect, 0.0, bar.color);
            }
        }
    }
}

// ============================================================================
// 4. CANDLES
// ============================================================================
pub struct CandlestickLayer;

impl ChartLayer for CandlestickLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        let half = ctx.bar_width() / 2.0;
        for series in ctx.visible_series() {
            let SeriesData::Candles(bars) = &series.data else {
                continue;
            };
            let scale = &series.options.scale;
            for bar in bars {
                let Some(x) = ctx.surface.time_to_x_unclipped(bar.time) else {
                    continue;
                };
                if !ctx.in_view(x) {
                    continue;
                }
                let y = |price: f64| ctx.surface.price_to_y_on(scale, price);
                let (Some(high), Some(low), Some(open), Some(close)) =
                    (y(bar.high), y(bar.low), y(bar.open), y(bar.close))
                else {
                    continue;
                };
                let color = match bar.get_type() {
                    CandleType::Bullish => PLOT_CONFIG.candle_bullish_color,
                    CandleType::Bearish => PLOT_CONFIG.candle_bearish_color,
                };

                painter.line_segment(
                    [ctx.to_screen(x, high), ctx.to_screen(x, low)],
                    Stroke::new(PLOT_CONFIG.candle_wick_width, color),
                );

                let top = ctx.to_screen(x, open.min(close));
                let bottom = ctx.to_screen(x, open.max(close));
                // Doji still gets a visible 1px body
                let body = Rect::from_min_max(
                    top - vec2(half, 0.0),
                    pos2(bottom.x + half, bottom.y.max(top.y + 1.0)),
                );
                painter.rect_filled(body, 0.0, color);
            }
        }
    }
}

// ============================================================================
// 5. LINES (overlays, panel lines, forecast)
// ============================================================================
pub struct LineSeriesLayer;

impl ChartLayer for LineSeriesLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        for series in ctx.visible_series() {
            let SeriesData::Line(points) = &series.data else {
                continue;
            };
            let opts = &series.options;
            let path: Vec<Pos2> = points
                .iter()
                .filter_map(|p| {
                    let x = ctx.surface.time_to_x_unclipped(p.time)?;
                    let y = ctx.surface.price_to_y_on(&opts.scale, p.value)?;
                    Some(ctx.to_screen(x, y))
                })
                .collect();
            if path.len() < 2 {
                continue;
            }
            let stroke = Stroke::new(opts.line_width, opts.color);
            match opts.line_style {
                LineStyle::Solid => {
                    painter.add(Shape::line(path, stroke));
                }
                LineStyle::Dashed => dashed(painter, &path, stroke, PLOT_CONFIG.forecast_dash_length),
            }
        }
    }
}

// ============================================================================
// 6. PRICE LINES (support / resistance guides)
// ============================================================================
pub struct PriceLineLayer;

impl ChartLayer for PriceLineLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        let width = ctx.rect.width() as f64;
        for series in ctx.visible_series() {
            for line in &series.options.price_lines {
                let Some(y) = ctx.surface.price_to_y_on(&series.options.scale, line.price) else {
                    continue;
                };
                let from = ctx.to_screen(0.0, y);
                let to = ctx.to_screen(width, y);
                dashed(
                    painter,
                    &[from, to],
                    Stroke::new(1.0, line.color),
                    PLOT_CONFIG.price_line_dash_length,
                );
                painter.text(
                    from + vec2(4.0, -2.0),
                    Align2::LEFT_BOTTOM,
                    format!("{} {}", line.title, format_price(line.price)),
                    FontId::proportional(UI_CONFIG.axis_font_size),
                    line.color,
                );
            }
        }
    }
}

// ============================================================================
// 7. ANNOTATIONS
// ============================================================================
pub struct AnnotationLayer;

impl ChartLayer for AnnotationLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        for glyph in ctx.glyphs {
            match glyph {
                ShapeGlyph::Segment { from, to, preview } => {
                    let color = annotation_color(*preview);
                    let a = ctx.to_screen(from.0, from.1);
                    let b = ctx.to_screen(to.0, to.1);
                    painter.line_segment([a, b], Stroke::new(PLOT_CONFIG.annotation_line_width, color));
                    painter.circle_filled(a, PLOT_CONFIG.annotation_marker_radius, color);
                    painter.circle_filled(b, PLOT_CONFIG.annotation_marker_radius, color);
                }
                ShapeGlyph::Level {
                    y,
                    width,
                    label,
                    preview,
                } => {
                    let color = annotation_color(*preview);
                    let from = ctx.to_screen(0.0, *y);
                    let to = ctx.to_screen(*width, *y);
                    dashed(
                        painter,
                        &[from, to],
                        Stroke::new(PLOT_CONFIG.annotation_line_width, color),
                        PLOT_CONFIG.annotation_dash_length,
                    );
                    painter.text(
                        to - vec2(4.0, 2.0),
                        Align2::RIGHT_BOTTOM,
                        label,
                        FontId::monospace(UI_CONFIG.axis_font_size),
                        color,
                    );
                }
            }
        }
    }
}

fn annotation_color(preview: bool) -> Color32 {
    if preview {
        PLOT_CONFIG.annotation_preview_color
    } else {
        PLOT_CONFIG.annotation_color
    }
}

// ============================================================================
// 8. CROSSHAIR
// ============================================================================
pub struct CrosshairLayer;

impl ChartLayer for CrosshairLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        let Some((x, y)) = ctx.pointer else {
            return;
        };
        let stroke = Stroke::new(1.0, PLOT_CONFIG.color_crosshair);
        let (w, h) = (ctx.rect.width() as f64, ctx.rect.height() as f64);
        dashed(painter, &[ctx.to_screen(0.0, y), ctx.to_screen(w, y)], stroke, 4.0);
        dashed(painter, &[ctx.to_screen(x, 0.0), ctx.to_screen(x, h)], stroke, 4.0);

        if let Some(price) = ctx.surface.y_to_price_on(&ScaleId::Main, y) {
            painter.text(
                ctx.to_screen(w, y) - vec2(4.0, 0.0),
                Align2::RIGHT_CENTER,
                format_price(price),
                FontId::monospace(UI_CONFIG.axis_font_size),
                PLOT_CONFIG.color_text_primary,
            );
        }
        if let Some(time) = ctx.surface.x_to_time(x) {
            painter.text(
                ctx.to_screen(x, h) - vec2(0.0, 4.0),
                Align2::CENTER_BOTTOM,
                epoch_sec_to_date_time_string(time),
                FontId::monospace(UI_CONFIG.axis_font_size),
                PLOT_CONFIG.color_text_primary,
            );
        }
    }
}

// ============================================================================
// 9. LEGEND
// ============================================================================
pub struct LegendLayer;

impl ChartLayer for LegendLayer {
    fn render(&self, painter: &Painter, ctx: &LayerContext) {
        let Some(legend) = ctx.legend else {
            return;
        };
        let mut cursor = ctx.rect.min + vec2(8.0, 8.0);
        for token in &legend.tokens {
            let rect = painter.text(
                cursor,
                Align2::LEFT_TOP,
                &token.text,
                FontId::proportional(UI_CONFIG.legend_font_size),
                token.color,
            );
            cursor.x = rect.right() + 8.0;
        }
    }
}
