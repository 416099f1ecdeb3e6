use eframe::egui::{Key, Sense, Ui};

use crate::config::DF;
use crate::engine::{
    AnnotationEngine, AnnotationOutcome, ChartSurface, CoordinateSpace, KeyValueStore,
    LegendReadout, SurfaceSize,
};
use crate::ui::UI_CONFIG;
use crate::ui::chart_layers::{
    AnnotationLayer, CandlestickLayer, ChartLayer, CrosshairLayer, GridLayer, HistogramLayer,
    LayerContext, LegendLayer, LineSeriesLayer, PriceLineLayer, WatermarkLayer,
};

/// Interactive chart pane. Owns no chart state, only pointer bookkeeping.
#[derive(Default)]
pub struct ChartView {
    hovering: bool,
}

impl ChartView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes pointer input to the surface or the annotation engine, then paints.
    pub fn show<S: KeyValueStore>(
        &mut self,
        ui: &mut Ui,
        surface: &mut ChartSurface,
        annotations: &mut AnnotationEngine<S>,
        watermark: &'static str,
    ) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        surface.resize(SurfaceSize::new(rect.width() as f64, rect.height() as f64));

        let pointer = response.hover_pos().map(|p| {
            let local = p - rect.min;
            (local.x as f64, local.y as f64)
        });

        match pointer {
            Some((x, y)) => {
                surface.pointer_hover(x, y);
                self.hovering = true;
            }
            None if self.hovering => {
                surface.pointer_leave();
                self.hovering = false;
            }
            None => {}
        }

        if ui.input(|i| i.key_pressed(Key::Escape)) {
            annotations.cancel();
        }

        if annotations.active_tool().is_some() {
            if let Some((x, y)) = pointer {
                let outcome = if response.clicked() {
                    annotations.pointer_click(&*surface, x, y)
                } else {
                    annotations.pointer_move(&*surface, x, y)
                };
                if let AnnotationOutcome::Committed(shape) = outcome {
                    if DF.log_annotations {
                        log::info!("Shape {} drawn from {:?} to {:?}", shape.id, shape.p1, shape.p2);
                    }
                }
            }
        } else {
            if response.dragged() {
                surface.pan(response.drag_delta().x as f64);
            }
            if response.double_clicked() {
                surface.fit_content();
            }
        }

        if let Some((x, _)) = pointer {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                let factor = 2f64.powf((scroll / UI_CONFIG.zoom_scroll_unit) as f64);
                surface.zoom(factor, x);
            }
        }

        // Hovered bucket, falling back to the latest bar
        let legend_time = pointer
            .and_then(|(x, _)| surface.x_to_time(x))
            .or_else(|| surface.time_scale().points().last().copied());
        let legend = legend_time.map(|t| LegendReadout::compose(surface.registry(), t));
        let glyphs = annotations.project(&*surface);

        let ctx = LayerContext {
            surface,
            rect,
            glyphs: &glyphs,
            legend: legend.as_ref(),
            pointer,
            watermark,
        };
        let painter = ui.painter_at(rect);
        let layers: [&dyn ChartLayer; 9] = [
            &WatermarkLayer,
            &GridLayer,
            &HistogramLayer,
            &CandlestickLayer,
            &LineSeriesLayer,
            &PriceLineLayer,
            &AnnotationLayer,
            &CrosshairLayer,
            &LegendLayer,
        ];
        for layer in layers {
            layer.render(&painter, &ctx);
        }
    }
}
