use eframe::{
    Frame, Storage,
    egui::{CentralPanel, Context, RichText, TopBottomPanel, Visuals},
};

use crate::{
    Cli,
    app::{PendingWork, PersistedView},
    config::DF,
    data::load_envelope,
    domain::MarketEnvelope,
    engine::{AnnotationEngine, ChartSurface, DataReconciler, FileStore, SurfaceSize},
    ui::{ChartView, ToolbarAction, TopBar, UI_CONFIG, UI_TEXT, render_drawing_toolbar},
};

pub struct ChartApp {
    view: PersistedView,
    envelope: Option<MarketEnvelope>,
    load_error: Option<String>,
    surface: ChartSurface,
    reconciler: DataReconciler,
    annotations: AnnotationEngine<FileStore>,
    chart_view: ChartView,
    pending: PendingWork,
}

impl ChartApp {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, args: Cli) -> Self {
        let mut view: PersistedView = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        if let Some(mode) = args.mode {
            view.display.mode = mode.into();
        }

        let (envelope, load_error) = match &args.envelope {
            Some(path) => match load_envelope(path) {
                Ok(envelope) => (Some(envelope), None),
                Err(e) => {
                    log::error!("{:#}", e);
                    (None, Some(format!("{}: {:#}", UI_TEXT.label_load_failed, e)))
                }
            },
            None => (None, None),
        };

        let store = args.store_dir.map(FileStore::new).unwrap_or_default();
        let mut annotations = AnnotationEngine::load(store);
        annotations.set_active_tool(view.active_tool);

        let mut surface = ChartSurface::create(SurfaceSize::new(0.0, 0.0));
        surface.on_view_change(|change| {
            if DF.log_layout {
                log::debug!("View changed: {:?}", change);
            }
        });
        surface.on_hover(|event| {
            if DF.log_layout {
                log::trace!("Hover: {:?}", event);
            }
        });

        let mut reconciler = DataReconciler::default();
        reconciler.on_price_header(|header| {
            if DF.log_reconcile {
                log::debug!(
                    "Price header: {:.2} ({:+.2}%)",
                    header.last_price,
                    header.change_percent
                );
            }
        });

        Self {
            view,
            envelope,
            load_error,
            surface,
            reconciler,
            annotations,
            chart_view: ChartView::new(),
            pending: PendingWork {
                reconcile: true,
                fit: true,
            },
        }
    }

    fn reconcile_if_pending(&mut self) {
        if !self.pending.reconcile {
            return;
        }
        self.pending.reconcile = false;
        if let Some(envelope) = &self.envelope {
            self.reconciler
                .reconcile(&mut self.surface, envelope, &self.view.display);
        }
    }

    fn apply_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::SelectTool(tool) => {
                self.annotations.set_active_tool(tool);
                self.view.active_tool = tool;
            }
            ToolbarAction::ClearAll => self.annotations.clear_all(),
        }
    }
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        setup_custom_visuals(ctx);

        let header = self.reconciler.last_header();
        let badge = self.reconciler.forecast_badge();
        TopBottomPanel::top("top_bar")
            .frame(UI_CONFIG.top_panel_frame())
            .show(ctx, |ui| {
                let action = TopBar {
                    header: header.as_ref(),
                    badge,
                }
                .render(ui, &mut self.view.display);
                self.pending.reconcile |= action.display_changed;
                self.pending.fit |= action.fit_requested;
            });

        let toolbar_action = TopBottomPanel::top("drawing_tools")
            .frame(UI_CONFIG.tool_panel_frame())
            .show(ctx, |ui| {
                render_drawing_toolbar(
                    ui,
                    self.annotations.active_tool(),
                    self.annotations.shapes().len(),
                )
            })
            .inner;
        if let Some(action) = toolbar_action {
            self.apply_toolbar_action(action);
        }

        self.reconcile_if_pending();

        CentralPanel::default()
            .frame(UI_CONFIG.central_panel_frame())
            .show(ctx, |ui| {
                if self.envelope.is_none() {
                    ui.centered_and_justified(|ui| {
                        let text = self.load_error.as_deref().unwrap_or(&UI_TEXT.label_no_data);
                        ui.label(RichText::new(text).color(UI_CONFIG.colors.label));
                    });
                    return;
                }
                self.chart_view.show(
                    ui,
                    &mut self.surface,
                    &mut self.annotations,
                    self.view.display.mode.watermark(),
                );
                // Needs the pane size, so only after the first layout pass
                if self.pending.fit {
                    self.pending.fit = false;
                    self.surface.fit_content();
                    ui.ctx().request_repaint();
                }
            });
    }

    fn save(&mut self, storage: &mut dyn Storage) {
        if DF.log_store {
            log::info!("SAVE [ChartApp]: {:?}", self.view);
        }
        eframe::set_value(storage, eframe::APP_KEY, &self.view);
    }
}

fn setup_custom_visuals(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.window_fill = UI_CONFIG.colors.central_panel;
    visuals.panel_fill = UI_CONFIG.colors.top_panel;
    visuals.widgets.noninteractive.fg_stroke.color = UI_CONFIG.colors.label;
    visuals.widgets.inactive.fg_stroke.color = UI_CONFIG.colors.label;
    visuals.widgets.hovered.fg_stroke.color = UI_CONFIG.colors.heading;
    visuals.widgets.active.fg_stroke.color = UI_CONFIG.colors.heading;
    ctx.set_visuals(visuals);
    ctx.style_mut(|s| s.interaction.selectable_labels = false);
}
