use eframe::egui::{Button, Color32, RichText, Ui};
use strum::IntoEnumIterator;

use crate::domain::{DisplayConfig, DisplayMode, ShapeKind};
use crate::engine::{ForecastBadge, PriceHeader};
use crate::ui::{UI_CONFIG, UI_TEXT};
use crate::utils::{format_price, format_signed, format_volume};

/// Requests coming out of the top bar that the app has to act on.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TopBarAction {
    pub display_changed: bool,
    pub fit_requested: bool,
}

pub struct TopBar<'a> {
    pub header: Option<&'a PriceHeader>,
    pub badge: Option<ForecastBadge>,
}

impl TopBar<'_> {
    pub fn render(&self, ui: &mut Ui, display: &mut DisplayConfig) -> TopBarAction {
        let mut action = TopBarAction::default();
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(&UI_TEXT.app_title)
                    .strong()
                    .color(UI_CONFIG.colors.heading),
            );
            ui.separator();

            self.render_header(ui);
            ui.separator();

            ui.label(RichText::new(&UI_TEXT.label_mode).color(UI_CONFIG.colors.label));
            for mode in DisplayMode::iter() {
                if ui
                    .selectable_label(display.mode == mode, mode.to_string())
                    .clicked()
                    && display.mode != mode
                {
                    display.mode = mode;
                    action.display_changed = true;
                }
            }
            ui.separator();

            action.display_changed |= ui
                .checkbox(&mut display.show_volume, UI_TEXT.label_volume.as_str())
                .changed();
            action.display_changed |= ui
                .checkbox(
                    &mut display.show_support_resistance,
                    UI_TEXT.label_support_resistance.as_str(),
                )
                .changed();

            if ui
                .button(UI_TEXT.label_fit.as_str())
                .on_hover_text(UI_TEXT.hover_fit.as_str())
                .clicked()
            {
                action.fit_requested = true;
            }

            if let Some(badge) = self.badge {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "{} {:.0}% ({})",
                        UI_TEXT.label_confidence, badge.confidence, badge.tier
                    ))
                    .strong()
                    .color(badge.tier.color()),
                );
            }
        });
        action
    }

    fn render_header(&self, ui: &mut Ui) {
        let Some(header) = self.header else {
            ui.label(RichText::new(&UI_TEXT.label_no_price).color(UI_CONFIG.colors.label));
            return;
        };
        let color = if header.is_up() {
            UI_CONFIG.colors.price_up
        } else {
            UI_CONFIG.colors.price_down
        };
        ui.label(
            RichText::new(format_price(header.last_price))
                .strong()
                .size(16.0)
                .color(color),
        );
        ui.label(
            RichText::new(format!(
                "{} ({}%)",
                format_signed(header.change),
                format_signed(header.change_percent)
            ))
            .color(color),
        );
        let volume = match header.volume {
            Some(v) => format!("{} {}", UI_TEXT.label_volume_short, format_volume(v)),
            None => UI_TEXT.label_no_volume.clone(),
        };
        ui.label(RichText::new(volume).color(UI_CONFIG.colors.label));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    SelectTool(Option<ShapeKind>),
    ClearAll,
}

/// Cursor / trend line / horizontal level, plus clear-all.
pub fn render_drawing_toolbar(
    ui: &mut Ui,
    active_tool: Option<ShapeKind>,
    shape_count: usize,
) -> Option<ToolbarAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if tool_button(ui, &UI_TEXT.label_cursor, active_tool.is_none()).clicked() {
            action = Some(ToolbarAction::SelectTool(None));
        }
        for kind in ShapeKind::iter() {
            if tool_button(ui, &kind.to_string(), active_tool == Some(kind))
                .on_hover_text(UI_TEXT.hover_escape.as_str())
                .clicked()
            {
                action = Some(ToolbarAction::SelectTool(Some(kind)));
            }
        }
        ui.separator();

        let clear = Button::new(format!("{} ({})", UI_TEXT.label_clear_all, shape_count));
        if ui
            .add_enabled(shape_count > 0, clear)
            .on_hover_text(UI_TEXT.hover_clear_all.as_str())
            .clicked()
        {
            action = Some(ToolbarAction::ClearAll);
        }
    });
    action
}

fn tool_button(ui: &mut Ui, label: &str, selected: bool) -> eframe::egui::Response {
    let fill = if selected {
        UI_CONFIG.colors.tool_selected
    } else {
        Color32::TRANSPARENT
    };
    ui.add(Button::new(label).fill(fill).selected(selected))
}
