mod chart_layers;
mod chart_view;
mod ui_config;
mod ui_panels;
mod ui_text;

pub(crate) use chart_view::ChartView;
pub(crate) use ui_config::UI_CONFIG;
pub(crate) use ui_panels::{ToolbarAction, TopBar, render_drawing_toolbar};
pub(crate) use ui_text::UI_TEXT;
