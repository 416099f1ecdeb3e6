#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod ui;
pub mod utils;

use std::path::PathBuf;

// Re-export commonly used types outside of crate (for main.rs and integration tests)
pub use app::ChartApp;
pub use config::PERSISTENCE;
pub use data::load_envelope;
pub use domain::{DisplayConfig, DisplayMode, MarketEnvelope};

// CLI argument parsing
use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Market,
    Lab,
}

impl From<ModeArg> for DisplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Market => DisplayMode::Market,
            ModeArg::Lab => DisplayMode::Lab,
        }
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Market envelope JSON (history, indicators, panels, predictions)
    #[arg(long)]
    pub envelope: Option<PathBuf>,

    /// Directory for saved drawings (default: ./chart_data)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Start in this display mode instead of the last used one
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Main application entry point - creates the GUI app
pub fn run_app(cc: &eframe::CreationContext<'_>, args: Cli) -> ChartApp {
    ChartApp::new(cc, args)
}
