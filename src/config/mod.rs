//! Configuration module for the chart engine.

// Can all be private now because we have a public re-export.
mod debug;
mod layout;
mod persistence;

// Can't be private because we don't re-export it
pub mod plot;

// Re-export commonly used items
pub use debug::DF;
pub use layout::{LAYOUT_CONFIG, LayoutConfig};
pub use persistence::{PERSISTENCE, store_filename};
