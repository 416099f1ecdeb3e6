// src/app/state.rs

use serde::{Deserialize, Serialize};

use crate::domain::{DisplayConfig, ShapeKind};

/// Host view state that survives restarts. The shape list itself lives in
/// the annotation store, not here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PersistedView {
    pub(crate) display: DisplayConfig,
    pub(crate) active_tool: Option<ShapeKind>,
}

/// What the next frame still owes the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct PendingWork {
    pub(crate) reconcile: bool,
    pub(crate) fit: bool,
}
