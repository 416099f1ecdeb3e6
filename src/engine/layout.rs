//! Vertical slot arithmetic for the price-axis column.
//!
//! Every scale in the chart shares one column of height 1.0. A scale's
//! margins say how much of that column sits above (`top`) and below
//! (`bottom`) its drawable band. Panels fill the space between the volume
//! strip and the main price area, one `panel_height` slot each: the first
//! panel sits directly under the main price area and the last one directly
//! above the volume strip. Slots are derived from the index alone with no
//! gaps, so the bands are disjoint by construction.

use crate::config::{LAYOUT_CONFIG, LayoutConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMargins {
    pub top: f64,
    pub bottom: f64,
}

impl ScaleMargins {
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Drawable band as (low, high) fractions measured up from the bottom.
    pub fn band(&self) -> (f64, f64) {
        (self.bottom, 1.0 - self.top)
    }

    pub fn height(&self) -> f64 {
        1.0 - self.top - self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub panel_height: f64,
    pub volume_reserved: f64,
    pub base_margin: f64,
    pub main_top_margin: f64,
    pub lab_top_margin: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::from_config(&LAYOUT_CONFIG)
    }
}

impl PanelLayout {
    pub fn from_config(cfg: &LayoutConfig) -> Self {
        Self {
            panel_height: cfg.panel_height_pct,
            volume_reserved: cfg.volume_reserved_pct,
            base_margin: cfg.base_margin_pct,
            main_top_margin: cfg.main_top_margin_pct,
            lab_top_margin: cfg.lab_top_margin_pct,
        }
    }

    pub fn with_panel_height(mut self, panel_height: f64) -> Self {
        self.panel_height = panel_height;
        self
    }

    /// Bottom reservation below the panels: the volume strip or the base margin.
    pub fn reserved_bottom(&self, volume_shown: bool) -> f64 {
        if volume_shown {
            self.volume_reserved
        } else {
            self.base_margin
        }
    }

    /// Panel height actually used for `panel_count` panels.
    ///
    /// Equals the configured height unless the stack plus the bottom strip
    /// would run past the main top margin, in which case every slot shrinks
    /// uniformly to fit.
    pub fn effective_panel_height(&self, panel_count: usize, volume_shown: bool) -> f64 {
        if panel_count == 0 {
            return self.panel_height;
        }
        let available = (1.0 - self.main_top_margin - self.reserved_bottom(volume_shown)).max(0.0);
        let wanted = panel_count as f64 * self.panel_height;
        if wanted > available {
            available / panel_count as f64
        } else {
            self.panel_height
        }
    }

    pub fn total_panels_height(&self, panel_count: usize, volume_shown: bool) -> f64 {
        panel_count as f64 * self.effective_panel_height(panel_count, volume_shown)
    }

    /// Main price scale in market mode.
    pub fn main_margins(&self, panel_count: usize, volume_shown: bool) -> ScaleMargins {
        ScaleMargins::new(
            self.main_top_margin,
            self.total_panels_height(panel_count, volume_shown) + self.reserved_bottom(volume_shown),
        )
    }

    /// Main price scale when no panels are laid out (lab mode).
    pub fn simple_main_margins(&self, volume_shown: bool) -> ScaleMargins {
        ScaleMargins::new(self.lab_top_margin, self.reserved_bottom(volume_shown))
    }

    /// Slot for the panel at `index`; index 0 sits directly under the main price area.
    pub fn panel_margins(&self, index: usize, panel_count: usize, volume_shown: bool) -> ScaleMargins {
        let h = self.effective_panel_height(panel_count, volume_shown);
        let total = panel_count as f64 * h;
        let my_bottom = (total - (index + 1) as f64 * h) + self.reserved_bottom(volume_shown);
        ScaleMargins::new(1.0 - my_bottom - h, my_bottom)
    }

    pub fn all_panel_margins(&self, panel_count: usize, volume_shown: bool) -> Vec<ScaleMargins> {
        (0..panel_count)
            .map(|i| self.panel_margins(i, panel_count, volume_shown))
            .collect()
    }

    /// Volume histogram occupies the bottom strip of the column.
    pub fn volume_margins(&self) -> ScaleMargins {
        ScaleMargins::new(1.0 - self.volume_reserved, 0.0)
    }
}
