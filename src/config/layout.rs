//! Vertical layout fractions for the price-axis column

/// All values are fractions of the full pane height (0.0 ..= 1.0).
pub struct LayoutConfig {
    /// Height of one oscillator panel slot
    pub panel_height_pct: f64,
    /// Bottom strip reserved for volume when the volume series is visible
    pub volume_reserved_pct: f64,
    /// Bottom margin kept when no volume strip is shown
    pub base_margin_pct: f64,
    /// Main price scale top margin in market mode
    pub main_top_margin_pct: f64,
    /// Main price scale top margin in lab mode
    pub lab_top_margin_pct: f64,
}

pub const LAYOUT_CONFIG: LayoutConfig = LayoutConfig {
    panel_height_pct: 0.12,
    volume_reserved_pct: 0.2,
    base_margin_pct: 0.05,
    main_top_margin_pct: 0.05,
    lab_top_margin_pct: 0.1,
};
