use std::sync::LazyLock;

pub struct UiText {
    pub app_title: String,

    // --- Top bar ---
    pub label_mode: String,
    pub label_volume: String,
    pub label_support_resistance: String,
    pub label_fit: String,
    pub hover_fit: String,
    pub label_confidence: String,
    pub label_no_price: String,
    pub label_volume_short: String,
    pub label_no_volume: String,

    // --- Drawing toolbar ---
    pub label_cursor: String,
    pub label_clear_all: String,
    pub hover_clear_all: String,
    pub hover_escape: String,

    // --- Chart ---
    pub label_no_data: String,
    pub label_load_failed: String,
}

pub static UI_TEXT: LazyLock<UiText> = LazyLock::new(|| UiText {
    app_title: "Quant Chart".to_string(),

    label_mode: "Mode".to_string(),
    label_volume: "Volume".to_string(),
    label_support_resistance: "S/R Levels".to_string(),
    label_fit: "Fit".to_string(),
    hover_fit: "Fit every bar into view (double-click the chart does the same)".to_string(),
    label_confidence: "Confidence".to_string(),
    label_no_price: "--".to_string(),
    label_volume_short: "Vol".to_string(),
    label_no_volume: "NO VOLUME".to_string(),

    label_cursor: "Cursor".to_string(),
    label_clear_all: "Clear All".to_string(),
    hover_clear_all: "Remove every drawing".to_string(),
    hover_escape: "Esc cancels the shape being drawn".to_string(),

    label_no_data: "No market data loaded. Start with --envelope <file.json>".to_string(),
    label_load_failed: "Failed to load envelope".to_string(),
});
