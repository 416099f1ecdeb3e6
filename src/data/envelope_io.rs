use {
    crate::config::DF,
    crate::domain::MarketEnvelope,
    anyhow::{Context, Result},
    std::fs::File,
    std::io::{BufReader, Read},
    std::path::Path,
};

/// Reads and parses an envelope JSON file.
pub fn load_envelope(path: &Path) -> Result<MarketEnvelope> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let envelope = MarketEnvelope::from_json(&bytes)
        .with_context(|| format!("Invalid envelope in {}", path.display()))?;
    if DF.log_reconcile {
        log::info!(
            "Loaded envelope {}: {} bars, {} overlays, {} panels, {} predictions",
            path.display(),
            envelope.history.len(),
            envelope.technical_indicators.len(),
            envelope.panels.len(),
            envelope.predictions.len()
        );
    }
    Ok(envelope)
}
