/// Two decimals, the precision used by the legend and the price header.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Formats large volumes with K/M suffixes (1.2M, 350.00K, 42).
/// Sub-unit volumes keep up to four decimals so they never read as zero.
pub fn format_volume(volume: f64) -> String {
    if !volume.is_finite() || volume <= 0.0 {
        return "0".to_string();
    }
    if volume >= 1_000_000.0 {
        format!("{:.2}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("{:.2}K", volume / 1_000.0)
    } else if volume >= 1.0 {
        format!("{:.0}", volume)
    } else {
        let text = format!("{:.4}", volume);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        if text == "0" {
            // Present but below display precision
            "<0.0001".to_string()
        } else {
            text.to_string()
        }
    }
}

/// "+1.25" / "-0.40". Keeps the sign visible for the header.
pub fn format_signed(value: f64) -> String {
    format!("{:+.2}", value)
}
