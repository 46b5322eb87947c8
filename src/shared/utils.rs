//! Utility functions and helpers

/// Format a signed percentage with two decimals
pub fn format_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// Format an open-interest magnitude for log lines
pub fn format_oi(value: f64) -> String {
    format!("{:.2}", value)
}
