use crate::config::LayoutConfig;
use crate::ir::NodeKind;
use crate::text_metrics::{FixedWidthMetrics, TextMeasure, measure_or_fallback};

const UNIFIED_SUFFIX: &str = "(unified)";

/// Display text for a node label. Canonical entities drop the conventional
/// `(unified)` suffix.
pub(super) fn label_text(kind: NodeKind, label: &str) -> String {
    let trimmed = label.trim();
    if kind != NodeKind::CanonicalEntity {
        return trimmed.to_string();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.ends_with(UNIFIED_SUFFIX) {
        trimmed[..trimmed.len() - UNIFIED_SUFFIX.len()]
            .trim_end()
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Measured glyph width of `text` at the label font size.
pub(super) fn measure_label(text: &str, config: &LayoutConfig, measurer: &dyn TextMeasure) -> f32 {
    let fallback = FixedWidthMetrics::new(config.fixed_advance_ratio);
    measure_or_fallback(measurer, &fallback, text, config.label_font_size)
}
