use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

// Width per character, as a fraction of the font size, when no font is available.
const FALLBACK_CHAR_WIDTH_FACTOR: f32 = 0.45;

/// Rendered width of a branch label.
pub(super) fn label_width(text: &str, theme: &Theme, config: &LayoutConfig) -> f32 {
    text_width(
        text,
        config.label_font_size,
        &theme.font_family,
        config.fast_text_metrics,
    )
}

pub(super) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family).unwrap_or_else(|| {
        tracing::debug!(text, "estimating label width without font metrics");
        fallback_text_width(text, font_size)
    })
}

pub(super) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    font_size * FALLBACK_CHAR_WIDTH_FACTOR * text.chars().count() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_linear_in_characters_and_size() {
        assert_eq!(fallback_text_width("", 14.0), 0.0);
        assert!((fallback_text_width("True", 10.0) - 18.0).abs() < 1e-4);
        let w16 = fallback_text_width("False", 16.0);
        let w32 = fallback_text_width("False", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01);
    }

    #[test]
    fn fast_metrics_skip_font_lookup() {
        let theme = Theme::modern();
        let config = LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        };
        let width = label_width("Otherwise", &theme, &config);
        assert!((width - config.label_font_size * 0.45 * 9.0).abs() < 1e-4);
    }

    #[test]
    fn measured_width_is_positive() {
        let theme = Theme::modern();
        let config = LayoutConfig::default();
        assert!(label_width("True", &theme, &config) > 0.0);
    }
}
