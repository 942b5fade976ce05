use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{ButtonKind, FlowDrawer, PositionButton, PositionedStep};
use crate::theme::Theme;
use crate::viewport::{CanvasTransform, Viewport};
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Margin around the content of a standalone SVG.
const DIAGRAM_PADDING: f32 = 40.0;

/// Standalone SVG sized to the layout, including its buttons and labels.
pub fn render_svg(layout: &FlowDrawer<'_>, theme: &Theme, config: &LayoutConfig) -> String {
    let (min_x, min_y, max_x, max_y) = content_extent(layout, config);
    let width = (max_x - min_x + DIAGRAM_PADDING * 2.0).max(200.0);
    let height = (max_y - min_y + DIAGRAM_PADDING * 2.0).max(200.0);
    let origin_x = min_x - DIAGRAM_PADDING;
    let origin_y = min_y - DIAGRAM_PADDING;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{origin_x:.2} {origin_y:.2} {width:.2} {height:.2}\">",
    );
    let _ = write!(
        svg,
        "<rect x=\"{origin_x:.2}\" y=\"{origin_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );
    push_contents(&mut svg, layout, theme, config);
    svg.push_str("</svg>");
    svg
}

/// SVG of the given viewport size with the layout placed by `transform`, the
/// way an interactive canvas shows it.
pub fn render_svg_in_viewport(
    layout: &FlowDrawer<'_>,
    theme: &Theme,
    config: &LayoutConfig,
    viewport: Viewport,
    transform: &CanvasTransform,
) -> String {
    let Viewport { width, height } = viewport;
    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );
    let _ = write!(svg, "<g transform=\"{}\">", transform.to_svg_transform());
    push_contents(&mut svg, layout, theme, config);
    svg.push_str("</g></svg>");
    svg
}

fn push_contents(svg: &mut String, layout: &FlowDrawer<'_>, theme: &Theme, config: &LayoutConfig) {
    if !layout.svg.is_empty() {
        let _ = write!(
            svg,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" stroke-linejoin=\"round\"/>",
            layout.svg.to_path_data(),
            theme.line_color
        );
    }

    for step in &layout.steps {
        push_card(svg, step, theme, config);
    }

    for label in &layout.labels {
        let _ = write!(
            svg,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" dominant-baseline=\"middle\">{}</text>",
            label.x,
            label.y,
            escape_xml(&theme.font_family),
            config.label_font_size,
            theme.label_text,
            escape_xml(&label.label)
        );
    }

    for button in &layout.buttons {
        push_button(svg, button, theme, config);
    }
}

fn push_card(svg: &mut String, step: &PositionedStep<'_>, theme: &Theme, config: &LayoutConfig) {
    // Empty slots are drawn by their big button.
    let Some(content) = step.content else {
        return;
    };
    let _ = write!(
        svg,
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        step.x,
        step.y,
        config.card_width,
        config.card_height,
        theme.card_fill,
        theme.card_border
    );
    let center_x = step.x + config.card_width / 2.0;
    let title_y = step.y + config.card_height / 2.0 - theme.font_size * 0.4;
    let kind_y = step.y + config.card_height / 2.0 + theme.font_size * 0.9;
    let family = escape_xml(&theme.font_family);
    let _ = write!(
        svg,
        "<text x=\"{center_x:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{family}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        theme.font_size,
        theme.card_text,
        escape_xml(&content.display_name)
    );
    let _ = write!(
        svg,
        "<text x=\"{center_x:.2}\" y=\"{kind_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{family}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        theme.font_size * 0.85,
        theme.card_subtext,
        content.kind.label()
    );
}

fn push_button(svg: &mut String, button: &PositionButton, theme: &Theme, config: &LayoutConfig) {
    let size = button.size(config.small_button_size, config.big_button_size);
    let cx = button.x + size / 2.0;
    let cy = button.y + size / 2.0;
    match button.kind {
        ButtonKind::Small => {
            let _ = write!(
                svg,
                "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                size / 2.0,
                theme.button_fill,
                theme.button_border
            );
        }
        ButtonKind::Big => {
            let _ = write!(
                svg,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{size:.2}\" height=\"{size:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" stroke-dasharray=\"4 3\"/>",
                button.x,
                button.y,
                theme.button_fill,
                theme.button_border
            );
        }
    }
    let arm = size * 0.25;
    let _ = write!(
        svg,
        "<path d=\"M {:.2} {cy:.2} L {:.2} {cy:.2} M {cx:.2} {:.2} L {cx:.2} {:.2}\" stroke=\"{}\" stroke-width=\"1.5\" stroke-linecap=\"round\"/>",
        cx - arm,
        cx + arm,
        cy - arm,
        cy + arm,
        theme.button_icon
    );
}

/// Union of the layout's bounding box with its buttons and labels.
fn content_extent(layout: &FlowDrawer<'_>, config: &LayoutConfig) -> (f32, f32, f32, f32) {
    let bbox = layout.bounding_box();
    let mut extent = (bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y);
    let mut include = |x0: f32, y0: f32, x1: f32, y1: f32| {
        extent.0 = extent.0.min(x0);
        extent.1 = extent.1.min(y0);
        extent.2 = extent.2.max(x1);
        extent.3 = extent.3.max(y1);
    };
    for button in &layout.buttons {
        let size = button.size(config.small_button_size, config.big_button_size);
        include(button.x, button.y, button.x + size, button.y + size);
    }
    let half_line = config.label_font_size / 2.0;
    for label in &layout.labels {
        include(
            label.x,
            label.y - half_line,
            label.x + label.width,
            label.y + half_line,
        );
    }
    extent
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    tracing::debug!(path = %output.display(), "wrote png");
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Step;
    use crate::layout::compute_flow_layout;

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn render_svg_basic() {
        let config = fast_config();
        let theme = Theme::modern();
        let trigger = Step::trigger("trigger")
            .with_display_name("New <order>")
            .then(Step::branch("check", Some(Step::action("ship")), None));
        let layout = compute_flow_layout(&trigger, &theme, &config);
        let svg = render_svg(&layout, &theme, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("New &lt;order&gt;"));
        assert!(svg.contains(">True</text>"));
        assert!(svg.contains(">False</text>"));
        // One dashed square for the empty false slot.
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
        // Three real cards, the empty slot has none.
        assert_eq!(svg.matches("rx=\"6\"").count(), 3);
    }

    #[test]
    fn viewport_render_wraps_contents_in_transform() {
        let config = fast_config();
        let theme = Theme::classic();
        let trigger = Step::trigger("trigger");
        let layout = compute_flow_layout(&trigger, &theme, &config);
        let transform = CanvasTransform {
            offset: crate::layout::Point::new(470.0, 300.0),
            scale: 1.0,
        };
        let svg = render_svg_in_viewport(
            &layout,
            &theme,
            &config,
            Viewport::new(1200.0, 800.0),
            &transform,
        );
        assert!(svg.contains("viewBox=\"0 0 1200.00 800.00\""));
        assert!(svg.contains("<g transform=\"translate(470.00 300.00) scale(1.0000)\">"));
        assert!(svg.contains("&quot;Open Sans&quot;"));
    }

    #[test]
    fn standalone_view_box_pads_the_content() {
        let config = fast_config();
        let theme = Theme::modern();
        let trigger = Step::trigger("trigger").then(Step::action("step_1"));
        let layout = compute_flow_layout(&trigger, &theme, &config);
        let (min_x, min_y, max_x, max_y) = content_extent(&layout, &config);
        let svg = render_svg(&layout, &theme, &config);
        let expected = format!(
            "viewBox=\"{:.2} {:.2} {:.2} {:.2}\"",
            min_x - DIAGRAM_PADDING,
            min_y - DIAGRAM_PADDING,
            max_x - min_x + DIAGRAM_PADDING * 2.0,
            max_y - min_y + DIAGRAM_PADDING * 2.0
        );
        assert!(svg.contains(&expected), "{svg}");
    }

    #[test]
    fn extent_covers_labels_and_buttons() {
        let config = fast_config();
        let theme = Theme::modern();
        let trigger = Step::trigger("trigger").then(Step::router(
            "router",
            [("a very long output name", None::<Step>), ("b", None)],
        ));
        let layout = compute_flow_layout(&trigger, &theme, &config);
        let (min_x, _, max_x, _) = content_extent(&layout, &config);
        for label in &layout.labels {
            assert!(label.x >= min_x && label.x + label.width <= max_x);
        }
    }
}
