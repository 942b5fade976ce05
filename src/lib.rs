//! Layout engine for workflow-automation flow canvases.
//!
//! [`compute_flow_layout`] turns a trigger and its nested actions into
//! positioned step cards, connector geometry, "add step" buttons and branch
//! labels. The [`viewport`] services turn the resulting bounding box into a
//! zoom scale and pan offset for an interactive canvas.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod flow;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewportConfig, load_config};
pub use flow::{FlowError, FlowVersion, Step, StepKind};
pub use layout::{FlowDrawer, compute_flow_layout};
pub use render::render_svg;
pub use theme::Theme;
pub use viewport::{PannerService, ZoomingService};

use layout_dump::LayoutDump;
use viewport::Viewport;

/// Everything needed to turn a flow JSON document into output.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    /// Render into a viewport of this size, fitted the way the canvas fits
    /// a freshly loaded flow. `None` sizes the SVG to the diagram.
    pub fit: Option<Viewport>,
}

impl RenderOptions {
    pub fn modern() -> Self {
        Self::default()
    }

    pub fn classic() -> Self {
        Self {
            theme: Theme::classic(),
            ..Self::default()
        }
    }
}

pub fn render_with_options(flow_json: &str, options: &RenderOptions) -> Result<String, FlowError> {
    let flow = FlowVersion::from_json(flow_json)?;
    let layout = compute_flow_layout(&flow.trigger, &options.theme, &options.layout);
    let Some(viewport) = options.fit else {
        return Ok(render_svg(&layout, &options.theme, &options.layout));
    };
    let mut zooming = ZoomingService::new(&options.viewport);
    let mut panner = PannerService::new(&options.viewport);
    let transform = panner.fit_to_screen(&mut zooming, &layout, viewport);
    Ok(render::render_svg_in_viewport(
        &layout,
        &options.theme,
        &options.layout,
        viewport,
        &transform,
    ))
}

/// Computed layout of a flow JSON document, serialised as JSON.
pub fn layout_with_options(flow_json: &str, options: &RenderOptions) -> Result<String, FlowError> {
    let flow = FlowVersion::from_json(flow_json)?;
    let layout = compute_flow_layout(&flow.trigger, &options.theme, &options.layout);
    Ok(serde_json::to_string(&LayoutDump::from_layout(&layout))?)
}
