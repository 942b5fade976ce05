use flow_canvas_renderer::viewport::Viewport;
use flow_canvas_renderer::{RenderOptions, layout_with_options, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    /// Viewport to fit the flow into, as `[width, height]`.
    fit: Option<[f32; 2]>,
}

fn build_render_options(options: FlowRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("classic") {
        RenderOptions::classic()
    } else {
        RenderOptions::modern()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    // No system fonts are reachable from the browser sandbox.
    render_options.layout.fast_text_metrics = options.fast_text.unwrap_or(true);
    render_options.fit = options.fit.map(|[width, height]| Viewport::new(width, height));

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<FlowRenderOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<FlowRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(FlowRenderOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_flow_svg(flow_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(flow_json, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn layout_flow_json(flow_json: &str) -> Result<String, JsValue> {
    let render_options = build_render_options(FlowRenderOptions::default());
    layout_with_options(flow_json, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
