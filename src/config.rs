use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry constants of the flow canvas. All values are in canvas pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub card_width: f32,
    pub card_height: f32,
    pub card_bottom_padding: f32,
    pub vertical_space_between_sequential_steps: f32,
    pub vertical_space_between_step_and_child: f32,
    pub horizontal_space_between_branches: f32,
    pub arc_length: f32,
    pub small_button_size: f32,
    pub big_button_size: f32,
    pub arrow_width: f32,
    pub arrow_height: f32,
    pub label_font_size: f32,
    /// Gap between a branch label and the connector it sits on.
    pub label_gap: f32,
    /// Skip font lookup and size labels with the character estimate.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 260.0,
            card_height: 70.0,
            card_bottom_padding: 20.0,
            vertical_space_between_sequential_steps: 60.0,
            vertical_space_between_step_and_child: 100.0,
            horizontal_space_between_branches: 80.0,
            arc_length: 15.0,
            small_button_size: 18.0,
            big_button_size: 40.0,
            arrow_width: 8.0,
            arrow_height: 6.0,
            label_font_size: 13.0,
            label_gap: 6.0,
            fast_text_metrics: false,
        }
    }
}

impl LayoutConfig {
    pub fn card_height_with_padding(&self) -> f32 {
        self.card_height + self.card_bottom_padding
    }

    pub fn card_center_x(&self) -> f32 {
        self.card_width / 2.0
    }
}

/// Zoom limits and the fixed chrome the viewport fit has to leave room for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    /// Upper bound of the scale picked when fitting a flow to the screen.
    pub fit_max_zoom: f32,
    pub header_height: f32,
    pub top_margin: f32,
    pub widget_space_above: f32,
    pub widget_space_below: f32,
    pub touchpad_idle_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.25,
            zoom_max: 1.5,
            zoom_step: 0.1,
            fit_max_zoom: 1.0,
            header_height: 60.0,
            top_margin: 50.0,
            widget_space_above: 70.0,
            widget_space_below: 120.0,
            touchpad_idle_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    card_fill: Option<String>,
    card_border: Option<String>,
    card_text: Option<String>,
    card_subtext: Option<String>,
    line_color: Option<String>,
    button_fill: Option<String>,
    button_border: Option<String>,
    button_icon: Option<String>,
    label_text: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    viewport: Option<ViewportConfig>,
}

/// Loads a JSON (or JSON5) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = json5::from_str(&contents)?;
    apply_config_file(&mut config, parsed);
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    match parsed.theme.as_deref() {
        Some("classic") | Some("default") => config.theme = Theme::classic(),
        Some("modern") => config.theme = Theme::modern(),
        Some(other) => tracing::warn!(theme = other, "unknown theme name, keeping default"),
        None => {}
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.card_fill {
            theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            theme.card_border = v;
        }
        if let Some(v) = vars.card_text {
            theme.card_text = v;
        }
        if let Some(v) = vars.card_subtext {
            theme.card_subtext = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.button_fill {
            theme.button_fill = v;
        }
        if let Some(v) = vars.button_border {
            theme.button_border = v;
        }
        if let Some(v) = vars.button_icon {
            theme.button_icon = v;
        }
        if let Some(v) = vars.label_text {
            theme.label_text = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(viewport) = parsed.viewport {
        config.viewport = viewport;
    }
}
