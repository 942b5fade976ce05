use crate::config::{Config, load_config};
use crate::flow::FlowVersion;
use crate::layout::compute_flow_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, render_svg_in_viewport, write_output_png, write_output_svg};
use crate::viewport::{PannerService, Viewport, ZoomingService};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "flowdraw", version, about = "Lays out and renders automation flow diagrams")]
pub struct Args {
    /// Input flow version (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file (theme, themeVariables, layout, viewport)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Place the flow in the viewport the way the canvas fits it to screen
    #[arg(long = "fit")]
    pub fit: bool,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let flow = FlowVersion::from_json(&input).context("failed to load flow")?;
    tracing::debug!(
        flow = %flow.display_name,
        steps = flow.trigger.step_count(),
        "loaded flow"
    );

    let svg = render_flow(&flow, &config, args.fit, args.dump_layout.as_deref())?;
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn render_flow(
    flow: &FlowVersion,
    config: &Config,
    fit: bool,
    dump_layout: Option<&Path>,
) -> Result<String> {
    let layout = compute_flow_layout(&flow.trigger, &config.theme, &config.layout);
    if let Some(path) = dump_layout {
        write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write layout dump to {}", path.display()))?;
    }

    if !fit {
        return Ok(render_svg(&layout, &config.theme, &config.layout));
    }
    let viewport = Viewport::new(config.render.width, config.render.height);
    let mut zooming = ZoomingService::new(&config.viewport);
    let mut panner = PannerService::new(&config.viewport);
    let transform = panner.fit_to_screen(&mut zooming, &layout, viewport);
    Ok(render_svg_in_viewport(
        &layout,
        &config.theme,
        &config.layout,
        viewport,
        &transform,
    ))
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path.filter(|p| *p != Path::new("-")) {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const FLOW: &str = r#"{
        "displayName": "Orders",
        "trigger": {
            "name": "trigger",
            "displayName": "New order",
            "type": "WEBHOOK",
            "nextAction": { "name": "step_1", "displayName": "Notify", "type": "PIECE" }
        }
    }"#;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.layout.fast_text_metrics = true;
        config
    }

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_fit_and_dump_flags() {
        let args = Args::try_parse_from([
            "flowdraw",
            "-i",
            "flow.json",
            "--fit",
            "--dump-layout",
            "layout.json",
            "-w",
            "800",
        ])
        .unwrap();
        assert!(args.fit);
        assert_eq!(args.dump_layout, Some(PathBuf::from("layout.json")));
        assert_eq!(args.width, 800.0);
        assert_eq!(args.height, 800.0);
    }

    #[test]
    fn fit_wraps_flow_in_viewport_transform() {
        let flow = FlowVersion::from_json(FLOW).unwrap();
        let config = test_config();
        let plain = render_flow(&flow, &config, false, None).unwrap();
        let fitted = render_flow(&flow, &config, true, None).unwrap();
        assert!(!plain.contains("<g transform"));
        assert!(fitted.contains("<g transform=\"translate("));
        assert!(fitted.contains("viewBox=\"0 0 1200.00 800.00\""));
        assert!(fitted.contains("Notify"));
    }
}
