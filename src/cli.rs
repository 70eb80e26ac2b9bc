use crate::config::load_config;
use crate::filter::Selection;
use crate::interaction::{DomainEvent, InteractionState};
use crate::ir::Snapshot;
use crate::layout_dump::write_layout_dump;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use crate::{RenderOptions, layout_snapshot};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lfr", version, about = "Layered data lineage renderer")]
pub struct Args {
    /// Lineage snapshot JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Container width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Container height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Origin system to include (repeatable, any spelling)
    #[arg(long = "system")]
    pub systems: Vec<String>,

    /// Consumer id to include (repeatable)
    #[arg(long = "consumer")]
    pub consumers: Vec<String>,

    /// Render as if this node were hovered
    #[arg(long = "hover")]
    pub hover: Option<String>,

    /// JSON array of domain events whose edges should render pulsing
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Also write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    let pulse_duration = Duration::from_millis(config.layout.pulse_duration_ms);

    let input = read_input(args.input.as_deref())?;
    let snapshot = Snapshot::from_json(&input).context("failed to parse lineage snapshot")?;
    tracing::info!(
        nodes = snapshot.nodes.len(),
        edges = snapshot.edges.len(),
        "loaded snapshot"
    );

    let selection = Selection::all()
        .with_systems(args.systems.iter().cloned())
        .with_consumers(args.consumers.iter().cloned());

    let now = Instant::now();
    let mut interaction = InteractionState::new(pulse_duration);
    interaction.hover(args.hover.as_deref());
    if let Some(path) = args.events.as_deref() {
        for event in read_events(path)? {
            interaction.apply_event(&event, now);
        }
    }

    let options = RenderOptions::from_config(config)
        .with_selection(selection)
        .with_view(interaction.view(now));
    let outcome = layout_snapshot(&snapshot, &options);

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &outcome)?;
    }

    let svg = render_svg(
        &outcome,
        &options.config.theme,
        &options.config.layout,
        &options.view,
    );
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &options)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, options: &RenderOptions) -> Result<()> {
    write_output_png(svg, output, &options.config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _options: &RenderOptions) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_events(path: &Path) -> Result<Vec<DomainEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read events {}", path.display()))?;
    parse_events(&raw)
}

fn parse_events(raw: &str) -> Result<Vec<DomainEvent>> {
    serde_json::from_str(raw).context("events must be a JSON array of {type, sourceId, targetId}")
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
