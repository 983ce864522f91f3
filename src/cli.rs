use crate::config::load_config;
use crate::flow::flow_elements;
use crate::layout::{LayoutAnchors, compute_layout, route_links};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::logging::init_logging;
use crate::parser::{InputFormat, parse_document};
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "topo", version, about = "Lay out change topologies: predecessors, task steps, successors")]
pub struct Args {
    /// Input file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted (png requires a path).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (geometry, fit, render, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Change to lay out when the input is a catalog
    #[arg(long = "change")]
    pub change: Option<String>,

    /// Task to highlight instead of the derived selection
    #[arg(long = "select")]
    pub select: Option<String>,

    /// Also write the computed layout as JSON to this path
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Layout dump with coordinates per node
    Json,
    /// Node-graph descriptors
    Flow,
    /// Curve paths for predecessor and successor links
    Links,
}

#[derive(Serialize)]
struct LinkOut<'a> {
    id: &'a str,
    d: &'a str,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = load_config(args.config.as_deref())?;

    let (input, format) = read_input(args.input.as_deref())?;
    let document = parse_document(&input, format)?;
    let data = document.select(args.change.as_deref())?;

    let layout = compute_layout(data, &config.layout);
    let selected = args.select.as_deref().or_else(|| data.selected_task_id());
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout, data)
            .with_context(|| format!("writing layout dump {}", path.display()))?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, data, selected, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&args, &layout, data, selected, &config)?,
        OutputFormat::Json => {
            let dump = LayoutDump::from_layout(&layout, data);
            write_json(&dump, args.output.as_deref())?;
        }
        OutputFormat::Flow => {
            let graph = flow_elements(data, &layout, selected);
            write_json(&graph, args.output.as_deref())?;
        }
        OutputFormat::Links => {
            let anchors = LayoutAnchors::new(&layout, config.render.padding);
            let links = route_links(data, &anchors);
            let out: Vec<LinkOut<'_>> = links
                .iter()
                .map(|link| LinkOut {
                    id: &link.id,
                    d: &link.path,
                })
                .collect();
            write_json(&out, args.output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(
    args: &Args,
    layout: &crate::layout::TopologyLayout,
    data: &crate::model::TopologyData,
    selected: Option<&str>,
    config: &crate::config::Config,
) -> Result<()> {
    let output = ensure_output(&args.output, "png")?;
    let svg = render_svg(layout, data, selected, &config.theme, &config.render);
    crate::render::write_output_png(&svg, &output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _args: &Args,
    _layout: &crate::layout::TopologyLayout,
    _data: &crate::model::TopologyData,
    _selected: Option<&str>,
    _config: &crate::config::Config,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<(String, InputFormat)> {
    if let Some(path) = path {
        if path != Path::new("-") {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading input {}", path.display()))?;
            let format = path
                .extension()
                .and_then(|e| e.to_str())
                .map(InputFormat::from_extension)
                .unwrap_or(InputFormat::Json);
            return Ok((content, format));
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, InputFormat::Json))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
