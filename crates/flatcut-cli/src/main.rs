//! flatcut - laser-cut outlines from thin STEP solids
//!
//! Reads a STEP file, flattens every sheet-like solid in it and writes the
//! outlines as SVG, DXF or JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use flatcut_export::{DxfDocument, LayoutOptions, SvgDocument, SvgStyle};
use flatcut_outline::{extract_outlines, ExtractSettings, Outline, SolidReport};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flatcut", version)]
#[command(about = "Extract laser-cut outlines from thin STEP solids", long_about = None)]
struct Cli {
    /// Log every pipeline stage
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract outlines from a STEP file
    Extract {
        /// Input STEP file (.step or .stp)
        input: PathBuf,
        /// Output file (default: input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sheet thickness in mm
        #[arg(long)]
        thickness: Option<f64>,
        /// Accepted deviation from the thickness in mm
        #[arg(long)]
        tolerance: Option<f64>,
        /// TOML file with extraction settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format (default: from the output extension, else svg)
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Gap between parts in the drawing, in mm
        #[arg(long)]
        gap: Option<f64>,
    },
    /// List the solids in a STEP file
    Info {
        /// Input STEP file
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Dxf,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "dxf" => Some(Self::Dxf),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Dxf => "dxf",
            Self::Json => "json",
        }
    }
}

/// Pick the format and output path from what the user gave.
fn resolve_output(input: &Path, output: Option<PathBuf>, format: Option<Format>) -> (Format, PathBuf) {
    let format = format
        .or_else(|| output.as_deref().and_then(Format::from_path))
        .unwrap_or(Format::Svg);
    let path = output.unwrap_or_else(|| input.with_extension(format.extension()));
    (format, path)
}

fn load_settings(
    config: Option<&Path>,
    thickness: Option<f64>,
    tolerance: Option<f64>,
) -> Result<ExtractSettings> {
    let mut settings = match config {
        Some(path) => ExtractSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => ExtractSettings::default(),
    };
    if let Some(t) = thickness {
        settings.thickness = t;
    }
    if let Some(t) = tolerance {
        settings.tolerance = t;
    }
    settings.validate().context("invalid extraction settings")?;
    Ok(settings)
}

fn layout_options(gap: Option<f64>) -> Result<LayoutOptions> {
    let mut layout = LayoutOptions::default();
    if let Some(gap) = gap {
        ensure!(
            gap.is_finite() && gap >= 0.0,
            "gap must be a finite, non-negative distance in mm, got {gap}"
        );
        layout.gap = gap;
    }
    Ok(layout)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            output,
            thickness,
            tolerance,
            config,
            format,
            gap,
        } => {
            let settings = load_settings(config.as_deref(), thickness, tolerance)?;
            let (format, output) = resolve_output(&input, output, format);
            let layout = layout_options(gap)?;
            extract(&input, &output, format, &settings, &layout)?;
        }
        Commands::Info { input } => {
            show_info(&input)?;
        }
    }

    Ok(())
}

fn extract(
    input: &Path,
    output: &Path,
    format: Format,
    settings: &ExtractSettings,
    layout: &LayoutOptions,
) -> Result<()> {
    let solids = flatcut_step::read_step(input)
        .with_context(|| format!("reading {}", input.display()))?;
    info!(
        input = %input.display(),
        solids = solids.len(),
        thickness = settings.thickness,
        tolerance = settings.tolerance,
        "extracting outlines"
    );

    let reports = extract_outlines(&solids, settings);
    for report in &reports {
        log_report(report);
    }

    let outlines: Vec<Outline> = reports
        .into_iter()
        .filter_map(|r| r.outcome.ok())
        .collect();
    if outlines.is_empty() {
        warn!("no solid produced an outline");
    }

    let written = match format {
        Format::Svg => {
            let mut doc = SvgDocument::new(SvgStyle::default(), *layout);
            for outline in &outlines {
                doc.add_outline(outline.clone());
            }
            doc.export(output)
        }
        Format::Dxf => DxfDocument::from_outlines(&outlines, layout).export(output),
        Format::Json => {
            let json = serde_json::to_string_pretty(&outlines)?;
            fs::write(output, json)
        }
    };
    written.with_context(|| format!("writing {}", output.display()))?;

    info!(
        output = %output.display(),
        format = format.extension(),
        outlines = outlines.len(),
        skipped = solids.len() - outlines.len(),
        "done"
    );
    Ok(())
}

fn log_report(report: &SolidReport) {
    for warning in &report.warnings {
        warn!(solid = %report.name, "{warning}");
    }
    match &report.outcome {
        Ok(outline) => info!(
            solid = %report.name,
            vertices = outline.outer.len(),
            holes = outline.holes.len(),
            width = outline.width(),
            height = outline.height(),
            "outline extracted"
        ),
        Err(reason) => warn!(solid = %report.name, "skipped: {reason}"),
    }
    if let Some(alignment) = &report.alignment {
        debug!(
            solid = %report.name,
            thickness = alignment.thickness,
            spin = ?alignment.spin,
            "alignment"
        );
    }
}

fn show_info(input: &Path) -> Result<()> {
    let solids = flatcut_step::read_step(input)
        .with_context(|| format!("reading {}", input.display()))?;

    println!("STEP file: {}", input.display());
    println!("  Solids: {}", solids.len());
    for (i, solid) in solids.iter().enumerate() {
        println!(
            "  {}: {} ({} faces, {} loops, {} edges, {} vertices)",
            i + 1,
            solid.name,
            solid.faces.len(),
            solid.num_loops(),
            solid.edges.len(),
            solid.vertices.len()
        );
    }
    Ok(())
}
