//! Koala layout CLI
//!
//! Lays out a box tree described as JSON and prints where every box ends up.
//!
//! ```text
//! koala tree.json              # colored box report
//! koala --json tree.json       # machine readable report
//! koala -v tree.json           # trace the layout pass on stderr
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use app_units::Au;
use clap::{Parser, ValueEnum};
use koala_common::logging::{LogConfig, LogFormat, init_logging};
use koala_layout::{
    BoxId, GeometryViolation, LayoutContext, LayoutOptions, LayoutSize, LayoutTree,
    TreeDescription,
};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Koala layout: position boxes the CSS 2.1 way
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a tree and print every box
    koala page.json

    # Override the viewport from the file
    koala --width 1280 --height 720 page.json

    # Emit JSON and fail on box model violations
    koala --json --strict page.json

    # Watch the out-of-flow traversal
    koala -v --log-filter koala_layout=debug page.json
"#)]
struct Cli {
    /// Box tree description (JSON)
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Viewport width in px, overriding the description
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height in px, overriding the description
    #[arg(long)]
    height: Option<f32>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Exit with an error when any box breaks a box model equality
    #[arg(long)]
    strict: bool,

    /// Log the layout pass step by step
    #[arg(short, long)]
    verbose: bool,

    /// Tracing filter, e.g. "koala_layout=debug"
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogStyle::Pretty)]
    log_format: LogStyle,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogStyle {
    Pretty,
    Compact,
    Json,
}

impl From<LogStyle> for LogFormat {
    fn from(style: LogStyle) -> Self {
        match style {
            LogStyle::Pretty => Self::Pretty,
            LogStyle::Compact => Self::Compact,
            LogStyle::Json => Self::Json,
        }
    }
}

/// One laid out box, in initial containing block coordinates.
#[derive(Debug, Serialize)]
struct BoxReport {
    id: usize,
    label: String,
    depth: usize,
    position: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    content_width: f32,
    content_height: f32,
}

#[derive(Debug, Serialize)]
struct Report {
    viewport: [f32; 2],
    boxes: Vec<BoxReport>,
    violations: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = if cli.verbose {
        LogConfig::debug()
    } else {
        LogConfig::default()
    };
    if let Some(filter) = &cli.log_filter {
        log_config = log_config.with_filter(filter.clone());
    }
    init_logging(&log_config.with_format(cli.log_format.into()));

    let source = fs::read_to_string(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let description: TreeDescription = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a valid box tree", cli.path.display()))?;
    let tree = LayoutTree::from_description(&description).context("failed to build box tree")?;

    let described = description.viewport_size();
    let viewport = LayoutSize::new(
        cli.width.map_or(described.width, Au::from_f32_px),
        cli.height.map_or(described.height, Au::from_f32_px),
    );

    let mut ctx = LayoutContext::new(&tree, viewport).with_options(LayoutOptions {
        validate_geometry: false,
    });
    ctx.layout();

    let violations = ctx.check_geometry_constraints();
    let report = build_report(&ctx, &violations);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if cli.strict && !violations.is_empty() {
        bail!("{} box model violation(s)", violations.len());
    }
    Ok(())
}

fn build_report(ctx: &LayoutContext<'_>, violations: &[GeometryViolation]) -> Report {
    let tree = ctx.tree();
    let viewport = ctx.viewport();
    let boxes = std::iter::once(BoxId::ROOT)
        .chain(tree.descendants(BoxId::ROOT))
        .map(|id| {
            let border_box = ctx.absolute_box(id).border_box();
            let computed_box = ctx.computed_box(id);
            BoxReport {
                id: id.0,
                label: tree.label(id),
                depth: tree.ancestors(id).count(),
                position: tree.layout_box(id).position().to_string(),
                x: border_box.x.to_f32_px(),
                y: border_box.y.to_f32_px(),
                width: border_box.width.to_f32_px(),
                height: border_box.height.to_f32_px(),
                content_width: computed_box.content_box_width().to_f32_px(),
                content_height: computed_box.content_box_height().to_f32_px(),
            }
        })
        .collect();

    Report {
        viewport: [viewport.width.to_f32_px(), viewport.height.to_f32_px()],
        boxes,
        violations: violations.iter().map(ToString::to_string).collect(),
    }
}

fn print_report(report: &Report) {
    let heading = format!(
        "=== Layout (viewport: {}x{}) ===",
        report.viewport[0], report.viewport[1]
    );
    println!("{}\n", heading.bold());

    for entry in &report.boxes {
        let indent = "  ".repeat(entry.depth);
        let position = match entry.position.as_str() {
            "absolute" | "fixed" => entry.position.magenta().to_string(),
            "relative" => entry.position.yellow().to_string(),
            _ => entry.position.dimmed().to_string(),
        };
        println!(
            "{indent}{} [{position}] at ({}, {}) size {}x{} content {}x{}",
            entry.label.cyan(),
            entry.x,
            entry.y,
            entry.width,
            entry.height,
            entry.content_width,
            entry.content_height,
        );
    }

    if report.violations.is_empty() {
        println!("\n{}", "box model equalities hold".green());
    } else {
        println!("\n{}", "=== Violations ===".red().bold());
        for violation in &report.violations {
            println!("  {}", violation.red());
        }
    }
}
