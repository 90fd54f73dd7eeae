//! Synoptic layout CLI
//!
//! Usage:
//!   synoptic-layout [OPTIONS] <FILE>
//!
//! Options:
//!   --translate <X,Y>  Move the reference shape before printing
//!   --rotate <DEG>     Rotate the reference shape (clockwise degrees)
//!   --scale <F>        Scale the reference shape
//!   -v, --verbose      Log alignment and routing decisions
//!   -h, --help         Print help

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use synoptic_geometry::{load_composite, Composite, DefinitionError, Point};

#[derive(Parser)]
#[command(name = "synoptic-layout")]
#[command(about = "Compute shape positions and connector paths for a synoptic diagram")]
struct Cli {
    /// Diagram definition (TOML)
    file: PathBuf,

    /// Translate the reference shape by X,Y
    #[arg(long, value_name = "X,Y", value_parser = parse_offset, allow_hyphen_values = true)]
    translate: Option<Point>,

    /// Rotate the reference shape, clockwise degrees
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    rotate: Option<f64>,

    /// Scale the reference shape
    #[arg(long, value_name = "F")]
    scale: Option<f64>,

    /// Log alignment and routing decisions
    #[arg(short, long)]
    verbose: bool,
}

fn parse_offset(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but found '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {}", s, e))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // a subscriber may already be installed by an embedding process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = match fs::read_to_string(&cli.file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.file.display(), e);
            std::process::exit(1);
        }
    };

    match run(&cli, &source) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            let filename = cli.file.display().to_string();
            eprintln!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, source: &str) -> Result<String, DefinitionError> {
    let mut composite = load_composite(source)?;

    // scale resets every shape, so it goes first
    if let Some(factor) = cli.scale {
        composite.scale(factor)?;
    }
    if let Some(degrees) = cli.rotate {
        composite.rotate(degrees)?;
    }
    if let Some(offset) = cli.translate {
        composite.translate(offset)?;
    }

    Ok(describe(&composite)?)
}

fn describe(composite: &Composite) -> Result<String, synoptic_geometry::LayoutError> {
    let mut out = String::new();
    for (i, shape) in composite.shapes().iter().enumerate() {
        let bounds = shape.calculate_shape_boundary();
        let marker = if i == composite.ref_shape_index() { " (reference)" } else { "" };
        let _ = writeln!(
            out,
            "shape {}{}: {} x [{:.2}, {:.2}] y [{:.2}, {:.2}]",
            i, marker, shape, bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max
        );
    }
    for (i, line) in composite.lines()?.iter().enumerate() {
        let points: Vec<String> = line.path.iter().map(|p| p.to_string()).collect();
        let _ = writeln!(
            out,
            "connector {}: {}.{} -> {}.{}: {}",
            i,
            line.shapes[0],
            line.anchors[0],
            line.shapes[1],
            line.anchors[1],
            points.join(" ")
        );
    }
    Ok(out)
}
