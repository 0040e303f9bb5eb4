//! scale-objects command line
//!
//! Usage:
//!   scale-objects replay scenario.ron     # Play a scripted resize session
//!   scale-objects pick --min 0 0 0 --max 2 2 2 --origin 5 1 1 --direction -1 0 0

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use scale_objects::config::Preferences;
use scale_objects::geometry::{BBox3, Ray, Vec3};
use scale_objects::replay::Scenario;
use scale_objects::tool::{pick_handles, WorldHandlePicker};

#[derive(Parser)]
#[command(name = "scale-objects")]
#[command(about = "Bounding-box handle picking and resizing")]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a RON interaction scenario and print the final bounds
    Replay {
        scenario: PathBuf,
    },
    /// Pick one ray against one box and list every handle hit
    Pick {
        #[arg(long, required = true, num_args = 3, allow_negative_numbers = true)]
        min: Vec<f32>,
        #[arg(long, required = true, num_args = 3, allow_negative_numbers = true)]
        max: Vec<f32>,
        #[arg(long, required = true, num_args = 3, allow_negative_numbers = true)]
        origin: Vec<f32>,
        #[arg(long, required = true, num_args = 3, allow_negative_numbers = true)]
        direction: Vec<f32>,
        /// Handle tolerance in world units (defaults to the saved preference)
        #[arg(long)]
        radius: Option<f32>,
    },
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Replay { scenario } => replay(scenario),
        Commands::Pick { min, max, origin, direction, radius } => {
            pick(&min, &max, &origin, &direction, radius)
        }
    }
}

fn replay(path: PathBuf) -> Result<()> {
    let scenario = Scenario::load(&path)
        .with_context(|| format!("Failed to load scenario {}", path.display()))?;
    let report = scenario
        .run()
        .with_context(|| format!("Scenario {} failed", path.display()))?;

    for line in &report.log {
        println!("{}", line);
    }
    match report.final_bounds {
        Some(bounds) => println!("final bounds: {}", bounds),
        None => println!("final bounds: (no selection)"),
    }
    println!("undo entries: {}", report.undo_depth);
    Ok(())
}

fn vec3(name: &str, values: &[f32]) -> Result<Vec3> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("--{} takes exactly three numbers", name),
    }
}

fn pick(min: &[f32], max: &[f32], origin: &[f32], direction: &[f32], radius: Option<f32>) -> Result<()> {
    let bbox = BBox3::new(vec3("min", min)?, vec3("max", max)?);
    if !bbox.is_valid() {
        bail!("box {} is invalid", bbox);
    }
    let direction = vec3("direction", direction)?;
    if direction.is_zero() {
        bail!("ray direction must not be zero");
    }
    let ray = Ray::new(vec3("origin", origin)?, direction);

    let radius = match radius {
        Some(radius) => radius,
        None => {
            let prefs = match Preferences::default_path() {
                Some(path) => Preferences::load_or_default(&path)
                    .with_context(|| format!("Failed to read preferences {}", path.display()))?,
                None => Preferences::default(),
            };
            prefs.handle_radius
        }
    };

    let result = pick_handles(&ray, &bbox, &WorldHandlePicker, radius);
    if result.is_empty() {
        println!("no hit");
        return Ok(());
    }
    for hit in result.hits() {
        println!("{:<6} {:<32} distance {:.4} at {}", hit.kind().as_str(), hit.target.to_string(), hit.distance, hit.point);
    }
    Ok(())
}
