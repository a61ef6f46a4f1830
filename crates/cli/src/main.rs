#![deny(unsafe_code)]
//! CLI binary for canvas-nest.
//!
//! Subcommands:
//! - `render`: attach a nest to an in-memory host, run N frames, write PNG
//! - `config`: print the resolved configuration or its parameter schema

mod error;

use canvas_nest_core::{attach, ColorChannels, ManualScheduler, NestConfig, PointerHub};
use canvas_nest_raster::{snapshot, RasterHost};
use clap::{Parser, Subcommand};
use error::CliError;
use serde_json::Value;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "canvas-nest", about = "Particle-link background renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Animate a nest for N frames and write the overlay as a PNG.
    Render {
        /// Host width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Host height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// Number of particles (overrides the config).
        #[arg(short, long)]
        count: Option<usize>,

        /// Number of frames to animate before the snapshot.
        #[arg(short, long, default_value_t = 60)]
        frames: usize,

        /// PRNG seed for deterministic particle placement.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Line color as "r,g,b" (overrides the config).
        #[arg(long)]
        color: Option<String>,

        /// Pointer position "x,y" in page coordinates, moved before the
        /// first frame.
        #[arg(long)]
        pointer: Option<String>,

        /// Opaque page color "r,g,b" behind the overlay; transparent if unset.
        #[arg(long)]
        background: Option<String>,

        /// Nest options as a JSON object.
        #[arg(long)]
        config: Option<String>,

        /// Output file path.
        #[arg(short, long, default_value = "nest.png")]
        output: PathBuf,
    },
    /// Print the resolved configuration.
    Config {
        /// Nest options as a JSON object.
        #[arg(long)]
        config: Option<String>,

        /// Print the parameter schema instead.
        #[arg(long)]
        schema: bool,
    },
}

/// Merges `--config` JSON over the defaults.
fn resolve_config(config: Option<&str>) -> Result<NestConfig, CliError> {
    let Some(raw) = config else {
        return Ok(NestConfig::default());
    };
    let options: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::Input(format!("invalid --config JSON: {e}")))?;
    if !options.is_object() {
        return Err(CliError::Input("--config must be a JSON object".into()));
    }
    Ok(NestConfig::from_json(&options)?)
}

/// Parses `"x,y"` into two finite numbers.
fn parse_pair(s: &str, flag: &str) -> Result<(f64, f64), CliError> {
    let invalid = || CliError::Input(format!("invalid {flag} {s:?}: expected \"x,y\""));
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok((x, y))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config { config, schema } => {
            if schema {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&NestConfig::param_schema())?
                );
                return Ok(());
            }
            let config = resolve_config(config.as_deref())?;
            config.validate()?;
            let resolved = config.to_json();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else if let Value::Object(map) = resolved {
                for (key, value) in map {
                    println!("{key} = {value}");
                }
            }
        }
        Command::Render {
            width,
            height,
            count,
            frames,
            seed,
            color,
            pointer,
            background,
            config,
            output,
        } => {
            let mut nest_config = resolve_config(config.as_deref())?;
            if let Some(count) = count {
                nest_config.count = count;
            }
            if let Some(color) = color.as_deref() {
                nest_config.color = ColorChannels::parse(color)?;
            }
            let pointer = pointer
                .as_deref()
                .map(|p| parse_pair(p, "--pointer"))
                .transpose()?;
            let background = background
                .as_deref()
                .map(ColorChannels::parse)
                .transpose()?;

            let scheduler = ManualScheduler::new();
            let hub = PointerHub::new();
            let nest = attach(
                RasterHost::new(width, height)?,
                &nest_config,
                scheduler.clone(),
                hub.clone(),
                seed,
            )?;
            if let Some((x, y)) = pointer {
                hub.dispatch_move(x, y);
            }
            scheduler.run_frames(frames);
            let stats = nest.last_stats();
            let drawn = nest.frames();
            let written = nest.with_surface(|s| snapshot::write_png(s, background, &output));
            nest.destroy();
            written?;

            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "count": nest_config.count,
                    "frames": drawn,
                    "seed": seed,
                    "links": stats.links,
                    "nudges": stats.nudges,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} points ({width}x{height}, {drawn} frames, seed {seed}, {} links) -> {}",
                    nest_config.count,
                    stats.links,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
