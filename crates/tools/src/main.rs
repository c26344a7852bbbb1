use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use foundation::math::Vec2;
use tools::replay::{parse_waypoint, run_replay};
use tracing_subscriber::EnvFilter;
use world::manifest::{WorldManifest, load_manifest};

#[derive(Debug, Parser)]
#[command(name = "archipelago", about = "Inspect and replay island world manifests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a manifest, print a summary and any warnings.
    Validate {
        manifest: PathBuf,
        /// Exit non-zero if the manifest has warnings.
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Pan the camera through waypoints and print what the engine did.
    Replay {
        manifest: PathBuf,
        /// Camera waypoints as `x,y`, visited one per step.
        #[arg(long, num_args = 1.., value_parser = parse_waypoint, allow_hyphen_values = true)]
        path: Vec<Vec2>,
        #[arg(long, default_value_t = 100.0)]
        step_ms: f64,
        /// URL the page was opened at.
        #[arg(long, default_value = "/")]
        route: String,
        /// Print the report as JSON instead of one line per event.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Validate {
            manifest,
            deny_warnings,
        } => cmd_validate(manifest, deny_warnings),
        Command::Replay {
            manifest,
            path,
            step_ms,
            route,
            json,
        } => cmd_replay(manifest, &path, step_ms, &route, json),
    }
}

fn load(path: &Path) -> Result<WorldManifest, String> {
    load_manifest(path).map_err(|e| e.to_string())
}

fn cmd_validate(path: PathBuf, deny_warnings: bool) -> Result<(), String> {
    let manifest = load(&path)?;
    let config = manifest.config();

    println!(
        "{} (version {}): {} islands, {} sections",
        manifest.name.as_deref().unwrap_or("unnamed"),
        manifest.version,
        manifest.islands.len(),
        manifest.section_count()
    );
    for island in &manifest.islands {
        let [x, y, _] = island.position;
        println!(
            "  {:<16} ({x}, {y})  load {}  active {}  sections {}",
            island.id,
            island.load_radius,
            island.active_radius,
            island.sections.len()
        );
    }
    println!(
        "  tie_break {:?}, vacancy {:?}, easing {}",
        config.tie_break,
        config.vacancy,
        config.easing().name()
    );

    let warnings = manifest.warnings();
    for w in &warnings {
        eprintln!("warning: {w}");
    }
    if deny_warnings && !warnings.is_empty() {
        return Err(format!("{} warning(s) in {}", warnings.len(), path.display()));
    }
    Ok(())
}

fn cmd_replay(
    path: PathBuf,
    waypoints: &[Vec2],
    step_ms: f64,
    route: &str,
    json: bool,
) -> Result<(), String> {
    let manifest = load(&path)?;
    if waypoints.is_empty() && route == "/" {
        return Err("replay needs --path waypoints or a --route to open".to_string());
    }

    let report = run_replay(&manifest, route, waypoints, step_ms);
    if json {
        let payload = serde_json::to_string_pretty(&report).map_err(|e| format!("json: {e}"))?;
        println!("{payload}");
        return Ok(());
    }

    for event in &report.events {
        println!("{event}");
    }
    println!(
        "settled at {:.0}ms: camera ({}, {}), focus {}, route {}",
        report.elapsed_ms,
        report.final_position[0],
        report.final_position[1],
        report.focus.as_deref().unwrap_or("-"),
        report.final_path
    );
    Ok(())
}
