//! leap_tree — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use leap_tree::app::{run, run_headless};
use leap_tree::config::TreeConfig;
use leap_tree::tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(name = "leap_tree", version, about = "Gesture-driven photo tree")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long)]
    debug: bool,

    /// Photo to show at start-up (repeatable)
    #[arg(long = "photo", value_name = "PATH")]
    photos: Vec<String>,

    /// Start with hand tracking running
    #[arg(long)]
    camera: bool,

    /// Seed for layout jitter and particles
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the interactive prompts
    #[arg(long)]
    quick: bool,

    /// Run N scripted frames without a window
    #[arg(long, value_name = "FRAMES")]
    headless: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })?;

    let mut cfg = TreeConfig::load(cli.config.as_deref())?;
    cfg.photos.extend(cli.photos.iter().cloned());
    if cli.camera {
        cfg.gesture.start_active = true;
    }
    if cli.seed.is_some() {
        cfg.scene.seed = cli.seed;
    }

    if let Some(frames) = cli.headless {
        cfg.validate()?;
        let stages = run_headless(&cfg, frames)?;
        let names: Vec<_> = stages.iter().map(|s| s.as_str()).collect();
        println!("{}", names.join(" → "));
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         Leap Tree — Gesture-Driven Photo Tree                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    if cli.quick {
        println!(
            "  Quick-start: {} particles, {} ornaments, {} photo(s)\n",
            cfg.scene.particle_count,
            cfg.scene.ornament_count,
            cfg.photos.len()
        );
    } else {
        configure_interactively(&mut cfg);
    }
    cfg.validate()?;

    println!();
    println!("  Opening visualizer window…");
    println!();

    run(&cfg)
}

fn configure_interactively(cfg: &mut TreeConfig) {
    let answer = read_line("  Start hand tracking now? (y/N): ");
    if answer.trim().eq_ignore_ascii_case("y") {
        cfg.gesture.start_active = true;
    }

    let prompt = format!("  Particle count (default {}): ", cfg.scene.particle_count);
    if let Ok(n) = read_line(&prompt).trim().parse::<usize>() {
        cfg.scene.particle_count = n.min(200_000);
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
