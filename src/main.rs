//! Atoll: streamed island terrain around a fly camera.
mod camera;
mod config;
mod headless;
mod viewer;

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use atoll_runtime::GenerationMode;

use crate::config::{AppConfig, load_app_config};

#[derive(Parser, Debug)]
#[command(name = "atoll", about = "Streamed island terrain viewer")]
struct Cli {
    /// TOML file with [stream], [terrain] and [viewer] tables.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the terrain seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Generation threads; 0 picks automatically. Omit to generate inline.
    #[arg(short, long)]
    workers: Option<usize>,
    /// Run this many ticks along a scripted path without opening a window.
    #[arg(long, value_name = "TICKS")]
    headless: Option<usize>,
    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let Some(path) = log_file else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        return Ok(());
    };
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| LevelFilter::from_str(&s).ok())
        .unwrap_or(LevelFilter::Info);
    let cfg = simplelog::Config::default();
    CombinedLogger::init(vec![
        TermLogger::new(level, cfg.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, cfg, File::create(path)?),
    ])?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let cfg = load_app_config(path)?;
            log::info!("loaded config from {}", path.display());
            cfg
        }
        None => AppConfig::default(),
    };
    if let Some(seed) = cli.seed {
        cfg.terrain.seed = seed;
    }
    if let Some(n) = cli.workers {
        cfg.viewer.workers = n;
    }
    Ok(cfg)
}

fn generation_mode(cli: &Cli, cfg: &AppConfig) -> GenerationMode {
    match cli.workers {
        Some(_) => GenerationMode::Workers(cfg.viewer.workers),
        None if cfg.viewer.workers > 0 => GenerationMode::Workers(cfg.viewer.workers),
        None => GenerationMode::Inline,
    }
}

fn run(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let cfg = load_config(cli)?;
    let mode = generation_mode(cli, &cfg);
    log::info!("seed {} mode {:?}", cfg.terrain.seed, mode);
    match cli.headless {
        Some(ticks) => {
            let summary = headless::run_headless(&cfg, ticks, mode)?;
            println!(
                "ticks {}  active {}  peak {}  created {}  evicted {}  faults {}  leaks {}",
                summary.ticks,
                summary.last.active,
                summary.peak_active,
                summary.created,
                summary.evicted,
                summary.faults,
                summary.leaks
            );
            Ok(summary.clean())
        }
        None => {
            viewer::run_viewer(&cfg, mode)?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_file.as_ref()) {
        eprintln!("logging: {e}");
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
