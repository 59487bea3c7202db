//! Mochi Console
//!
//! A virtual text-mode console drawn with a scalable font.

mod backend;
mod config;
mod demos;
mod input;

use std::error::Error;

use clap::Parser;
use console_core::{HeadlessBackend, Terminal};

use backend::WindowBackend;
use config::{BackendKind, CliArgs, Config};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::debug!("Starting Mochi Console");

    let args = CliArgs::parse();

    // Precedence: CLI > env > file > defaults
    let config = match Config::load_with_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Backend: {:?}, demo: {:?}", config.backend, config.demo);
    log::debug!(
        "Font: {:?} @ {}pt, {:?}",
        config.console.font.path,
        config.console.font.point_size,
        config.console.font.quality
    );

    match config.backend {
        BackendKind::Window => {
            let mut terminal = Terminal::<WindowBackend>::new(config.console.clone())?;
            demos::run(&mut terminal, config.demo, None)?;
        }
        BackendKind::Headless => {
            let mut terminal = Terminal::<HeadlessBackend>::new(config.console.clone())?;
            demos::run(&mut terminal, config.demo, Some(config.headless_frames))?;
            let stats = terminal.last_stats();
            println!(
                "{} frames, last frame: {} characters, {} rectangles, {} skipped",
                terminal.backend().frames_presented(),
                stats.characters,
                stats.rectangles,
                stats.skipped
            );
        }
    }

    log::debug!("Mochi Console exited");
    Ok(())
}
