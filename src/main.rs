mod app;
mod config;
mod device;
mod game;
mod input;
mod render;
mod scheduler;
mod sound;
mod strip;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;

use crate::config::Args;

fn init_logging(args: &Args) -> Result<()> {
    // The terminal is the LED strip, so records only go to a file.
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_logging(&args)?;
    log::info!("starting with {:?}", args);
    app::run(&args)
}
