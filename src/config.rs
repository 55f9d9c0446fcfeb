use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::Pacing;

// ── Grid ────────────────────────────────────────────────────────────────────

pub(crate) const COLS: usize = 8;
pub(crate) const ROWS: usize = 4;
pub(crate) const LED_COUNT: usize = COLS * ROWS;

/// A new wall enters the grid every this many ticks.
pub(crate) const SPAWN_EVERY: u64 = 4;
/// Length of the crash flash sequence, in ticks.
pub(crate) const CRASH_FLASHES: u8 = 4;
/// Timer steps per frame of the idle and pairing animations.
pub(crate) const ANIMATION_STEPS: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SideMode {
    /// Walls alternate between hanging from the top and rising from the bottom
    Alternate,
    /// Each wall picks its side at random
    Random,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "flappy-strip")]
#[command(about = "Flappy Bird on a 4x8 LED strip, played with one button", long_about = None)]
pub(crate) struct Args {
    /// Timer interval in milliseconds. Everything is paced in these steps.
    #[arg(long, default_value_t = 10)]
    pub(crate) step_ms: u64,

    /// Steps per game tick when a round starts.
    #[arg(long, default_value_t = 50)]
    pub(crate) start_steps: u32,

    /// Fastest pace the ramp can reach, in steps per tick.
    #[arg(long, default_value_t = 12)]
    pub(crate) min_steps: u32,

    /// Game ticks between two speed-ups.
    #[arg(long, default_value_t = 8)]
    pub(crate) ramp_every: u32,

    /// How walls choose the side they grow from
    #[arg(long, value_enum, default_value_t = SideMode::Alternate)]
    pub(crate) sides: SideMode,

    /// Seed for the wall generator (random when omitted)
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Global LED brightness, 0-255
    #[arg(long, default_value_t = 255)]
    pub(crate) brightness: u8,

    /// Frames of idle animation between game over and the next round
    #[arg(long, default_value_t = 24)]
    pub(crate) idle_frames: u32,

    /// Milliseconds between two button discovery attempts
    #[arg(long, default_value_t = 1000)]
    pub(crate) discovery_ms: u64,

    /// Disable sound
    #[arg(long, default_value_t = false)]
    pub(crate) mute: bool,

    /// Write log records to this file (RUST_LOG sets the filter)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            step_ms: 10,
            start_steps: 50,
            min_steps: 12,
            ramp_every: 8,
            sides: SideMode::Alternate,
            seed: None,
            brightness: 255,
            idle_frames: 24,
            discovery_ms: 1000,
            mute: false,
            log_file: None,
        }
    }
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.step_ms == 0 {
            bail!("--step-ms must be at least 1");
        }
        if self.min_steps == 0 {
            bail!("--min-steps must be at least 1");
        }
        if self.min_steps > self.start_steps {
            bail!(
                "--min-steps ({}) cannot exceed --start-steps ({})",
                self.min_steps,
                self.start_steps
            );
        }
        if self.ramp_every == 0 {
            bail!("--ramp-every must be at least 1");
        }
        Ok(())
    }

    pub(crate) fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    pub(crate) fn pacing(&self) -> Pacing {
        Pacing {
            start_steps: self.start_steps,
            min_steps: self.min_steps,
            ramp_every: self.ramp_every,
        }
    }

    /// Discovery interval in timer steps, never less than one.
    pub(crate) fn discovery_steps(&self) -> u64 {
        (self.discovery_ms / self.step_ms.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_and_validate() {
        let args = Args::parse_from(["flappy-strip"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.step(), Duration::from_millis(10));
        assert_eq!(args.sides, SideMode::Alternate);
        assert_eq!(args.discovery_steps(), 100);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "flappy-strip",
            "--sides",
            "random",
            "--seed",
            "7",
            "--start-steps",
            "20",
            "--min-steps",
            "5",
        ]);
        assert_eq!(args.sides, SideMode::Random);
        assert_eq!(args.seed, Some(7));
        let pacing = args.pacing();
        assert_eq!(pacing.start_steps, 20);
        assert_eq!(pacing.min_steps, 5);
    }

    #[test]
    fn rejects_bad_pacing() {
        let zero_step = Args {
            step_ms: 0,
            ..Args::default()
        };
        assert!(zero_step.validate().is_err());

        let inverted = Args {
            start_steps: 5,
            min_steps: 10,
            ..Args::default()
        };
        assert!(inverted.validate().is_err());

        let no_ramp = Args {
            ramp_every: 0,
            ..Args::default()
        };
        assert!(no_ramp.validate().is_err());
    }

    #[test]
    fn discovery_steps_never_zero() {
        let args = Args {
            discovery_ms: 3,
            ..Args::default()
        };
        assert_eq!(args.discovery_steps(), 1);
    }
}
