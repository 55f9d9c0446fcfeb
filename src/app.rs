use anyhow::{Context, Result};
use crossterm::{cursor, execute, terminal};
use std::io::{self, Stdout, stdout};
use std::time::Instant;

use crate::config::{ANIMATION_STEPS, Args};
use crate::device::{ButtonDevice, ConnectError, DeviceEvent, KeyboardButton};
use crate::game::{GameState, TickEvent, WallSource, WallSpawner};
use crate::input::ButtonLatch;
use crate::render::{idle_frame, pairing_frame, render};
use crate::scheduler::Scheduler;
use crate::sound::{Cues, Sound};
use crate::strip::{LedStrip, TerminalStrip};

#[derive(Debug)]
enum Mode {
    Connecting { attempts: u32 },
    Playing { game: GameState },
    GameOver { frames: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Connecting → playing → game over → playing ..., one timer step at a time.
pub(crate) struct App<S: WallSource> {
    mode: Mode,
    scheduler: Scheduler,
    latch: ButtonLatch,
    walls: S,
    step: u64,
    mode_started: u64,
    discovery_steps: u64,
    idle_frames: u32,
    rounds: u32,
    best: u32,
}

impl<S: WallSource> App<S> {
    pub(crate) fn new(args: &Args, walls: S) -> Self {
        Self {
            mode: Mode::Connecting { attempts: 0 },
            scheduler: Scheduler::new(args.pacing()),
            latch: ButtonLatch::new(),
            walls,
            step: 0,
            mode_started: 0,
            discovery_steps: args.discovery_steps(),
            idle_frames: args.idle_frames,
            rounds: 0,
            best: 0,
        }
    }

    /// Steps since the current mode began.
    fn elapsed(&self) -> u64 {
        self.step - self.mode_started
    }

    fn enter(&mut self, mode: Mode) {
        self.mode = mode;
        self.mode_started = self.step;
    }

    fn start_round(&mut self, strip: &mut impl LedStrip) -> Result<()> {
        self.rounds += 1;
        log::info!("round {} starts", self.rounds);
        self.scheduler.reset();
        self.latch.reset();
        let game = GameState::new();
        strip.show(&render(&game))?;
        self.enter(Mode::Playing { game });
        Ok(())
    }

    /// One timer step.
    pub(crate) fn step(
        &mut self,
        device: &mut impl ButtonDevice,
        strip: &mut impl LedStrip,
        cues: &mut impl Cues,
    ) -> Result<Flow> {
        self.step += 1;
        let flow = match self.mode {
            Mode::Connecting { .. } => self.connecting(device, strip)?,
            Mode::Playing { .. } => self.playing(device, strip, cues)?,
            Mode::GameOver { .. } => self.game_over(device, strip)?,
        };
        if flow == Flow::Exit {
            strip.clear()?;
            device.disconnect();
        }
        Ok(flow)
    }

    fn connecting(
        &mut self,
        device: &mut impl ButtonDevice,
        strip: &mut impl LedStrip,
    ) -> Result<Flow> {
        let elapsed = self.elapsed();
        if elapsed % ANIMATION_STEPS == 0 {
            strip.show(&pairing_frame(elapsed / ANIMATION_STEPS))?;
        }
        if elapsed % self.discovery_steps != 0 {
            return Ok(Flow::Continue);
        }

        let Mode::Connecting { attempts } = &mut self.mode else {
            return Ok(Flow::Continue);
        };
        *attempts += 1;
        match device.discover() {
            Ok(()) => {
                log::info!("button connected after {} attempt(s)", attempts);
                self.start_round(strip)?;
            }
            Err(ConnectError::Cancelled) => {
                log::info!("pairing cancelled");
                return Ok(Flow::Exit);
            }
            Err(ConnectError::NotFound) => log::debug!("no button yet, retrying"),
            Err(e) => log::warn!("{e}, retrying"),
        }
        Ok(Flow::Continue)
    }

    /// Drains pending button events. Returns false on disconnect.
    fn poll_button(&mut self, device: &mut impl ButtonDevice) -> Result<bool> {
        while let Some(event) = device.poll_event()? {
            match event {
                DeviceEvent::Pressed => self.latch.press(),
                DeviceEvent::Released => self.latch.release(),
                DeviceEvent::Disconnected => {
                    log::info!("button disconnected");
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn playing(
        &mut self,
        device: &mut impl ButtonDevice,
        strip: &mut impl LedStrip,
        cues: &mut impl Cues,
    ) -> Result<Flow> {
        if !self.poll_button(device)? {
            return Ok(Flow::Exit);
        }
        if !self.scheduler.on_step() {
            return Ok(Flow::Continue);
        }

        let pressed = self.latch.take();
        let Mode::Playing { game } = &mut self.mode else {
            return Ok(Flow::Continue);
        };
        let event = game.tick(pressed, &mut self.walls);
        strip.show(&render(game))?;

        if pressed && matches!(event, TickEvent::Advanced | TickEvent::Passed) {
            cues.flap();
        }
        match event {
            TickEvent::Crashed => {
                log::info!("crash after {} ticks", game.tick_count());
                cues.crash();
            }
            TickEvent::Finished => {
                let score = game.score();
                self.best = self.best.max(score);
                log::info!(
                    "game over, score {} (best {}), pace {} steps per tick",
                    score,
                    self.best,
                    self.scheduler.steps_per_tick()
                );
                self.enter(Mode::GameOver { frames: 0 });
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn game_over(
        &mut self,
        device: &mut impl ButtonDevice,
        strip: &mut impl LedStrip,
    ) -> Result<Flow> {
        if !self.poll_button(device)? {
            return Ok(Flow::Exit);
        }
        if self.elapsed() % ANIMATION_STEPS != 0 {
            return Ok(Flow::Continue);
        }

        let Mode::GameOver { frames } = &mut self.mode else {
            return Ok(Flow::Continue);
        };
        if *frames >= self.idle_frames {
            self.start_round(strip)?;
            return Ok(Flow::Continue);
        }
        strip.show(&idle_frame(u64::from(*frames)))?;
        *frames += 1;
        Ok(Flow::Continue)
    }
}

// ── Terminal session ────────────────────────────────────────────────────────

fn setup(out: &mut Stdout) -> Result<()> {
    terminal::enable_raw_mode().context("enabling raw mode")?;
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        terminal::Clear(terminal::ClearType::All),
    )
    .context("preparing terminal")?;
    Ok(())
}

fn cleanup(out: &mut Stdout) -> io::Result<()> {
    execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

pub(crate) fn run(args: &Args) -> Result<()> {
    let mut out = stdout();
    setup(&mut out)?;
    let result = run_loop(args);
    // Restore the terminal before reporting anything.
    let restored = cleanup(&mut out).context("restoring terminal");
    result.and(restored)
}

fn run_loop(args: &Args) -> Result<()> {
    let mut device = KeyboardButton::new(stdout());
    let mut strip = TerminalStrip::new(stdout(), args.brightness);
    let mut sound = Sound::open(args.mute);
    let mut app = App::new(args, WallSpawner::new(args.sides, args.seed));
    let step = args.step();

    log::info!("waiting for the button (press Enter or Space to pair, q to quit)");
    loop {
        let step_start = Instant::now();

        let flow = app.step(&mut device, &mut strip, &mut sound);
        if flow.is_err() {
            device.disconnect();
        }
        if flow? == Flow::Exit {
            return Ok(());
        }

        let elapsed = step_start.elapsed();
        if elapsed < step {
            std::thread::sleep(step - elapsed);
        }
    }
}
