use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use crate::config::{COLS, CRASH_FLASHES, ROWS, SPAWN_EVERY, SideMode};

// ── Bird ────────────────────────────────────────────────────────────────────

/// Vertical position of the bird. Lane 0 is the top row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bird {
    lane: usize,
}

impl Bird {
    pub(crate) fn new() -> Self {
        Self { lane: ROWS / 2 }
    }

    pub(crate) fn lane(&self) -> usize {
        self.lane
    }

    fn flap(&mut self) {
        self.lane = self.lane.saturating_sub(1);
    }

    fn fall(&mut self) {
        self.lane = (self.lane + 1).min(ROWS - 1);
    }
}

// ── Walls ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Top,
    Bottom,
}

impl Side {
    pub(crate) fn flipped(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Wall {
    side: Side,
    gap: [bool; ROWS],
    x: i32,
}

impl Wall {
    /// A wall blocking `height` cells from `side`, placed just off the right
    /// edge. The height is clamped so at least one gap cell remains.
    pub(crate) fn new(side: Side, height: usize) -> Self {
        let height = height.clamp(1, ROWS - 1);
        let mut gap = [true; ROWS];
        for lane in 0..height {
            let blocked = match side {
                Side::Top => lane,
                Side::Bottom => ROWS - 1 - lane,
            };
            gap[blocked] = false;
        }
        Self {
            side,
            gap,
            x: COLS as i32,
        }
    }

    pub(crate) fn side(&self) -> Side {
        self.side
    }

    pub(crate) fn x(&self) -> i32 {
        self.x
    }

    pub(crate) fn in_gap(&self, lane: usize) -> bool {
        self.gap.get(lane).copied().unwrap_or(false)
    }

    /// Lanes this wall blocks, top to bottom.
    pub(crate) fn blocked_lanes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..ROWS).filter(|&lane| !self.gap[lane])
    }
}

/// Where new walls come from.
pub(crate) trait WallSource {
    fn next_wall(&mut self) -> Wall;
}

/// Random wall heights, sides per [`SideMode`].
pub(crate) struct WallSpawner {
    rng: StdRng,
    mode: SideMode,
    next_side: Side,
}

impl WallSpawner {
    pub(crate) fn new(mode: SideMode, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            mode,
            next_side: Side::Top,
        }
    }
}

impl WallSource for WallSpawner {
    fn next_wall(&mut self) -> Wall {
        let side = match self.mode {
            SideMode::Alternate => {
                let side = self.next_side;
                self.next_side = side.flipped();
                side
            }
            SideMode::Random => {
                if self.rng.gen_bool(0.5) {
                    Side::Top
                } else {
                    Side::Bottom
                }
            }
        };
        let height = self.rng.gen_range(1..ROWS);
        Wall::new(side, height)
    }
}

// ── Game ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Playing,
    Crashing { flashes_left: u8 },
    Over,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickEvent {
    Advanced,
    /// The bird went through the gap of the lead wall.
    Passed,
    Crashed,
    Flashed,
    /// Last flash done, the round is over.
    Finished,
    Idle,
}

#[derive(Clone, Debug)]
pub(crate) struct GameState {
    bird: Bird,
    walls: VecDeque<Wall>,
    phase: Phase,
    tick_count: u64,
    score: u32,
}

impl GameState {
    pub(crate) fn new() -> Self {
        Self {
            bird: Bird::new(),
            walls: VecDeque::new(),
            phase: Phase::Playing,
            tick_count: 0,
            score: 0,
        }
    }

    pub(crate) fn bird(&self) -> Bird {
        self.bird
    }

    /// Walls on screen, oldest (leftmost) first.
    pub(crate) fn walls(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter()
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn tick(&mut self, pressed: bool, walls: &mut impl WallSource) -> TickEvent {
        match self.phase {
            Phase::Playing => self.advance(pressed, walls),
            Phase::Crashing { flashes_left } => {
                let left = flashes_left.saturating_sub(1);
                if left == 0 {
                    self.phase = Phase::Over;
                    TickEvent::Finished
                } else {
                    self.phase = Phase::Crashing { flashes_left: left };
                    TickEvent::Flashed
                }
            }
            Phase::Over => TickEvent::Idle,
        }
    }

    fn advance(&mut self, pressed: bool, source: &mut impl WallSource) -> TickEvent {
        if pressed {
            self.bird.flap();
        } else {
            self.bird.fall();
        }

        if self.tick_count % SPAWN_EVERY == 0 {
            let wall = source.next_wall();
            log::debug!(
                "tick {}: {:?} wall blocking {} cell(s)",
                self.tick_count,
                wall.side(),
                wall.blocked_lanes().count()
            );
            self.walls.push_back(wall);
        }
        for wall in &mut self.walls {
            wall.x -= 1;
        }
        while self.walls.front().is_some_and(|w| w.x < 0) {
            self.walls.pop_front();
        }
        self.tick_count += 1;

        match self.walls.front() {
            Some(lead) if lead.x == 0 => {
                if lead.in_gap(self.bird.lane) {
                    self.score += 1;
                    TickEvent::Passed
                } else {
                    self.phase = Phase::Crashing {
                        flashes_left: CRASH_FLASHES,
                    };
                    TickEvent::Crashed
                }
            }
            _ => TickEvent::Advanced,
        }
    }
}
