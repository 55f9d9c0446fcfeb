use crate::config::{COLS, LED_COUNT, ROWS};
use crate::game::{GameState, Phase};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rgb(pub(crate) u8, pub(crate) u8, pub(crate) u8);

impl Rgb {
    pub(crate) const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    /// Dim by `level` / 255.
    pub(crate) const fn scale(self, level: u8) -> Rgb {
        let l = level as u16;
        Rgb(
            (self.0 as u16 * l / 255) as u8,
            (self.1 as u16 * l / 255) as u8,
            (self.2 as u16 * l / 255) as u8,
        )
    }
}

pub(crate) const OFF: Rgb = Rgb(0, 0, 0);
pub(crate) const BIRD: Rgb = Rgb(245, 200, 66);
pub(crate) const WALL: Rgb = Rgb(100, 170, 40);
pub(crate) const FLASH_A: Rgb = Rgb(200, 20, 20);
pub(crate) const FLASH_B: Rgb = Rgb(255, 140, 0);
pub(crate) const IDLE: Rgb = Rgb(255, 255, 255);
pub(crate) const PAIRING: Rgb = Rgb(40, 90, 255);

// ── Frames ──────────────────────────────────────────────────────────────────

/// One color per LED, row-major: index `x + lane * COLS`.
pub(crate) type Frame = [Rgb; LED_COUNT];

pub(crate) const BLANK: Frame = [OFF; LED_COUNT];

pub(crate) const fn index(x: usize, lane: usize) -> usize {
    x + lane * COLS
}

pub(crate) fn render(state: &GameState) -> Frame {
    let (background, show_bird) = match state.phase() {
        Phase::Playing => (OFF, true),
        Phase::Crashing { flashes_left } => (flash_color(flashes_left), false),
        // One more flash, continuing the alternation, until the idle animation.
        Phase::Over => (flash_color(0), false),
    };

    let mut frame = [background; LED_COUNT];
    for wall in state.walls() {
        let Ok(x) = usize::try_from(wall.x()) else {
            continue;
        };
        if x >= COLS {
            continue;
        }
        for lane in wall.blocked_lanes() {
            frame[index(x, lane)] = WALL;
        }
    }
    if show_bird {
        frame[index(0, state.bird().lane())] = BIRD;
    }
    frame
}

fn flash_color(flashes_left: u8) -> Rgb {
    if flashes_left % 2 == 0 { FLASH_A } else { FLASH_B }
}

/// A column of light sweeping left to right.
pub(crate) fn idle_frame(frame_no: u64) -> Frame {
    let col = (frame_no % COLS as u64) as usize;
    let mut frame = BLANK;
    for lane in 0..ROWS {
        frame[index(col, lane)] = IDLE;
    }
    frame
}

/// Slow blue pulse on the bird's home cell while the button pairs.
pub(crate) fn pairing_frame(frame_no: u64) -> Frame {
    // Triangle wave over 16 frames.
    let phase = (frame_no % 16) as u16;
    let t = if phase < 8 { phase * 32 } else { (16 - phase) * 32 };
    let mut frame = BLANK;
    frame[index(0, ROWS / 2)] = Rgb::lerp(OFF, PAIRING, t);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::Script;
    use crate::game::{Side, TickEvent, Wall};

    fn lit(frame: &Frame, color: Rgb) -> Vec<usize> {
        (0..LED_COUNT).filter(|&i| frame[i] == color).collect()
    }

    #[test]
    fn fresh_game_shows_only_the_bird() {
        let state = GameState::new();
        let frame = render(&state);
        assert_eq!(frame.len(), 32);
        assert_eq!(lit(&frame, BIRD), vec![state.bird().lane() * 8]);
        assert_eq!(lit(&frame, OFF).len(), 31);
    }

    #[test]
    fn walls_map_to_column_plus_lane_offset() {
        let mut state = GameState::new();
        let mut source =
            Script::new(vec![Wall::new(Side::Top, 2), Wall::new(Side::Bottom, 1)]);
        for _ in 0..6 {
            state.tick(false, &mut source);
        }
        // Top wall at x=2 blocking lanes 0-1, bottom wall at x=6 blocking lane 3.
        let frame = render(&state);
        assert_eq!(lit(&frame, WALL), vec![2, 2 + 8, 6 + 24]);
        assert_eq!(lit(&frame, BIRD), vec![24]);
    }

    #[test]
    fn crash_flashes_alternate_and_hide_the_bird() {
        let mut state = GameState::new();
        let mut source = Script::new(vec![Wall::new(Side::Bottom, 3)]);
        while state.tick(false, &mut source) != TickEvent::Crashed {}

        let mut backgrounds = Vec::new();
        loop {
            let frame = render(&state);
            assert!(lit(&frame, BIRD).is_empty());
            // Walls at x=0 and x=4 are still drawn over the flash.
            assert_eq!(lit(&frame, WALL), vec![8, 12, 16, 20, 24, 28]);
            backgrounds.push(frame[0]);
            if state.tick(false, &mut source) == TickEvent::Finished {
                break;
            }
        }
        assert_eq!(backgrounds, vec![FLASH_A, FLASH_B, FLASH_A, FLASH_B]);

        // The game-over frame keeps alternating after the last flash.
        assert_eq!(state.phase(), Phase::Over);
        let over = render(&state);
        assert_eq!(over[0], FLASH_A);
        assert!(lit(&over, BIRD).is_empty());
    }

    #[test]
    fn idle_sweeps_columns() {
        for n in 0..20 {
            let frame = idle_frame(n);
            let col = n as usize % COLS;
            assert_eq!(
                lit(&frame, IDLE),
                vec![col, col + 8, col + 16, col + 24]
            );
        }
    }

    #[test]
    fn pairing_pulses() {
        let dark = pairing_frame(0);
        let bright = pairing_frame(8);
        assert_eq!(dark, BLANK);
        assert_eq!(bright[index(0, ROWS / 2)], PAIRING);
        assert_eq!(pairing_frame(16), dark);
    }

    #[test]
    fn scale_dims_proportionally() {
        assert_eq!(Rgb(255, 128, 0).scale(255), Rgb(255, 128, 0));
        assert_eq!(Rgb(255, 128, 10).scale(0), OFF);
        assert_eq!(Rgb(200, 100, 50).scale(127), Rgb(99, 49, 24));
    }
}
