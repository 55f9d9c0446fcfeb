use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::config::{COLS, LED_COUNT, ROWS};
use crate::render::{BLANK, Frame, Rgb};

/// Anything that can display a 32-LED frame.
pub(crate) trait LedStrip {
    fn show(&mut self, frame: &Frame) -> io::Result<()>;

    fn clear(&mut self) -> io::Result<()> {
        self.show(&BLANK)
    }
}

// ── Terminal strip ──────────────────────────────────────────────────────────

/// Pixels per LED edge.
const LED_PX: usize = 4;
/// Dark border between LEDs.
const GAP_PX: usize = 1;
const BORDER: Rgb = Rgb(24, 24, 28);

const STRIP_W: usize = COLS * (LED_PX + GAP_PX) + GAP_PX;
// Half-block rendering packs two pixel rows per terminal row.
const STRIP_H: usize = (ROWS * (LED_PX + GAP_PX) + GAP_PX).next_multiple_of(2);

/// Draws the strip as a grid of colored cells on a truecolor terminal.
pub(crate) struct TerminalStrip<W: Write> {
    out: W,
    buf: PixelBuf,
    brightness: u8,
}

impl<W: Write> TerminalStrip<W> {
    pub(crate) fn new(out: W, brightness: u8) -> Self {
        Self {
            out,
            buf: PixelBuf::new(STRIP_W, STRIP_H),
            brightness,
        }
    }

    fn rasterize(&mut self, frame: &Frame) {
        self.buf.fill_rect(0, 0, STRIP_W as i32, STRIP_H as i32, BORDER);
        for (i, led) in frame.iter().enumerate().take(LED_COUNT) {
            let col = (i % COLS) as i32;
            let row = (i / COLS) as i32;
            let step = (LED_PX + GAP_PX) as i32;
            self.buf.fill_rect(
                GAP_PX as i32 + col * step,
                GAP_PX as i32 + row * step,
                LED_PX as i32,
                LED_PX as i32,
                led.scale(self.brightness),
            );
        }
    }
}

impl<W: Write> LedStrip for TerminalStrip<W> {
    fn show(&mut self, frame: &Frame) -> io::Result<()> {
        self.rasterize(frame);
        self.buf.render(&mut self.out)
    }
}

// ── Pixel buffer with half-block rendering ──────────────────────────────────

struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![BORDER; w * h],
        }
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = None;
        let mut prev_bg = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if prev_bg != Some(bot) {
                    queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                    prev_bg = Some(bot);
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                } else {
                    if prev_fg != Some(top) {
                        queue!(out, style::SetForegroundColor(term_color(top)))?;
                        prev_fg = Some(top);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                prev_fg = None;
                prev_bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::index;

    fn led_origin(x: usize, lane: usize) -> (usize, usize) {
        (
            GAP_PX + x * (LED_PX + GAP_PX),
            GAP_PX + lane * (LED_PX + GAP_PX),
        )
    }

    #[test]
    fn leds_fill_their_cells() {
        let mut strip = TerminalStrip::new(Vec::new(), 255);
        let mut frame = BLANK;
        frame[index(3, 2)] = Rgb(10, 20, 30);
        strip.rasterize(&frame);

        let (ox, oy) = led_origin(3, 2);
        for dy in 0..LED_PX {
            for dx in 0..LED_PX {
                assert_eq!(strip.buf.get(ox + dx, oy + dy), Rgb(10, 20, 30));
            }
        }
        assert_eq!(strip.buf.get(ox - 1, oy), BORDER);
        let (ox, oy) = led_origin(0, 0);
        assert_eq!(strip.buf.get(ox, oy), Rgb(0, 0, 0));
    }

    #[test]
    fn brightness_applies_to_every_led() {
        let mut strip = TerminalStrip::new(Vec::new(), 0);
        strip.rasterize(&[Rgb(255, 255, 255); LED_COUNT]);
        for lane in 0..ROWS {
            for x in 0..COLS {
                let (ox, oy) = led_origin(x, lane);
                assert_eq!(strip.buf.get(ox, oy), Rgb(0, 0, 0));
            }
        }
    }

    #[test]
    fn show_writes_one_line_per_row_pair() {
        let mut strip = TerminalStrip::new(Vec::new(), 255);
        strip.show(&BLANK).unwrap();
        let text = String::from_utf8(strip.out.clone()).unwrap();
        assert_eq!(text.matches("\r\n").count(), STRIP_H / 2 - 1);
        assert!(text.contains('\u{2580}'));
    }
}
