use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeviceEvent {
    Pressed,
    Released,
    Disconnected,
}

#[derive(Debug)]
pub(crate) enum ConnectError {
    /// Nothing answered this discovery round.
    NotFound,
    /// The user gave up on pairing.
    Cancelled,
    Io(io::Error),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::NotFound => write!(f, "no button found"),
            ConnectError::Cancelled => write!(f, "pairing cancelled"),
            ConnectError::Io(e) => write!(f, "discovery failed: {e}"),
        }
    }
}

impl From<io::Error> for ConnectError {
    fn from(e: io::Error) -> Self {
        ConnectError::Io(e)
    }
}

/// A single push-button reached over a wireless link.
pub(crate) trait ButtonDevice {
    /// One discovery and connect attempt.
    fn discover(&mut self) -> Result<(), ConnectError>;

    /// Next pending event, without blocking.
    fn poll_event(&mut self) -> io::Result<Option<DeviceEvent>>;

    fn disconnect(&mut self);
}

// ── Keyboard ────────────────────────────────────────────────────────────────

/// The keyboard standing in for the button: Enter or Space pairs,
/// Space/Up/Enter press, q/Esc disconnects.
pub(crate) struct KeyboardButton<W: Write> {
    out: W,
    reports_release: bool,
    pending: VecDeque<DeviceEvent>,
    connected: bool,
}

impl<W: Write> KeyboardButton<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            reports_release: false,
            pending: VecDeque::new(),
            connected: false,
        }
    }

    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    fn map_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if key.kind == KeyEventKind::Press {
                    self.pending.push_back(DeviceEvent::Disconnected);
                }
            }
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => match key.kind {
                KeyEventKind::Press => {
                    self.pending.push_back(DeviceEvent::Pressed);
                    if !self.reports_release {
                        self.pending.push_back(DeviceEvent::Released);
                    }
                }
                KeyEventKind::Release => self.pending.push_back(DeviceEvent::Released),
                KeyEventKind::Repeat => {}
            },
            _ => {}
        }
    }
}

impl<W: Write> ButtonDevice for KeyboardButton<W> {
    fn discover(&mut self) -> Result<(), ConnectError> {
        while let Some(key) = self.next_key()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Err(ConnectError::Cancelled),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    self.reports_release = terminal::supports_keyboard_enhancement()?;
                    if self.reports_release {
                        execute!(
                            self.out,
                            PushKeyboardEnhancementFlags(
                                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                            )
                        )?;
                    }
                    self.connected = true;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(ConnectError::NotFound)
    }

    fn poll_event(&mut self) -> io::Result<Option<DeviceEvent>> {
        if self.pending.is_empty() {
            if let Some(key) = self.next_key()? {
                self.map_key(key);
            }
        }
        Ok(self.pending.pop_front())
    }

    fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        if self.reports_release {
            if let Err(e) = execute!(self.out, PopKeyboardEnhancementFlags) {
                log::warn!("could not restore keyboard flags: {e}");
            }
        }
        self.pending.clear();
    }
}
