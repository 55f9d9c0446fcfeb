/// Button state between two game ticks.
///
/// A press is latched on its rising edge and stays latched until the next
/// tick takes it. Presses that arrive while the button is still held (key
/// repeat, contact bounce) are ignored.
#[derive(Debug, Default)]
pub(crate) struct ButtonLatch {
    held: bool,
    latched: bool,
}

impl ButtonLatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn press(&mut self) {
        if !self.held {
            self.held = true;
            self.latched = true;
        }
    }

    pub(crate) fn release(&mut self) {
        self.held = false;
    }

    /// Consume the latched press.
    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(&mut self.latched)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
