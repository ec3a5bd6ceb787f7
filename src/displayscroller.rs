use crate::peripherals::AlphanumericDisplay;

/// Scrolls a fixed message by advancing a start offset once per tick and
/// writing the suffix from there. The prefix is deliberately not wrapped
/// around: the visible text shortens toward the last character, then the
/// offset rolls over and the full message reappears.
pub struct DisplayScroller {
    message: String,
    offset: usize,
}

impl DisplayScroller {
    /// The display hardware takes plain ASCII; anything else is dropped here
    /// so suffix slicing stays on character boundaries.
    pub fn new(message: &str) -> DisplayScroller {
        DisplayScroller {
            message: message.chars().filter(|c| c.is_ascii()).collect(),
            offset: 0,
        }
    }

    pub fn tick(&mut self, display: &mut dyn AlphanumericDisplay) {
        if self.message.is_empty() {
            return;
        }

        self.offset = (self.offset + 1) % self.message.len();
        if let Err(err) = display.write(self.visible_text()) {
            log::warn!("Error setting display: {err}");
        }
    }

    pub fn visible_text(&self) -> &str {
        &self.message[self.offset..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}
