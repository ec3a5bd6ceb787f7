use palette::Srgb;

use crate::peripherals::LedStrip;
use crate::rainbow::PIXEL_COUNT;

/// Bounces a single lit pixel back and forth across the strip. Only the
/// pixel at the current position is lit, with its palette color; the rest of
/// the frame stays black, so the pixel leaves no afterimage.
pub struct LedAnimator {
    palette: [Srgb<u8>; PIXEL_COUNT],
    position: usize,
    up: bool,
}

impl LedAnimator {
    pub fn new(palette: [Srgb<u8>; PIXEL_COUNT]) -> LedAnimator {
        LedAnimator {
            palette,
            position: 0,
            up: true,
        }
    }

    /// Advances the animation by one step and pushes the frame to the strip.
    /// A write failure only costs this tick's frame; the position has already
    /// moved on.
    pub fn tick(&mut self, strip: &mut dyn LedStrip) {
        self.advance();

        let mut frame = [Srgb::new(0u8, 0, 0); PIXEL_COUNT];
        frame[self.position] = self.palette[self.position];

        if let Err(err) = strip.write(&frame) {
            log::warn!("Error setting ledstrip: {err}");
        }
    }

    // The direction flips after the move, and each bound check belongs to its
    // own direction branch, so at most one flip happens per tick.
    fn advance(&mut self) {
        if self.up {
            self.position += 1;
            if self.position >= PIXEL_COUNT - 1 {
                self.up = false;
            }
        } else {
            self.position -= 1;
            if self.position == 0 {
                self.up = true;
            }
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_moving_up(&self) -> bool {
        self.up
    }
}
