use palette::{FromColor, Hsv, Srgb};

pub const PIXEL_COUNT: usize = 7;

/// Builds the strip palette: one fully saturated color per pixel, hues spaced
/// evenly across the circle. Computed once at startup.
pub fn build_palette() -> [Srgb<u8>; PIXEL_COUNT] {
    let mut palette = [Srgb::new(0u8, 0, 0); PIXEL_COUNT];
    for (i, slot) in palette.iter_mut().enumerate() {
        let hue = i as f32 * 360.0 / PIXEL_COUNT as f32;
        let hsv = Hsv::new(hue, 1.0, 1.0);
        *slot = Srgb::from_color(hsv).into_format();
    }

    return palette;
}
