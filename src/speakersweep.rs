use std::thread;
use std::time::Duration;

use crate::peripherals::Speaker;

const START_HZ: f32 = 440.0;
const END_HZ: f32 = START_HZ * 4.0;
const PASS_DURATION_MS: u64 = 50;
const PASSES: u32 = 6;
const UPDATE_STEP_MS: u64 = 10;

/// Delay between opening the speaker and starting the sweep, giving the PWM
/// device time to stabilize.
pub const WARMUP_DELAY_MS: u64 = 300;

/// The full sweep as a flat frequency sequence: a linear ramp from 440 Hz to
/// 1760 Hz sampled every update step, repeated for every pass.
pub fn sample_frequencies() -> Vec<f32> {
    let steps = (PASS_DURATION_MS / UPDATE_STEP_MS) as usize;
    let mut samples = Vec::with_capacity(PASSES as usize * (steps + 1));

    for _ in 0..PASSES {
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            samples.push(START_HZ + (END_HZ - START_HZ) * t);
        }
    }

    return samples;
}

/// Plays the sweep, then stops the speaker. Unlike the per-tick writes of the
/// animator and scroller, any failure here escalates to the caller and ends
/// the run loop.
pub fn play(speaker: &mut dyn Speaker) -> Result<(), String> {
    for frequency in sample_frequencies() {
        speaker.play(frequency)?;
        thread::sleep(Duration::from_millis(UPDATE_STEP_MS));
    }

    speaker.stop()
}
