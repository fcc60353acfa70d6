//! The metronome click: a short sine tone with an exponential decay.

use std::f32::consts::PI;

pub const FREQUENCY_HZ: f32 = 800.0;
pub const START_GAIN: f32 = 0.5;
pub const END_GAIN: f32 = 0.001;
pub const DURATION_SECS: f32 = 0.05;

/// Gain envelope at `t` seconds after the click: no attack, decays from
/// `START_GAIN` to `END_GAIN` over `DURATION_SECS`, silent afterwards.
pub fn gain_at(t: f32) -> f32 {
    if !(0.0..DURATION_SECS).contains(&t) {
        return 0.0;
    }
    START_GAIN * (END_GAIN / START_GAIN).powf(t / DURATION_SECS)
}

pub fn sample_at(t: f32) -> f32 {
    (2.0 * PI * FREQUENCY_HZ * t).sin() * gain_at(t)
}

/// Number of frames the click lasts at `sample_rate`.
pub fn frame_count(sample_rate: u32) -> usize {
    (DURATION_SECS * sample_rate as f32).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_starts_at_full_gain() {
        assert!((gain_at(0.0) - START_GAIN).abs() < 1e-6);
    }

    #[test]
    fn test_envelope_decays_monotonically() {
        let mut prev = gain_at(0.0);
        for i in 1..50 {
            let g = gain_at(i as f32 / 1000.0);
            assert!(g < prev, "gain must decay at {i}ms");
            prev = g;
        }
        assert!(gain_at(0.0499) < 0.0011);
    }

    #[test]
    fn test_silent_outside_click() {
        assert_eq!(gain_at(-0.001), 0.0);
        assert_eq!(gain_at(DURATION_SECS), 0.0);
        assert_eq!(sample_at(0.2), 0.0);
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(48_000), 2400);
        assert_eq!(frame_count(44_100), 2205);
    }
}
