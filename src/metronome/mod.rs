//! CPR compression-rate metronome: a periodic click plus a visual flash.

pub mod sink;
pub mod tone;

use std::time::{Duration, Instant};

pub use sink::{PulseSink, default_sink};

/// How long the on-screen pulse stays lit after each beat.
pub const FLASH_DURATION: Duration = Duration::from_millis(150);

pub struct Metronome<S: PulseSink> {
    sink: S,
    bpm: u32,
    next_beat: Option<Instant>,
    flash_until: Option<Instant>,
    beats: u64,
}

impl<S: PulseSink> Metronome<S> {
    pub fn new(sink: S, bpm: u32) -> Self {
        Self {
            sink,
            bpm: bpm.max(1),
            next_beat: None,
            flash_until: None,
            beats: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(60_000 / u64::from(self.bpm))
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn is_running(&self) -> bool {
        self.next_beat.is_some()
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }

    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Start with an immediate beat, or stop. Returns the new running state.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            tracing::debug!(bpm = self.bpm, "metronome started");
            self.pulse(now);
            self.next_beat = Some(now + self.interval());
        }
        self.is_running()
    }

    pub fn stop(&mut self) {
        if self.next_beat.take().is_some() {
            tracing::debug!(beats = self.beats, "metronome stopped");
        }
        self.flash_until = None;
    }

    /// Fire the beat that is due, if any. Beats missed while the loop was
    /// blocked are skipped rather than replayed in a burst.
    pub fn on_tick(&mut self, now: Instant) {
        let Some(due) = self.next_beat else { return };
        if now < due {
            return;
        }
        self.pulse(now);
        let interval = self.interval();
        let mut next = due + interval;
        if next <= now {
            next = now + interval;
        }
        self.next_beat = Some(next);
    }

    fn pulse(&mut self, now: Instant) {
        self.sink.click();
        // restart the flash even if the previous one is still lit
        self.flash_until = Some(now + FLASH_DURATION);
        self.beats += 1;
    }
}
