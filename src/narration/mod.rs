//! Spoken narration of instruction text.
//!
//! The narrator owns the speech engine and is driven by `on_tick`. It
//! keeps at most one utterance alive: every `speak` cancels the previous
//! one and schedules the new one after [`START_DELAY`], because some
//! engines drop an utterance queued right after a cancel.
//!
//! While an utterance plays, a keep-alive tick pauses and immediately
//! resumes the engine every [`KEEP_ALIVE_INTERVAL`]. Some engines stop
//! long utterances silently otherwise. The tick stops itself as soon as
//! speech is no longer active.

pub mod engine;

use std::time::{Duration, Instant};

use crate::markup;
use engine::{SpeechEngine, SpeechEvent, Utterance};

pub const START_DELAY: Duration = Duration::from_millis(100);
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_RATE: f32 = 0.9;
const DEFAULT_VOICE: &str = "pt-BR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NarrationState {
    Idle,
    /// Scheduled, waiting out the start delay.
    Pending,
    Speaking,
    Paused,
}

/// Voice tag for a dataset language code.
pub fn voice_for(lang: &str) -> &'static str {
    match lang {
        "ES" => "es-ES",
        "EN" => "en-US",
        "PT" | "LIBRAS" | "MAC" => "pt-BR",
        _ => DEFAULT_VOICE,
    }
}

pub struct Narrator<E: SpeechEngine> {
    engine: E,
    state: NarrationState,
    pending: Option<(Utterance, Instant)>,
    keep_alive_at: Option<Instant>,
    rate: f32,
}

impl<E: SpeechEngine> Narrator<E> {
    pub fn new(engine: E, rate: f32) -> Self {
        Self {
            engine,
            state: NarrationState::Idle,
            pending: None,
            keep_alive_at: None,
            rate,
        }
    }

    pub fn state(&self) -> NarrationState {
        self.state
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.state, NarrationState::Speaking | NarrationState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == NarrationState::Paused
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Replace any current utterance with `text` (markup is stripped).
    pub fn speak(&mut self, text: &str, lang: &str, now: Instant) {
        self.cancel();
        let utterance = Utterance {
            text: markup::strip_tags(text),
            voice: voice_for(lang),
            rate: self.rate,
        };
        self.pending = Some((utterance, now + START_DELAY));
        self.state = NarrationState::Pending;
    }

    /// Stop everything, including a not-yet-started utterance.
    pub fn cancel(&mut self) {
        self.engine.cancel();
        self.engine.poll_events();
        self.pending = None;
        self.keep_alive_at = None;
        self.state = NarrationState::Idle;
    }

    pub fn pause(&mut self) {
        if self.engine.is_speaking() {
            self.engine.pause();
        }
    }

    pub fn resume(&mut self) {
        if self.engine.is_speaking() {
            self.engine.resume();
            if self.engine.is_paused() {
                self.engine.resume();
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.engine.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.drain_events();

        if let Some((_, start_at)) = &self.pending {
            if now >= *start_at {
                if let Some((utterance, _)) = self.pending.take() {
                    self.start(utterance, now);
                }
            }
        }

        if let Some(at) = self.keep_alive_at {
            if now >= at {
                if self.is_speaking() && self.engine.is_speaking() && !self.engine.is_paused() {
                    self.engine.pause();
                    self.engine.resume();
                    self.keep_alive_at = Some(now + KEEP_ALIVE_INTERVAL);
                } else {
                    self.keep_alive_at = None;
                }
            }
        }
    }

    fn start(&mut self, utterance: Utterance, now: Instant) {
        match self.engine.speak(&utterance) {
            Ok(()) => {
                self.state = NarrationState::Speaking;
                self.keep_alive_at = Some(now + KEEP_ALIVE_INTERVAL);
                // engines that finish synchronously report End right away
                self.drain_events();
            }
            Err(err) => {
                tracing::error!(error = %err, "speech engine failed to start");
                self.state = NarrationState::Idle;
            }
        }
    }

    fn drain_events(&mut self) {
        for event in self.engine.poll_events() {
            match event {
                SpeechEvent::Start | SpeechEvent::Resume => {
                    if self.state != NarrationState::Idle {
                        self.state = NarrationState::Speaking;
                    }
                }
                SpeechEvent::Pause => {
                    if self.state != NarrationState::Idle {
                        self.state = NarrationState::Paused;
                    }
                }
                SpeechEvent::End => {
                    self.state = NarrationState::Idle;
                }
                SpeechEvent::Error(msg) => {
                    tracing::error!(error = %msg, "speech engine error");
                    self.state = NarrationState::Idle;
                }
            }
        }
    }
}
