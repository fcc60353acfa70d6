use std::process::{Child, Command, Stdio};

use thiserror::Error;

/// Default speaking rate of espeak-style synthesizers, in words per minute.
const BASE_WPM: f32 = 175.0;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("could not start speech program `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 style tag, e.g. `pt-BR`.
    pub voice: &'static str,
    pub rate: f32,
}

/// Lifecycle notifications from the engine, drained by the narrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Start,
    Pause,
    Resume,
    End,
    Error(String),
}

/// Platform speech facility. One utterance at a time.
pub trait SpeechEngine {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;
    fn cancel(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn is_speaking(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn poll_events(&mut self) -> Vec<SpeechEvent>;
}

impl<T: SpeechEngine + ?Sized> SpeechEngine for Box<T> {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        (**self).speak(utterance)
    }
    fn cancel(&mut self) {
        (**self).cancel()
    }
    fn pause(&mut self) {
        (**self).pause()
    }
    fn resume(&mut self) {
        (**self).resume()
    }
    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }
    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }
    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        (**self).poll_events()
    }
}

/// Used when narration is disabled: every utterance ends immediately.
#[derive(Default)]
pub struct SilentEngine {
    events: Vec<SpeechEvent>,
}

impl SpeechEngine for SilentEngine {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        tracing::debug!(chars = utterance.text.len(), "narration disabled, skipping");
        self.events.push(SpeechEvent::Start);
        self.events.push(SpeechEvent::End);
        Ok(())
    }
    fn cancel(&mut self) {}
    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn is_speaking(&self) -> bool {
        false
    }
    fn is_paused(&self) -> bool {
        false
    }
    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Runs an external synthesizer (`espeak-ng`, `espeak` or macOS `say`)
/// per utterance. Pause and resume stop and continue the process.
pub struct CommandEngine {
    program: String,
    child: Option<Child>,
    paused: bool,
    events: Vec<SpeechEvent>,
}

impl CommandEngine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            child: None,
            paused: false,
            events: Vec::new(),
        }
    }

    fn command(&self, utterance: &Utterance) -> Command {
        let wpm = (BASE_WPM * utterance.rate).round() as u32;
        let mut cmd = Command::new(&self.program);
        if self.program.ends_with("say") {
            cmd.args(["-r", &wpm.to_string()]);
        } else {
            cmd.args(["-v", &espeak_voice(utterance.voice), "-s", &wpm.to_string()]);
        }
        cmd.arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    fn signal(&self, signal: &str) -> bool {
        let Some(child) = &self.child else {
            return false;
        };
        if !cfg!(unix) {
            return false;
        }
        Command::new("kill")
            .args([signal, &child.id().to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }
}

impl SpeechEngine for CommandEngine {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.cancel();
        let child = self
            .command(utterance)
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(pid = child.id(), voice = utterance.voice, "speech started");
        self.child = Some(child);
        self.events.push(SpeechEvent::Start);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.paused = false;
    }

    fn pause(&mut self) {
        if !self.paused && self.signal("-STOP") {
            self.paused = true;
            self.events.push(SpeechEvent::Pause);
        }
    }

    fn resume(&mut self) {
        if self.paused && self.signal("-CONT") {
            self.paused = false;
            self.events.push(SpeechEvent::Resume);
        }
    }

    fn is_speaking(&self) -> bool {
        self.child.is_some()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn poll_events(&mut self) -> Vec<SpeechEvent> {
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    self.child = None;
                    self.paused = false;
                    self.events.push(if status.success() {
                        SpeechEvent::End
                    } else {
                        SpeechEvent::Error(format!("speech program exited with {status}"))
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    self.child = None;
                    self.paused = false;
                    self.events.push(SpeechEvent::Error(err.to_string()));
                }
            }
        }
        std::mem::take(&mut self.events)
    }
}

impl Drop for CommandEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// espeak voice names are lower-case; Castilian Spanish is plain `es`.
fn espeak_voice(tag: &str) -> String {
    match tag {
        "es-ES" => "es".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_engine_finishes_immediately() {
        let mut engine = SilentEngine::default();
        let utterance = Utterance {
            text: "teste".into(),
            voice: "pt-BR",
            rate: 0.9,
        };
        engine.speak(&utterance).unwrap();
        assert!(!engine.is_speaking());
        assert_eq!(engine.poll_events(), vec![SpeechEvent::Start, SpeechEvent::End]);
        assert!(engine.poll_events().is_empty());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut engine = CommandEngine::new("socorro-no-such-speech-program");
        let utterance = Utterance {
            text: "teste".into(),
            voice: "en-US",
            rate: 1.0,
        };
        let err = engine.speak(&utterance).unwrap_err();
        assert!(matches!(err, SpeechError::Spawn { .. }));
        assert!(!engine.is_speaking());
    }

    #[test]
    fn test_espeak_voice_names() {
        assert_eq!(espeak_voice("pt-BR"), "pt-br");
        assert_eq!(espeak_voice("en-US"), "en-us");
        assert_eq!(espeak_voice("es-ES"), "es");
    }
}
