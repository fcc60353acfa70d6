use std::io::{self, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("could not query output configuration: {0}")]
    Config(String),
    #[error("unsupported sample format {0}")]
    Format(String),
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Where metronome clicks go.
pub trait PulseSink {
    fn click(&mut self);
}

impl<T: PulseSink + ?Sized> PulseSink for Box<T> {
    fn click(&mut self) {
        (**self).click()
    }
}

/// Terminal bell; used when no audio output is available.
pub struct BellSink;

impl PulseSink for BellSink {
    fn click(&mut self) {
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// Visual-only metronome.
pub struct MuteSink;

impl PulseSink for MuteSink {
    fn click(&mut self) {}
}

pub fn default_sink(sound: bool) -> Box<dyn PulseSink> {
    if !sound {
        return Box::new(MuteSink);
    }
    #[cfg(feature = "audio")]
    return Box::new(audio::CpalSink::new());
    #[cfg(not(feature = "audio"))]
    return Box::new(BellSink);
}

#[cfg(feature = "audio")]
mod audio {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{FromSample, Sample, SizedSample};

    use super::{AudioError, BellSink, PulseSink};
    use crate::metronome::tone;

    /// Synthesized click through one shared output stream, opened on the
    /// first click and reused afterwards.
    pub struct CpalSink {
        output: Option<ClickOutput>,
        unavailable: bool,
    }

    struct ClickOutput {
        stream: cpal::Stream,
        clicks: Arc<AtomicU64>,
    }

    impl CpalSink {
        pub fn new() -> Self {
            Self {
                output: None,
                unavailable: false,
            }
        }
    }

    impl PulseSink for CpalSink {
        fn click(&mut self) {
            if self.output.is_none() && !self.unavailable {
                match ClickOutput::open() {
                    Ok(output) => self.output = Some(output),
                    Err(err) => {
                        tracing::warn!(error = %err, "audio output unavailable, using terminal bell");
                        self.unavailable = true;
                    }
                }
            }

            match &self.output {
                Some(output) => {
                    output.clicks.fetch_add(1, Ordering::Relaxed);
                    // the platform may have suspended the stream
                    if let Err(err) = output.stream.play() {
                        tracing::warn!(error = %err, "could not resume audio stream");
                    }
                }
                None => BellSink.click(),
            }
        }
    }

    impl ClickOutput {
        fn open() -> Result<Self, AudioError> {
            let host = cpal::default_host();
            let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
            let supported = device
                .default_output_config()
                .map_err(|e| AudioError::Config(e.to_string()))?;
            let sample_rate = supported.sample_rate().0;
            let channels = supported.channels() as usize;
            let config: cpal::StreamConfig = supported.config();
            let clicks = Arc::new(AtomicU64::new(0));

            let stream = match supported.sample_format() {
                cpal::SampleFormat::F32 => {
                    build::<f32>(&device, &config, channels, sample_rate, clicks.clone())
                }
                cpal::SampleFormat::I16 => {
                    build::<i16>(&device, &config, channels, sample_rate, clicks.clone())
                }
                cpal::SampleFormat::U16 => {
                    build::<u16>(&device, &config, channels, sample_rate, clicks.clone())
                }
                other => Err(AudioError::Format(format!("{other:?}"))),
            }?;
            stream
                .play()
                .map_err(|e| AudioError::Stream(e.to_string()))?;
            tracing::debug!(sample_rate, channels, "audio output opened");
            Ok(Self { stream, clicks })
        }
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        channels: usize,
        sample_rate: u32,
        clicks: Arc<AtomicU64>,
    ) -> Result<cpal::Stream, AudioError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let total = tone::frame_count(sample_rate);
        let mut seen = clicks.load(Ordering::Relaxed);
        let mut frame: Option<usize> = None;

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let current = clicks.load(Ordering::Relaxed);
                    if current != seen {
                        seen = current;
                        frame = Some(0);
                    }
                    for out in data.chunks_mut(channels.max(1)) {
                        let value = match frame {
                            Some(i) if i < total => {
                                frame = Some(i + 1);
                                tone::sample_at(i as f32 / sample_rate as f32)
                            }
                            _ => {
                                frame = None;
                                0.0
                            }
                        };
                        let sample = T::from_sample(value);
                        for slot in out.iter_mut() {
                            *slot = sample;
                        }
                    }
                },
                |err| tracing::warn!(error = %err, "audio stream error"),
                None,
            )
            .map_err(|e| AudioError::Stream(e.to_string()))
    }
}

