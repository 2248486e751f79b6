/// Sound engine: per-pad tones via rodio.
///
/// All tones are generated as in-memory WAV buffers at init time, one
/// reveal-length and one feedback-length buffer per pad, plus the
/// game-over buzz. Playback is fire-and-forget (non-blocking) via
/// rodio's Sink.
///
/// `SoundEngine::new()` returns None when no output device is available;
/// the game then runs with visual pulses only. Compile without the
/// "sound" feature to disable audio entirely (the stub does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use crate::domain::color::Color;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each pad and duration.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        reveal: [Arc<Vec<u8>>; 4],
        feedback: [Arc<Vec<u8>>; 4],
        buzz: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new(reveal_ms: u64, feedback_ms: u64) -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            let tone = |c: Color, ms: u64| {
                Arc::new(make_wav(&gen_tone(c.tone_hz(), ms as f32 / 1000.0, 0.3)))
            };
            let reveal = Color::ALL.map(|c| tone(c, reveal_ms));
            let feedback = Color::ALL.map(|c| tone(c, feedback_ms));
            let buzz = Arc::new(make_wav(&gen_buzz()));

            Some(SoundEngine {
                _stream: stream,
                handle,
                reveal,
                feedback,
                buzz,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// Full-length tone for a replay pulse.
        pub fn play_reveal(&self, color: Color) {
            self.play(&self.reveal[color.index()]);
        }

        /// Short tone acknowledging a press.
        pub fn play_feedback(&self, color: Color) {
            self.play(&self.feedback[color.index()]);
        }

        /// Game-over buzz.
        pub fn play_buzz(&self) {
            self.play(&self.buzz);
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Sine tone with an exponential fade from full volume to near
    /// silence over the duration (Web-Audio-style gain ramp).
    fn gen_tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let t_norm = i as f32 / n.max(1) as f32;
                let env = 0.033_f32.powf(t_norm); // 1.0 → ~0.033
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Game over: low sawtooth buzz, half a second.
    fn gen_buzz() -> Vec<f32> {
        let freq = 100.0_f32;
        let duration = 0.5;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let t_norm = i as f32 / n as f32;
                let phase = t * freq;
                let saw = 2.0 * (phase - phase.floor()) - 1.0;
                let env = 0.033_f32.powf(t_norm);
                saw * env * 0.3
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_reveal_ms: u64, _feedback_ms: u64) -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play_reveal(&self, _color: crate::domain::color::Color) {}
    pub fn play_feedback(&self, _color: crate::domain::color::Color) {}
    pub fn play_buzz(&self) {}
}
