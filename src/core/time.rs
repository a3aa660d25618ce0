//! Time representation for buffers handed to the playback engine.
//! The engine timestamps every block in microseconds (i64); frame positions
//! on the host side are plain frame indices.

use std::sync::atomic::{AtomicI64, Ordering};

/// Engine time in microseconds since the start of a run
pub type Micros = i64;

/// Time constants for conversions
pub mod constants {
    use super::Micros;

    pub const MICROS_PER_SECOND: Micros = 1_000_000;
}

/// Duration of one video frame at `fps`, rounded to the nearest microsecond.
/// A non-positive or non-finite rate yields zero.
#[inline]
pub fn frame_duration(fps: f64) -> Micros {
    if !(fps.is_finite() && fps > 0.0) {
        return 0;
    }
    (1.0 / fps * constants::MICROS_PER_SECOND as f64).round() as Micros
}

/// Duration of `samples` audio samples at `frequency`, biased by half a
/// microsecond and truncated.
#[inline]
pub fn sample_duration(samples: usize, frequency: u32) -> Micros {
    if frequency == 0 {
        return 0;
    }
    let exact = samples as f64 / frequency as f64 * constants::MICROS_PER_SECOND as f64;
    (exact + 0.5) as Micros
}

/// Cumulative audio samples from position 0 up to the start of `position`.
pub fn samples_to_now(fps: f64, frequency: u32, position: i64) -> i64 {
    if fps == 0.0 {
        return 0;
    }
    let bias = if position < 0 { -0.5 } else { 0.5 };
    (position as f64 * frequency as f64 / fps + bias) as i64
}

/// Number of audio samples belonging to the frame at `position`.
///
/// Each frame boundary is rounded independently and the frame gets the
/// difference, so rounding never accumulates into drift across a long run.
pub fn sample_count(fps: f64, frequency: u32, position: i64) -> usize {
    let samples = samples_to_now(fps, frequency, position + 1)
        - samples_to_now(fps, frequency, position);
    samples.max(0) as usize
}

/// Synthesized presentation clock for both tracks.
///
/// Each track advances independently by the duration of what it emitted;
/// nothing here follows wall-clock or engine time. dts always equals pts.
#[derive(Debug, Default)]
pub struct PtsClock {
    video: AtomicI64,
    audio: AtomicI64,
}

impl PtsClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the video counter by one frame at `fps` and return the new pts
    pub fn next_video_pts(&self, fps: f64) -> Micros {
        let step = frame_duration(fps);
        self.video.fetch_add(step, Ordering::AcqRel) + step
    }

    /// Advance the audio counter by the duration of `samples` samples at
    /// `frequency` and return the new pts
    pub fn next_audio_pts(&self, samples: usize, frequency: u32) -> Micros {
        let step = sample_duration(samples, frequency);
        self.audio.fetch_add(step, Ordering::AcqRel) + step
    }

    pub fn video(&self) -> Micros {
        self.video.load(Ordering::Acquire)
    }

    pub fn audio(&self) -> Micros {
        self.audio.load(Ordering::Acquire)
    }

    /// Rewind both counters to zero. Only a stop does this, never a pause.
    pub fn reset(&self) {
        self.video.store(0, Ordering::Release);
        self.audio.store(0, Ordering::Release);
    }
}
