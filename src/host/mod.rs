//! The host media framework as seen by the consumer.
//!
//! The host produces frames on demand, owns the consumer's configuration and
//! receives consumer events. Every frame handed out by [`Host::next_frame`]
//! must come back through [`Host::close_frame`] exactly once.

pub mod properties;

use bytes::Bytes;

use crate::core::format::{AudioFormat, ImageFormat};
use crate::core::time;

pub use properties::{Properties, Value};

/// Image produced by a frame
#[derive(Debug, Clone)]
pub struct Image {
    pub data: Bytes,
    /// The host may convert to something other than what was asked for
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn byte_size(&self) -> usize {
        self.format.buffer_size(self.width, self.height)
    }
}

/// Interleaved audio produced by a frame
#[derive(Debug, Clone)]
pub struct Audio {
    pub data: Bytes,
    pub format: AudioFormat,
    pub frequency: u32,
    pub channels: u32,
    pub samples: usize,
}

impl Audio {
    pub fn byte_size(&self) -> usize {
        self.format.buffer_size(self.samples, self.channels)
    }
}

/// One unit of decodable audio, video and metadata
pub trait Frame: Send + 'static {
    /// Playback speed the frame was produced at; zero means paused
    fn speed(&self) -> f64;

    /// Frame index in the source timeline
    fn original_position(&self) -> i64;

    /// Render the image, `None` when the frame has none
    fn get_image(&mut self, format: ImageFormat, width: u32, height: u32) -> Option<Image>;

    /// Render `samples` samples of audio, `None` when the frame has none
    fn get_audio(
        &mut self,
        format: AudioFormat,
        frequency: u32,
        channels: u32,
        samples: usize,
    ) -> Option<Audio>;
}

/// Events fired towards the host
#[derive(Debug)]
pub enum ConsumerEvent<'a, F> {
    /// The engine finished with the last buffer of this frame
    FrameShow(&'a F),
    /// Setup failed and playback will not proceed
    FatalError(&'a str),
}

/// The host framework
pub trait Host: Send + Sync + 'static {
    type Frame: Frame;

    /// Produce the next frame. May block for as long as the host needs.
    fn next_frame(&self) -> Option<Self::Frame>;

    /// Hand a frame back to the host
    fn close_frame(&self, frame: Self::Frame);

    fn properties(&self) -> &Properties;

    fn fire(&self, event: ConsumerEvent<'_, Self::Frame>);

    /// Audio samples belonging to the frame at `position`
    fn sample_count(&self, fps: f64, frequency: u32, position: i64) -> usize {
        time::sample_count(fps, frequency, position)
    }
}
