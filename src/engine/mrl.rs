//! Media location and option strings for raw-memory input.
//!
//! The video track is the media's location (`imem://...`), the audio track is
//! attached as an input slave, and a transcode/sink chain is added when the
//! output is a file or stream instead of a window. The correlation cookies in
//! these strings are the ones the raw source is later called with.

use crate::core::format::FourCC;

pub const VIDEO_COOKIE: &str = "0";
pub const AUDIO_COOKIE: &str = "1";

/// Elementary stream categories understood by the raw input
const CAT_AUDIO: u32 = 1;
const CAT_VIDEO: u32 = 2;

/// Raw video track parameters
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInput {
    pub width: u32,
    pub height: u32,
    pub display_ratio: String,
    pub fps: f64,
    pub codec: FourCC,
}

/// Raw audio track parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInput {
    pub codec: FourCC,
    pub frequency: u32,
    pub channels: u32,
}

/// Encoder and sink for file/stream output
#[derive(Debug, Clone, PartialEq)]
pub struct Transcode {
    pub vcodec: String,
    pub acodec: String,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub video_bitrate: i64,
    pub audio_bitrate: i64,
    pub channels: u32,
    pub frequency: u32,
    pub access: String,
    pub mux: String,
    pub dst: String,
}

/// A media location plus the options to attach to it, in order
#[derive(Debug, Clone, PartialEq)]
pub struct MediaLocation {
    pub location: String,
    pub options: Vec<String>,
}

impl MediaLocation {
    /// Video as the main raw input, audio as its slave
    pub fn imem(video: &VideoInput, audio: &AudioInput) -> Self {
        let location = format!(
            "imem://width={}:height={}:dar={}:fps={}/1:cookie={}:codec={}:cat={}:caching=0",
            video.width,
            video.height,
            video.display_ratio,
            video.fps,
            VIDEO_COOKIE,
            video.codec,
            CAT_VIDEO,
        );
        let slave = format!(
            ":input-slave=imem://cookie={}:cat={}:codec={}:samplerate={}:channels={}:caching=0",
            AUDIO_COOKIE, CAT_AUDIO, audio.codec, audio.frequency, audio.channels,
        );
        Self {
            location,
            options: vec![slave],
        }
    }

    /// Route output through an encoder into a sink instead of a display
    pub fn with_transcode(mut self, transcode: &Transcode) -> Self {
        self.options.push(transcode.sout());
        self
    }
}

impl Transcode {
    /// The `:sout=` option string
    pub fn sout(&self) -> String {
        format!(
            ":sout=#transcode{{vcodec={},fps={},width={},height={},vb={},\
             acodec={},channels={},samplerate={},ab={}}}\
             :standard{{access={},mux={},dst=\"{}\"}}",
            self.vcodec,
            self.fps,
            self.width,
            self.height,
            self.video_bitrate,
            self.acodec,
            self.channels,
            self.frequency,
            self.audio_bitrate,
            self.access,
            self.mux,
            self.dst,
        )
    }
}
