//! Host pixel/sample formats and their engine codec tags.
//!
//! The host numbers its formats with small integers (these are the values
//! stored in `input_image_format` / `input_audio_format`); the engine wants
//! four-character codes. Formats the engine's raw input cannot take fall back
//! to packed 4:2:2 for video and signed 16-bit little-endian for audio.

use std::fmt;

/// Host image format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    None,
    Rgb24,
    Rgba,
    Yuv422,
    Yuv420p,
    Movit,
    OpenGlTexture,
    Yuv422p16,
}

impl ImageFormat {
    /// Decode the host's integer value
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::None,
            1 => Self::Rgb24,
            2 => Self::Rgba,
            3 => Self::Yuv422,
            4 => Self::Yuv420p,
            5 => Self::Movit,
            6 => Self::OpenGlTexture,
            7 => Self::Yuv422p16,
            _ => return None,
        })
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Rgb24 => 1,
            Self::Rgba => 2,
            Self::Yuv422 => 3,
            Self::Yuv420p => 4,
            Self::Movit => 5,
            Self::OpenGlTexture => 6,
            Self::Yuv422p16 => 7,
        }
    }

    /// Bytes needed for one `width` x `height` image.
    /// GPU-resident formats have no CPU-side size.
    pub fn buffer_size(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            Self::Rgb24 => pixels * 3,
            Self::Rgba => pixels * 4,
            Self::Yuv422 => pixels * 2,
            Self::Yuv420p => pixels * 3 / 2,
            Self::Yuv422p16 => pixels * 4,
            Self::None | Self::Movit | Self::OpenGlTexture => 0,
        }
    }

    /// Engine codec tag for formats the raw input accepts
    pub fn fourcc(self) -> Option<FourCC> {
        match self {
            Self::Rgb24 => Some(FourCC::RV24),
            Self::Rgba => Some(FourCC::RGBA),
            Self::Yuv422 => Some(FourCC::YUY2),
            Self::Yuv420p => Some(FourCC::I420),
            _ => None,
        }
    }
}

/// Host audio sample format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    None,
    S16,
    S32,
    Float,
    S32le,
    F32le,
    U8,
}

impl AudioFormat {
    /// Decode the host's integer value
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::None,
            1 => Self::S16,
            2 => Self::S32,
            3 => Self::Float,
            4 => Self::S32le,
            5 => Self::F32le,
            6 => Self::U8,
            _ => return None,
        })
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::S16 => 1,
            Self::S32 => 2,
            Self::Float => 3,
            Self::S32le => 4,
            Self::F32le => 5,
            Self::U8 => 6,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::None => 0,
            Self::S16 => 2,
            Self::S32 | Self::Float | Self::S32le | Self::F32le => 4,
            Self::U8 => 1,
        }
    }

    /// Bytes needed for `samples` samples on each of `channels` channels
    pub fn buffer_size(self, samples: usize, channels: u32) -> usize {
        self.bytes_per_sample() * samples * channels as usize
    }

    /// Engine codec tag for formats the raw input accepts
    pub fn fourcc(self) -> Option<FourCC> {
        match self {
            Self::S16 => Some(FourCC::S16L),
            Self::S32le => Some(FourCC::S32L),
            Self::F32le => Some(FourCC::FL32),
            _ => None,
        }
    }
}

/// Four-character engine codec tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC([u8; 4]);

impl FourCC {
    pub const RV24: FourCC = FourCC(*b"RV24");
    pub const RGBA: FourCC = FourCC(*b"RGBA");
    pub const YUY2: FourCC = FourCC(*b"YUY2");
    pub const I420: FourCC = FourCC(*b"I420");
    pub const S16L: FourCC = FourCC(*b"s16l");
    pub const S32L: FourCC = FourCC(*b"s32l");
    pub const FL32: FourCC = FourCC(*b"fl32");

    pub fn as_str(&self) -> &str {
        // Only built from the ASCII constants above
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A host format paired with the tag the engine is told to expect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated<F> {
    /// Format requested from the host
    pub format: F,
    pub codec: FourCC,
}

/// Pick the video codec tag for the configured host image format.
///
/// `raw` is the configured integer value. Anything the engine cannot take,
/// including values the host enumeration does not know, is logged and
/// replaced by packed 4:2:2; the host is then asked for that format too so
/// the bytes match the tag.
pub fn negotiate_video(raw: i32) -> Negotiated<ImageFormat> {
    let supported = ImageFormat::from_raw(raw)
        .and_then(|format| format.fourcc().map(|codec| (format, codec)));
    match supported {
        Some((format, codec)) => Negotiated { format, codec },
        None => {
            tracing::debug!(
                input_image_format = raw,
                "unsupported input_image_format, defaulting to yuv422"
            );
            Negotiated {
                format: ImageFormat::Yuv422,
                codec: FourCC::YUY2,
            }
        }
    }
}

/// Pick the audio codec tag for the configured host sample format.
/// Unsupported values fall back to signed 16-bit little-endian.
pub fn negotiate_audio(raw: i32) -> Negotiated<AudioFormat> {
    let supported = AudioFormat::from_raw(raw)
        .and_then(|format| format.fourcc().map(|codec| (format, codec)));
    match supported {
        Some((format, codec)) => Negotiated { format, codec },
        None => {
            tracing::debug!(
                input_audio_format = raw,
                "unsupported input_audio_format, defaulting to s16"
            );
            Negotiated {
                format: AudioFormat::S16,
                codec: FourCC::S16L,
            }
        }
    }
}
