//! The playback engine as seen by the consumer.
//!
//! The engine plays a media built from a location string plus options. Raw
//! audio/video enter it through a [`RawMediaSource`] which the engine calls
//! from its own threads: `get` for the next block of a track, `release` once
//! it is done with that block. The player reports lifecycle changes through
//! [`PlayerEvent`] listeners, also on engine threads.

pub mod mrl;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::core::time::Micros;

pub use mrl::MediaLocation;

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Media creation failed: {0}")]
    Media(String),
    #[error("Player creation failed: {0}")]
    Player(String),
    #[error("Engine returned status {0}")]
    Status(i32),
}

impl EngineError {
    /// Integer status equivalent, always nonzero
    pub fn status(&self) -> i32 {
        match self {
            EngineError::Status(code) if *code != 0 => *code,
            _ => -1,
        }
    }
}

/// Why a `get` produced no block
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PullError {
    #[error("Consumer is not running")]
    Stopped,
    #[error("End of stream")]
    EndOfStream,
    #[error("No data available")]
    NoData,
}

impl PullError {
    /// The engine treats every nonzero return as "no block this call"
    pub fn status(&self) -> i32 {
        1
    }
}

/// One block of raw media handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub buffer: Bytes,
    /// Bytes of `buffer` that belong to the block
    pub size: usize,
    pub pts: Micros,
    pub dts: Micros,
}

/// Pull-based raw media input registered with a media
pub trait RawMediaSource: Send + Sync {
    /// Next block for the track identified by `cookie`
    fn get(&self, cookie: &str) -> Result<RawBlock, PullError>;

    /// The engine is done with a block previously returned by `get`
    fn release(&self, cookie: &str, block: RawBlock);
}

/// Engine log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Notice,
    Warning,
    Error,
}

pub type LogSink = Box<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Player lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Playing,
    Stopped,
    EndReached,
    EncounteredError,
}

pub type EventListener = Arc<dyn Fn(PlayerEvent) + Send + Sync>;

/// Opaque native window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

/// Kind of native handle a player can render into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// Cocoa view
    NsObject,
    /// X11 drawable
    XWindow,
    /// Win32 window
    Hwnd,
}

impl WindowType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "nsobject" => Some(Self::NsObject),
            "xwindow" => Some(Self::XWindow),
            "hwnd" => Some(Self::Hwnd),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NsObject => "nsobject",
            Self::XWindow => "xwindow",
            Self::Hwnd => "hwnd",
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A media player. Dropping it releases the engine object.
pub trait Player: Send + Sync {
    fn set_nsobject(&self, view: WindowHandle);

    fn set_xwindow(&self, drawable: u32);

    fn set_hwnd(&self, hwnd: WindowHandle);

    fn attach(&self, event: PlayerEvent, listener: EventListener);

    fn detach(&self, event: PlayerEvent);

    fn play(&self) -> Result<(), EngineError>;

    /// Ask the player to stop. Safe to call on a stopped player.
    fn stop(&self);
}

/// An engine instance. Dropping it releases the instance.
pub trait Engine: Send + Sync + 'static {
    /// A media description; dropping it releases the engine object
    type Media: Send;
    type Player: Player;

    fn set_log_sink(&self, sink: LogSink);

    fn media_new_location(&self, location: &str) -> Result<Self::Media, EngineError>;

    fn media_add_option(&self, media: &mut Self::Media, option: &str);

    /// Wire the raw input callbacks the location's `imem://` parts refer to
    fn media_set_source(&self, media: &mut Self::Media, source: Arc<dyn RawMediaSource>);

    fn player_new_from_media(&self, media: &Self::Media) -> Result<Self::Player, EngineError>;
}
