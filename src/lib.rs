//! Bridges a pull-based host media framework to a push-based playback engine.
//!
//! The host hands out frames one at a time; the engine asks for raw video and
//! audio blocks from its own threads and tells us when it is done with each.
//! [`Consumer`] owns the engine objects and the start/stop lifecycle, and the
//! [`playback::Bridge`] it shares with the engine pairs every host frame with
//! one pull per track, stamps blocks with synthesized timestamps, and returns
//! each frame to the host exactly once.

pub mod core;
pub mod engine;
pub mod host;
pub mod playback;

#[cfg(test)]
mod testing;

pub use engine::{Engine, EngineError, Player, PullError, RawBlock, RawMediaSource};
pub use host::{Frame, Host, Properties};
pub use playback::{Consumer, ConsumerError, ConsumerState, OutputDestination, OutputMode, Track};
