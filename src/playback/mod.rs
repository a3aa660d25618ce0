pub mod bridge;
pub mod consumer;
pub mod queue;
pub mod settings;
pub mod state;

pub use bridge::{Bridge, BridgeSource, CallbackFence, Track};
pub use consumer::{Consumer, ConsumerError};
pub use queue::HandoffQueue;
pub use settings::{OutputDestination, OutputMode, WorkingProperties};
pub use state::ConsumerState;
