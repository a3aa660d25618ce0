//! Consumer lifecycle state.

/// Externally visible consumer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// No player, or the player was stopped by the caller or the engine
    Stopped,
    /// Player started and still feeding on frames
    Running,
}

impl ConsumerState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, ConsumerState::Stopped)
    }
}

impl Default for ConsumerState {
    fn default() -> Self {
        ConsumerState::Stopped
    }
}
