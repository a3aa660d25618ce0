//! Consumer lifecycle: engine object setup, start/stop, teardown.
//!
//! The application thread drives a [`Consumer`]; the engine's threads only
//! ever reach the shared [`Bridge`] (through the raw source and the player
//! event listener), so the player and media handles here are touched by one
//! thread only.

use std::sync::Arc;

use crate::engine::{Engine, EngineError, LogLevel, Player, PlayerEvent, WindowType};
use crate::host::{ConsumerEvent, Host};
use crate::playback::bridge::{Bridge, BridgeSource};
use crate::playback::settings::{self, OutputDestination, OutputMode, WorkingProperties};
use crate::playback::state::ConsumerState;

/// Error type for consumer lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("Consumer is already running")]
    AlreadyRunning,
    #[error("Window setup failed: {0}")]
    WindowSetup(String),
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Player failed to start: {0}")]
    Play(EngineError),
}

impl ConsumerError {
    /// Nonzero status for hosts that expect one from `start`
    pub fn status(&self) -> i32 {
        match self {
            ConsumerError::AlreadyRunning | ConsumerError::WindowSetup(_) => 1,
            ConsumerError::Engine(err) | ConsumerError::Play(err) => err.status(),
        }
    }
}

fn forward_engine_log(consumer: u64, level: LogLevel, message: &str) {
    let message = message.trim_end();
    match level {
        LogLevel::Debug => tracing::debug!(target: "engine", consumer, "{}", message),
        LogLevel::Notice => tracing::info!(target: "engine", consumer, "{}", message),
        LogLevel::Warning => tracing::warn!(target: "engine", consumer, "{}", message),
        LogLevel::Error => tracing::error!(target: "engine", consumer, "{}", message),
    }
}

fn bind_window<P: Player>(
    player: &P,
    settings: &WorkingProperties,
) -> Result<WindowType, ConsumerError> {
    let (Some(name), Some(handle)) = (settings.window_type.as_deref(), settings.window_handle)
    else {
        return Err(ConsumerError::WindowSetup(
            "window_type and output_dst must both be set".to_string(),
        ));
    };
    let kind = WindowType::parse(name)
        .ok_or_else(|| ConsumerError::WindowSetup(format!("unknown window_type {:?}", name)))?;
    match kind {
        WindowType::NsObject => player.set_nsobject(handle),
        WindowType::XWindow => {
            let drawable = u32::try_from(handle.0).map_err(|_| {
                ConsumerError::WindowSetup(format!(
                    "xwindow handle {:#x} is not a drawable id",
                    handle.0
                ))
            })?;
            player.set_xwindow(drawable);
        }
        WindowType::Hwnd => player.set_hwnd(handle),
    }
    Ok(kind)
}

/// Feeds host frames into a playback engine
pub struct Consumer<H: Host, E: Engine> {
    // Field order is drop order: player before media before engine
    player: Option<E::Player>,
    media: Option<E::Media>,
    engine: E,
    bridge: Arc<Bridge<H>>,
    mode: OutputMode,
    closed: bool,
}

impl<H: Host, E: Engine> Consumer<H, E> {
    /// Create a consumer for the service `service_id`.
    ///
    /// `"libvlc_window"` renders into the window passed as `destination`;
    /// any other id transcodes into the location passed as `destination`.
    pub fn new(
        host: H,
        engine: E,
        service_id: &str,
        destination: Option<OutputDestination>,
    ) -> Self {
        let mode = OutputMode::from_service_id(service_id);
        match (mode, &destination) {
            (OutputMode::Window, Some(OutputDestination::Location(_)))
            | (OutputMode::Transcode, Some(OutputDestination::Window(_))) => {
                tracing::warn!(?mode, "output destination does not match the output mode");
            }
            _ => {}
        }
        settings::apply_defaults(host.properties(), destination);

        let bridge = Arc::new(Bridge::new(host));
        let weak = Arc::downgrade(&bridge);
        engine.set_log_sink(Box::new(move |level: LogLevel, message: &str| {
            let consumer = weak.upgrade().map(|bridge| bridge.id()).unwrap_or(0);
            forward_engine_log(consumer, level, message);
        }));

        Self {
            player: None,
            media: None,
            engine,
            bridge,
            mode,
            closed: false,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn host(&self) -> &H {
        self.bridge.host()
    }

    pub fn bridge(&self) -> &Arc<Bridge<H>> {
        &self.bridge
    }

    /// Session identity of the current (or last) run, zero before the first
    pub fn id(&self) -> u64 {
        self.bridge.id()
    }

    /// Build fresh engine objects from the current configuration and play.
    ///
    /// Fails with [`ConsumerError::AlreadyRunning`] unless stopped. A window
    /// setup failure fires a fatal-error event and leaves the player
    /// unstarted; a play failure is returned with the engine's status.
    pub fn start(&mut self) -> Result<(), ConsumerError> {
        if !self.is_stopped() {
            return Err(ConsumerError::AlreadyRunning);
        }
        self.release_engine_objects();

        let settings = Arc::new(WorkingProperties::snapshot(self.bridge.properties()));
        let id = self.bridge.begin_run(Arc::clone(&settings));
        let location = settings.media_location(self.mode);
        tracing::debug!(consumer = id, location = %location.location, "creating media");

        let mut media = self.engine.media_new_location(&location.location)?;
        for option in &location.options {
            self.engine.media_add_option(&mut media, option);
        }
        self.engine
            .media_set_source(&mut media, Arc::new(BridgeSource::new(&self.bridge)));
        let player = self.engine.player_new_from_media(&media)?;
        self.media = Some(media);
        let player = self.player.insert(player);

        if self.mode == OutputMode::Window {
            match bind_window(&*player, &settings) {
                Ok(kind) => {
                    tracing::debug!(consumer = id, window_type = %kind, "bound player to window")
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::error!(consumer = id, "{}", message);
                    self.bridge.host().fire(ConsumerEvent::FatalError(&message));
                    return Err(err);
                }
            }
        }

        let weak = Arc::downgrade(&self.bridge);
        player.attach(
            PlayerEvent::Stopped,
            Arc::new(move |event: PlayerEvent| {
                if let Some(bridge) = weak.upgrade() {
                    bridge.on_player_event(event);
                }
            }),
        );

        self.bridge.set_running(true);
        if let Err(err) = player.play() {
            self.bridge.set_running(false);
            tracing::error!(consumer = id, error = %err, "player failed to start");
            return Err(ConsumerError::Play(err));
        }
        tracing::info!(consumer = id, mode = ?self.mode, "consumer started");
        Ok(())
    }

    /// Stop playback and rewind the timestamps. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(player) = &self.player {
            self.bridge.set_running(false);
            player.stop();
            tracing::info!(consumer = self.bridge.id(), "consumer stopped");
        }
        self.bridge.clock().reset();
        self.bridge.release_pending();
    }

    pub fn is_stopped(&self) -> bool {
        self.state().is_stopped()
    }

    pub fn state(&self) -> ConsumerState {
        if self.player.is_some() && self.bridge.is_running() {
            ConsumerState::Running
        } else {
            ConsumerState::Stopped
        }
    }

    /// Nothing to purge; `stop` already drops everything buffered
    pub fn purge(&mut self) {}

    /// Stop, wait for in-flight callbacks, and release every engine object
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(player) = &self.player {
            player.detach(PlayerEvent::Stopped);
        }
        self.stop();
        self.bridge.fence().close();
        self.player = None;
        self.media = None;
        self.bridge.release_pending();
        tracing::debug!(consumer = self.bridge.id(), "consumer closed");
    }

    /// Drop the previous run's player and media once no callback is inside
    fn release_engine_objects(&mut self) {
        if self.player.is_none() && self.media.is_none() {
            return;
        }
        if let Some(player) = &self.player {
            player.detach(PlayerEvent::Stopped);
            player.stop();
        }
        self.bridge.fence().close();
        self.player = None;
        self.media = None;
        self.bridge.release_pending();
        self.bridge.fence().reopen();
    }
}

impl<H: Host, E: Engine> Drop for Consumer<H, E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
