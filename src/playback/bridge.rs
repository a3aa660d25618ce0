//! The pull/release callback pair connecting host frames to engine tracks.
//!
//! The engine pulls video and audio independently, from any of its threads,
//! in any interleaving. One host frame feeds one pull of each kind: the pull
//! that fetches it parks it, the pull that pops it owns it until the engine
//! releases that block, and the release hands it back to the host. Host
//! fetches and image/audio rendering run outside the queue lock.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crossbeam::sync::WaitGroup;
use parking_lot::{Mutex, RwLock};

use crate::core::time::PtsClock;
use crate::engine::mrl::{AUDIO_COOKIE, VIDEO_COOKIE};
use crate::engine::{PlayerEvent, PullError, RawBlock, RawMediaSource};
use crate::host::{ConsumerEvent, Frame, Host, Properties};
use crate::playback::queue::HandoffQueue;
use crate::playback::settings::WorkingProperties;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Media kind a callback is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Video,
    Audio,
}

impl Track {
    /// Decode the correlation cookie the engine passes back
    pub fn from_cookie(cookie: &str) -> Option<Self> {
        match cookie {
            VIDEO_COOKIE => Some(Track::Video),
            AUDIO_COOKIE => Some(Track::Audio),
            _ => None,
        }
    }

    pub fn cookie(self) -> &'static str {
        match self {
            Track::Video => VIDEO_COOKIE,
            Track::Audio => AUDIO_COOKIE,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Video => f.write_str("video"),
            Track::Audio => f.write_str("audio"),
        }
    }
}

/// Barrier between engine callbacks and teardown.
///
/// Every callback holds a [`WaitGroup`] clone while it runs. `close` stops
/// handing out clones and waits for the outstanding ones; a closed fence
/// turns callbacks away until it is reopened.
#[derive(Debug)]
pub struct CallbackFence {
    open: Mutex<Option<WaitGroup>>,
}

impl Default for CallbackFence {
    fn default() -> Self {
        Self {
            open: Mutex::new(Some(WaitGroup::new())),
        }
    }
}

impl CallbackFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running callback, `None` once the fence is closed
    pub fn enter(&self) -> Option<WaitGroup> {
        self.open.lock().clone()
    }

    /// Refuse new callbacks and wait for the running ones to return
    pub fn close(&self) {
        let pending = self.open.lock().take();
        if let Some(pending) = pending {
            pending.wait();
        }
    }

    pub fn reopen(&self) {
        let mut open = self.open.lock();
        if open.is_none() {
            *open = Some(WaitGroup::new());
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.lock().is_some()
    }
}

/// State shared between the consumer and the engine's callback threads
pub struct Bridge<H: Host> {
    host: H,
    id: AtomicU64,
    running: AtomicBool,
    clock: PtsClock,
    handoff: HandoffQueue<H::Frame>,
    settings: RwLock<Arc<WorkingProperties>>,
    fence: CallbackFence,
}

impl<H: Host> Bridge<H> {
    pub fn new(host: H) -> Self {
        let settings = WorkingProperties::snapshot(host.properties());
        Self {
            host,
            id: AtomicU64::new(0),
            running: AtomicBool::new(false),
            clock: PtsClock::new(),
            handoff: HandoffQueue::new(),
            settings: RwLock::new(Arc::new(settings)),
            fence: CallbackFence::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn properties(&self) -> &Properties {
        self.host.properties()
    }

    /// Session identity, assigned anew on every setup
    pub fn id(&self) -> u64 {
        self.id.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub fn clock(&self) -> &PtsClock {
        &self.clock
    }

    pub fn fence(&self) -> &CallbackFence {
        &self.fence
    }

    pub fn handoff(&self) -> &HandoffQueue<H::Frame> {
        &self.handoff
    }

    pub fn settings(&self) -> Arc<WorkingProperties> {
        Arc::clone(&self.settings.read())
    }

    /// Install the configuration for a new run and take a fresh identity
    pub fn begin_run(&self, settings: Arc<WorkingProperties>) -> u64 {
        *self.settings.write() = settings;
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        self.id.store(id, Ordering::Relaxed);
        id
    }

    /// Give every parked and owned frame back to the host
    pub fn release_pending(&self) -> usize {
        let frames = self.handoff.drain();
        let count = frames.len();
        for frame in frames {
            self.host.close_frame(frame);
        }
        if count > 0 {
            tracing::debug!(consumer = self.id(), count, "released pending frames");
        }
        count
    }

    /// Engine player event, delivered on an engine thread
    pub fn on_player_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::Stopped => {
                self.set_running(false);
                tracing::debug!(consumer = self.id(), "player stopped");
            }
            other => tracing::debug!(consumer = self.id(), event = ?other, "ignoring player event"),
        }
    }

    /// Produce the next block for `track`
    pub fn pull(&self, track: Track) -> Result<RawBlock, PullError> {
        if !self.is_running() {
            return Err(PullError::Stopped);
        }
        let settings = self.settings();

        let (mut frame, last_use) = match self.handoff.pop_front() {
            Some(frame) => (frame, true),
            None => match self.host.next_frame() {
                Some(frame) => (frame, false),
                None => {
                    tracing::debug!(consumer = self.id(), %track, "host produced no frame");
                    return Err(PullError::NoData);
                }
            },
        };

        // The fetch can block for a long time; a stop may have happened since
        if !self.is_running() {
            self.host.close_frame(frame);
            return Err(PullError::Stopped);
        }

        if settings.terminate_on_pause && frame.speed() == 0.0 {
            self.set_running(false);
            self.host.close_frame(frame);
            tracing::info!(consumer = self.id(), %track, "paused frame, ending stream");
            return Err(PullError::EndOfStream);
        }

        let block = match track {
            Track::Video => self.render_video(&mut frame, &settings),
            Track::Audio => self.render_audio(&mut frame, &settings),
        };

        let stale = {
            let mut handoff = self.handoff.lock();
            match (&block, last_use) {
                (Some(_), true) => handoff.own(track, frame),
                (None, true) => Some(frame),
                (_, false) => {
                    handoff.push_back(frame);
                    None
                }
            }
        };
        if let Some(stale) = stale {
            if block.is_some() {
                tracing::warn!(consumer = self.id(), %track, "previous block was never released");
            }
            self.host.close_frame(stale);
        }

        match block {
            Some(block) => {
                tracing::trace!(
                    consumer = self.id(),
                    %track,
                    pts = block.pts,
                    size = block.size,
                    "pulled block"
                );
                Ok(block)
            }
            None => {
                tracing::debug!(consumer = self.id(), %track, "frame produced no data");
                Err(PullError::NoData)
            }
        }
    }

    /// The engine is done with the last block of `track`
    pub fn release(&self, track: Track, block: RawBlock) {
        drop(block);
        let owned = self.handoff.lock().take_owned(track);
        if let Some(frame) = owned {
            self.host.fire(ConsumerEvent::FrameShow(&frame));
            self.host.close_frame(frame);
        }
    }

    fn render_video(&self, frame: &mut H::Frame, settings: &WorkingProperties) -> Option<RawBlock> {
        let image = frame.get_image(settings.video.format, settings.width, settings.height)?;
        if image.data.is_empty() {
            return None;
        }
        let size = image.byte_size().min(image.data.len());
        let pts = self.clock.next_video_pts(settings.fps);
        Some(RawBlock {
            buffer: image.data,
            size,
            pts,
            dts: pts,
        })
    }

    fn render_audio(&self, frame: &mut H::Frame, settings: &WorkingProperties) -> Option<RawBlock> {
        let samples = self
            .host
            .sample_count(settings.fps, settings.frequency, frame.original_position());
        let audio = frame.get_audio(
            settings.audio.format,
            settings.frequency,
            settings.channels,
            samples,
        )?;
        if audio.data.is_empty() {
            return None;
        }
        let size = audio.byte_size().min(audio.data.len());
        let pts = self.clock.next_audio_pts(samples, settings.frequency);
        Some(RawBlock {
            buffer: audio.data,
            size,
            pts,
            dts: pts,
        })
    }
}

/// The raw input the engine is given; routes cookies to [`Bridge`] calls
pub struct BridgeSource<H: Host> {
    bridge: Weak<Bridge<H>>,
}

impl<H: Host> BridgeSource<H> {
    pub fn new(bridge: &Arc<Bridge<H>>) -> Self {
        Self {
            bridge: Arc::downgrade(bridge),
        }
    }
}

impl<H: Host> RawMediaSource for BridgeSource<H> {
    fn get(&self, cookie: &str) -> Result<RawBlock, PullError> {
        let Some(bridge) = self.bridge.upgrade() else {
            return Err(PullError::Stopped);
        };
        let Some(_inflight) = bridge.fence.enter() else {
            return Err(PullError::Stopped);
        };
        match Track::from_cookie(cookie) {
            Some(track) => bridge.pull(track),
            None if bridge.is_running() => {
                panic!("raw input pulled with unregistered cookie {cookie:?}")
            }
            None => Err(PullError::Stopped),
        }
    }

    fn release(&self, cookie: &str, block: RawBlock) {
        let Some(bridge) = self.bridge.upgrade() else {
            return;
        };
        let Some(_inflight) = bridge.fence.enter() else {
            return;
        };
        match Track::from_cookie(cookie) {
            Some(track) => bridge.release(track, block),
            None if bridge.is_running() => {
                panic!("raw input released with unregistered cookie {cookie:?}")
            }
            None => {}
        }
    }
}
