//! Recording host and engine doubles for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::core::format::{AudioFormat, ImageFormat};
use crate::engine::{
    Engine, EngineError, EventListener, LogLevel, LogSink, Player, PlayerEvent, RawMediaSource,
    WindowHandle, WindowType,
};
use crate::host::{Audio, ConsumerEvent, Frame, Host, Image, Properties};

pub struct MockFrame {
    pub id: u64,
    speed: f64,
    position: i64,
    image: bool,
}

impl Frame for MockFrame {
    fn speed(&self) -> f64 {
        self.speed
    }

    fn original_position(&self) -> i64 {
        self.position
    }

    fn get_image(&mut self, format: ImageFormat, width: u32, height: u32) -> Option<Image> {
        if !self.image {
            return None;
        }
        Some(Image {
            data: Bytes::from(vec![self.id as u8; format.buffer_size(width, height)]),
            format,
            width,
            height,
        })
    }

    fn get_audio(
        &mut self,
        format: AudioFormat,
        frequency: u32,
        channels: u32,
        samples: usize,
    ) -> Option<Audio> {
        Some(Audio {
            data: Bytes::from(vec![self.id as u8; format.buffer_size(samples, channels)]),
            format,
            frequency,
            channels,
            samples,
        })
    }
}

/// Host producing numbered frames (ids start at 1) and recording what
/// comes back
#[derive(Default)]
pub struct MockHost {
    props: Properties,
    next_id: AtomicU64,
    speed: Mutex<Option<f64>>,
    no_image: AtomicBool,
    exhausted: AtomicBool,
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
    closed: Mutex<Vec<u64>>,
    shown: Mutex<Vec<u64>>,
    fatal: Mutex<Vec<String>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_speed(&self, speed: f64) {
        *self.speed.lock() = Some(speed);
    }

    pub fn set_image(&self, image: bool) {
        self.no_image.store(!image, Ordering::SeqCst);
    }

    pub fn set_exhausted(&self, exhausted: bool) {
        self.exhausted.store(exhausted, Ordering::SeqCst);
    }

    /// Hold every later fetch inside `next_frame`. The first receiver gets a
    /// message each time a fetch starts waiting; dropping the sender lets
    /// all fetches through.
    pub fn hold_fetches(&self) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = channel::unbounded();
        let (open_tx, open_rx) = channel::unbounded();
        *self.gate.lock() = Some((entered_tx, open_rx));
        (entered_rx, open_tx)
    }

    pub fn fetched(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> Vec<u64> {
        self.closed.lock().clone()
    }

    pub fn shown(&self) -> Vec<u64> {
        self.shown.lock().clone()
    }

    pub fn fatal_errors(&self) -> Vec<String> {
        self.fatal.lock().clone()
    }
}

impl Host for MockHost {
    type Frame = MockFrame;

    fn next_frame(&self) -> Option<MockFrame> {
        let gate = self.gate.lock().clone();
        if let Some((entered, open)) = gate {
            let _ = entered.send(());
            let _ = open.recv();
        }
        if self.exhausted.load(Ordering::SeqCst) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Some(MockFrame {
            id,
            speed: self.speed.lock().unwrap_or(1.0),
            position: id as i64 - 1,
            image: !self.no_image.load(Ordering::SeqCst),
        })
    }

    fn close_frame(&self, frame: MockFrame) {
        self.closed.lock().push(frame.id);
    }

    fn properties(&self) -> &Properties {
        &self.props
    }

    fn fire(&self, event: ConsumerEvent<'_, MockFrame>) {
        match event {
            ConsumerEvent::FrameShow(frame) => self.shown.lock().push(frame.id),
            ConsumerEvent::FatalError(message) => self.fatal.lock().push(message.to_string()),
        }
    }
}

/// Everything the mock engine and its objects were asked to do
#[derive(Default)]
pub struct EngineProbe {
    pub locations: Mutex<Vec<String>>,
    pub options: Mutex<Vec<String>>,
    pub source: Mutex<Option<Arc<dyn RawMediaSource>>>,
    pub listeners: Mutex<HashMap<PlayerEvent, EventListener>>,
    pub bound: Mutex<Vec<(WindowType, usize)>>,
    pub log_sink: Mutex<Option<LogSink>>,
    /// Status `play` fails with, if any
    pub play_failure: Mutex<Option<i32>>,
    pub plays: AtomicUsize,
    pub stops: AtomicUsize,
    pub media_released: AtomicUsize,
    pub players_released: AtomicUsize,
    pub engines_released: AtomicUsize,
}

impl EngineProbe {
    pub fn source(&self) -> Arc<dyn RawMediaSource> {
        self.source.lock().clone().expect("no source registered")
    }

    /// Deliver a player event the way the engine would
    pub fn emit(&self, event: PlayerEvent) {
        let listener = self.listeners.lock().get(&event).cloned();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if let Some(sink) = self.log_sink.lock().as_ref() {
            sink(level, message);
        }
    }
}

pub struct MockEngine {
    pub probe: Arc<EngineProbe>,
}

impl MockEngine {
    pub fn with_probe() -> (Self, Arc<EngineProbe>) {
        let probe = Arc::new(EngineProbe::default());
        (
            Self {
                probe: Arc::clone(&probe),
            },
            probe,
        )
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.probe.engines_released.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockMedia {
    probe: Arc<EngineProbe>,
}

impl Drop for MockMedia {
    fn drop(&mut self) {
        self.probe.media_released.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct MockPlayer {
    probe: Arc<EngineProbe>,
}

impl Drop for MockPlayer {
    fn drop(&mut self) {
        self.probe.players_released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Player for MockPlayer {
    fn set_nsobject(&self, view: WindowHandle) {
        self.probe.bound.lock().push((WindowType::NsObject, view.0));
    }

    fn set_xwindow(&self, drawable: u32) {
        self.probe.bound.lock().push((WindowType::XWindow, drawable as usize));
    }

    fn set_hwnd(&self, hwnd: WindowHandle) {
        self.probe.bound.lock().push((WindowType::Hwnd, hwnd.0));
    }

    fn attach(&self, event: PlayerEvent, listener: EventListener) {
        self.probe.listeners.lock().insert(event, listener);
    }

    fn detach(&self, event: PlayerEvent) {
        self.probe.listeners.lock().remove(&event);
    }

    fn play(&self) -> Result<(), EngineError> {
        self.probe.plays.fetch_add(1, Ordering::SeqCst);
        match *self.probe.play_failure.lock() {
            Some(code) => Err(EngineError::Status(code)),
            None => Ok(()),
        }
    }

    fn stop(&self) {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
    }
}

impl Engine for MockEngine {
    type Media = MockMedia;
    type Player = MockPlayer;

    fn set_log_sink(&self, sink: LogSink) {
        *self.probe.log_sink.lock() = Some(sink);
    }

    fn media_new_location(&self, location: &str) -> Result<MockMedia, EngineError> {
        self.probe.locations.lock().push(location.to_string());
        Ok(MockMedia {
            probe: Arc::clone(&self.probe),
        })
    }

    fn media_add_option(&self, _media: &mut MockMedia, option: &str) {
        self.probe.options.lock().push(option.to_string());
    }

    fn media_set_source(&self, _media: &mut MockMedia, source: Arc<dyn RawMediaSource>) {
        *self.probe.source.lock() = Some(source);
    }

    fn player_new_from_media(&self, media: &MockMedia) -> Result<MockPlayer, EngineError> {
        Ok(MockPlayer {
            probe: Arc::clone(&media.probe),
        })
    }
}
