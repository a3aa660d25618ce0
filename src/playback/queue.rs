//! Frames parked between the two tracks' pulls.
//!
//! A frame fetched for one track is parked at the back of the queue until the
//! other track's next pull picks it up; that pull becomes the frame's last
//! user and moves it into the track's owned slot, where it waits for the
//! engine's release. Queue and slots share one lock so a frame is always in
//! exactly one place.

use std::collections::VecDeque;

use parking_lot::{Mutex, MutexGuard};

use crate::playback::bridge::Track;

/// Parked frames plus one owned slot per track
#[derive(Debug)]
pub struct Handoff<F> {
    queue: VecDeque<F>,
    video: Option<F>,
    audio: Option<F>,
}

impl<F> Default for Handoff<F> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            video: None,
            audio: None,
        }
    }
}

impl<F> Handoff<F> {
    pub fn push_back(&mut self, frame: F) {
        self.queue.push_back(frame);
    }

    /// Oldest parked frame, never blocks
    pub fn pop_front(&mut self) -> Option<F> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn slot(&mut self, track: Track) -> &mut Option<F> {
        match track {
            Track::Video => &mut self.video,
            Track::Audio => &mut self.audio,
        }
    }

    /// Put `frame` in the track's owned slot, returning whatever was there
    pub fn own(&mut self, track: Track, frame: F) -> Option<F> {
        self.slot(track).replace(frame)
    }

    pub fn take_owned(&mut self, track: Track) -> Option<F> {
        self.slot(track).take()
    }

    pub fn is_owned(&self, track: Track) -> bool {
        match track {
            Track::Video => self.video.is_some(),
            Track::Audio => self.audio.is_some(),
        }
    }

    /// Empty the queue and both slots, oldest parked frame first
    pub fn drain(&mut self) -> Vec<F> {
        let mut frames: Vec<F> = self.queue.drain(..).collect();
        frames.extend(self.video.take());
        frames.extend(self.audio.take());
        frames
    }
}

/// Mutex-guarded [`Handoff`], shared between the engine's callback threads
#[derive(Debug)]
pub struct HandoffQueue<F> {
    inner: Mutex<Handoff<F>>,
}

impl<F> Default for HandoffQueue<F> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Handoff::default()),
        }
    }
}

impl<F> HandoffQueue<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for a compound queue/slot update. Never hold this across a host
    /// call.
    pub fn lock(&self) -> MutexGuard<'_, Handoff<F>> {
        self.inner.lock()
    }

    pub fn push_back(&self, frame: F) {
        self.inner.lock().push_back(frame);
    }

    pub fn pop_front(&self) -> Option<F> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn drain(&self) -> Vec<F> {
        self.inner.lock().drain()
    }
}
