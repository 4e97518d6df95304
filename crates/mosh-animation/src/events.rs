//! Playback notifications and explicit observer registration
//!
//! Each playback controller owns its own observer list. Interested parties
//! subscribe with a callback and keep the returned `SubscriptionId` for as
//! long as they want notifications; there is no process-wide event hub.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Current playback position, as shown by frame sliders and time readouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameData {
    /// Decimal frame index
    pub current_frame: f64,
    pub total_frames: usize,
    pub frame_rate: u32,
}

impl FrameData {
    /// Current position in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_frame / self.frame_rate as f64
    }

    /// Clip length in seconds.
    pub fn duration(&self) -> f64 {
        self.total_frames as f64 / self.frame_rate as f64
    }
}

/// A notification emitted by a playback controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlaybackEvent {
    /// Emitted once when playback starts
    TotalFrames(usize),
    /// Emitted after every tick that advanced playback
    CurrentFrame(FrameData),
    /// Emitted exactly once when playback finishes or is interrupted after starting
    AnimationEnded,
}

/// Handle identifying one subscription on one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&PlaybackEvent)>;

/// Observer list owned by a single playback controller
#[derive(Default)]
pub struct PlaybackObservers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl PlaybackObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until `unsubscribe` is called
    /// with the returned id or the owning controller is dropped.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to every subscriber in registration order.
    pub fn emit(&mut self, event: &PlaybackEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Thread-safe request to stop a playback from outside its tick loop.
///
/// Cloned handles share one flag. The owning controller honors the request
/// on its next `start` or `tick`.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    requested: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
