//! Playback state machine: elapsed-time accumulation, pause, speed, direction
//! and loop policy for one animation instance

use crate::clip::AnimationClipData;
use crate::events::{
    FrameData, InterruptHandle, PlaybackEvent, PlaybackObservers, SubscriptionId,
};
use crate::resample::{resample, ResampledFrame};
use crate::settings::PlaybackSettings;

/// Direction of travel through a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Coarse lifecycle of a playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    NotStarted,
    Playing,
    Paused,
    /// Terminal: a new controller is needed to play again
    Finished,
}

/// Mutable per-instance playback state.
///
/// `started` and `finished` only ever go from `false` to `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Seconds into the clip
    pub elapsed_time: f64,
    pub started: bool,
    pub finished: bool,
    pub paused: bool,
    /// Positive multiplier; the sign comes from `direction`
    pub speed: f64,
    pub direction: Direction,
    pub looping: bool,
    ended_notified: bool,
}

impl PlaybackState {
    fn from_settings(settings: &PlaybackSettings) -> Self {
        Self {
            elapsed_time: 0.0,
            started: false,
            finished: false,
            paused: false,
            speed: settings.speed,
            direction: if settings.play_backwards {
                Direction::Backward
            } else {
                Direction::Forward
            },
            looping: settings.looping,
            ended_notified: false,
        }
    }
}

/// Drives one clip's playback position and notifies observers.
///
/// The controller only needs the clip's frame count and frame rate, both
/// already validated when the clip was loaded.
pub struct PlaybackController {
    state: PlaybackState,
    frame_count: usize,
    frame_rate: u32,
    duration: f64,
    current: ResampledFrame,
    observers: PlaybackObservers,
    interrupt: InterruptHandle,
}

impl PlaybackController {
    /// `frame_count` and `frame_rate` must both be positive.
    pub fn new(frame_count: usize, frame_rate: u32, settings: &PlaybackSettings) -> Self {
        debug_assert!(frame_count > 0 && frame_rate > 0);
        Self {
            state: PlaybackState::from_settings(settings),
            frame_count,
            frame_rate,
            duration: frame_count as f64 / frame_rate as f64,
            current: ResampledFrame::first_frame_guaranteed(frame_count),
            observers: PlaybackObservers::new(),
            interrupt: InterruptHandle::new(),
        }
    }

    pub fn for_clip(clip: &AnimationClipData, settings: &PlaybackSettings) -> Self {
        Self::new(clip.frame_count(), clip.frame_rate(), settings)
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackEvent) + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// A handle that can stop this playback from outside the tick loop.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.state.finished {
            PlaybackStatus::Finished
        } else if !self.state.started {
            PlaybackStatus::NotStarted
        } else if self.state.paused {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Playing
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn elapsed_time(&self) -> f64 {
        self.state.elapsed_time
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The most recently resampled position (from `tick` or `jump_to_frame`).
    pub fn current_frame(&self) -> ResampledFrame {
        self.current
    }

    /// Begin playback from the start of the clip.
    ///
    /// Ignored once the playback has started or finished.
    pub fn start(&mut self) {
        self.poll_interrupt();
        if self.state.started || self.state.finished {
            return;
        }
        self.state.started = true;
        self.state.elapsed_time = 0.0;
        self.current = ResampledFrame::first_frame_guaranteed(self.frame_count);
        tracing::debug!(frames = self.frame_count, fps = self.frame_rate, "playback started");
        self.observers
            .emit(&PlaybackEvent::TotalFrames(self.frame_count));
    }

    /// Advance playback by `delta_time` seconds of wall-clock time.
    ///
    /// Returns `None` without touching any state when the playback has not
    /// started, is paused, or has finished.
    pub fn tick(&mut self, delta_time: f64) -> Option<ResampledFrame> {
        self.poll_interrupt();
        if !self.state.started || self.state.finished || self.state.paused {
            return None;
        }

        self.state.elapsed_time += delta_time * self.state.speed * self.state.direction.sign();
        if self.state.elapsed_time < 0.0 {
            // Backward travel holds at frame 0 until interrupted or turned around
            self.state.elapsed_time = 0.0;
        }

        let frame = resample(self.state.elapsed_time, self.frame_count, self.duration);
        self.current = frame;
        self.observers.emit(&PlaybackEvent::CurrentFrame(FrameData {
            current_frame: frame.frame,
            total_frames: self.frame_count,
            frame_rate: self.frame_rate,
        }));

        if frame.is_last_frame {
            if self.state.looping {
                self.state.elapsed_time = 0.0;
            } else {
                self.finish();
            }
        }

        Some(frame)
    }

    /// Scrub to a (possibly fractional) frame. Does not change the status.
    pub fn jump_to_frame(&mut self, target_frame: f64) {
        self.state.elapsed_time = (target_frame / self.frame_count as f64) * self.duration;
        self.current = resample(self.state.elapsed_time, self.frame_count, self.duration);
        tracing::debug!(
            frame = target_frame,
            elapsed = self.state.elapsed_time,
            "jumped to frame"
        );
    }

    /// Set the speed multiplier. Non-positive or non-finite values are ignored.
    pub fn set_speed(&mut self, multiplier: f64) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            tracing::warn!("Ignoring invalid playback speed {}", multiplier);
            return;
        }
        self.state.speed = multiplier;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.state.looping = looping;
    }

    /// Stop playback from any state.
    ///
    /// Observers hear `AnimationEnded` only if playback had started and
    /// had not already ended; repeated calls are harmless.
    pub fn interrupt(&mut self) {
        if self.state.finished {
            return;
        }
        if !self.state.started {
            self.state.finished = true;
            tracing::debug!("playback interrupted before starting");
            return;
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.state.finished = true;
        if !self.state.ended_notified {
            self.state.ended_notified = true;
            tracing::debug!(elapsed = self.state.elapsed_time, "playback ended");
            self.observers.emit(&PlaybackEvent::AnimationEnded);
        }
    }

    /// Honor an `InterruptHandle` request now rather than on the next `tick`.
    ///
    /// Returns `true` if the playback is finished afterwards.
    pub fn poll_interrupt(&mut self) -> bool {
        if self.interrupt.is_requested() {
            self.interrupt();
        }
        self.state.finished
    }
}
