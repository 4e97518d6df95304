//! Animation playback for MoSh/AMASS motion-capture clips
//!
//! Clips are loaded from JSON, converted into the render coordinate space,
//! and played back at any tick rate by resampling their fixed source frame
//! rate:
//! - `resample` maps elapsed time onto a pair of source frames
//! - `interpolate` blends those frames into a `Pose`
//! - `PlaybackController` owns elapsed time, pause, speed, direction and looping
//! - `AnimationSequence` plays sets of clips, one character per clip

pub mod animation;
pub mod clip;
pub mod coords;
pub mod events;
pub mod interpolate;
pub mod loader;
pub mod model;
pub mod playback;
pub mod resample;
pub mod sequence;
pub mod settings;

use mosh_core::Result;
use mosh_runtime::RuntimeSystem;

use animation::PoseConsumer;
use loader::PendingLoad;
use sequence::{AnimationSequence, SetStatus};
use settings::PlaybackSettings;

/// Top-level system driving an `AnimationSequence` from the player loop.
///
/// Accepts a finished sequence or a background load; in the latter case the
/// sequence is built as soon as the load completes and, when
/// `playback_immediately` is set, started right away. Finished sets advance
/// to the next set automatically.
pub struct AnimationSystem {
    settings: PlaybackSettings,
    consumer: Box<dyn PoseConsumer>,
    sequence: Option<AnimationSequence>,
    pending: Option<PendingLoad>,
    pub auto_advance: bool,
}

impl AnimationSystem {
    pub fn new(settings: PlaybackSettings, consumer: Box<dyn PoseConsumer>) -> Self {
        Self {
            settings,
            consumer,
            sequence: None,
            pending: None,
            auto_advance: true,
        }
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Replace whatever is playing with `sequence`.
    pub fn set_sequence(&mut self, mut sequence: AnimationSequence) {
        if self.settings.playback_immediately {
            sequence.start();
        }
        self.sequence = Some(sequence);
    }

    /// Play the result of a background load once it arrives.
    pub fn set_pending(&mut self, pending: PendingLoad) {
        self.pending = Some(pending);
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn sequence(&self) -> Option<&AnimationSequence> {
        self.sequence.as_ref()
    }

    pub fn sequence_mut(&mut self) -> Option<&mut AnimationSequence> {
        self.sequence.as_mut()
    }

    /// Start the first set, for sequences not started on arrival.
    pub fn start(&mut self) {
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.start();
        }
    }

    /// True once every set has played. False while loading or before a sequence exists.
    pub fn is_complete(&self) -> bool {
        self.pending.is_none() && self.sequence.as_ref().is_some_and(|s| s.all_complete())
    }

    fn poll_pending(&mut self) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        let Some(result) = pending.try_take() else {
            return Ok(());
        };
        self.pending = None;

        let report = result?;
        if !report.is_complete() {
            tracing::warn!(
                "{} animation files failed to load",
                report.failures.len()
            );
        }
        let sequence = AnimationSequence::from_report(report, &self.settings);
        self.set_sequence(sequence);
        Ok(())
    }
}

impl RuntimeSystem for AnimationSystem {
    fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            "Animation system initialized ({} animation sets{})",
            self.sequence.as_ref().map_or(0, AnimationSequence::len),
            if self.pending.is_some() { ", loading" } else { "" }
        );
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        self.poll_pending()?;

        let Some(sequence) = self.sequence.as_mut() else {
            return Ok(());
        };
        if sequence.tick(dt, self.consumer.as_mut()) == SetStatus::SetFinished && self.auto_advance
        {
            sequence.next();
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.stop(self.consumer.as_mut());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "animation"
    }
}
