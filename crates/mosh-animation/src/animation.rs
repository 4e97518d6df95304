//! One playing instance of a clip, and the consumer that receives its poses

use crate::clip::AnimationClipData;
use crate::interpolate::{interpolate, Pose};
use crate::playback::PlaybackController;
use crate::resample::ResampledFrame;
use crate::settings::PlaybackSettings;
use std::sync::Arc;

/// A pose produced by one `play_current_frame` call
#[derive(Debug, Clone, PartialEq)]
pub struct PoseUpdate {
    pub pose: Pose,
    pub frame: ResampledFrame,
    /// True for the update that entered the clip. Consumers typically snap
    /// to it instead of blending from whatever pose they held before.
    pub first_frame: bool,
}

/// Receives poses for the characters of an animation set
pub trait PoseConsumer {
    /// A character is about to play `clip`. Called once per character per set start.
    fn begin_character(&mut self, index: usize, clip: &AnimationClipData);

    fn apply_pose(&mut self, index: usize, update: &PoseUpdate);

    /// The character's animation finished or was cut short.
    fn end_character(&mut self, index: usize);
}

/// Clip data shared with other instances plus this instance's playback
pub struct Animation {
    clip: Arc<AnimationClipData>,
    settings: PlaybackSettings,
    controller: PlaybackController,
}

impl Animation {
    pub fn new(clip: Arc<AnimationClipData>, settings: PlaybackSettings) -> Self {
        let controller = PlaybackController::for_clip(&clip, &settings);
        Self {
            clip,
            settings,
            controller,
        }
    }

    pub fn name(&self) -> &str {
        self.clip.name()
    }

    pub fn clip(&self) -> &Arc<AnimationClipData> {
        &self.clip
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    /// Discard all playback state. Subscriptions on the old controller are dropped.
    pub fn reset(&mut self) {
        self.controller = PlaybackController::for_clip(&self.clip, &self.settings);
    }

    pub fn is_finished(&self) -> bool {
        self.controller.is_finished()
    }

    /// Advance by `delta_time` seconds and evaluate the resulting pose.
    ///
    /// The first call starts playback and always yields frame 0 regardless of
    /// `delta_time`. While paused, the held position is re-evaluated so that
    /// scrubbing with `jump_to_frame` stays visible. Returns `None` once
    /// playback has finished.
    pub fn play_current_frame(&mut self, delta_time: f64) -> Option<PoseUpdate> {
        if self.controller.poll_interrupt() {
            return None;
        }

        if !self.controller.state().started {
            self.controller.start();
            if self.controller.is_finished() {
                return None;
            }
            let frame = self.controller.current_frame();
            return Some(PoseUpdate {
                pose: interpolate(&self.clip, &frame),
                frame,
                first_frame: true,
            });
        }

        let frame = if self.controller.state().paused {
            self.controller.current_frame()
        } else {
            self.controller.tick(delta_time)?
        };

        Some(PoseUpdate {
            pose: interpolate(&self.clip, &frame),
            frame,
            first_frame: false,
        })
    }

    /// Stop playback early.
    pub fn end(&mut self) {
        self.controller.interrupt();
    }
}
