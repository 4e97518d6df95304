//! Ordered animation sets, played one set at a time

use crate::animation::{Animation, PoseConsumer};
use crate::clip::AnimationClipData;
use crate::loader::LoadReport;
use crate::settings::PlaybackSettings;
use std::sync::Arc;

/// Result of one `AnimationSequence::tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    /// Nothing is playing: not started, or the last set finished and is waiting for `next`
    Idle,
    Playing,
    /// The current set finished during this tick
    SetFinished,
    /// Every set has been played or skipped
    AllComplete,
}

/// Sets of animations where each set plays simultaneously, one character per
/// animation, and sets play in list order.
pub struct AnimationSequence {
    groups: Vec<Vec<Animation>>,
    current: usize,
    active: bool,
    all_complete: bool,
    ended: Vec<bool>,
    pending_begin: bool,
    pending_end: Vec<usize>,
}

impl AnimationSequence {
    pub fn new(groups: Vec<Vec<Arc<AnimationClipData>>>, settings: &PlaybackSettings) -> Self {
        let groups = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| {
                group
                    .into_iter()
                    .map(|clip| Animation::new(clip, settings.clone()))
                    .collect()
            })
            .collect();
        Self {
            groups,
            current: 0,
            active: false,
            all_complete: false,
            ended: Vec::new(),
            pending_begin: false,
            pending_end: Vec::new(),
        }
    }

    pub fn from_report(report: LoadReport, settings: &PlaybackSettings) -> Self {
        Self::new(report.groups, settings)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Index of the set that is playing (or last played).
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_group(&self) -> &[Animation] {
        self.groups
            .get(self.current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn current_group_mut(&mut self) -> &mut [Animation] {
        self.groups
            .get_mut(self.current)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn all_complete(&self) -> bool {
        self.all_complete
    }

    /// Play the first set.
    pub fn start(&mut self) {
        self.interrupt_current();
        self.current = 0;
        self.begin_current();
    }

    /// Cut the current set short and play the following one.
    pub fn next(&mut self) {
        if self.all_complete {
            return;
        }
        self.interrupt_current();
        self.current += 1;
        self.begin_current();
    }

    /// Cut the current set short and play the one before it (or the first one again).
    pub fn previous(&mut self) {
        self.interrupt_current();
        self.current = self.current.saturating_sub(1);
        if !self.groups.is_empty() {
            self.current = self.current.min(self.groups.len() - 1);
        }
        self.begin_current();
    }

    /// Play the current set again from its first frame.
    pub fn restart(&mut self) {
        self.interrupt_current();
        if !self.groups.is_empty() {
            self.current = self.current.min(self.groups.len() - 1);
        }
        self.begin_current();
    }

    /// Cut the current set short and tell `consumer` about every character
    /// that was still playing. The sequence stays where it is; `restart` or
    /// `next` resume from here.
    pub fn stop(&mut self, consumer: &mut dyn PoseConsumer) {
        self.interrupt_current();
        for index in self.pending_end.drain(..) {
            consumer.end_character(index);
        }
    }

    /// Advance every animation of the current set by `delta_time` seconds and
    /// hand the poses to `consumer`.
    pub fn tick(&mut self, delta_time: f64, consumer: &mut dyn PoseConsumer) -> SetStatus {
        for index in self.pending_end.drain(..) {
            consumer.end_character(index);
        }
        if self.all_complete {
            return SetStatus::AllComplete;
        }
        if !self.active {
            return SetStatus::Idle;
        }

        let group = &mut self.groups[self.current];
        if self.pending_begin {
            self.pending_begin = false;
            for (index, animation) in group.iter().enumerate() {
                consumer.begin_character(index, animation.clip());
            }
        }

        for (index, animation) in group.iter_mut().enumerate() {
            if self.ended[index] {
                continue;
            }
            if let Some(update) = animation.play_current_frame(delta_time) {
                consumer.apply_pose(index, &update);
            }
            if animation.is_finished() {
                self.ended[index] = true;
                consumer.end_character(index);
            }
        }

        if self.ended.iter().all(|ended| *ended) {
            self.active = false;
            tracing::info!(set = self.current, "Animation set finished");
            return SetStatus::SetFinished;
        }
        SetStatus::Playing
    }

    fn begin_current(&mut self) {
        if self.current >= self.groups.len() {
            self.active = false;
            if !self.all_complete {
                self.all_complete = true;
                tracing::info!("All animations complete");
            }
            return;
        }

        let total = self.groups.len();
        let group = &mut self.groups[self.current];
        for animation in group.iter_mut() {
            animation.reset();
        }
        self.ended = vec![false; group.len()];
        self.pending_begin = true;
        self.active = true;
        self.all_complete = false;
        tracing::info!(
            set = self.current,
            total,
            characters = group.len(),
            "Playing animation set"
        );
    }

    fn interrupt_current(&mut self) {
        if !self.active {
            return;
        }
        let group = &mut self.groups[self.current];
        for (index, animation) in group.iter_mut().enumerate() {
            if !self.ended[index] {
                animation.end();
                self.ended[index] = true;
                // begin_character was never sent for a set that did not tick
                if !self.pending_begin {
                    self.pending_end.push(index);
                }
            }
        }
        self.active = false;
    }
}
