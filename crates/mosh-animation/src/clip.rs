//! Parsed animation clip data

use crate::coords::SpaceConversion;
use mosh_core::{MoshError, Quat, Result, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body gender recorded in a clip; selects the character variant to pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// Clip contents as read from a file, still in source space.
#[derive(Debug, Clone)]
pub struct RawClip {
    /// Animation name, usually the file name
    pub name: String,
    /// Name of the matched body model
    pub model_name: String,
    /// Joints per frame expected by the model
    pub joint_count: usize,
    /// Beta count expected by the model
    pub beta_count: usize,
    pub gender: Gender,
    /// Frames per second as stored; 0 means "not recorded"
    pub fps: u32,
    pub betas: Vec<f32>,
    /// One root translation per frame
    pub translations: Vec<[f32; 3]>,
    /// Per frame, one xyzw rotation per joint
    pub poses: Vec<Vec<[f32; 4]>>,
}

/// An immutable, validated animation clip in render space.
///
/// Rotations are stored frame-major: the rotations for frame `f` occupy
/// `rotations[f * joint_count..(f + 1) * joint_count]`.
#[derive(Debug, Clone)]
pub struct AnimationClipData {
    name: String,
    model_name: String,
    gender: Gender,
    frame_rate: u32,
    frame_count: usize,
    joint_count: usize,
    body_shape: Vec<f32>,
    translations: Vec<Vec3>,
    rotations: Vec<Quat>,
}

impl AnimationClipData {
    /// Build a clip from render-space samples, checking the length invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        model_name: impl Into<String>,
        gender: Gender,
        frame_rate: u32,
        joint_count: usize,
        body_shape: Vec<f32>,
        translations: Vec<Vec3>,
        rotations: Vec<Quat>,
    ) -> Result<Self> {
        let name = name.into();

        if frame_rate == 0 {
            return Err(MoshError::ValidationError(format!(
                "Clip '{}' has a frame rate of zero",
                name
            )));
        }
        if joint_count == 0 {
            return Err(MoshError::ValidationError(format!(
                "Clip '{}' has no joints",
                name
            )));
        }

        let frame_count = translations.len();
        if frame_count == 0 {
            return Err(MoshError::ValidationError(format!(
                "Clip '{}' has no frames",
                name
            )));
        }
        if rotations.len() != frame_count * joint_count {
            return Err(MoshError::ValidationError(format!(
                "Clip '{}' has {} rotations, expected {} ({} frames x {} joints)",
                name,
                rotations.len(),
                frame_count * joint_count,
                frame_count,
                joint_count
            )));
        }

        Ok(Self {
            name,
            model_name: model_name.into(),
            gender,
            frame_rate,
            frame_count,
            joint_count,
            body_shape,
            translations,
            rotations,
        })
    }

    /// Validate a raw clip, substitute the fallback frame rate when the file
    /// recorded none, and convert every sample into render space.
    pub fn from_raw(raw: RawClip, fallback_fps: Option<u32>) -> Result<Self> {
        let frame_rate = match (raw.fps, fallback_fps) {
            (0, Some(fallback)) if fallback > 0 => {
                tracing::warn!(
                    clip = %raw.name,
                    "No fps specified, defaulting to {} fps",
                    fallback
                );
                fallback
            }
            (0, _) => {
                return Err(MoshError::ValidationError(format!(
                    "Clip '{}' has no frame rate and no fallback is configured",
                    raw.name
                )));
            }
            (fps, _) => fps,
        };

        if raw.betas.len() != raw.beta_count {
            return Err(MoshError::ValidationError(format!(
                "Clip '{}' has {} betas, model '{}' expects {}",
                raw.name,
                raw.betas.len(),
                raw.model_name,
                raw.beta_count
            )));
        }

        if raw.poses.len() != raw.translations.len() {
            return Err(MoshError::ValidationError(format!(
                "Clip '{}' has {} translation frames but {} pose frames",
                raw.name,
                raw.translations.len(),
                raw.poses.len()
            )));
        }

        let mut rotations = Vec::with_capacity(raw.poses.len() * raw.joint_count);
        for (frame, joints) in raw.poses.iter().enumerate() {
            if joints.len() != raw.joint_count {
                return Err(MoshError::ValidationError(format!(
                    "Clip '{}' frame {} has {} joint rotations, model '{}' expects {}",
                    raw.name,
                    frame,
                    joints.len(),
                    raw.model_name,
                    raw.joint_count
                )));
            }
            rotations.extend(
                joints
                    .iter()
                    .map(|q| Quat::from_array(*q).to_render_space()),
            );
        }

        let translations = raw
            .translations
            .iter()
            .map(|t| Vec3::from_array(*t).to_render_space())
            .collect();

        Self::new(
            raw.name,
            raw.model_name,
            raw.gender,
            frame_rate,
            raw.joint_count,
            raw.betas,
            translations,
            rotations,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    /// Clip length in seconds (`frame_count / frame_rate`).
    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / self.frame_rate as f64
    }

    /// Body-shape betas, constant for the whole clip.
    pub fn body_shape(&self) -> &[f32] {
        &self.body_shape
    }

    pub fn translations(&self) -> &[Vec3] {
        &self.translations
    }

    /// Root translation at `frame`.
    ///
    /// # Panics
    /// If `frame >= frame_count`.
    pub fn translation(&self, frame: usize) -> Vec3 {
        self.translations[frame]
    }

    /// All joint rotations at `frame`.
    ///
    /// # Panics
    /// If `frame >= frame_count`.
    pub fn rotations_at(&self, frame: usize) -> &[Quat] {
        let start = frame * self.joint_count;
        &self.rotations[start..start + self.joint_count]
    }

    pub fn rotation(&self, frame: usize, joint: usize) -> Quat {
        self.rotations_at(frame)[joint]
    }
}
