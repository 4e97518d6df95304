//! Pose evaluation at a resampled frame with quaternion slerp for joint rotations

use crate::clip::AnimationClipData;
use crate::resample::ResampledFrame;
use mosh_core::{Quat, Vec3};
use serde::Serialize;

/// One instant of a clip: root translation plus every joint rotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotations: Vec<Quat>,
}

/// Evaluate the pose of `clip` at `frame`.
///
/// - First frame: sample 0, no blending, so playback always enters cleanly.
/// - Last frame: hold `frame_before` rather than extrapolating.
/// - Otherwise: lerp the translation and slerp each joint by `fraction`.
pub fn interpolate(clip: &AnimationClipData, frame: &ResampledFrame) -> Pose {
    if frame.is_first_frame {
        return sample_pose(clip, 0);
    }
    if frame.is_last_frame {
        return sample_pose(clip, frame.frame_before);
    }

    let t = frame.fraction as f32;
    let before = frame.frame_before;
    let after = frame.frame_after;

    let translation = lerp_vec3(clip.translation(before), clip.translation(after), t);
    let rotations = clip
        .rotations_at(before)
        .iter()
        .zip(clip.rotations_at(after))
        .map(|(a, b)| quat_slerp(*a, *b, t))
        .collect();

    Pose {
        translation,
        rotations,
    }
}

/// The pose stored at a single discrete frame.
pub fn sample_pose(clip: &AnimationClipData, frame: usize) -> Pose {
    Pose {
        translation: clip.translation(frame),
        rotations: clip.rotations_at(frame).to_vec(),
    }
}

/// Linear interpolation that returns the endpoints exactly at `t = 0` and `t = 1`.
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a.lerp(&b, t)
    }
}

/// Quaternion spherical linear interpolation with shortest-path correction.
///
/// Returns `a` exactly at `t <= 0` and `b` exactly at `t >= 1`. In between the
/// result is normalized.
pub fn quat_slerp(a: Quat, b: Quat, t: f32) -> Quat {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }

    let mut b_adj = b;
    let mut dot = a.dot(&b);

    // Shortest path: q and -q are the same rotation
    if dot < 0.0 {
        b_adj = -b;
        dot = -dot;
    }

    // Nearly parallel: sin(theta) is too small to divide by
    let (scale_a, scale_b) = if dot > 0.9995 {
        (1.0 - t, t)
    } else {
        let theta = dot.acos();
        let sin_theta = theta.sin();
        (
            ((1.0 - t) * theta).sin() / sin_theta,
            (t * theta).sin() / sin_theta,
        )
    };

    (a * scale_a + b_adj * scale_b).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::tests::ramp_clip;
    use crate::resample::resample;

    fn y_rotation(degrees: f32) -> Quat {
        let half = degrees.to_radians() * 0.5;
        Quat::new(0.0, half.sin(), 0.0, half.cos())
    }

    fn assert_quat_close(a: Quat, b: Quat) {
        assert!(
            (a.dot(&b).abs() - 1.0).abs() < 1e-5,
            "expected {:?} to represent the same rotation as {:?}",
            a,
            b
        );
    }

    #[test]
    fn slerp_endpoints_are_exact() {
        let a = y_rotation(10.0);
        let b = y_rotation(100.0);
        assert_eq!(quat_slerp(a, b, 0.0), a);
        assert_eq!(quat_slerp(a, b, 1.0), b);
    }

    #[test]
    fn slerp_midpoint_is_normalized() {
        let a = Quat::IDENTITY;
        let b = Quat::new(0.0, 1.0, 0.0, 0.0); // 180 degrees about Y
        let mid = quat_slerp(a, b, 0.5);
        assert!(
            (mid.length() - 1.0).abs() < 1e-5,
            "slerp midpoint should be normalized, got length {}",
            mid.length()
        );
    }

    #[test]
    fn slerp_constant_angular_velocity() {
        let a = y_rotation(0.0);
        let b = y_rotation(90.0);
        assert_quat_close(quat_slerp(a, b, 0.25), y_rotation(22.5));
        assert_quat_close(quat_slerp(a, b, 0.5), y_rotation(45.0));
    }

    #[test]
    fn slerp_shortest_path() {
        // -b is the same rotation as b; interpolating towards it must not
        // swing the long way round.
        let a = y_rotation(10.0);
        let b = -y_rotation(30.0);
        assert_quat_close(quat_slerp(a, b, 0.5), y_rotation(20.0));
    }

    #[test]
    fn slerp_nearly_parallel_falls_back_to_lerp() {
        let a = y_rotation(1.0);
        let b = y_rotation(1.5);
        let mid = quat_slerp(a, b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-6);
        assert_quat_close(mid, y_rotation(1.25));
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = Vec3::new(0.1, 0.2, 0.3);
        let b = Vec3::new(0.7, -0.9, 1.1);
        assert_eq!(lerp_vec3(a, b, 0.0), a);
        assert_eq!(lerp_vec3(a, b, 1.0), b);
    }

    #[test]
    fn midpoint_translation_between_frames() {
        let clip = ramp_clip(10, 10, 3);
        let pose = interpolate(&clip, &resample(0.35, 10, clip.duration()));
        let expected = clip.translation(3).lerp(&clip.translation(4), 0.5);
        assert!((pose.translation - expected).length() < 1e-5);
        assert!((pose.translation.x - 3.5).abs() < 1e-5);
        assert_eq!(pose.rotations.len(), 3);
        assert_quat_close(pose.rotations[0], y_rotation(35.0));
    }

    #[test]
    fn first_frame_uses_sample_zero() {
        let clip = ramp_clip(10, 10, 2);
        let pose = interpolate(&clip, &ResampledFrame::first_frame_guaranteed(10));
        assert_eq!(pose, sample_pose(&clip, 0));
    }

    #[test]
    fn last_frame_holds_frame_before() {
        let clip = ramp_clip(10, 10, 2);
        let frame = resample(0.87, 10, clip.duration());
        assert!(frame.is_last_frame);
        assert_eq!(interpolate(&clip, &frame), sample_pose(&clip, 8));
    }

    #[test]
    fn fraction_zero_and_one_match_samples() {
        let clip = ramp_clip(10, 10, 4);
        let mut frame = resample(0.35, 10, clip.duration());

        frame.fraction = 0.0;
        assert_eq!(interpolate(&clip, &frame), sample_pose(&clip, 3));

        frame.fraction = 1.0;
        assert_eq!(interpolate(&clip, &frame), sample_pose(&clip, 4));
    }

    #[test]
    fn interpolation_is_idempotent() {
        let clip = ramp_clip(25, 30, 5);
        for step in 0..50 {
            let t = clip.duration() * step as f64 / 50.0;
            let frame = resample(t, clip.frame_count(), clip.duration());
            let a = interpolate(&clip, &frame);
            let b = interpolate(&clip, &resample(t, clip.frame_count(), clip.duration()));
            assert_eq!(a.translation.to_array().map(f32::to_bits), b.translation.to_array().map(f32::to_bits));
            for (qa, qb) in a.rotations.iter().zip(&b.rotations) {
                assert_eq!(qa.to_array().map(f32::to_bits), qb.to_array().map(f32::to_bits));
            }
        }
    }
}
