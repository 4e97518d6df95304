//! Continuous playback time to fractional source-frame position

/// Tolerance for treating the decimal frame index as exactly zero
pub const FIRST_FRAME_EPSILON: f64 = 1e-4;

/// The two discrete frames bounding a continuous playback position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampledFrame {
    /// Decimal frame index, unclamped (may fall outside the clip for one tick)
    pub frame: f64,
    /// Frame at or before the position, clamped to `[0, frame_count - 1]`
    pub frame_before: usize,
    /// Frame at or after the position, clamped to `[0, frame_count - 1]`
    pub frame_after: usize,
    /// Weight toward `frame_after`, in `[0, 1]`
    pub fraction: f64,
    pub is_first_frame: bool,
    pub is_last_frame: bool,
}

impl ResampledFrame {
    /// A frame that always poses sample 0, used on the first tick of playback
    /// so the entry pose never depends on how long that tick took.
    pub fn first_frame_guaranteed(frame_count: usize) -> Self {
        Self {
            frame: 0.0,
            frame_before: 0,
            frame_after: frame_count.saturating_sub(1).min(1),
            fraction: 0.0,
            is_first_frame: true,
            is_last_frame: false,
        }
    }
}

/// Map elapsed playback time onto the source frames of a clip.
///
/// `frame_count` must be at least 1 and `duration` positive; both are
/// guaranteed by clip validation. Out-of-range times are clamped, never
/// rejected: a position past the end reports `is_last_frame` and the caller
/// decides what that means.
pub fn resample(elapsed_time: f64, frame_count: usize, duration: f64) -> ResampledFrame {
    let last = frame_count.saturating_sub(1);
    let proportion_complete = elapsed_time / duration;
    let decimal_frame_index = proportion_complete * frame_count as f64;

    let frame_before = clamp_index(decimal_frame_index.floor(), last);
    let frame_after = clamp_index(decimal_frame_index.ceil(), last);
    let fraction = (decimal_frame_index - frame_before as f64).clamp(0.0, 1.0);

    ResampledFrame {
        frame: decimal_frame_index,
        frame_before,
        frame_after,
        fraction,
        is_first_frame: decimal_frame_index.abs() < FIRST_FRAME_EPSILON,
        is_last_frame: frame_after >= last,
    }
}

fn clamp_index(index: f64, last: usize) -> usize {
    if index.is_nan() || index <= 0.0 {
        0
    } else if index >= last as f64 {
        last
    } else {
        index as usize
    }
}
