//! Handedness conversion between the authoring convention and render space
//!
//! Source files come from a right-handed, Z-up tool. The render convention is
//! left-handed and Y-up. Conversion happens once while a clip is loaded, so
//! nothing downstream of the loader deals with source space.

use mosh_core::{Quat, Vec3};

/// Conversion between source (authoring) space and render space.
pub trait SpaceConversion: Sized {
    /// Convert a source-space value into render space.
    fn to_render_space(&self) -> Self;

    /// Convert a render-space value back into source space.
    fn to_source_space(&self) -> Self;
}

impl SpaceConversion for Vec3 {
    /// X is mirrored, source Z becomes up, and source Y becomes backward.
    fn to_render_space(&self) -> Self {
        Vec3::new(-self.x, self.z, -self.y)
    }

    fn to_source_space(&self) -> Self {
        Vec3::new(-self.x, -self.z, self.y)
    }
}

impl SpaceConversion for Quat {
    /// Mirror across the x axis: `(x, y, z, w) -> (-x, y, z, -w)`.
    ///
    /// This is the same rotation as `(x, -y, -z, w)`. Joint rotations are local
    /// to the rig, whose up-axis change is carried by the rig itself, so only
    /// the mirror is applied here. The map is its own inverse.
    fn to_render_space(&self) -> Self {
        Quat::new(-self.x, self.y, self.z, -self.w)
    }

    fn to_source_space(&self) -> Self {
        Quat::new(-self.x, self.y, self.z, -self.w)
    }
}
