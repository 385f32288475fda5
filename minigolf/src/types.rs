/*!
Core math aliases and small value types shared by every gameplay module.

This module intentionally contains no algorithms beyond the box/point
tests the shot machine needs. It defines the data exchanged between:
- the collision builder (source meshes, node transforms)
- the physics world (poses, bounding boxes)
- the scene synchronizer and the render hand-off

Conventions
- Units are meters, seconds and kilograms.
- +Y is up; gravity acts along -Y.
- Rotations are unit quaternions.
*/

pub use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;
pub type Mat4 = na::Matrix4<f32>;

/// A rigid pose (isometry) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for use with Rapier.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    #[inline]
    pub fn from_iso(iso: &Iso) -> Self {
        Self::new(iso.translation.vector, iso.rotation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_translation(Vec3::zeros())
    }
}

/// Local transform of a scene node: rotation, translation and non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY_SCALE: [f32; 3] = [1.0, 1.0, 1.0];

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity(), Vec3::from(Self::IDENTITY_SCALE))
    }

    /// Rigid part of the transform (scale dropped).
    #[inline]
    pub fn pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation)
    }

    /// Compose `self` (parent) with `child`.
    ///
    /// Exact for axis-aligned scales; with rotated non-uniform scales the
    /// resulting shear cannot be represented and is dropped.
    pub fn compose(&self, child: &NodeTransform) -> NodeTransform {
        let scaled = self.scale.component_mul(&child.translation);
        NodeTransform {
            translation: self.translation + self.rotation * scaled,
            rotation: self.rotation * child.rotation,
            scale: self.scale.component_mul(&child.scale),
        }
    }

    /// Column-major TRS matrix, as used for draw calls.
    pub fn matrix(&self) -> Mat4 {
        let t = Mat4::new_translation(&self.translation);
        let r = self.rotation.to_homogeneous();
        let s = Mat4::new_nonuniform_scaling(&self.scale);
        t * r * s
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::from_translation(Vec3::zeros())
    }
}

/// Axis-aligned bounding box in world space.
///
/// `Aabb::UNSET` (all zeros) marks a hole box whose collider has not been built yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const UNSET: Aabb = Aabb {
        min: Vec3::new(0.0, 0.0, 0.0),
        max: Vec3::new(0.0, 0.0, 0.0),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }

    /// True unless `min < max` strictly holds on every axis.
    pub fn is_degenerate(&self) -> bool {
        (0..3).any(|i| !(self.min[i] < self.max[i]))
    }

    /// Inclusive containment test with the vertical (Y) upper bound lowered by `top_margin`.
    ///
    /// The margin requires a ball to have visibly dropped into a cup rather than
    /// merely rolling over its rim.
    pub fn contains_below_top(&self, p: &Vec3, top_margin: f32) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y - top_margin
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::UNSET
    }
}
