/*!
Physics world abstraction.

Gameplay code talks to the simulation only through [`PhysicsWorld`] and the
opaque [`BodyHandle`]s it hands out. The Rapier backend lives in
[`rapier_world`]; tests and alternative backends implement the same trait.

Body model
- `mass == 0.0` means static: the body is fixed and never moves.
- Any positive mass makes the body dynamic. A world holds at most one
  dynamic body, the ball.
*/

pub mod rapier_world;

pub use rapier_world::RapierWorld;

use crate::{
    Result,
    types::{Aabb, Pose, Vec3},
};

/// Opaque, typed handle of a body registered with a [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Supported collider shapes.
#[derive(Clone, Debug)]
pub enum ShapeDesc {
    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Convex hull of a point cloud, scaled in shape-local space.
    ConvexHull { points: Vec<Vec3>, scale: Vec3 },

    /// Arbitrary (concave) triangle soup, scaled in shape-local space.
    TriMesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
        scale: Vec3,
    },

    /// Infinite plane (half-space).
    ///
    /// The plane normal is derived from the pose as `rotation * +Y`, and the
    /// plane passes through `translation + normal * offset_along_normal`.
    Plane { offset_along_normal: f32 },
}

/// Contact response coefficients. Combined multiplicatively between two colliders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    pub rolling_friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.5,
            rolling_friction: 0.0,
        }
    }
}

/// Continuous collision detection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CcdParams {
    /// CCD runs only for steps in which the body travels farther than this.
    pub motion_threshold: f32,
    pub swept_sphere_radius: f32,
}

/// Everything needed to create one body with exactly one collider.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub shape: ShapeDesc,
    /// `0.0` = static.
    pub mass: f32,
    pub pose: Pose,
    pub material: Material,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Extra contact distance around the shape.
    pub margin: f32,
    pub ccd: Option<CcdParams>,
}

impl BodyDesc {
    /// A static body with no damping, CCD or margin.
    pub fn fixed(shape: ShapeDesc, pose: Pose, material: Material) -> Self {
        Self {
            shape,
            mass: 0.0,
            pose,
            material,
            linear_damping: 0.0,
            angular_damping: 0.0,
            margin: 0.0,
            ccd: None,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }
}

/// Capability set the gameplay core needs from a rigid-body simulation.
pub trait PhysicsWorld {
    /// Register a body. Fails for invalid shapes or a second dynamic body.
    fn create_body(&mut self, desc: BodyDesc) -> Result<BodyHandle>;

    fn remove_body(&mut self, handle: BodyHandle) -> Result<()>;

    /// Advance by `time_step` using fixed internal steps, at most `max_sub_steps` of them.
    ///
    /// Returns the number of internal steps taken.
    fn step_simulation(&mut self, time_step: f32, max_sub_steps: u32) -> u32;

    fn pose(&self, handle: BodyHandle) -> Result<Pose>;

    fn set_pose(&mut self, handle: BodyHandle, pose: Pose) -> Result<()>;

    fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3>;

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()>;

    fn angular_velocity(&self, handle: BodyHandle) -> Result<Vec3>;

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()>;

    /// `0.0` for static bodies.
    fn mass(&self, handle: BodyHandle) -> Result<f32>;

    /// World-space bounding box of the body's collider.
    fn aabb(&self, handle: BodyHandle) -> Result<Aabb>;

    fn body_count(&self) -> usize;

    fn dynamic_body_count(&self) -> usize;

    /// Move a body to `pose` and clear both velocities.
    fn teleport(&mut self, handle: BodyHandle, pose: Pose) -> Result<()> {
        self.set_pose(handle, pose)?;
        self.set_linear_velocity(handle, Vec3::zeros())?;
        self.set_angular_velocity(handle, Vec3::zeros())
    }
}
