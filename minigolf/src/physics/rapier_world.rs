//! Rapier-backed implementation of [`PhysicsWorld`].
//!
//! Owns the complete Rapier pipeline (bodies, colliders, broad/narrow phase,
//! CCD solver) for one game session.
//!
//! Design goals
//! - Reproducible: identical call sequences give identical results. Rapier has no
//!   hidden randomness and bodies are inserted in call order.
//! - Bullet-like stepping: `step_simulation` accumulates frame time and consumes it
//!   in fixed internal steps, capped by `max_sub_steps`.
//! - Statics are `fixed` bodies; the single dynamic body is the ball.

// Re-export Rapier so downstream crates can reach Rapier types without
// depending on `rapier3d` directly.
pub use rapier3d;

use super::{BodyDesc, BodyHandle, CcdParams, PhysicsWorld, ShapeDesc};
use crate::{
    GolfError, Result,
    config::PhysicsConfig,
    types::{Aabb, Point3, Pose, Vec3},
};
use rapier3d::parry::shape::{ConvexPolyhedron, TriMesh};
use rapier3d::prelude::*;

/// Accumulated time within this distance of a full step still triggers the step.
const STEP_EPS: f32 = 1.0e-6;

/// Per-body bookkeeping that Rapier does not store for us.
#[derive(Clone, Copy, Debug)]
struct Slot {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    is_static: bool,
    rolling_friction: f32,
    /// Sphere radius of dynamic bodies (rolling resistance needs it).
    radius: Option<f32>,
    ccd: Option<CcdParams>,
}

pub struct RapierWorld {
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    slots: Vec<Option<Slot>>,
    /// Frame time not yet consumed by a fixed step.
    accumulated: f32,
}

impl RapierWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: config.fixed_dt,
            ..IntegrationParameters::default()
        };

        Self {
            gravity: Vector::new(0.0, -config.gravity, 0.0),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            slots: Vec::new(),
            accumulated: 0.0,
        }
    }

    pub fn fixed_dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    fn slot(&self, handle: BodyHandle) -> Result<&Slot> {
        self.slots
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GolfError::BodyNotFound(handle))
    }

    fn rigid_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        let slot = self.slot(handle)?;
        self.bodies
            .get(slot.body)
            .ok_or(GolfError::BodyNotFound(handle))
    }

    fn rigid_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        let body = self.slot(handle)?.body;
        self.bodies
            .get_mut(body)
            .ok_or(GolfError::BodyNotFound(handle))
    }

    fn dynamic_handle(&self) -> Option<BodyHandle> {
        self.slots.iter().enumerate().find_map(|(i, slot)| {
            slot.filter(|s| !s.is_static)
                .map(|_| BodyHandle(i as u32))
        })
    }

    /// Toggle CCD per body for the coming step: on only when the body would
    /// travel farther than its motion threshold.
    fn update_ccd(&mut self, dt: f32) {
        for slot in self.slots.iter().flatten() {
            let Some(ccd) = slot.ccd else {
                continue;
            };
            if let Some(rb) = self.bodies.get_mut(slot.body) {
                let motion = rb.linvel().norm() * dt;
                rb.enable_ccd(motion > ccd.motion_threshold);
            }
        }
    }

    /// Rolling resistance: Rapier has none, so decelerate a dynamic sphere that touches
    /// a surface by `mu * g`, where `mu` is the larger rolling friction of the pair.
    fn apply_rolling_resistance(&mut self, dt: f32) {
        let g = self.gravity.norm();
        for slot in self.slots.iter().flatten() {
            let Some(radius) = slot.radius else {
                continue;
            };

            let mut mu = 0.0_f32;
            for pair in self.narrow_phase.contact_pairs_with(slot.collider) {
                if !pair.has_any_active_contact {
                    continue;
                }
                let other = if pair.collider1 == slot.collider {
                    pair.collider2
                } else {
                    pair.collider1
                };
                let other_mu = self
                    .colliders
                    .get(other)
                    .and_then(|c| self.slots.get(c.user_data as usize))
                    .and_then(|s| s.map(|s| s.rolling_friction))
                    .unwrap_or(0.0);
                mu = mu.max(other_mu.max(slot.rolling_friction));
            }
            if mu <= 0.0 {
                continue;
            }

            let Some(rb) = self.bodies.get_mut(slot.body) else {
                continue;
            };
            let decel = mu * g * dt;

            let v = *rb.linvel();
            let planar = Vector::new(v.x, 0.0, v.z);
            let speed = planar.norm();
            let planar = if speed <= decel {
                Vector::zeros()
            } else {
                planar * ((speed - decel) / speed)
            };
            rb.set_linvel(Vector::new(planar.x, v.y, planar.z), false);

            let w = *rb.angvel();
            let spin = w.norm();
            let spin_decel = decel / radius;
            let w = if spin <= spin_decel {
                Vector::zeros()
            } else {
                w * ((spin - spin_decel) / spin)
            };
            rb.set_angvel(w, false);
        }
    }

    fn step_once(&mut self) {
        self.update_ccd(self.integration_parameters.dt);

        // Default hooks/events (none).
        let hooks = ();
        let events = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &hooks,
            &events,
        );

        self.apply_rolling_resistance(self.integration_parameters.dt);
    }
}

/// Build the Rapier shape for a descriptor.
///
/// Scale is applied to the shape itself; the caller's vertex arrays are only read.
fn shared_shape(shape: &ShapeDesc) -> Result<SharedShape> {
    match shape {
        ShapeDesc::Sphere { radius } => Ok(SharedShape::ball(*radius)),

        ShapeDesc::ConvexHull { points, scale } => {
            let points: Vec<Point3> = points.iter().map(|p| Point3::from(*p)).collect();
            ConvexPolyhedron::from_convex_hull(&points)
                .and_then(|hull| hull.scaled(scale))
                .filter(|hull| {
                    let extents = hull.local_aabb().extents();
                    extents.iter().all(|e| *e > f32::EPSILON)
                })
                .map(SharedShape::new)
                .ok_or_else(|| GolfError::DegenerateHull("convex hull".to_string()))
        }

        ShapeDesc::TriMesh {
            vertices,
            indices,
            scale,
        } => {
            let vertices: Vec<Point3> = vertices.iter().map(|p| Point3::from(*p)).collect();
            let mesh = TriMesh::new(vertices, indices.clone())
                .map_err(|e| GolfError::invalid_mesh("trimesh", format!("{e:?}")))?;
            Ok(SharedShape::new(mesh.scaled(scale)))
        }

        // Half-space with local normal +Y; the body's rotation orients it.
        ShapeDesc::Plane { .. } => Ok(SharedShape::halfspace(Vector::y_axis())),
    }
}

impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, desc: BodyDesc) -> Result<BodyHandle> {
        if !desc.is_static() {
            if let Some(existing) = self.dynamic_handle() {
                return Err(GolfError::SecondDynamicBody(existing));
            }
        }

        let handle = BodyHandle(self.slots.len() as u32);
        let shape = shared_shape(&desc.shape)?;

        let mut collider = ColliderBuilder::new(shape)
            .restitution(desc.material.restitution)
            .friction(desc.material.friction)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .friction_combine_rule(CoefficientCombineRule::Multiply)
            .user_data(handle.0 as u128);
        if let ShapeDesc::Plane {
            offset_along_normal,
        } = desc.shape
        {
            collider = collider.translation(Vector::new(0.0, offset_along_normal, 0.0));
        }

        let rb = if desc.is_static() {
            RigidBodyBuilder::fixed().pose(desc.pose.iso()).build()
        } else {
            collider = collider.mass(desc.mass);
            RigidBodyBuilder::dynamic()
                .pose(desc.pose.iso())
                .linear_damping(desc.linear_damping)
                .angular_damping(desc.angular_damping)
                // Predictive contacts over the margin keep slow rolling over seams smooth.
                .soft_ccd_prediction(desc.margin)
                .build()
        };

        let body = self.bodies.insert(rb);
        let collider = self
            .colliders
            .insert_with_parent(collider.build(), body, &mut self.bodies);

        let radius = match (&desc.shape, desc.is_static()) {
            (ShapeDesc::Sphere { radius }, false) => Some(*radius),
            _ => None,
        };
        self.slots.push(Some(Slot {
            body,
            collider,
            is_static: desc.is_static(),
            rolling_friction: desc.material.rolling_friction,
            radius,
            ccd: desc.ccd,
        }));

        log::debug!(
            "created {} body {:?} ({} total)",
            if desc.is_static() { "static" } else { "dynamic" },
            handle,
            self.bodies.len()
        );
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Result<()> {
        let slot = self
            .slots
            .get_mut(handle.0 as usize)
            .and_then(Option::take)
            .ok_or(GolfError::BodyNotFound(handle))?;
        self.bodies.remove(
            slot.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true, // Remove attached colliders
        );
        Ok(())
    }

    fn step_simulation(&mut self, time_step: f32, max_sub_steps: u32) -> u32 {
        let dt = self.integration_parameters.dt;
        self.accumulated += time_step;

        let mut steps = 0;
        while self.accumulated + STEP_EPS >= dt && steps < max_sub_steps {
            self.step_once();
            self.accumulated -= dt;
            steps += 1;
        }

        // Drop whatever the sub-step budget could not consume.
        if self.accumulated + STEP_EPS >= dt {
            log::trace!("dropping {:.4}s of simulation time", self.accumulated);
            self.accumulated = 0.0;
        }
        self.accumulated = self.accumulated.max(0.0);

        steps
    }

    fn pose(&self, handle: BodyHandle) -> Result<Pose> {
        let rb = self.rigid_body(handle)?;
        Ok(Pose::new(*rb.translation(), *rb.rotation()))
    }

    fn set_pose(&mut self, handle: BodyHandle, pose: Pose) -> Result<()> {
        let rb = self.rigid_body_mut(handle)?;
        rb.set_translation(pose.translation, true);
        rb.set_rotation(pose.rotation, true);
        Ok(())
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3> {
        Ok(*self.rigid_body(handle)?.linvel())
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()> {
        self.rigid_body_mut(handle)?.set_linvel(velocity, true);
        Ok(())
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Result<Vec3> {
        Ok(*self.rigid_body(handle)?.angvel())
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()> {
        self.rigid_body_mut(handle)?.set_angvel(velocity, true);
        Ok(())
    }

    fn mass(&self, handle: BodyHandle) -> Result<f32> {
        // Fixed bodies still carry density-derived mass properties in Rapier;
        // report them as immovable.
        if self.slot(handle)?.is_static {
            return Ok(0.0);
        }
        Ok(self.rigid_body(handle)?.mass())
    }

    fn aabb(&self, handle: BodyHandle) -> Result<Aabb> {
        let slot = self.slot(handle)?;
        let collider = self
            .colliders
            .get(slot.collider)
            .ok_or(GolfError::BodyNotFound(handle))?;
        let aabb = collider.compute_aabb();
        Ok(Aabb::new(aabb.mins.coords, aabb.maxs.coords))
    }

    fn body_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    fn dynamic_body_count(&self) -> usize {
        self.slots.iter().flatten().filter(|s| !s.is_static).count()
    }

    fn teleport(&mut self, handle: BodyHandle, pose: Pose) -> Result<()> {
        let rb = self.rigid_body_mut(handle)?;
        rb.set_translation(pose.translation, true);
        rb.set_rotation(pose.rotation, true);
        rb.set_linvel(Vector::zeros(), true);
        rb.set_angvel(Vector::zeros(), true);
        rb.reset_forces(true);
        rb.reset_torques(true);
        Ok(())
    }
}
