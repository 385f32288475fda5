/*!
Collision shape builder.

Turns static node geometry into immovable colliders and registers them with
the physics world. One call builds exactly one body:

- [`build_concave`]: triangle mesh for terrain.
- [`build_hole`]: triangle mesh whose world bounds become a level's win region.
- [`build_convex`]: convex hull for small flat pieces.
- [`build_ball`]: the single dynamic sphere.
- [`build_floor`]: optional infinite plane under the course.

Mesh arrays are only borrowed; scale is passed to the shape, never baked into them.
*/

use crate::{
    GolfError, Result,
    config::{BallConfig, SurfaceConfig},
    level::LevelTable,
    physics::{BodyDesc, BodyHandle, CcdParams, Material, PhysicsWorld, ShapeDesc},
    types::{NodeTransform, Pose, Quat, Vec3},
};

/// Borrowed view of one node's collision geometry.
#[derive(Clone, Copy, Debug)]
pub struct SourceMesh<'a> {
    pub name: &'a str,
    pub transform: NodeTransform,
    /// Flat `xyz` vertex positions.
    pub positions: &'a [f32],
    /// Flat triangle vertex indices.
    pub indices: &'a [u32],
}

impl SourceMesh<'_> {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn validate_vertices(&self, minimum: usize) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(GolfError::invalid_mesh(
                self.name,
                format!("{} position floats is not a multiple of 3", self.positions.len()),
            ));
        }
        if self.vertex_count() < minimum {
            return Err(GolfError::invalid_mesh(
                self.name,
                format!("needs at least {minimum} vertices, got {}", self.vertex_count()),
            ));
        }
        if let Some(bad) = self.positions.iter().position(|v| !v.is_finite()) {
            return Err(GolfError::invalid_mesh(
                self.name,
                format!("non-finite position component at {bad}"),
            ));
        }
        Ok(())
    }

    fn validate_triangles(&self) -> Result<()> {
        self.validate_vertices(3)?;
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(GolfError::invalid_mesh(
                self.name,
                format!("{} indices do not form whole triangles", self.indices.len()),
            ));
        }
        let count = self.vertex_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(GolfError::invalid_mesh(
                self.name,
                format!("index {bad} out of bounds for {count} vertices"),
            ));
        }
        Ok(())
    }

    fn points(&self) -> Vec<Vec3> {
        self.positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect()
    }

    fn triangles(&self) -> Vec<[u32; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    }
}

fn surface_material(surface: &SurfaceConfig) -> Material {
    Material {
        restitution: surface.restitution,
        friction: surface.friction,
        rolling_friction: surface.rolling_friction,
    }
}

/// Build a static triangle-mesh collider for course geometry.
pub fn build_concave<W: PhysicsWorld>(
    world: &mut W,
    mesh: &SourceMesh<'_>,
    surface: &SurfaceConfig,
) -> Result<BodyHandle> {
    mesh.validate_triangles()?;
    let shape = ShapeDesc::TriMesh {
        vertices: mesh.points(),
        indices: mesh.triangles(),
        scale: mesh.transform.scale,
    };
    world
        .create_body(BodyDesc::fixed(
            shape,
            mesh.transform.pose(),
            surface_material(surface),
        ))
        .map_err(|e| rename_shape_error(e, mesh.name))
}

/// Build the concave collider of a hole and store its world bounds as `level`'s win region.
///
/// On failure nothing stays registered and the level table is untouched.
pub fn build_hole<W: PhysicsWorld>(
    world: &mut W,
    levels: &mut LevelTable,
    level: usize,
    mesh: &SourceMesh<'_>,
    surface: &SurfaceConfig,
) -> Result<BodyHandle> {
    levels.get(level)?;
    let handle = build_concave(world, mesh, surface)?;

    let stored = world
        .aabb(handle)
        .and_then(|aabb| levels.set_hole(level, aabb).map(|_| aabb));
    match stored {
        Ok(aabb) => {
            log::info!(
                "hole {level} ({}): {:?} .. {:?}",
                mesh.name,
                aabb.min.as_slice(),
                aabb.max.as_slice()
            );
            Ok(handle)
        }
        Err(err) => {
            world.remove_body(handle)?;
            Err(err)
        }
    }
}

/// Build a static convex-hull collider from vertex positions alone.
pub fn build_convex<W: PhysicsWorld>(
    world: &mut W,
    mesh: &SourceMesh<'_>,
    surface: &SurfaceConfig,
) -> Result<BodyHandle> {
    mesh.validate_vertices(4)?;
    let shape = ShapeDesc::ConvexHull {
        points: mesh.points(),
        scale: mesh.transform.scale,
    };
    world
        .create_body(BodyDesc::fixed(
            shape,
            mesh.transform.pose(),
            surface_material(surface),
        ))
        .map_err(|e| rename_shape_error(e, mesh.name))
}

/// Build the ball: the session's only dynamic body.
pub fn build_ball<W: PhysicsWorld>(
    world: &mut W,
    spawn: Vec3,
    ball: &BallConfig,
) -> Result<BodyHandle> {
    world.create_body(BodyDesc {
        shape: ShapeDesc::Sphere {
            radius: ball.radius,
        },
        mass: ball.mass,
        pose: Pose::from_translation(spawn),
        material: Material {
            restitution: ball.restitution,
            friction: ball.friction,
            rolling_friction: 0.0,
        },
        linear_damping: ball.linear_damping,
        angular_damping: ball.angular_damping,
        margin: ball.margin,
        ccd: Some(CcdParams {
            motion_threshold: ball.ccd_motion_threshold,
            swept_sphere_radius: ball.ccd_swept_radius,
        }),
    })
}

/// Build an infinite horizontal ground plane at `height`.
pub fn build_floor<W: PhysicsWorld>(
    world: &mut W,
    height: f32,
    surface: &SurfaceConfig,
) -> Result<BodyHandle> {
    world.create_body(BodyDesc::fixed(
        ShapeDesc::Plane {
            offset_along_normal: 0.0,
        },
        Pose::new(Vec3::new(0.0, height, 0.0), Quat::identity()),
        surface_material(surface),
    ))
}

/// Backends report shape failures without knowing the node; attach its name.
fn rename_shape_error(err: GolfError, node: &str) -> GolfError {
    match err {
        GolfError::DegenerateHull(_) => GolfError::DegenerateHull(node.to_string()),
        GolfError::InvalidMesh { reason, .. } => GolfError::invalid_mesh(node, reason),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{GameConfig, PhysicsConfig},
        level::default_course,
        physics::RapierWorld,
    };
    use approx::assert_relative_eq;

    /// Open-top box ("cup"): 8 corners, 5 faces (no lid), 10 triangles.
    fn cup_positions() -> Vec<f32> {
        vec![
            -0.1, -0.1, -0.1, //
            0.1, -0.1, -0.1, //
            0.1, -0.1, 0.1, //
            -0.1, -0.1, 0.1, //
            -0.1, 0.1, -0.1, //
            0.1, 0.1, -0.1, //
            0.1, 0.1, 0.1, //
            -0.1, 0.1, 0.1, //
        ]
    }

    fn cup_indices() -> Vec<u32> {
        vec![
            0, 1, 2, 0, 2, 3, // bottom
            0, 4, 5, 0, 5, 1, // -z wall
            1, 5, 6, 1, 6, 2, // +x wall
            2, 6, 7, 2, 7, 3, // +z wall
            3, 7, 4, 3, 4, 0, // -x wall
        ]
    }

    fn world() -> RapierWorld {
        RapierWorld::new(&PhysicsConfig::default())
    }

    #[test]
    fn hole_bounds_are_stored_in_world_space_and_non_degenerate() {
        let mut w = world();
        let mut levels = LevelTable::from_defs(&default_course());
        let positions = cup_positions();
        let indices = cup_indices();
        let mesh = SourceMesh {
            name: "Luknja1",
            transform: NodeTransform::new(
                Vec3::new(5.0, 1.0, -2.0),
                Quat::identity(),
                Vec3::new(2.0, 1.0, 1.0),
            ),
            positions: &positions,
            indices: &indices,
        };

        let handle = build_hole(&mut w, &mut levels, 1, &mesh, &SurfaceConfig::default()).unwrap();

        let hole = levels.get(1).unwrap().hole;
        assert!(!hole.is_degenerate());
        assert_relative_eq!(hole.min, Vec3::new(4.8, 0.9, -2.1), epsilon = 1.0e-4);
        assert_relative_eq!(hole.max, Vec3::new(5.2, 1.1, -1.9), epsilon = 1.0e-4);
        assert_eq!(w.mass(handle).unwrap(), 0.0);
        // Only level 1 was touched.
        assert_eq!(levels.missing_holes(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn flat_hole_is_rejected_and_unregistered() {
        let mut w = world();
        let mut levels = LevelTable::from_defs(&default_course());
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let indices = vec![0, 1, 2];
        let mesh = SourceMesh {
            name: "Luknja0",
            transform: NodeTransform::default(),
            positions: &positions,
            indices: &indices,
        };

        let err = build_hole(&mut w, &mut levels, 0, &mesh, &SurfaceConfig::default()).unwrap_err();
        assert!(matches!(err, GolfError::DegenerateHoleBounds { level: 0, .. }));
        assert_eq!(w.body_count(), 0);
        assert!(levels.get(0).unwrap().hole.is_unset());
    }

    #[test]
    fn hole_for_unknown_level_builds_nothing() {
        let mut w = world();
        let mut levels = LevelTable::from_defs(&default_course());
        let positions = cup_positions();
        let indices = cup_indices();
        let mesh = SourceMesh {
            name: "Luknja7",
            transform: NodeTransform::default(),
            positions: &positions,
            indices: &indices,
        };
        let err = build_hole(&mut w, &mut levels, 7, &mesh, &SurfaceConfig::default()).unwrap_err();
        assert!(matches!(err, GolfError::UnknownLevel(7)));
        assert_eq!(w.body_count(), 0);
    }

    #[test]
    fn out_of_bounds_index_is_a_precondition_violation() {
        let mut w = world();
        let positions = cup_positions();
        let indices = vec![0, 1, 8];
        let mesh = SourceMesh {
            name: "Teren",
            transform: NodeTransform::default(),
            positions: &positions,
            indices: &indices,
        };
        let err = build_concave(&mut w, &mesh, &SurfaceConfig::default()).unwrap_err();
        assert!(matches!(err, GolfError::InvalidMesh { ref node, .. } if node == "Teren"));
        assert_eq!(w.body_count(), 0);
    }

    #[test]
    fn ragged_arrays_are_rejected() {
        let mut w = world();
        let positions = vec![0.0; 10];
        let indices = vec![0, 1, 2];
        let mesh = SourceMesh {
            name: "Teren",
            transform: NodeTransform::default(),
            positions: &positions,
            indices: &indices,
        };
        assert!(build_concave(&mut w, &mesh, &SurfaceConfig::default()).is_err());

        let positions = cup_positions();
        let indices = vec![0, 1];
        let mesh = SourceMesh {
            positions: &positions,
            indices: &indices,
            ..mesh
        };
        assert!(build_concave(&mut w, &mesh, &SurfaceConfig::default()).is_err());
    }

    #[test]
    fn convex_piece_uses_shape_local_scale() {
        let mut w = world();
        let positions = cup_positions();
        let mesh = SourceMesh {
            name: "deska.001",
            transform: NodeTransform::new(Vec3::zeros(), Quat::identity(), Vec3::new(10.0, 1.0, 1.0)),
            positions: &positions,
            indices: &[],
        };
        let handle = build_convex(&mut w, &mesh, &SurfaceConfig::default()).unwrap();
        let aabb = w.aabb(handle).unwrap();
        assert_relative_eq!(aabb.max.x, 1.0, epsilon = 1.0e-4);
        assert_relative_eq!(aabb.max.y, 0.1, epsilon = 1.0e-4);
        // Source arrays are untouched.
        assert_eq!(positions, cup_positions());
    }

    #[test]
    fn degenerate_convex_piece_reports_the_node() {
        let mut w = world();
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let mesh = SourceMesh {
            name: "deska.flat",
            transform: NodeTransform::default(),
            positions: &positions,
            indices: &[],
        };
        let err = build_convex(&mut w, &mesh, &SurfaceConfig::default()).unwrap_err();
        assert!(matches!(err, GolfError::DegenerateHull(ref n) if n == "deska.flat"));
    }

    #[test]
    fn ball_is_the_single_dynamic_body() {
        let mut w = world();
        let config = GameConfig::default();
        let ball = build_ball(&mut w, Vec3::new(1.0, 2.0, 3.0), &config.ball).unwrap();
        assert_relative_eq!(w.mass(ball).unwrap(), config.ball.mass, epsilon = 1.0e-5);
        assert_eq!(w.dynamic_body_count(), 1);
        assert_eq!(w.pose(ball).unwrap().translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(build_ball(&mut w, Vec3::zeros(), &config.ball).is_err());
    }

    #[test]
    fn floor_catches_a_falling_ball() {
        let mut w = world();
        let config = GameConfig::default();
        build_floor(&mut w, -1.0, &config.terrain).unwrap();
        let mut ball_config = config.ball.clone();
        ball_config.margin = 0.0;
        let ball = build_ball(&mut w, Vec3::new(0.0, 0.0, 0.0), &ball_config).unwrap();
        for _ in 0..240 {
            w.step_simulation(w.fixed_dt(), 2);
        }
        let y = w.pose(ball).unwrap().translation.y;
        assert!(y > -1.0 && y < -0.8, "ball should rest on the floor, y = {y}");
    }
}
