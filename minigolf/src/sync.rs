//! Scene synchronizer.
//!
//! At load time it walks the scene graph and builds one collider per mesh
//! node. Each frame it copies the ball's simulated pose into the ball node.

use crate::{
    GolfError, Result,
    collision::{self, SourceMesh},
    config::GameConfig,
    level::LevelTable,
    physics::{BodyHandle, PhysicsWorld},
    scene::{NodeId, NodeTag, SceneGraph},
};

/// A mesh node that got no collider.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedNode {
    pub node: NodeId,
    pub name: String,
    pub reason: String,
}

/// Result of building colliders for a whole scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    pub colliders: Vec<(NodeId, BodyHandle)>,
    pub skipped: Vec<SkippedNode>,
    pub ball_node: Option<NodeId>,
    /// Levels whose hole geometry was not found in the scene.
    pub missing_holes: Vec<usize>,
}

/// Build static colliders for every mesh-bearing node except the ball.
///
/// A node that fails its builder preconditions is logged and skipped; the
/// rest of the scene still loads.
pub fn load_colliders<W: PhysicsWorld>(
    scene: &SceneGraph,
    world: &mut W,
    levels: &mut LevelTable,
    config: &GameConfig,
) -> LoadReport {
    let mut report = LoadReport::default();

    for (id, transform) in scene.walk() {
        let Some(node) = scene.node(id) else {
            continue;
        };
        let tag = node
            .tag
            .unwrap_or_else(|| NodeTag::from_name(&node.name, &config.tags));
        if tag == NodeTag::Ball {
            report.ball_node.get_or_insert(id);
            continue;
        }
        let Some(mesh) = &node.mesh else {
            continue;
        };

        let source = SourceMesh {
            name: &node.name,
            transform,
            positions: &mesh.positions,
            indices: &mesh.indices,
        };
        let built = match tag {
            NodeTag::Terrain => collision::build_concave(world, &source, &config.terrain),
            NodeTag::Hole(level) => {
                collision::build_hole(world, levels, level, &source, &config.terrain)
            }
            NodeTag::SmallPiece => collision::build_convex(world, &source, &config.small_piece),
            NodeTag::Ball => continue,
        };

        match built {
            Ok(handle) => report.colliders.push((id, handle)),
            Err(err) => {
                log::error!("skipping collider for `{}`: {err}", node.name);
                report.skipped.push(SkippedNode {
                    node: id,
                    name: node.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    report.missing_holes = levels.missing_holes();
    if !report.missing_holes.is_empty() {
        log::warn!("no hole geometry for levels {:?}", report.missing_holes);
    }
    log::info!(
        "built {} colliders, skipped {}",
        report.colliders.len(),
        report.skipped.len()
    );
    report
}

/// Copy the ball body's pose into the ball node, keeping the node's scale.
pub fn sync_ball<W: PhysicsWorld>(
    world: &W,
    ball: BodyHandle,
    scene: &mut SceneGraph,
    ball_node: NodeId,
) -> Result<()> {
    let pose = world.pose(ball)?;
    let node = scene
        .node_mut(ball_node)
        .ok_or(GolfError::NodeNotFound(ball_node.0))?;
    node.transform.translation = pose.translation;
    node.transform.rotation = pose.rotation;
    Ok(())
}
