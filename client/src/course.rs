//! Course loading: spawns the glTF scene for rendering and, once the asset is
//! ready, converts its node tree into a [`SceneGraph`] for the gameplay core.

use crate::{config::Settings, game::Golf};
use bevy::{
    asset::LoadState,
    gltf::{Gltf, GltfMesh, GltfNode},
    platform::collections::HashSet,
    prelude::*,
};
use minigolf::{MeshData, NodeId, NodeTransform, SceneGraph, SceneNode};

#[derive(Resource)]
struct CourseAsset {
    handle: Handle<Gltf>,
    /// Set once the core has the course, or loading failed for good.
    done: bool,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (spawn_course, spawn_light));
    app.add_systems(Update, build_course.run_if(resource_exists::<Golf>));
}

fn spawn_course(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<Settings>) {
    let path = settings.client.course.clone();
    info!("loading course {path}");
    commands.insert_resource(CourseAsset {
        handle: asset_server.load(path.clone()),
        done: false,
    });
    commands.spawn((
        Name::new("Course"),
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(path))),
    ));
}

fn spawn_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 12_000.0,
            ..default()
        },
        Transform::from_xyz(-20.0, 40.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn build_course(
    mut course: ResMut<CourseAsset>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    nodes: Res<Assets<GltfNode>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    meshes: Res<Assets<Mesh>>,
    materials: Res<Assets<StandardMaterial>>,
    mut golf: ResMut<Golf>,
) {
    if course.done {
        return;
    }
    if let LoadState::Failed(err) = asset_server.load_state(&course.handle) {
        error!("course failed to load: {err}");
        course.done = true;
        return;
    }
    if !asset_server.is_loaded_with_dependencies(&course.handle) {
        return;
    }
    let Some(gltf) = gltfs.get(&course.handle) else {
        return;
    };
    course.done = true;

    let assets = GltfAssets {
        nodes: &nodes,
        gltf_meshes: &gltf_meshes,
        meshes: &meshes,
        materials: &materials,
    };
    let scene = assets.scene_graph(gltf);
    info!("course has {} nodes", scene.len());

    match golf.load_course(scene) {
        Ok(report) => {
            for skipped in &report.skipped {
                warn!("no collider for `{}`: {}", skipped.name, skipped.reason);
            }
            info!(
                "course ready: {} colliders, {} levels",
                report.colliders.len(),
                golf.levels().len()
            );
        }
        Err(err) => error!("could not build course: {err}"),
    }
}

struct GltfAssets<'a> {
    nodes: &'a Assets<GltfNode>,
    gltf_meshes: &'a Assets<GltfMesh>,
    meshes: &'a Assets<Mesh>,
    materials: &'a Assets<StandardMaterial>,
}

impl GltfAssets<'_> {
    fn scene_graph(&self, gltf: &Gltf) -> SceneGraph {
        let children: HashSet<AssetId<GltfNode>> = gltf
            .nodes
            .iter()
            .filter_map(|h| self.nodes.get(h))
            .flat_map(|node| node.children.iter().map(Handle::id))
            .collect();

        let mut scene = SceneGraph::new();
        let mut stack: Vec<(Option<NodeId>, &Handle<GltfNode>)> = gltf
            .nodes
            .iter()
            .filter(|h| !children.contains(&h.id()))
            .rev()
            .map(|h| (None, h))
            .collect();

        while let Some((parent, handle)) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            let mut scene_node = SceneNode::new(node.name.clone(), node_transform(&node.transform));
            scene_node.mesh = node.mesh.as_ref().and_then(|m| self.mesh_data(m));
            let id = scene.add(parent, scene_node);
            for child in node.children.iter().rev() {
                stack.push((Some(id), child));
            }
        }
        scene
    }

    /// Merge every primitive of a glTF mesh into one triangle soup.
    fn mesh_data(&self, handle: &Handle<GltfMesh>) -> Option<MeshData> {
        let gltf_mesh = self.gltf_meshes.get(handle)?;
        let mut data = MeshData::default();
        for primitive in &gltf_mesh.primitives {
            let Some(mesh) = self.meshes.get(&primitive.mesh) else {
                continue;
            };
            let Some(positions) = mesh
                .attribute(Mesh::ATTRIBUTE_POSITION)
                .and_then(|values| values.as_float3())
            else {
                continue;
            };
            let indices: Vec<u32> = match mesh.indices() {
                Some(indices) => indices.iter().map(|i| i as u32).collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let (double_sided, blend) = primitive
                .material
                .as_ref()
                .and_then(|m| self.materials.get(m))
                .map(|m| (m.double_sided, matches!(m.alpha_mode, AlphaMode::Blend)))
                .unwrap_or_default();

            data.append(&MeshData {
                positions: positions.iter().flatten().copied().collect(),
                indices,
                double_sided,
                blend,
            });
        }
        (data.vertex_count() > 0).then_some(data)
    }
}

fn node_transform(tf: &Transform) -> NodeTransform {
    NodeTransform::new(
        minigolf::Vec3::new(tf.translation.x, tf.translation.y, tf.translation.z),
        minigolf::Quat::from_quaternion(minigolf::types::na::Quaternion::new(
            tf.rotation.w,
            tf.rotation.x,
            tf.rotation.y,
            tf.rotation.z,
        )),
        minigolf::Vec3::new(tf.scale.x, tf.scale.y, tf.scale.z),
    )
}
