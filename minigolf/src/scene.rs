/*!
Parsed course scene graph, as handed over by the asset loader.

The loader fills in names, local transforms, mesh arrays and (optionally)
authored tags. [`SceneGraph::resolve_tags`] then settles every node's
[`NodeTag`] once, so nothing downstream inspects names again.
*/

use crate::{config::TagConfig, types::{Mat4, NodeTransform}};

/// Role of a node in the course.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    /// Concave course geometry.
    Terrain,
    /// Small flat piece built as a convex hull.
    SmallPiece,
    /// Cup geometry of the given level; its bounds are the win region.
    Hole(usize),
    /// Visual ball model. Gets no collider from the scene.
    Ball,
}

impl NodeTag {
    /// Classify a node by name with the configured naming rules.
    pub fn from_name(name: &str, rules: &TagConfig) -> NodeTag {
        if name.contains(rules.small_piece_pattern.as_str()) {
            return NodeTag::SmallPiece;
        }
        if name == rules.ball_name {
            return NodeTag::Ball;
        }
        if let Some(suffix) = name.strip_prefix(rules.hole_prefix.as_str()) {
            match suffix.parse::<usize>() {
                Ok(level) => return NodeTag::Hole(level),
                Err(_) => log::warn!("node `{name}` has the hole prefix but no level index"),
            }
        }
        NodeTag::Terrain
    }
}

/// Triangle mesh data of one node: flat `xyz` positions and flat triangle indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
    /// Render-facing material flags.
    pub double_sided: bool,
    pub blend: bool,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Append another primitive, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.double_sided |= other.double_sided;
        self.blend |= other.blend;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub transform: NodeTransform,
    pub mesh: Option<MeshData>,
    /// Authored tag, or the tag resolved from the name at load time.
    pub tag: Option<NodeTag>,
    pub children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: NodeTransform) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: None,
            tag: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_tag(mut self, tag: NodeTag) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent` (or as a root) and return its id.
    ///
    /// An unknown parent id makes the node a root.
    pub fn add(&mut self, parent: Option<NodeId>, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Give every untagged node a tag from its name. Authored tags are kept.
    pub fn resolve_tags(&mut self, rules: &TagConfig) {
        for node in &mut self.nodes {
            if node.tag.is_none() {
                node.tag = Some(NodeTag::from_name(&node.name, rules));
            }
        }
    }

    /// Depth-first traversal yielding each node with its world transform.
    pub fn walk(&self) -> Vec<(NodeId, NodeTransform)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, NodeTransform)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, NodeTransform::default()))
            .collect();

        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            let world = parent.compose(&node.transform);
            out.push((id, world));
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }

    /// World matrix of every node, for draw calls.
    pub fn world_matrices(&self) -> Vec<(NodeId, Mat4)> {
        self.walk()
            .into_iter()
            .map(|(id, tf)| (id, tf.matrix()))
            .collect()
    }
}
