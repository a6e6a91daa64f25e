// node.rs - Scene graph nodes, node cores and the arena that owns them

use id_arena::{Arena, Id};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to a node living in a [`SceneGraph`]
pub type NodeId = Id<Node>;

/// Deepest node nesting the scene readers accept
pub const MAX_NESTING: usize = 256;

/// Column-major 4x4 identity
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Simple Phong-style material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
    pub transparency: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            shininess: 1.0,
            transparency: 0.0,
        }
    }
}

/// Indexed triangle geometry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material: Option<Material>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check index bounds and normal count
    pub fn validate(&self) -> Result<(), String> {
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(format!(
                "Geometry has {} normals for {} positions",
                self.normals.len(),
                self.positions.len()
            ));
        }
        if let Some(&bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(format!(
                "Geometry index {} out of range ({} positions)",
                bad,
                self.positions.len()
            ));
        }
        Ok(())
    }
}

/// Structural role attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeCore {
    Group,
    Transform { matrix: [f32; 16] },
    DistanceLod { center: [f32; 3], ranges: Vec<f32> },
    MaterialGroup { material: Material },
    Geometry(Geometry),
}

impl NodeCore {
    /// Name used by the text format and by the inspector
    pub fn kind(&self) -> &'static str {
        match self {
            NodeCore::Group => "Group",
            NodeCore::Transform { .. } => "Transform",
            NodeCore::DistanceLod { .. } => "DistanceLOD",
            NodeCore::MaterialGroup { .. } => "MaterialGroup",
            NodeCore::Geometry(_) => "Geometry",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, NodeCore::Group)
    }
}

/// A node stored in the arena. Parent/child links are managed by [`SceneGraph`].
#[derive(Debug, Default)]
pub struct Node {
    pub name: Option<String>,
    pub core: Option<NodeCore>,
    pub meta: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Owned, self-contained form of a subtree. This is what the file formats
/// encode and decode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneTree {
    pub name: Option<String>,
    pub core: Option<NodeCore>,
    pub meta: BTreeMap<String, String>,
    pub children: Vec<SceneTree>,
}

impl SceneTree {
    pub fn group() -> Self {
        Self {
            core: Some(NodeCore::Group),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_core(mut self, core: NodeCore) -> Self {
        self.core = Some(core);
        self
    }

    pub fn with_child(mut self, child: SceneTree) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneTree::node_count).sum::<usize>()
    }

    /// Number of levels, a lone node has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(SceneTree::depth).max().unwrap_or(0)
    }
}

/// Arena owning every node of one or more scenes
pub struct SceneGraph {
    nodes: Arena<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
        }
    }

    /// Create a detached node without a core
    pub fn create_node(&mut self) -> NodeId {
        self.nodes.alloc(Node::default())
    }

    /// Create a detached node carrying a `Group` core
    pub fn create_group(&mut self) -> NodeId {
        let id = self.create_node();
        self.nodes[id].core = Some(NodeCore::Group);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn set_core(&mut self, id: NodeId, core: NodeCore) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.core = Some(core);
        }
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = Some(name.to_string());
        }
    }

    /// Attach `child` as the last child of `parent`, detaching it from its
    /// previous parent first. Refuses links that would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), String> {
        if self.nodes.get(parent).is_none() || self.nodes.get(child).is_none() {
            return Err("Node does not belong to this scene graph".to_string());
        }

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err("Adding this child would create a cycle".to_string());
            }
            cursor = self.nodes[id].parent;
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.nodes[old_parent].children.retain(|&c| c != child);
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Total number of nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes reachable from `root`, root included
    pub fn subtree_size(&self, root: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children(id));
        }
        count
    }

    /// Number of levels below and including `root`
    pub fn depth(&self, root: NodeId) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, level)) = stack.pop() {
            max_depth = max_depth.max(level);
            for &child in self.children(id) {
                stack.push((child, level + 1));
            }
        }
        max_depth
    }

    /// Copy the subtree under `root` into an owned [`SceneTree`]
    pub fn to_tree(&self, root: NodeId) -> SceneTree {
        let node = &self.nodes[root];
        SceneTree {
            name: node.name.clone(),
            core: node.core.clone(),
            meta: node.meta.clone(),
            children: node.children.iter().map(|&c| self.to_tree(c)).collect(),
        }
    }

    /// Move an owned [`SceneTree`] into the arena, returning its detached root
    pub fn insert_tree(&mut self, tree: SceneTree) -> NodeId {
        let id = self.nodes.alloc(Node {
            name: tree.name,
            core: tree.core,
            meta: tree.meta,
            parent: None,
            children: Vec::with_capacity(tree.children.len()),
        });
        for child in tree.children {
            let child_id = self.insert_tree(child);
            self.nodes[child_id].parent = Some(id);
            self.nodes[id].children.push(child_id);
        }
        id
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_child_keeps_order() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let a = graph.create_node();
        let b = graph.create_node();

        graph.add_child(root, a).unwrap();
        graph.add_child(root, b).unwrap();

        assert_eq!(graph.children(root), &[a, b]);
        assert_eq!(graph.get(a).unwrap().parent(), Some(root));
        assert_eq!(graph.subtree_size(root), 3);
        assert_eq!(graph.depth(root), 2);
    }

    #[test]
    fn test_add_child_reparents() {
        let mut graph = SceneGraph::new();
        let first = graph.create_group();
        let second = graph.create_group();
        let child = graph.create_node();

        graph.add_child(first, child).unwrap();
        graph.add_child(second, child).unwrap();

        assert_eq!(graph.child_count(first), 0);
        assert_eq!(graph.children(second), &[child]);
    }

    #[test]
    fn test_add_child_rejects_cycle() {
        let mut graph = SceneGraph::new();
        let a = graph.create_group();
        let b = graph.create_group();
        graph.add_child(a, b).unwrap();

        assert!(graph.add_child(b, a).is_err());
        assert!(graph.add_child(a, a).is_err());
    }

    #[test]
    fn test_tree_roundtrip_through_arena() {
        let tree = SceneTree::group()
            .with_name("root")
            .with_child(SceneTree::default().with_core(NodeCore::Transform {
                matrix: IDENTITY_MATRIX,
            }))
            .with_child(SceneTree::group().with_child(SceneTree::default()));

        let mut graph = SceneGraph::new();
        let id = graph.insert_tree(tree.clone());

        assert_eq!(graph.subtree_size(id), tree.node_count());
        assert_eq!(graph.depth(id), tree.depth());
        assert_eq!(graph.to_tree(id), tree);
    }

    #[test]
    fn test_inserted_tree_is_detached() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let id = graph.insert_tree(SceneTree::group().with_child(SceneTree::default()));

        assert_eq!(graph.get(id).unwrap().parent(), None);
        assert!(graph.add_child(group, id).is_ok());
        assert_eq!(graph.subtree_size(group), 3);
    }

    #[test]
    fn test_geometry_validate() {
        let mut geometry = Geometry {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            ..Geometry::default()
        };
        assert!(geometry.validate().is_ok());

        geometry.indices.push(3);
        assert!(geometry.validate().is_err());

        geometry.indices.pop();
        geometry.normals = vec![[0.0, 0.0, 1.0]];
        assert!(geometry.validate().is_err());
    }
}
