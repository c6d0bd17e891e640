//! Scene engine
//!
//! The viewer treats everything in here as an opaque capability: a scene
//! arena of named nodes with stable unique ids, a material table, an asset
//! loader that turns a data URL into a node hierarchy, and ray hit-testing.
//! Nothing above this module holds a reference into the arena; callers keep
//! `NodeId`s and resolve them on demand.

pub mod loader;
pub mod pick;

#[cfg(test)]
pub mod fixtures;

pub use loader::{load_data_url, LoadError, ParsedAsset, ParsedNode};
pub use pick::{PickHit, PointerInfo, PointerKind, Ray};

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::fmt;

/// Unique, never reused identifier of a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub ambient: [f32; 3],
}

impl Material {
    pub fn standard(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            ambient: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Indexed triangle list in node-local space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Triangles with out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.positions.get(tri[0] as usize)?;
            let b = self.positions.get(tri[1] as usize)?;
            let c = self.positions.get(tri[2] as usize)?;
            Some([Vec3::from(*a), Vec3::from(*b), Vec3::from(*c)])
        })
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub transform: Transform,
    geometry: Option<Geometry>,
    material: Option<MaterialId>,
}

impl SceneNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_mesh(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }
}

/// What [`Scene::instantiate`] created for one asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instantiated {
    pub roots: Vec<NodeId>,
    pub materials: Vec<MaterialId>,
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    materials: HashMap<MaterialId, Material>,
    next_id: u32,
    next_material: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            materials: HashMap::new(),
            next_id: 1,
            next_material: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_nodes(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn create_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, material);
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Drops a material from the table. Nodes still pointing at it render
    /// unshaded until reassigned.
    pub fn remove_material(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.remove(&id)
    }

    /// Assigns a material to a mesh node. Returns false for unknown or non-mesh nodes.
    pub fn set_mesh_material(&mut self, id: NodeId, material: Option<MaterialId>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.is_mesh() => {
                node.material = material;
                true
            }
            _ => false,
        }
    }

    /// Mesh nodes in ascending id order.
    pub fn mesh_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.is_mesh())
            .map(|node| node.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        transform: Transform,
        geometry: Option<Geometry>,
        material: Option<MaterialId>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                id,
                name: name.to_string(),
                parent,
                children: Vec::new(),
                transform,
                geometry,
                material,
            },
        );
        match parent.and_then(|parent_id| self.nodes.get_mut(&parent_id)) {
            Some(parent_node) => parent_node.children.push(id),
            None => {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.parent = None;
                }
                self.roots.push(id);
            }
        }
        id
    }

    /// Adds every node and material of a parsed asset.
    pub fn instantiate(&mut self, asset: &ParsedAsset) -> Instantiated {
        let materials: Vec<MaterialId> = asset
            .materials
            .iter()
            .cloned()
            .map(|material| self.create_material(material))
            .collect();
        let roots = asset
            .roots
            .iter()
            .map(|root| self.instantiate_node(None, root, &materials))
            .collect();
        Instantiated { roots, materials }
    }

    fn instantiate_node(
        &mut self,
        parent: Option<NodeId>,
        node: &ParsedNode,
        materials: &[MaterialId],
    ) -> NodeId {
        let material = node
            .material
            .and_then(|index| materials.get(index))
            .copied();
        let id = self.add_node(
            parent,
            &node.name,
            node.transform,
            node.geometry.clone(),
            material,
        );
        for child in &node.children {
            self.instantiate_node(Some(id), child, materials);
        }
        id
    }

    /// The node and all of its descendants, parents first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Removes a node and its subtree. Returns the removed ids.
    pub fn dispose(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.descendants(id);
        if removed.is_empty() {
            return removed;
        }
        let parent = self.nodes.get(&id).and_then(|node| node.parent);
        match parent.and_then(|parent_id| self.nodes.get_mut(&parent_id)) {
            Some(parent_node) => parent_node.children.retain(|child| *child != id),
            None => self.roots.retain(|root| *root != id),
        }
        for node_id in &removed {
            self.nodes.remove(node_id);
        }
        removed
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent.and_then(|parent| self.nodes.get(&parent));
        }
        matrix
    }
}
