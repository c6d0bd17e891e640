//! Pick-to-highlight.
//!
//! Each mesh cycles `Normal ⇄ Highlighted`, starting in `Normal`, and only a
//! pick on that mesh moves it. The override map is the state store: a mesh
//! is `Highlighted` exactly when it has an entry, and the entry holds the
//! material to put back.

use crate::engine::{Material, MaterialId, NodeId, PointerInfo, PointerKind, Scene};
use crate::scene::SceneManager;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    Normal,
    Highlighted,
}

impl HighlightState {
    /// Transition taken on a pick.
    pub fn next(self) -> Self {
        match self {
            Self::Normal => Self::Highlighted,
            Self::Highlighted => Self::Normal,
        }
    }
}

pub struct HighlightController {
    material: MaterialId,
    /// mesh id -> material it had before being highlighted
    overrides: HashMap<NodeId, Option<MaterialId>>,
}

impl HighlightController {
    /// Creates the shared highlight material in `scene`.
    pub fn new(scene: &mut Scene, material: Material) -> Self {
        Self {
            material: scene.create_material(material),
            overrides: HashMap::new(),
        }
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn state_of(&self, mesh: NodeId) -> HighlightState {
        if self.overrides.contains_key(&mesh) {
            HighlightState::Highlighted
        } else {
            HighlightState::Normal
        }
    }

    /// Highlighted meshes in ascending id order.
    pub fn highlighted(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.overrides.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Toggles the highlight on a node picked from the outline. Ids that no
    /// longer resolve to a mesh are ignored.
    pub fn pick_by_id(&mut self, scenes: &mut SceneManager, id: NodeId) -> Option<HighlightState> {
        if scenes.resolve_mesh(id).is_none() {
            log::debug!("Pick ignored: node {} is not a live mesh", id);
            return None;
        }
        self.pick_mesh(scenes.scene_mut(), id)
    }

    pub fn pick_mesh(&mut self, scene: &mut Scene, mesh: NodeId) -> Option<HighlightState> {
        let current = scene.node(mesh).filter(|node| node.is_mesh())?.material();
        let next = self.state_of(mesh).next();
        match next {
            HighlightState::Highlighted => {
                self.overrides.insert(mesh, current);
                scene.set_mesh_material(mesh, Some(self.material));
            }
            HighlightState::Normal => {
                let original = self.overrides.remove(&mesh).flatten();
                scene.set_mesh_material(mesh, original);
            }
        }
        log::debug!("Mesh {} is now {:?}", mesh, next);
        Some(next)
    }

    /// Only a press that hit a mesh counts as a pick.
    pub fn pick_from_pointer_event(
        &mut self,
        scene: &mut Scene,
        info: &PointerInfo,
    ) -> Option<HighlightState> {
        if info.kind != PointerKind::Down {
            return None;
        }
        let mesh = info.picked_mesh()?;
        self.pick_mesh(scene, mesh)
    }

    /// Drops entries for meshes that were disposed.
    pub fn forget(&mut self, meshes: &[NodeId]) {
        for mesh in meshes {
            self.overrides.remove(mesh);
        }
    }
}
