use crate::engine::{Instantiated, LoadError, MaterialId, NodeId, ParsedAsset, Scene, SceneNode};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

/// The nodes produced by one successful append.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInstance {
    pub id: InstanceId,
    pub label: String,
    pub roots: Vec<NodeId>,
    pub meshes: Vec<NodeId>,
    pub materials: Vec<MaterialId>,
}

/// Owns the live scene and the registry of loaded asset instances.
pub struct SceneManager {
    scene: Scene,
    instances: Vec<AssetInstance>,
    next_instance: u32,
    asset_scale: f32,
}

impl SceneManager {
    pub fn new(asset_scale: f32) -> Self {
        Self {
            scene: Scene::new(),
            instances: Vec::new(),
            next_instance: 1,
            asset_scale,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn instances(&self) -> &[AssetInstance] {
        &self.instances
    }

    pub fn append(&mut self, asset: &ParsedAsset) -> Result<InstanceId, LoadError> {
        if asset.roots.is_empty() {
            return Err(LoadError::Empty {
                label: asset.label.clone(),
            });
        }
        let Instantiated { roots, materials } = self.scene.instantiate(asset);
        let meshes: Vec<NodeId> = roots
            .iter()
            .flat_map(|root| self.scene.descendants(*root))
            .filter(|id| self.scene.node(*id).is_some_and(SceneNode::is_mesh))
            .collect();
        for mesh in &meshes {
            if let Some(node) = self.scene.node_mut(*mesh) {
                node.transform.scale = Vec3::splat(self.asset_scale);
            }
        }

        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        log::info!(
            "Appended '{}' as instance {} ({} roots, {} meshes)",
            asset.label,
            id.0,
            roots.len(),
            meshes.len()
        );
        self.instances.push(AssetInstance {
            id,
            label: asset.label.clone(),
            roots,
            meshes,
            materials,
        });
        Ok(id)
    }

    /// Disposes every loaded instance along with the materials it brought.
    /// Returns the disposed mesh ids.
    pub fn clear(&mut self) -> Vec<NodeId> {
        let mut disposed_meshes = Vec::new();
        for instance in self.instances.drain(..) {
            for root in &instance.roots {
                self.scene.dispose(*root);
            }
            for material in &instance.materials {
                self.scene.remove_material(*material);
            }
            disposed_meshes.extend(instance.meshes);
        }
        if !disposed_meshes.is_empty() {
            log::info!(
                "Cleared {} meshes ({} nodes, {} materials remain)",
                disposed_meshes.len(),
                self.scene.len(),
                self.scene.material_count()
            );
        }
        disposed_meshes
    }

    pub fn resolve_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.scene.node(id)
    }

    pub fn resolve_mesh(&self, id: NodeId) -> Option<&SceneNode> {
        self.resolve_node(id).filter(|node| node.is_mesh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetPayload;
    use crate::engine::fixtures::{gltf_data_url, obj_data_url, FixtureNode};

    fn parsed(roots: &[FixtureNode]) -> ParsedAsset {
        AssetPayload::from_data_url("fixture.gltf", gltf_data_url(roots))
            .parse()
            .unwrap()
    }

    #[test]
    fn append_registers_instance_and_scales_meshes() {
        let mut manager = SceneManager::new(4.0);
        let id = manager
            .append(&parsed(&[FixtureNode::new(
                "hull",
                vec![FixtureNode::leaf("mast")],
            )]))
            .unwrap();

        let instance = &manager.instances()[0];
        assert_eq!(instance.id, id);
        assert_eq!(instance.roots.len(), 1);
        assert_eq!(instance.meshes.len(), 2);
        assert_eq!(instance.materials.len(), 1);
        for mesh in &instance.meshes {
            let node = manager.resolve_mesh(*mesh).unwrap();
            assert_eq!(node.transform.scale, Vec3::splat(4.0));
        }
    }

    #[test]
    fn failed_parse_leaves_scene_unchanged() {
        let mut manager = SceneManager::new(4.0);
        manager.append(&parsed(&[FixtureNode::leaf("keep")])).unwrap();
        let before = manager.scene().len();

        let bad = AssetPayload::from_bytes("bad.glb", "model/gltf-binary", b"glTF\x02garbage");
        assert!(bad.parse().is_err());
        assert_eq!(manager.scene().len(), before);
        assert_eq!(manager.instances().len(), 1);
    }

    #[test]
    fn empty_asset_is_rejected() {
        let mut manager = SceneManager::new(1.0);
        let empty = ParsedAsset {
            label: "nothing".to_string(),
            roots: Vec::new(),
            materials: Vec::new(),
        };
        assert!(matches!(
            manager.append(&empty),
            Err(LoadError::Empty { .. })
        ));
        assert!(manager.instances().is_empty());
    }

    #[test]
    fn sequential_appends_sum_root_counts() {
        let mut manager = SceneManager::new(1.0);
        manager
            .append(&parsed(&[FixtureNode::leaf("a"), FixtureNode::leaf("b")]))
            .unwrap();
        let obj = AssetPayload::from_data_url("pair.obj", obj_data_url(&["c", "d", "e"]));
        manager.append(&obj.parse().unwrap()).unwrap();
        assert_eq!(manager.scene().root_nodes().len(), 5);
        assert_eq!(manager.instances().len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut manager = SceneManager::new(4.0);
        assert!(manager.clear().is_empty());
        manager
            .append(&parsed(&[FixtureNode::new(
                "root",
                vec![FixtureNode::leaf("x"), FixtureNode::leaf("y")],
            )]))
            .unwrap();
        let disposed = manager.clear();
        assert_eq!(disposed.len(), 3);
        assert!(manager.instances().is_empty());
        assert!(manager.scene().root_nodes().is_empty());
        assert!(manager.resolve_node(disposed[0]).is_none());

        assert!(manager.clear().is_empty());
        assert!(manager.instances().is_empty());
    }

    #[test]
    fn clear_frees_instance_materials() {
        let mut manager = SceneManager::new(1.0);
        let keep = manager
            .scene_mut()
            .create_material(crate::engine::Material::standard("highlight"));
        for _ in 0..3 {
            manager.append(&parsed(&[FixtureNode::leaf("part")])).unwrap();
        }
        let loaded: Vec<MaterialId> = manager
            .instances()
            .iter()
            .flat_map(|instance| instance.materials.clone())
            .collect();
        assert_eq!(loaded.len(), 3);
        assert_eq!(manager.scene().material_count(), 4);

        manager.clear();
        assert!(loaded
            .iter()
            .all(|material| manager.scene().material(*material).is_none()));
        assert_eq!(manager.scene().material_count(), 1);
        assert!(manager.scene().material(keep).is_some());
    }
}
