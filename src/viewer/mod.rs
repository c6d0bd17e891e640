//! The viewer context.
//!
//! Owns the scene, the outline and the highlight controller, and keeps the
//! outline in step with the scene after every append and clear. Built once
//! by the host when the window comes up and dropped through
//! [`Viewer::shutdown`].

use crate::assets::{AssetError, LoadOutcome};
use crate::config::{HighlightColors, ViewerConfig};
use crate::engine::{LoadError, Material, NodeId, ParsedAsset, PointerInfo, PointerKind, Ray};
use crate::highlight::{HighlightController, HighlightState};
use crate::outline::{project, OutlineAction, OutlineView, ProjectedNode};
use crate::scene::{InstanceId, SceneManager};

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("failed to load \"{name}\": {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },
    #[error("loader crashed while decoding \"{name}\"")]
    LoaderPanicked { name: String },
}

fn highlight_material(colors: &HighlightColors) -> Material {
    Material {
        name: "highlight".to_string(),
        diffuse: colors.diffuse,
        specular: colors.specular,
        emissive: colors.emissive,
        ambient: colors.ambient,
    }
}

pub struct Viewer {
    config: ViewerConfig,
    scenes: SceneManager,
    outline: OutlineView,
    highlight: HighlightController,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let mut scenes = SceneManager::new(config.asset_scale);
        let highlight =
            HighlightController::new(scenes.scene_mut(), highlight_material(&config.highlight));
        Self {
            config,
            scenes,
            outline: OutlineView::new(),
            highlight,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn outline(&self) -> &OutlineView {
        &self.outline
    }

    pub fn highlight(&self) -> &HighlightController {
        &self.highlight
    }

    pub fn append(&mut self, asset: &ParsedAsset) -> Result<InstanceId, ViewerError> {
        let id = self
            .scenes
            .append(asset)
            .map_err(|source| ViewerError::Load {
                name: asset.label.clone(),
                source,
            })?;
        log::info!("\"{}\" was appended successfully", asset.label);
        self.refresh_outline();
        Ok(id)
    }

    /// Applies the result of a background read.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> Result<InstanceId, ViewerError> {
        let result = match outcome {
            LoadOutcome::Parsed(asset) => self.append(&asset),
            LoadOutcome::ReadFailed(err) => Err(err.into()),
            LoadOutcome::Rejected { name, error } => Err(ViewerError::Load {
                name,
                source: error,
            }),
            LoadOutcome::Panicked { name } => Err(ViewerError::LoaderPanicked { name }),
        };
        if let Err(err) = &result {
            log::error!("{}", err);
        }
        result
    }

    /// Returns how many meshes were disposed.
    pub fn clear(&mut self) -> usize {
        let disposed = self.scenes.clear();
        self.highlight.forget(&disposed);
        self.refresh_outline();
        disposed.len()
    }

    pub fn refresh_outline(&mut self) {
        let scene = self.scenes.scene();
        let projected = project(scene, scene.root_nodes());
        log::debug!(
            "Outline rebuilt: {} roots, {} entries",
            projected.len(),
            projected.iter().map(ProjectedNode::count).sum::<usize>()
        );
        self.outline.render_tree(&projected);
    }

    /// Outline label click.
    pub fn select_node(&mut self, id: NodeId) -> Option<HighlightState> {
        let id = self.outline.on_node_select(id);
        self.highlight.pick_by_id(&mut self.scenes, id)
    }

    pub fn toggle_node(&mut self, id: NodeId) -> Option<bool> {
        self.outline.on_toggle(id)
    }

    pub fn handle_outline_action(&mut self, action: OutlineAction) {
        match action {
            OutlineAction::Toggle(id) => {
                self.toggle_node(id);
            }
            OutlineAction::Select(id) => {
                self.select_node(id);
            }
        }
    }

    /// Hit-tests presses only; other pointer kinds never carry a hit.
    pub fn pointer_info(&self, kind: PointerKind, ray: Option<Ray>) -> PointerInfo {
        let hit = match (kind, ray) {
            (PointerKind::Down, Some(ray)) => self.scenes.scene().pick(&ray),
            _ => None,
        };
        PointerInfo { kind, hit }
    }

    pub fn on_pointer(&mut self, info: &PointerInfo) -> Option<HighlightState> {
        self.highlight
            .pick_from_pointer_event(self.scenes.scene_mut(), info)
    }

    /// Disposes everything still loaded. Returns the disposed mesh count.
    pub fn shutdown(mut self) -> usize {
        let disposed = self.clear();
        self.outline.clear();
        log::info!("Viewer shut down ({} meshes disposed)", disposed);
        disposed
    }
}
