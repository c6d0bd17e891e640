use crate::outline::OutlineAction;
use crate::render::{viewport, ArcRotateCamera};
use crate::viewer::Viewer;

/// Panel state that lives outside the viewer.
#[derive(Debug, Default)]
pub struct UiState {
    status: String,
    pending_loads: usize,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    pub fn pending_loads(&self) -> usize {
        self.pending_loads
    }

    pub fn load_started(&mut self) {
        self.pending_loads += 1;
    }

    pub fn load_finished(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }
}

/// Raw pointer activity over the 3D viewport for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportInput {
    pub rect: egui::Rect,
    pub pressed: Option<egui::Pos2>,
    pub released: Option<egui::Pos2>,
    pub hovered: Option<egui::Pos2>,
    pub drag: egui::Vec2,
    pub scroll: f32,
}

impl Default for ViewportInput {
    fn default() -> Self {
        Self {
            rect: egui::Rect::NOTHING,
            pressed: None,
            released: None,
            hovered: None,
            drag: egui::Vec2::ZERO,
            scroll: 0.0,
        }
    }
}

/// What the user asked for this frame. The caller acts on it after the UI
/// pass so nothing is mutated while egui holds the viewer.
#[derive(Debug, Default)]
pub struct UiCommands {
    pub open_model: bool,
    pub clear: bool,
    pub outline: Option<OutlineAction>,
    pub viewport: ViewportInput,
}

pub fn draw(
    ctx: &egui::Context,
    state: &UiState,
    viewer: &Viewer,
    camera: &ArcRotateCamera,
) -> UiCommands {
    let mut commands = UiCommands::default();

    egui::SidePanel::left("scene_outline")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Scene");
            ui.horizontal(|ui| {
                if ui.button("Open model…").clicked() {
                    commands.open_model = true;
                }
                if ui.button("Clear").clicked() {
                    commands.clear = true;
                }
            });
            if state.pending_loads() > 0 {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading {} file(s)…", state.pending_loads()));
                });
            }
            if !state.status().is_empty() {
                ui.label(state.status());
            }
            let highlighted = viewer.highlight().highlighted().len();
            if highlighted > 0 {
                ui.weak(format!("{} mesh(es) highlighted", highlighted));
            }
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if viewer.scenes().scene().is_empty() {
                        ui.weak("Drop a .glb, .gltf or .obj file here");
                    }
                    commands.outline = viewer.outline().show(ui);
                });
        });

    egui::CentralPanel::default()
        .frame(egui::Frame::default())
        .show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            let aspect = rect.width() / rect.height().max(1.0);
            let triangles = viewport::collect_triangles(
                viewer.scenes().scene(),
                camera.view_proj(aspect),
                camera.eye(),
                viewer.config().light_intensity,
            );
            viewport::paint(ui.painter(), rect, viewer.config().clear_color, &triangles);
            commands.viewport = read_viewport_input(ui, &response, rect);
        });

    commands
}

fn read_viewport_input(ui: &egui::Ui, response: &egui::Response, rect: egui::Rect) -> ViewportInput {
    let (pressed, released, scroll) = ui.input(|input| {
        (
            input.pointer.primary_pressed(),
            input.pointer.primary_released(),
            input.smooth_scroll_delta.y,
        )
    });
    let hovered = response.hover_pos();
    ViewportInput {
        rect,
        pressed: hovered.filter(|_| pressed),
        released: hovered.filter(|_| released),
        hovered,
        drag: if response.dragged_by(egui::PointerButton::Primary) {
            response.drag_delta()
        } else {
            egui::Vec2::ZERO
        },
        scroll: if hovered.is_some() { scroll } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_counter_never_underflows() {
        let mut state = UiState::new();
        state.load_started();
        state.load_started();
        state.load_finished();
        assert_eq!(state.pending_loads(), 1);
        state.load_finished();
        state.load_finished();
        assert_eq!(state.pending_loads(), 0);
    }

    #[test]
    fn draw_reports_no_commands_without_input() {
        let ctx = egui::Context::default();
        let viewer = Viewer::new(crate::config::ViewerConfig::default());
        let camera = ArcRotateCamera::new(&viewer.config().camera);
        let state = UiState::new();

        let mut commands = UiCommands::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            commands = draw(ctx, &state, &viewer, &camera);
        });
        assert!(!commands.open_model);
        assert!(!commands.clear);
        assert!(commands.outline.is_none());
        assert!(commands.viewport.pressed.is_none());
    }
}
