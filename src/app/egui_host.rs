use winit::event::WindowEvent;
use winit::window::Window;

/// Tessellated egui output for one frame, ready for the painter.
pub struct EguiFrameOutput {
    pub clipped_primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
    pub needs_repaint: bool,
}

pub struct EguiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
}

impl EguiHost {
    pub fn new(window: &Window) -> Self {
        let context = egui::Context::default();
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        Self {
            context,
            winit_state,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.winit_state.on_window_event(window, event);
        if response.repaint {
            window.request_redraw();
        }
        response.consumed
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.context.wants_keyboard_input()
    }

    pub fn run_ui<F>(&mut self, window: &Window, build_ui: F) -> EguiFrameOutput
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.context.run(raw_input, build_ui);
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let needs_repaint = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| viewport.repaint_delay.is_zero());
        EguiFrameOutput {
            clipped_primitives: self.context.tessellate(full_output.shapes, pixels_per_point),
            textures_delta: full_output.textures_delta,
            pixels_per_point,
            needs_repaint,
        }
    }
}
