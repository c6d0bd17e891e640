use crate::engine::PointerKind;
use crate::render::viewport::screen_to_ndc;
use crate::ui::ViewportInput;
use glam::Vec2;
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Exit,
    ZoomIn,
    ZoomOut,
}

pub fn handle_key(key: PhysicalKey, pressed: bool) -> InputAction {
    if !pressed {
        return InputAction::None;
    }
    match key {
        PhysicalKey::Code(KeyCode::Escape) => InputAction::Exit,
        PhysicalKey::Code(KeyCode::Equal | KeyCode::NumpadAdd) => InputAction::ZoomIn,
        PhysicalKey::Code(KeyCode::Minus | KeyCode::NumpadSubtract) => InputAction::ZoomOut,
        _ => InputAction::None,
    }
}

/// Pointer events over the viewport in the order they happened within the
/// frame, each with its position in normalized device coordinates.
pub fn pointer_events(input: &ViewportInput) -> Vec<(PointerKind, Vec2)> {
    let to_ndc = |pos| screen_to_ndc(pos, input.rect);
    let mut events = Vec::new();
    if let Some(pos) = input.pressed {
        events.push((PointerKind::Down, to_ndc(pos)));
    }
    if let Some(pos) = input.hovered {
        if input.drag != egui::Vec2::ZERO {
            events.push((PointerKind::Move, to_ndc(pos)));
        }
        if input.scroll != 0.0 {
            events.push((PointerKind::Wheel, to_ndc(pos)));
        }
    }
    if let Some(pos) = input.released {
        events.push((PointerKind::Up, to_ndc(pos)));
    }
    events
}
