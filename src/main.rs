//! meshview - desktop 3D model viewer
//!
//! Loads glTF/GLB/OBJ models into a scene, shows the scene graph as a
//! collapsible outline and toggles a highlight material on meshes picked
//! either from the outline or by clicking them in the viewport.

mod app;
mod assets;
mod config;
mod engine;
mod highlight;
mod outline;
mod render;
mod scene;
mod ui;
mod viewer;

fn main() {
    if let Err(err) = app::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
