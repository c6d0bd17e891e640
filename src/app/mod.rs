pub mod egui_host;
mod input;
mod timing;

use crate::assets::{catch_load_panic, read_and_parse, LoadOutcome};
use crate::config::ViewerConfig;
use crate::render::{create_with_retry, ArcRotateCamera, EngineInitError, RenderContext};
use crate::ui::{self, UiCommands, UiState};
use crate::viewer::Viewer;
use egui_host::EguiHost;
use input::InputAction;
use timing::FramePacer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowAttributes, WindowId};

const MODEL_EXTENSIONS: &[&str] = &["glb", "gltf", "obj"];
const LINE_SCROLL_POINTS: f32 = 50.0;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("graphics initialization failed: {0}")]
    EngineInit(#[from] EngineInitError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Events posted to the event loop from worker threads.
#[derive(Debug)]
pub enum AppEvent {
    AssetLoaded { path: PathBuf, outcome: LoadOutcome },
}

#[derive(Debug, Default, PartialEq)]
struct LaunchArgs {
    config: Option<PathBuf>,
    models: Vec<PathBuf>,
}

/// A leading `.json` argument is the config file; the rest are models.
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> LaunchArgs {
    let mut launch = LaunchArgs::default();
    for (index, arg) in args.into_iter().enumerate() {
        let path = PathBuf::from(arg);
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if index == 0 && is_json {
            launch.config = Some(path);
        } else {
            launch.models.push(path);
        }
    }
    launch
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct App {
    config: ViewerConfig,
    startup_models: Vec<PathBuf>,
    proxy: EventLoopProxy<AppEvent>,
    window: Option<Arc<Window>>,
    render: Option<RenderContext>,
    egui: Option<EguiHost>,
    viewer: Option<Viewer>,
    camera: ArcRotateCamera,
    ui: UiState,
    pacer: FramePacer,
    /// Set when `resumed` gave up; `run` reports it after the loop exits.
    init_error: Option<AppError>,
}

impl App {
    fn new(config: ViewerConfig, startup_models: Vec<PathBuf>, proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            camera: ArcRotateCamera::new(&config.camera),
            pacer: FramePacer::new(config.window_title.clone(), Instant::now()),
            config,
            startup_models,
            proxy,
            window: None,
            render: None,
            egui: None,
            viewer: None,
            ui: UiState::new(),
            init_error: None,
        }
    }

    /// Reads and decodes on a worker thread; the result comes back as an
    /// [`AppEvent`].
    fn spawn_load(&mut self, path: PathBuf) {
        log::info!("Loading {}", path.display());
        self.ui.load_started();
        let proxy = self.proxy.clone();
        std::thread::spawn(move || {
            let outcome = catch_load_panic(&display_name(&path), || read_and_parse(&path));
            if proxy
                .send_event(AppEvent::AssetLoaded { path, outcome })
                .is_err()
            {
                log::warn!("Event loop closed before a load finished");
            }
        });
    }

    fn finish_load(&mut self, path: &Path, outcome: LoadOutcome) {
        self.ui.load_finished();
        let Some(viewer) = self.viewer.as_mut() else {
            log::warn!("Dropping load of {}: viewer is gone", path.display());
            return;
        };
        let status = match viewer.finish_load(outcome) {
            Ok(_) => format!("Loaded {}", display_name(path)),
            Err(err) => format!("Failed to load {}:\n{}", display_name(path), err),
        };
        self.ui.set_status(status);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_open_model_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("3D models", MODEL_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.spawn_load(path);
    }

    fn apply_commands(&mut self, commands: UiCommands) {
        let UiCommands {
            open_model,
            clear,
            outline,
            viewport,
        } = commands;

        if let (Some(viewer), Some(action)) = (self.viewer.as_mut(), outline) {
            viewer.handle_outline_action(action);
        }

        if viewport.drag != egui::Vec2::ZERO {
            self.camera.orbit(glam::Vec2::new(viewport.drag.x, viewport.drag.y));
        }
        if viewport.scroll != 0.0 {
            self.camera.zoom(viewport.scroll / LINE_SCROLL_POINTS);
        }

        if let Some(viewer) = self.viewer.as_mut() {
            let aspect = viewport.rect.width() / viewport.rect.height().max(1.0);
            for (kind, ndc) in input::pointer_events(&viewport) {
                let ray = self.camera.ray_from_ndc(ndc, aspect);
                let info = viewer.pointer_info(kind, Some(ray));
                viewer.on_pointer(&info);
            }
        }

        if clear {
            if let Some(viewer) = self.viewer.as_mut() {
                viewer.clear();
                self.ui.set_status(String::new());
            }
        }
        if open_model {
            self.handle_open_model_action();
        }
    }

    fn render_frame(&mut self) {
        let (Some(window), Some(egui), Some(viewer)) =
            (self.window.clone(), self.egui.as_mut(), self.viewer.as_ref())
        else {
            return;
        };

        let mut commands = UiCommands::default();
        let ui_state = &self.ui;
        let camera = &self.camera;
        let frame = egui.run_ui(&window, |ctx| {
            commands = ui::draw(ctx, ui_state, viewer, camera);
        });

        if let Some(render) = self.render.as_mut() {
            render.render(&frame, self.config.clear_color);
        }
        if let Some(fps) = self.pacer.frame_presented(Instant::now()) {
            window.set_title(&self.pacer.title_with_fps(fps));
        }

        self.apply_commands(commands);
        if frame.needs_repaint {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self) {
        if let Some(viewer) = self.viewer.take() {
            viewer.shutdown();
        }
        self.egui = None;
        self.render = None;
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let [width, height] = self.config.window_size;
        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.init_error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        let render = match create_with_retry(|| RenderContext::new(window.clone())) {
            Ok(render) => render,
            Err(err) => {
                self.init_error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        self.egui = Some(EguiHost::new(&window));
        self.render = Some(render);
        self.viewer = Some(Viewer::new(self.config.clone()));
        self.pacer.sync_to_window(&window);
        log::info!("Frame pacing at {:?} per frame", self.pacer.target_frame());
        self.window = Some(window);

        for path in std::mem::take(&mut self.startup_models) {
            self.spawn_load(path);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::AssetLoaded { path, outcome } => self.finish_load(&path, outcome),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let consumed = self
            .egui
            .as_mut()
            .is_some_and(|egui| egui.on_window_event(&window, &event));

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(render) = self.render.as_mut() {
                    render.resize(new_size);
                }
                self.pacer.sync_to_window(&window);
                window.request_redraw();
            }
            WindowEvent::Moved(_) => self.pacer.sync_to_window(&window),
            WindowEvent::DroppedFile(path) => self.spawn_load(path),
            WindowEvent::KeyboardInput { event, .. } => {
                let wants_keyboard = self
                    .egui
                    .as_ref()
                    .is_some_and(|egui| egui.wants_keyboard_input());
                if consumed || wants_keyboard {
                    return;
                }
                let pressed = event.state == ElementState::Pressed;
                match input::handle_key(event.physical_key, pressed) {
                    InputAction::Exit => {
                        self.shutdown();
                        event_loop.exit();
                    }
                    InputAction::ZoomIn => self.camera.zoom(1.0),
                    InputAction::ZoomOut => self.camera.zoom(-1.0),
                    InputAction::None => {}
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.pacer.poll(Instant::now()) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next_frame()));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args(std::env::args().skip(1));
    let config = ViewerConfig::load_or_default(args.config.as_deref());
    if let Some(path) = args.config.as_deref().filter(|path| !path.exists()) {
        match config.save_to_file(path) {
            Ok(()) => log::info!("Wrote default config to {}", path.display()),
            Err(err) => log::warn!("Could not write config {}: {}", path.display(), err),
        }
    }
    log::info!("{} starting", config.window_title);
    log::info!("   Drop a model on the window or use \"Open model…\"; ESC exits");

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, args.models, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;
    if let Some(err) = app.init_error.take() {
        return Err(err);
    }

    log::info!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn leading_json_is_config() {
        let launch = parse_args(args(&["viewer.json", "a.glb", "b.obj"]));
        assert_eq!(launch.config, Some(PathBuf::from("viewer.json")));
        assert_eq!(
            launch.models,
            vec![PathBuf::from("a.glb"), PathBuf::from("b.obj")]
        );
    }

    #[test]
    fn models_without_config() {
        let launch = parse_args(args(&["scene.gltf"]));
        assert_eq!(launch.config, None);
        assert_eq!(launch.models, vec![PathBuf::from("scene.gltf")]);
        assert_eq!(parse_args(Vec::new()), LaunchArgs::default());
    }

    #[test]
    fn engine_init_failure_is_an_app_error() {
        let err: AppError = EngineInitError::AdapterUnavailable.into();
        assert!(matches!(
            err,
            AppError::EngineInit(EngineInitError::AdapterUnavailable)
        ));
        assert_eq!(
            err.to_string(),
            "graphics initialization failed: no compatible graphics adapter found"
        );
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/tmp/models/Boat.glb")), "Boat.glb");
    }
}
