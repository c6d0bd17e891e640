mod camera;
pub mod viewport;

pub use camera::ArcRotateCamera;

use crate::app::egui_host::EguiFrameOutput;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum EngineInitError {
    #[error("failed to create window surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter found")]
    AdapterUnavailable,
    #[error("failed to create graphics device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Runs `create` and, when it fails, runs it exactly once more.
pub fn create_with_retry<T, E, F>(mut create: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    match create() {
        Ok(value) => Ok(value),
        Err(err) => {
            log::warn!("Engine creation failed ({}), retrying once", err);
            create()
        }
    }
}

pub struct RenderContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl RenderContext {
    pub fn new(window: Arc<Window>) -> Result<Self, EngineInitError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = futures::executor::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            },
        ))
        .ok_or(EngineInitError::AdapterUnavailable)?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = futures::executor::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("meshview device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        // egui_wgpu expects a linear target
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(EngineInitError::NoSurfaceFormat)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Clears the frame and draws the egui output on top.
    pub fn render(&mut self, frame: &EguiFrameOutput, clear_color: [f32; 3]) {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: frame.pixels_per_point,
        };
        for (id, delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("meshview frame"),
            });
        let mut command_buffers = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &frame.clipped_primitives,
            &screen,
        );

        {
            let [r, g, b] = clear_color.map(f64::from);
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &frame.clipped_primitives, &screen);
        }

        command_buffers.push(encoder.finish());
        self.queue.submit(command_buffers);
        surface_texture.present();

        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn retry_runs_second_attempt_once() {
        let attempts = Cell::new(0);
        let result: Result<u32, String> = create_with_retry(|| {
            attempts.set(attempts.get() + 1);
            if attempts.get() == 1 {
                Err("first".to_string())
            } else {
                Ok(7)
            }
        });
        assert_eq!(result, Ok(7));
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn retry_gives_up_after_second_failure() {
        let attempts = Cell::new(0);
        let result: Result<(), String> = create_with_retry(|| {
            attempts.set(attempts.get() + 1);
            Err(format!("attempt {}", attempts.get()))
        });
        assert_eq!(result, Err("attempt 2".to_string()));
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn success_is_not_retried() {
        let attempts = Cell::new(0);
        let result: Result<(), String> = create_with_retry(|| {
            attempts.set(attempts.get() + 1);
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(attempts.get(), 1);
    }
}
