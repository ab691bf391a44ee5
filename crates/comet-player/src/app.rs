//! Windowed player implementing winit's ApplicationHandler
//!
//! Each redraw advances the frame clock, steps the swarm on step frames,
//! publishes it to the wgpu renderer and draws the egui parameter panel on top.

use crate::session::{StepReport, SwarmSession};
use anyhow::{anyhow, Context as _};
use comet_particles::{MAX_PARTICLES, MIN_PARTICLES};
use comet_render::{Camera, RenderContext, SwarmRenderer};
use comet_runtime::PointerState;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const WINDOW_SIZE: (u32, u32) = (1280, 720);

/// Values edited through the egui panel
struct PanelState {
    particle_count: usize,
}

pub struct SwarmApp {
    session: SwarmSession,
    pointer: PointerState,
    camera: Camera,
    panel: PanelState,
    last_report: Option<StepReport>,

    // Rendering
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    renderer: Option<SwarmRenderer>,

    // egui
    egui_ctx: egui::Context,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    /// Set when the app had to stop on an error
    failure: Option<anyhow::Error>,
}

impl SwarmApp {
    pub fn new(session: SwarmSession) -> Self {
        let particle_count = session.world.particle_count();
        Self {
            session,
            pointer: PointerState::new(WINDOW_SIZE.0, WINDOW_SIZE.1),
            camera: Camera::for_window(WINDOW_SIZE.0, WINDOW_SIZE.1),
            panel: PanelState { particle_count },
            last_report: None,
            window: None,
            render_context: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_winit: None,
            egui_renderer: None,
            failure: None,
        }
    }

    /// Outcome once the event loop has returned
    pub fn finish(mut self) -> anyhow::Result<()> {
        self.session.world.teardown();
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("[player] {err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("Comet")
            .with_inner_size(PhysicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );
        self.window = Some(window.clone());

        let render_context = pollster::block_on(RenderContext::new(window.clone()))
            .context("Failed to initialize rendering")?;

        let size = render_context.size;
        self.camera.set_viewport(size.width, size.height);
        self.pointer.process_resize(size);

        let renderer = SwarmRenderer::new(
            &render_context.device,
            render_context.config.format,
            &self.session.world.config().tube,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &render_context.device,
            render_context.config.format,
            None,
            1,
            false,
        );

        self.render_context = Some(render_context);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        log::info!("[player] Window ready ({}x{})", size.width, size.height);
        Ok(())
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        if self.pointer.is_key_just_pressed(KeyCode::Escape) {
            event_loop.exit();
        }
        self.pointer.end_frame();

        match self.session.frame() {
            Ok(Some(report)) => {
                log::debug!(
                    "[swarm] step {} mean dist {:.3} ({:.2} ms)",
                    report.step,
                    report.stats.mean_distance,
                    report.elapsed.as_secs_f64() * 1000.0
                );
                self.last_report = Some(report);
            }
            Ok(None) => {}
            Err(e) => {
                self.fail(event_loop, anyhow!(e).context("Simulation step failed"));
                return;
            }
        }

        if let Some(renderer) = &mut self.renderer {
            self.session.publish(renderer);
        }
    }

    fn render(&mut self) {
        let (Some(context), Some(renderer)) = (&mut self.render_context, &mut self.renderer) else {
            return;
        };

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                return;
            }
            Err(e) => {
                log::warn!("[render] Surface error: {e:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(context, &self.camera, &view);

        if let Some(new_count) = self.render_egui(&view) {
            self.apply_particle_count(new_count);
        }

        output.present();
    }

    /// Draw the parameter panel over `target_view`. Returns a new particle
    /// count when the slider was committed.
    fn render_egui(&mut self, target_view: &wgpu::TextureView) -> Option<usize> {
        let window = self.window.clone()?;
        let context = self.render_context.as_ref()?;
        let egui_winit = self.egui_winit.as_mut()?;
        let mut egui_renderer = self.egui_renderer.take()?;

        let raw_input = egui_winit.take_egui_input(&window);

        let panel = &mut self.panel;
        let report = self.last_report;
        let live_count = self.session.world.particle_count();
        let mut committed = None;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Params")
                .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
                .resizable(false)
                .show(ctx, |ui| {
                    let response = ui.add(
                        egui::Slider::new(&mut panel.particle_count, MIN_PARTICLES..=MAX_PARTICLES)
                            .text("particleCount"),
                    );
                    // respawn once the drag ends, or right away for typed values
                    if (response.drag_stopped() || (response.changed() && !response.dragged()))
                        && panel.particle_count != live_count
                    {
                        committed = Some(panel.particle_count);
                    }

                    ui.separator();
                    ui.label(format!("particles: {live_count}"));
                    if let Some(report) = report {
                        ui.label(format!("step: {}", report.step));
                        ui.label(format!("step time: {:.2} ms", report.elapsed.as_secs_f64() * 1000.0));
                        ui.label(format!("mean distance: {:.3}", report.stats.mean_distance));
                        ui.label(format!("mean tail factor: {:.3}", report.stats.mean_length_factor));
                    }
                });
        });

        egui_winit.handle_platform_output(&window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [context.config.width, context.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui Encoder"),
            });

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&context.device, &context.queue, *id, image_delta);
        }

        egui_renderer.update_buffers(
            &context.device,
            &context.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        context.queue.submit(std::iter::once(encoder.finish()));

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        self.egui_renderer = Some(egui_renderer);
        committed
    }

    fn apply_particle_count(&mut self, count: usize) {
        match self.session.respawn(count) {
            Ok(()) => self.last_report = None,
            Err(e) => {
                log::warn!("[player] Respawn rejected: {e}");
                self.panel.particle_count = self.session.world.particle_count();
            }
        }
    }
}

impl ApplicationHandler for SwarmApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                }
                self.camera.set_viewport(new_size.width, new_size.height);
                self.pointer.process_resize(new_size);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.process_cursor_moved(position.x, position.y);
                if self.pointer.take_moved() {
                    if let Some(ndc) = self.pointer.ndc() {
                        let inv_view_proj = self.camera.inverse_view_projection_matrix();
                        self.session.pick(&inv_view_proj, ndc);
                    }
                }
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer.process_cursor_left();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.pointer.process_key_down(key_code),
                        ElementState::Released => self.pointer.process_key_up(key_code),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick(event_loop);
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
