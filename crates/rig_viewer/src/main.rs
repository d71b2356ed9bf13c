//! Hierarchical robot viewer -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. The
//! loop sleeps until something happens:
//!
//!   1. Key presses are routed straight into the `Session` and request a redraw
//!   2. While a tween runs, `about_to_wait` wakes at the next tick deadline and
//!      consumes whole fixed ticks from the `TickClock`
//!   3. `RedrawRequested` records the scene into a `FrameRecorder`, uploads it
//!      and composites the egui overlay on top
//!
//! Hot reload: the settings JSON is watched via mtime polling and reloaded
//! between ticks. A reload that fails validation keeps the previous settings.

mod settings;
#[cfg(test)]
mod replay;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rig_core::input::KEY_HELP;
use rig_core::time::{FrameTimer, TickClock};
use rig_core::{InputRouter, Key, Reaction, SceneAssembler, Session};
use rig_devtools::{DebugOverlay, OverlayActions, OverlayStats};
use rig_render::{Camera3D, FrameRecorder, GpuContext, MeshPipeline};
use settings::{load_settings_from_path, load_settings_or_default, RigSettings, SettingsWatcher};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{Window, WindowId};

const SETTINGS_PATH: &str = "assets/rig_settings.json";
const SETTINGS_POLL_INTERVAL: Duration = Duration::from_millis(500);
const OVERLAY_REFRESH_INTERVAL: Duration = Duration::from_millis(16);

/// All mutable viewer state. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
struct ViewerState {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: Camera3D,
    mesh_pipeline: MeshPipeline,
    recorder: FrameRecorder,
    debug_overlay: DebugOverlay,
    frame_timer: FrameTimer,
    tick_clock: TickClock,

    // --- Robot -------------------------------------------------------------------
    session: Session,
    router: InputRouter,
    scene: SceneAssembler,
    paused: bool,
    single_step_requested: bool,

    // --- Hot-reloadable settings --------------------------------------------------
    settings_path: PathBuf,
    settings_watcher: SettingsWatcher,
    settings: RigSettings,
    next_settings_poll: Instant,
}

impl ViewerState {
    fn new(window: Arc<Window>, settings_path: PathBuf, settings: RigSettings) -> Self {
        let gpu = GpuContext::new(window.clone());
        let scene = settings.scene_assembler();
        let mesh_pipeline = MeshPipeline::new(&gpu.device, gpu.surface_format, &scene.ground);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        let mut camera = Camera3D::new(gpu.size.0, gpu.size.1);
        apply_projection(&mut camera, &settings);

        Self {
            window,
            gpu,
            camera,
            mesh_pipeline,
            recorder: FrameRecorder::new(),
            debug_overlay,
            frame_timer: FrameTimer::new(),
            tick_clock: TickClock::new(),
            session: Session::new(settings.dimensions()),
            router: InputRouter::new(),
            scene,
            paused: false,
            single_step_requested: false,
            settings_watcher: SettingsWatcher::new(settings_path.clone()),
            settings_path,
            settings,
            next_settings_poll: Instant::now() + SETTINGS_POLL_INTERVAL,
        }
    }

    fn reload_settings(&mut self, reason: &str) {
        match load_settings_from_path(&self.settings_path) {
            Ok(settings) => {
                self.apply_settings(settings);
                log::info!(
                    "Settings reloaded ({}) from {}",
                    reason,
                    self.settings_path.display()
                );
            }
            Err(e) => {
                log::error!("Settings reload failed ({}): {}", reason, e);
            }
        }
    }

    fn apply_settings(&mut self, settings: RigSettings) {
        if settings.body_size != self.settings.body_size {
            self.session.rescale(settings.body_size);
            log::info!("Body size now {:.2}", settings.body_size);
        }
        let ground_changed = settings.ground != self.settings.ground;
        self.scene = settings.scene_assembler();
        if ground_changed {
            self.mesh_pipeline
                .rebuild_meshes(&self.gpu.device, &self.scene.ground);
        }
        apply_projection(&mut self.camera, &settings);

        if settings.window.title != self.settings.window.title {
            self.window.set_title(&settings.window.title);
        }
        if (settings.window.width, settings.window.height)
            != (self.settings.window.width, self.settings.window.height)
        {
            let _ = self.window.request_inner_size(winit::dpi::LogicalSize::new(
                settings.window.width,
                settings.window.height,
            ));
        }
        self.settings = settings;
        self.window.request_redraw();
    }

    fn handle_key(&mut self, key: Key, event_loop: &ActiveEventLoop) {
        match key {
            Key::F3 => {
                self.debug_overlay.toggle();
            }
            Key::F1 => {
                self.debug_overlay.toggle_help();
                for (keys, action) in KEY_HELP {
                    log::info!("{:>14}  {}", keys, action);
                }
            }
            _ => {
                let was_animating = self.session.is_animating();
                if self.router.handle_key(key, &mut self.session) == Reaction::Quit {
                    event_loop.exit();
                    return;
                }
                if !was_animating && self.session.is_animating() {
                    // Start counting from the press, not from the last idle frame.
                    self.tick_clock.resync();
                }
            }
        }
        self.window.request_redraw();
    }

    /// Run every tick that is due. Returns true if the pose moved.
    fn advance_ticks(&mut self) -> bool {
        if self.paused {
            if !self.single_step_requested {
                return false;
            }
            self.single_step_requested = false;
            self.tick_clock.total_ticks += 1;
            return self.session.tick();
        }
        if !self.session.is_animating() {
            return false;
        }

        self.tick_clock.begin_frame();
        let mut moved = false;
        while self.tick_clock.should_step() {
            moved |= self.session.tick();
            if !self.session.is_animating() {
                log::info!(
                    "Animation idle after {} ticks",
                    self.session.driver.ticks()
                );
                break;
            }
        }
        moved
    }

    fn apply_overlay_actions(&mut self, actions: &OverlayActions) {
        if actions.toggle_pause {
            self.paused = !self.paused;
            if !self.paused {
                self.tick_clock.resync();
            }
            log::info!(
                "Animation {}",
                if self.paused { "PAUSED" } else { "RESUMED" }
            );
        }
        if actions.single_step {
            self.single_step_requested = true;
        }
        if actions.reset_pose {
            self.session.reset_pose();
            log::info!("Pose reset");
        }
        if actions.toggle_pause || actions.single_step || actions.reset_pose {
            self.window.request_redraw();
        }
    }

    fn render(&mut self) {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return;
        }
        self.frame_timer.record_frame();

        // Record the whole scene on the CPU first; the GPU only replays it.
        self.recorder.begin();
        let primitive_count = self.scene.assemble(&self.session, &mut self.recorder);
        self.camera.view = self.recorder.view();
        self.mesh_pipeline.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            &self.camera,
            &self.recorder,
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = OverlayStats {
            draw_calls: self.recorder.draw_calls().len() as u32,
            primitive_count: primitive_count as u32,
            pose: self.session.pose,
            selected: self.session.selected,
            running: self.session.driver.running_labels(),
            body_size: self.session.dims().body_size(),
            paused: self.paused,
        };
        let (egui_primitives, egui_textures_delta, overlay_actions) = self
            .debug_overlay
            .prepare(&self.window, &self.frame_timer, &self.tick_clock, &stats);
        self.apply_overlay_actions(&overlay_actions);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.mesh_pipeline
            .render(&mut encoder, &view, &self.gpu.depth_view, &self.recorder);

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    settings_path: PathBuf,
    settings: RigSettings,
    state: Option<ViewerState>,
}

impl App {
    fn new() -> Self {
        let settings_path = PathBuf::from(SETTINGS_PATH);
        let settings = load_settings_or_default(&settings_path);
        Self {
            settings_path,
            settings,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = rig_platform::create_window(event_loop, &self.settings.platform_config());
        self.state = Some(ViewerState::new(
            window,
            self.settings_path.clone(),
            self.settings.clone(),
        ));
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        // Settings reload happens here, between ticks, never mid-tick.
        let now = Instant::now();
        if now >= state.next_settings_poll {
            state.next_settings_poll = now + SETTINGS_POLL_INTERVAL;
            if state.settings_watcher.should_reload() {
                state.reload_settings("file watcher");
            }
        }

        if state.advance_ticks() {
            state.window.request_redraw();
        }

        let wake_at = if state.session.is_animating() && !state.paused {
            state.tick_clock.next_deadline()
        } else if state.debug_overlay.is_showing() {
            state.window.request_redraw();
            now + OVERLAY_REFRESH_INTERVAL
        } else {
            state.next_settings_poll
        };
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake_at));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                    state.window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                // Auto-repeat presses count as presses.
                if event.state == ElementState::Pressed {
                    if let Some(key) = map_key(&event.logical_key) {
                        state.handle_key(key, event_loop);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.render();
            }

            _ => {
                if egui_consumed {
                    state.window.request_redraw();
                }
            }
        }
    }
}

fn apply_projection(camera: &mut Camera3D, settings: &RigSettings) {
    camera.fov_y_deg = settings.camera.fov_y_deg;
    camera.near = settings.camera.near;
    camera.far = settings.camera.far;
}

fn map_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c)),
                _ => None,
            }
        }
        WinitKey::Named(NamedKey::ArrowLeft) => Some(Key::Left),
        WinitKey::Named(NamedKey::ArrowRight) => Some(Key::Right),
        WinitKey::Named(NamedKey::ArrowUp) => Some(Key::Up),
        WinitKey::Named(NamedKey::ArrowDown) => Some(Key::Down),
        WinitKey::Named(NamedKey::F1) => Some(Key::F1),
        WinitKey::Named(NamedKey::F3) => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Hierarchical robot viewer starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
