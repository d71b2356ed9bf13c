//! Debug overlay rendered via egui on top of the robot scene.
//!
//! egui needs a `RenderPass<'static>` while `begin_render_pass` borrows the
//! encoder, so rendering is split into phases:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The stats window only runs when `visible` is true (F3); the key help
//! window has its own toggle (F1). egui event handling is always active so
//! either window can take clicks while shown.

use rig_core::input::KEY_HELP;
use rig_core::pose::{AngleId, PoseState};
use rig_core::time::{FrameTimer, TickClock};
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub draw_calls: u32,
    pub primitive_count: u32,
    pub pose: PoseState,
    pub selected: Option<AngleId>,
    /// Labels of the tweens currently running
    pub running: Vec<&'static str>,
    pub body_size: f32,
    /// Whether animation ticks are paused
    pub paused: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance exactly one animation tick while paused
    pub single_step: bool,
    pub reset_pose: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
    pub help_visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
            help_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }

    /// True while any overlay window is on screen.
    pub fn is_showing(&self) -> bool {
        self.visible || self.help_visible
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        frames: &FrameTimer,
        ticks: &TickClock,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let visible = self.visible;
        let mut help_visible = self.help_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", frames.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", frames.smoothed_frame_time_ms));
                        ui.label(format!("Frame: {}", frames.frame_count));
                        ui.label(format!("Ticks this frame: {}", ticks.ticks_this_frame));
                        ui.label(format!("Total ticks: {}", ticks.total_ticks));
                        ui.label(format!(
                            "Draw calls: {} ({} primitives)",
                            stats.draw_calls, stats.primitive_count
                        ));
                        ui.label(format!("Body size: {:.2}", stats.body_size));

                        ui.separator();
                        ui.label(format!("Steering: {}", selection_label(stats.selected)));
                        ui.label(format!("Running: {}", running_label(&stats.running)));
                        egui::Grid::new("pose_table").striped(true).show(ui, |ui| {
                            for (label, degrees) in pose_rows(&stats.pose) {
                                ui.label(label);
                                ui.label(format!("{degrees:.2}\u{b0}"));
                                ui.end_row();
                            }
                        });

                        ui.separator();
                        ui.horizontal(|ui| {
                            let pause_label = if stats.paused { "Resume" } else { "Pause" };
                            if ui.button(pause_label).clicked() {
                                actions.toggle_pause = true;
                            }
                            if stats.paused && ui.button("Step").clicked() {
                                actions.single_step = true;
                            }
                            if ui.button("Reset pose").clicked() {
                                actions.reset_pose = true;
                            }
                        });
                        if stats.paused {
                            ui.label("\u{23f8} PAUSED");
                        }
                    });
            }

            if help_visible {
                egui::Window::new("Keys")
                    .open(&mut help_visible)
                    .default_pos([420.0, 10.0])
                    .show(ctx, |ui| {
                        egui::Grid::new("key_help").show(ui, |ui| {
                            for (keys, action) in KEY_HELP {
                                ui.monospace(*keys);
                                ui.label(*action);
                                ui.end_row();
                            }
                        });
                    });
            }
        });
        self.help_visible = help_visible;

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

pub fn pose_rows(pose: &PoseState) -> Vec<(&'static str, f32)> {
    AngleId::ALL
        .iter()
        .map(|id| (id.label(), pose.get(*id)))
        .collect()
}

pub fn selection_label(selected: Option<AngleId>) -> String {
    match selected {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

fn running_label(running: &[&'static str]) -> String {
    if running.is_empty() {
        "idle".to_string()
    } else {
        running.join(", ")
    }
}
