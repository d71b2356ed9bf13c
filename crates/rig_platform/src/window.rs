use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub const DEFAULT_TITLE: &str = "3D Hierarchical Example";
pub const DEFAULT_WIDTH: u32 = 650;
pub const DEFAULT_HEIGHT: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl PlatformConfig {
    /// Window attributes for this config. Zero sizes fall back to the defaults.
    pub fn attributes(&self) -> WindowAttributes {
        let width = if self.width == 0 { DEFAULT_WIDTH } else { self.width };
        let height = if self.height == 0 { DEFAULT_HEIGHT } else { self.height };
        WindowAttributes::default()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height))
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let window = event_loop
        .create_window(config.attributes())
        .expect("Failed to create window");
    log::info!(
        "Window '{}' created: {}x{}",
        config.title,
        config.width,
        config.height
    );
    Arc::new(window)
}
