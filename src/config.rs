use std::path::PathBuf;

use glam::Vec3;
use log::LevelFilter;

use crate::core::Color;

pub const DEFAULT_WIDTH: usize = 800;
pub const DEFAULT_HEIGHT: usize = 600;
pub const CAPTURE_FILE: &str = "framebuffer_contents.png";

/// Startup settings for the viewer. Everything has a default so the binary
/// runs with no arguments; `handle_clap_matches` overrides from the CLI.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub width: usize,
    pub height: usize,
    pub model_path: PathBuf,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: Color,
    pub pyramid_translation: Vec3,
    pub model_translation: Vec3,
    pub capture_path: PathBuf,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// Render a single frame to `capture_path` and exit instead of opening a window
    pub snapshot: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            model_path: PathBuf::from("assets/models/cube.obj"),
            fov: 60.0,
            near: 0.2,
            far: 20.0,
            clear_color: Color::new(0.37, 0.42, 0.45),
            pyramid_translation: Vec3::new(-2.0, 0.0, -6.0),
            model_translation: Vec3::new(2.0, 0.0, -6.0),
            capture_path: PathBuf::from(CAPTURE_FILE),
            log_level: LevelFilter::Info,
            log_file: None,
            snapshot: false,
        }
    }
}

impl ViewerConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
