use std::{
    fmt::Display,
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;

pub mod config;
pub mod controls;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod util;
pub mod viewer;

pub use config::ViewerConfig;
pub use crate::core::geometry;
pub use crate::core::geometry::Mesh;
pub use crate::core::Color;
pub use crate::core::Scene;
pub use error::ViewerError;
pub use util::format_mat4;
pub use viewer::{Event, Redraw, Viewer};

/// Frame timing shown in the window title.
pub struct Metrics {
    pub last_frame: Instant,
    pub frame_time: Duration,
    pub fps_counter: u32,
    pub fps_update_timer: Instant,
    pub current_fps: f32,
    pub frame_times: Vec<f32>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            frame_time: Duration::from_secs_f32(1.0 / 60.0),
            fps_counter: 0,
            fps_update_timer: Instant::now(),
            current_fps: 0.0,
            frame_times: Vec::with_capacity(120),
        }
    }

    /// Record one presented frame. Returns true once per second, when the
    /// averages have been refreshed.
    pub fn frame(&mut self, now: Instant) -> bool {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.fps_counter += 1;
        self.frame_times.push(delta.as_secs_f32() * 1000.0);

        let elapsed = now.saturating_duration_since(self.fps_update_timer);
        if elapsed < Duration::from_secs(1) {
            return false;
        }
        self.current_fps = self.fps_counter as f32 / elapsed.as_secs_f32();
        self.frame_time = elapsed / self.fps_counter.max(1);
        self.fps_counter = 0;
        self.fps_update_timer = now;
        true
    }

    /// Drop the per-frame samples after they have been shown.
    pub fn reset_samples(&mut self) {
        self.frame_times.clear();
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FPS: {:.2} | Avg: {:.2}ms | Min: {:.2}ms | Max: {:.2}ms",
            self.current_fps,
            self.frame_time.as_secs_f32() * 1000.0,
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::min)
                .unwrap_or(0.0),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::max)
                .unwrap_or(0.0)
        )
    }
}

pub fn create_clap_command() -> Command {
    Command::new("mesh_viewer")
        .about("Interactive OBJ mesh viewer")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("model")
                .short('f')
                .long("model")
                .value_name("FILE")
                .help("Path to the .obj model shown on the right. If not supplied, the bundled cube is used.")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .help("Initial window width")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .help("Initial window height")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Console and file log verbosity")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Also append log output to this file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .help("Render a single frame to framebuffer_contents.png and exit")
                .action(ArgAction::SetTrue),
        )
}

pub fn handle_clap_matches(matches: &clap::ArgMatches) -> ViewerConfig {
    let mut config = ViewerConfig::default();

    if let Some(model) = matches.get_one::<PathBuf>("model") {
        config.model_path = model.clone();
    }
    if let Some(&width) = matches.get_one::<u32>("width") {
        config.width = width as usize;
    }
    if let Some(&height) = matches.get_one::<u32>("height") {
        config.height = height as usize;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.log_level = level.parse().unwrap_or(LevelFilter::Info);
    }
    config.log_file = matches.get_one::<PathBuf>("log-file").cloned();
    config.snapshot = matches.get_flag("snapshot");

    config
}
