use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use log::info;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use mesh_viewer::{
    controls::{Command, Controls},
    create_clap_command,
    error::{GraphicsSetupError, LoadError},
    handle_clap_matches,
    pipeline::SoftwareBackend,
    util::format_scene_matrices,
    Event, Mesh, Metrics, Redraw, Viewer, ViewerConfig, ViewerError,
};

const TITLE: &str = "Mesh Viewer";
const TARGET_FPS: usize = 60;
/// Two presses of the same button closer than this make a double click
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const MOUSE_BUTTONS: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

fn main() -> Result<(), ViewerError> {
    let matches = create_clap_command().get_matches();
    let config = handle_clap_matches(&matches);
    init_logging(&config)?;

    let mesh = Mesh::from_obj_or_empty(&config.model_path).map_err(LoadError::from)?;
    let backend = SoftwareBackend::new(config.width, config.height);
    let mut viewer = Viewer::new(backend, &config, &mesh)?;

    if config.snapshot {
        viewer.draw();
        viewer.save_capture(&config.capture_path)?;
        return Ok(());
    }

    run_window(viewer, &config)
}

fn init_logging(config: &ViewerConfig) -> Result<(), ViewerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        let log_file = OpenOptions::new().create(true).append(true).open(path)?;
        loggers.push(WriteLogger::new(config.log_level, Config::default(), log_file));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Mouse state carried between frames, for edge and double-click detection.
#[derive(Default)]
struct MouseTracker {
    pos: Option<(f32, f32)>,
    down: [bool; 3],
    last_press: Option<(MouseButton, Instant)>,
}

fn run_window(mut viewer: Viewer<SoftwareBackend>, config: &ViewerConfig) -> Result<(), ViewerError> {
    let window_err = |e: minifb::Error| GraphicsSetupError::Window(e.to_string());
    let mut window = Window::new(
        TITLE,
        config.width,
        config.height,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )
    .map_err(window_err)?;
    window.set_target_fps(TARGET_FPS);

    let mut controls = Controls::new();
    let mut metrics = Metrics::new();
    let mut mouse = MouseTracker::default();
    let mut size = (config.width, config.height);

    viewer.draw();

    'main: while window.is_open() {
        let mut events = Vec::new();

        let (w, h) = window.get_size();
        // minimised windows report 0x0, keep the last real size
        if (w, h) != size && w > 0 && h > 0 {
            size = (w, h);
            events.push(Event::Resized { width: w, height: h });
        }

        let shift = window.is_key_down(Key::LeftShift) || window.is_key_down(Key::RightShift);
        for key in window.get_keys_pressed(KeyRepeat::Yes) {
            events.push(Event::KeyPressed(key));
            match controls.key_pressed(key, shift) {
                Some(Command::Send(event)) => events.push(event),
                Some(Command::Quit) => break 'main,
                None if key == Key::M => info!("\n{}", format_scene_matrices(viewer.scene())),
                None => {}
            }
        }
        for key in window.get_keys_released() {
            events.push(Event::KeyReleased(key));
        }

        poll_mouse(&window, &mut mouse, &mut events);
        if let Some((_, dy)) = window.get_scroll_wheel() {
            if dy != 0.0 {
                events.push(Event::Wheel { delta: dy });
                events.extend(controls.wheel(dy));
            }
        }

        events.push(Event::Tick);

        let mut redraw = false;
        for event in events {
            redraw |= viewer.handle(event) == Redraw::Yes;
        }
        if redraw {
            viewer.draw();
        }

        window
            .update_with_buffer(viewer.backend().frame(), size.0, size.1)
            .map_err(window_err)?;

        if metrics.frame(Instant::now()) {
            window.set_title(&format!("{} | {}", TITLE, metrics));
            metrics.reset_samples();
        }
    }

    info!("Window closed");
    Ok(())
}

fn poll_mouse(window: &Window, mouse: &mut MouseTracker, events: &mut Vec<Event>) {
    let pos = window.get_mouse_pos(MouseMode::Discard);
    if let Some((x, y)) = pos {
        if mouse.pos != pos {
            events.push(Event::MouseMoved { x, y });
        }
    }
    mouse.pos = pos;
    let (x, y) = pos.unwrap_or_default();

    for (i, button) in MOUSE_BUTTONS.into_iter().enumerate() {
        let down = window.get_mouse_down(button);
        if down == mouse.down[i] {
            continue;
        }
        mouse.down[i] = down;

        if !down {
            events.push(Event::MouseReleased { button, x, y });
            continue;
        }

        let now = Instant::now();
        match mouse.last_press {
            Some((last, at)) if last == button && now.duration_since(at) < DOUBLE_CLICK => {
                events.push(Event::DoubleClick { button, x, y });
                mouse.last_press = None;
            }
            _ => {
                events.push(Event::MousePressed { button, x, y });
                mouse.last_press = Some((button, now));
            }
        }
    }
}
