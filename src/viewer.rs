use std::path::{Path, PathBuf};

use log::{debug, error, info, trace};
use minifb::{Key, MouseButton};

use crate::config::ViewerConfig;
use crate::core::{
    geometry::{pyramid, Mesh},
    InteractionState, Projection, Scene, SceneObject, TransformController,
};
use crate::error::{CaptureError, GraphicsSetupError};
use crate::pipeline::{GraphicsBackend, Pipeline};

/// Everything the host can tell the viewer about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    KeyPressed(Key),
    KeyReleased(Key),
    MousePressed { button: MouseButton, x: f32, y: f32 },
    MouseReleased { button: MouseButton, x: f32, y: f32 },
    MouseMoved { x: f32, y: f32 },
    DoubleClick { button: MouseButton, x: f32, y: f32 },
    Wheel { delta: f32 },
    Resized { width: usize, height: usize },
    /// Periodic timer, fired at the host's frame rate
    Tick,
    SetRotation { x: i32, y: i32, z: i32 },
    SetScale(f32),
    ResetRotation,
    ResetScale,
    /// Write the current frame to the capture file
    Capture,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    Yes,
    No,
}

/// Owns the scene, the transform controller and the render pipeline, and
/// turns host events into state changes.
pub struct Viewer<G: GraphicsBackend> {
    scene: Scene,
    controller: TransformController,
    pipeline: Pipeline<G>,
    capture_path: PathBuf,
}

impl<G: GraphicsBackend> Viewer<G> {
    /// Builds the two-object scene (the fixed pyramid on the left, the
    /// loaded model on the right) and uploads it.
    pub fn new(backend: G, config: &ViewerConfig, model: &Mesh) -> Result<Self, GraphicsSetupError> {
        let mut scene = Scene::new(Projection::new(
            config.fov,
            config.aspect_ratio(),
            config.near,
            config.far,
        ));
        scene.add_object(SceneObject::new("pyramid", pyramid(), config.pyramid_translation));
        scene.add_object(SceneObject::new("model", model.to_vertices(), config.model_translation));
        for object in &scene.objects {
            info!("Scene object: {}", object);
        }

        let pipeline = Pipeline::new(backend, &scene, config.width, config.height, config.clear_color)?;
        let controller = TransformController::new();
        controller.apply(&mut scene.objects);

        Ok(Self {
            scene,
            controller,
            pipeline,
            capture_path: config.capture_path.clone(),
        })
    }

    pub fn handle(&mut self, event: Event) -> Redraw {
        match event {
            Event::KeyPressed(key) => info!("Key pressed: {:?}", key),
            Event::KeyReleased(key) => info!("Key released: {:?}", key),
            Event::MousePressed { button, x, y } => {
                info!("Mouse {:?} pressed at ({}, {})", button, x, y)
            }
            Event::MouseReleased { button, x, y } => {
                info!("Mouse {:?} released at ({}, {})", button, x, y)
            }
            Event::MouseMoved { x, y } => trace!("Mouse moved to ({}, {})", x, y),
            Event::DoubleClick { button, x, y } => {
                info!("Mouse {:?} double clicked at ({}, {})", button, x, y)
            }
            Event::Wheel { delta } => info!("Mouse wheel: {}", delta),
            Event::Resized { width, height } => {
                self.pipeline.resize(&mut self.scene, width, height);
            }
            Event::Tick => {}
            Event::SetRotation { x, y, z } => {
                self.controller.set_rotation(&mut self.scene.objects, x, y, z);
            }
            Event::SetScale(scale) => {
                self.controller.set_scale(&mut self.scene.objects, scale);
            }
            Event::ResetRotation => self.controller.reset_rotation(&mut self.scene.objects),
            Event::ResetScale => self.controller.reset_scale(&mut self.scene.objects),
            Event::Capture => {
                if let Err(e) = self.save_capture(&self.capture_path) {
                    error!("{}", e);
                }
                return Redraw::No;
            }
        }
        Redraw::Yes
    }

    pub fn draw(&mut self) {
        self.pipeline.render_frame(&self.scene);
    }

    pub fn save_capture(&self, path: impl AsRef<Path>) -> Result<(), CaptureError> {
        debug!("capturing {}x{} frame", self.pipeline.size().0, self.pipeline.size().1);
        self.pipeline.save_capture(path)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn interaction(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn backend(&self) -> &G {
        self.pipeline.backend()
    }
}
