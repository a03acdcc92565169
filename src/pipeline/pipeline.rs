use std::path::Path;

use image::RgbImage;
use log::{debug, info};

use super::{
    shader::{FRAGMENT_SHADER, VERTEX_SHADER},
    BufferId, GraphicsBackend, RenderState, UniformLocation,
};
use crate::core::{Color, Scene};
use crate::error::{CaptureError, GraphicsSetupError};

pub const MODEL_UNIFORM: &str = "modelTransform";
pub const PROJECTION_UNIFORM: &str = "projectionTransform";

/// One uploaded scene object: which buffer holds it and how many vertices
/// to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawCall {
    buffer: BufferId,
    count: usize,
}

/// Drives a [`GraphicsBackend`] through the viewer's frame: clear, then for
/// every object set the projection and model uniforms and draw its
/// triangles.
///
/// Geometry is uploaded once in [`Pipeline::new`]; objects added to the
/// scene afterwards are not drawn.
pub struct Pipeline<G: GraphicsBackend> {
    backend: G,
    model_loc: UniformLocation,
    projection_loc: UniformLocation,
    draws: Vec<DrawCall>,
    width: usize,
    height: usize,
}

impl<G: GraphicsBackend> Pipeline<G> {
    pub fn new(
        mut backend: G,
        scene: &Scene,
        width: usize,
        height: usize,
        clear_color: Color,
    ) -> Result<Self, GraphicsSetupError> {
        backend.set_render_state(RenderState::default());
        backend.set_clear_color(clear_color);
        backend.create_program(VERTEX_SHADER, FRAGMENT_SHADER)?;

        let lookup = |name: &str| {
            backend
                .uniform_location(name)
                .ok_or_else(|| GraphicsSetupError::MissingUniform(name.to_string()))
        };
        let model_loc = lookup(MODEL_UNIFORM)?;
        let projection_loc = lookup(PROJECTION_UNIFORM)?;

        backend.set_viewport(width, height);

        let draws = scene
            .objects
            .iter()
            .map(|object| {
                debug!("uploading {}", object);
                DrawCall {
                    buffer: backend.upload(&object.vertices),
                    count: object.vertex_count(),
                }
            })
            .collect();

        info!("Pipeline ready at {}x{}", width, height);
        Ok(Self {
            backend,
            model_loc,
            projection_loc,
            draws,
            width,
            height,
        })
    }

    pub fn render_frame(&mut self, scene: &Scene) {
        self.backend.clear();
        let projection = scene.projection.matrix();
        for (object, draw) in scene.objects.iter().zip(&self.draws) {
            self.backend.set_uniform_mat4(self.projection_loc, &projection);
            self.backend.set_uniform_mat4(self.model_loc, &object.model);
            self.backend.bind(draw.buffer);
            self.backend.draw_triangles(0, draw.count);
        }
    }

    /// Track a new window size: the viewport and the projection's aspect
    /// ratio both follow it.
    pub fn resize(&mut self, scene: &mut Scene, width: usize, height: usize) {
        debug!("resize to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.backend.set_viewport(width, height);
        scene.projection.resize(width as u32, height as u32);
    }

    /// Read back whatever the last frame left in the color buffer.
    pub fn capture(&self) -> RgbImage {
        self.backend.read_pixels()
    }

    pub fn save_capture(&self, path: impl AsRef<Path>) -> Result<(), CaptureError> {
        let path = path.as_ref();
        self.capture().save(path).map_err(|source| CaptureError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved framebuffer to {}", path.display());
        Ok(())
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }
}
