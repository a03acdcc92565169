use glam::Mat4;
use image::RgbImage;

use crate::core::{geometry::Vertex, Color};
use crate::error::GraphicsSetupError;

mod buffer;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod rasterizer;
pub mod shader;
pub mod software;

pub use buffer::FrameBuffer;
pub use pipeline::{Pipeline, MODEL_UNIFORM, PROJECTION_UNIFORM};
pub use software::SoftwareBackend;

/// Handle to a vertex buffer (and its attribute layout) living in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthFunc {
    Less,
    #[default]
    LessEqual,
    Always,
}

impl DepthFunc {
    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self {
            DepthFunc::Less => incoming < stored,
            DepthFunc::LessEqual => incoming <= stored,
            DepthFunc::Always => true,
        }
    }
}

/// Fixed-function switches set once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_func: DepthFunc,
    pub cull_back_faces: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_func: DepthFunc::LessEqual,
            cull_back_faces: true,
        }
    }
}

/// What the render pipeline needs from a graphics API. Calls mirror the
/// usual GL sequence: set state once, upload buffers once, then per frame
/// clear, set uniforms, bind and draw.
pub trait GraphicsBackend {
    fn set_render_state(&mut self, state: RenderState);
    fn set_clear_color(&mut self, color: Color);
    /// Compile and link a program from vertex and fragment source, and make it current.
    fn create_program(&mut self, vertex_src: &str, fragment_src: &str)
        -> Result<(), GraphicsSetupError>;
    fn uniform_location(&self, name: &str) -> Option<UniformLocation>;
    /// Copy interleaved position + color vertices into a new buffer.
    fn upload(&mut self, vertices: &[Vertex]) -> BufferId;
    fn set_viewport(&mut self, width: usize, height: usize);
    /// Clear both color and depth.
    fn clear(&mut self);
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);
    fn bind(&mut self, buffer: BufferId);
    /// Non-indexed triangle draw of `count` vertices from the bound buffer.
    fn draw_triangles(&mut self, first: usize, count: usize);
    fn read_pixels(&self) -> RgbImage;
}
