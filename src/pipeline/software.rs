use glam::{Mat4, Vec4};
use image::RgbImage;
use log::{debug, warn};

use super::{
    rasterizer::{rasterize_triangle, ClipVertex, RasterStats},
    shader::{self, Program},
    BufferId, FrameBuffer, GraphicsBackend, RenderState, UniformLocation,
};
use crate::core::{geometry::Vertex, Color};
use crate::error::{GraphicsSetupError, ShaderStage};

/// CPU implementation of [`GraphicsBackend`]. Draws into its own
/// [`FrameBuffer`], which the host presents or reads back.
pub struct SoftwareBackend {
    framebuffer: FrameBuffer,
    buffers: Vec<Vec<Vertex>>,
    bound: Option<BufferId>,
    program: Option<Program>,
    uniforms: Vec<Mat4>,
    state: RenderState,
    clear_color: Color,
    stats: RasterStats,
}

impl SoftwareBackend {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height),
            buffers: Vec::new(),
            bound: None,
            program: None,
            uniforms: Vec::new(),
            state: RenderState::default(),
            clear_color: Color::BLACK,
            stats: RasterStats::default(),
        }
    }

    /// Current color buffer in 0RGB, row-major, top row first.
    pub fn frame(&self) -> &[u32] {
        &self.framebuffer.data
    }

    /// Raster counters since the last clear.
    pub fn stats(&self) -> RasterStats {
        self.stats
    }

    fn clip_transform(&self, program: &Program) -> Mat4 {
        program
            .position_chain()
            .iter()
            .fold(Mat4::IDENTITY, |acc, &loc| {
                acc * self.uniforms.get(loc).copied().unwrap_or(Mat4::IDENTITY)
            })
    }
}

impl GraphicsBackend for SoftwareBackend {
    fn set_render_state(&mut self, state: RenderState) {
        debug!("render state {:?}", state);
        self.state = state;
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<(), GraphicsSetupError> {
        let vs = shader::compile(ShaderStage::Vertex, vertex_src)?;
        let fs = shader::compile(ShaderStage::Fragment, fragment_src)?;
        let program = shader::link(&vs, &fs)?;
        debug!(
            "linked program with uniforms {:?}",
            program.uniforms().iter().map(|u| u.name.as_str()).collect::<Vec<_>>()
        );
        self.uniforms = vec![Mat4::IDENTITY; program.uniforms().len()];
        self.program = Some(program);
        Ok(())
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.program
            .as_ref()?
            .uniform_location(name)
            .map(UniformLocation)
    }

    fn upload(&mut self, vertices: &[Vertex]) -> BufferId {
        self.buffers.push(vertices.to_vec());
        BufferId(self.buffers.len() - 1)
    }

    fn set_viewport(&mut self, width: usize, height: usize) {
        if (width, height) != (self.framebuffer.width, self.framebuffer.height) {
            debug!("viewport {}x{}", width, height);
            self.framebuffer.resize(width, height);
        }
    }

    fn clear(&mut self) {
        self.framebuffer.clear(self.clear_color.to_u32());
        self.stats = RasterStats::default();
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        match self.uniforms.get_mut(location.0) {
            Some(slot) => *slot = *value,
            None => warn!("ignoring write to unknown uniform location {}", location.0),
        }
    }

    fn bind(&mut self, buffer: BufferId) {
        self.bound = Some(buffer);
    }

    fn draw_triangles(&mut self, first: usize, count: usize) {
        let Some(program) = self.program.as_ref() else {
            warn!("draw with no program bound");
            return;
        };
        let Some(vertices) = self.bound.and_then(|id| self.buffers.get(id.0)) else {
            warn!("draw with no vertex buffer bound");
            return;
        };

        let transform = self.clip_transform(program);
        let end = (first + count).min(vertices.len());
        let start = first.min(end);

        // trailing vertices that do not make a full triangle are ignored
        for tri in vertices[start..end].chunks_exact(3) {
            let clip: [ClipVertex; 3] = std::array::from_fn(|i| ClipVertex {
                position: transform * Vec4::from((tri[i].pos, 1.0)),
                color: tri[i].color,
            });
            rasterize_triangle(&clip, &self.state, &mut self.framebuffer, &mut self.stats);
        }
    }

    fn read_pixels(&self) -> RgbImage {
        self.framebuffer.to_image()
    }
}
