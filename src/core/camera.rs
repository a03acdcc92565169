use glam::Mat4;

/// Perspective projection shared by every object in the scene. Only the
/// aspect ratio changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect_ratio: f32,
    /// Anything closer than this is clipped
    pub near: f32,
    /// Anything beyond this is clipped
    pub far: f32,
    matrix: Mat4,
}

impl Projection {
    pub fn new(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let mut out = Self {
            fov,
            aspect_ratio,
            near,
            far,
            matrix: Mat4::IDENTITY,
        };
        out.update_matrix();
        out
    }

    /// Recompute for a new viewport. A zero height is treated as one pixel
    /// so a minimised window never produces an infinite aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
        self.update_matrix();
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    fn update_matrix(&mut self) {
        self.matrix =
            Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect_ratio, self.near, self.far);
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(60.0, 4.0 / 3.0, 0.2, 20.0)
    }
}
