use glam::Vec3;

use crate::core::Color;

/// One render-ready vertex. The layout is what gets uploaded: position
/// (3 floats) immediately followed by color (3 floats).
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Vertex {
    pub pos: Vec3,
    pub color: Color,
}

impl Vertex {
    pub const fn new(pos: Vec3, color: Color) -> Self {
        Self { pos, color }
    }

    /// Vertex colored by the absolute value of its own position.
    pub fn from_position(pos: Vec3) -> Self {
        Self::new(pos, Color::from_position(pos))
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            color: Color::WHITE,
        }
    }
}

/// Attribute slots of the interleaved layout, shared by every object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: usize,
    pub offset: usize,
}

pub const VERTEX_STRIDE: usize = std::mem::size_of::<Vertex>();

pub const VERTEX_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        location: 0,
        components: 3,
        offset: std::mem::offset_of!(Vertex, pos),
    },
    VertexAttribute {
        location: 1,
        components: 3,
        offset: std::mem::offset_of!(Vertex, color),
    },
];
