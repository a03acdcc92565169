mod mesh;
pub mod obj;
mod primitive;
mod vert;

pub use mesh::{align, unpack, Mesh};
pub use primitive::pyramid;
pub use vert::{Vertex, VertexAttribute, VERTEX_LAYOUT, VERTEX_STRIDE};
