use glam::Vec3;

use super::Vertex;
use crate::core::Color;

/// Square pyramid with its base on z = 1 and apex at z = -1. Vertices are
/// already laid out three per triangle, counter-clockwise from outside.
pub fn pyramid() -> Vec<Vertex> {
    let a = Vertex::new(Vec3::new(-1.0, 1.0, 1.0), Color::RED);
    let b = Vertex::new(Vec3::new(1.0, 1.0, 1.0), Color::GREEN);
    let c = Vertex::new(Vec3::new(0.0, 0.0, -1.0), Color::MAGENTA);
    let d = Vertex::new(Vec3::new(1.0, -1.0, 1.0), Color::YELLOW);
    let e = Vertex::new(Vec3::new(-1.0, -1.0, 1.0), Color::BLUE);

    #[rustfmt::skip]
    let verts = vec![
        a, e, d,  b, a, d, // base
        d, c, b,  b, c, a,
        a, c, e,  e, c, d,
    ];
    verts
}
