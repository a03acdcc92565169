use glam::{Vec2, Vec3, Vec4};
use log::trace;

use super::{FrameBuffer, RenderState};
use crate::core::Color;

/// Vertices this close to (or behind) the eye plane are not drawn.
const W_EPSILON: f32 = 1e-6;

/// A triangle corner after the vertex stage.
#[derive(Debug, Clone, Copy)]
pub struct ClipVertex {
    pub position: Vec4,
    pub color: Color,
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    pos: Vec2,
    depth: f32,
    inv_w: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RasterStats {
    pub culled: usize,
    pub rejected: usize,
    pub fragments: usize,
}

/// Fill one triangle into `target`. Front faces are counter-clockwise in
/// normalized device coordinates.
pub fn rasterize_triangle(
    tri: &[ClipVertex; 3],
    state: &RenderState,
    target: &mut FrameBuffer,
    stats: &mut RasterStats,
) {
    if tri.iter().any(|v| v.position.w <= W_EPSILON) {
        trace!("rejecting triangle crossing the eye plane");
        stats.rejected += 1;
        return;
    }

    let ndc = tri.map(|v| v.position.truncate() / v.position.w);

    let area = signed_area(ndc[0].truncate(), ndc[1].truncate(), ndc[2].truncate());
    if area == 0.0 || (state.cull_back_faces && area < 0.0) {
        stats.culled += 1;
        return;
    }

    let (width, height) = (target.width as f32, target.height as f32);
    let screen: [ScreenVertex; 3] = std::array::from_fn(|i| to_screen(ndc[i], tri[i].position.w, width, height));
    let colors = tri.map(|v| v.color);

    // Bounding box, clamped to the viewport
    let mut bbox_min = Vec2::splat(f32::MAX);
    let mut bbox_max = Vec2::splat(f32::MIN);
    for v in &screen {
        bbox_min = bbox_min.min(v.pos);
        bbox_max = bbox_max.max(v.pos);
    }
    let x0 = bbox_min.x.floor().max(0.0) as usize;
    let y0 = bbox_min.y.floor().max(0.0) as usize;
    let x1 = (bbox_max.x.ceil().min(width) as usize).min(target.width);
    let y1 = (bbox_max.y.ceil().min(height) as usize).min(target.height);

    let depth_test = state.depth_test.then_some(state.depth_func);
    let (p0, p1, p2) = (screen[0].pos, screen[1].pos, screen[2].pos);

    for y in y0..y1 {
        for x in x0..x1 {
            // Sample at the pixel center
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let Some((w0, w1, w2)) = barycentric(p, p0, p1, p2) else {
                continue;
            };
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0 * screen[0].depth + w1 * screen[1].depth + w2 * screen[2].depth;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }

            // perspective-correct weights for the color varying
            let pw = (
                w0 * screen[0].inv_w,
                w1 * screen[1].inv_w,
                w2 * screen[2].inv_w,
            );
            let sum = pw.0 + pw.1 + pw.2;
            let color = Color::blend3(&colors, (pw.0 / sum, pw.1 / sum, pw.2 / sum));

            if target.set_pixel((x, y), depth, color, depth_test) {
                stats.fragments += 1;
            }
        }
    }
}

/// Twice the signed area of a 2D triangle, positive when counter-clockwise
/// (y up).
fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// NDC to window coordinates: x right, y down, depth in [0, 1].
fn to_screen(ndc: Vec3, w: f32, width: f32, height: f32) -> ScreenVertex {
    ScreenVertex {
        pos: Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height),
        depth: ndc.z * 0.5 + 0.5,
        inv_w: 1.0 / w,
    }
}

fn barycentric(p: Vec2, v0: Vec2, v1: Vec2, v2: Vec2) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);
    if denom.abs() < 1e-10 {
        // Degenerate triangle
        return None;
    }
    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;
    Some((w0, w1, w2))
}
