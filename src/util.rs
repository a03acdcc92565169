use glam::Mat4;

use crate::core::Scene;

pub fn format_mat4(name: &str, mat: &Mat4) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}:\n", name));

    // printed by row
    for (row, label) in ["x", "y", "z", "w"].into_iter().enumerate() {
        let r = mat.row(row);
        output.push_str(&format!(
            "{}: [{:8.3},{:8.3},{:8.3},{:8.3}]\n",
            label, r.x, r.y, r.z, r.w
        ));
    }

    output
}

/// Projection plus every model matrix, for the debug key.
pub fn format_scene_matrices(scene: &Scene) -> String {
    let mut output = format_mat4(crate::pipeline::PROJECTION_UNIFORM, &scene.projection.matrix());
    for object in &scene.objects {
        output.push_str(&format_mat4(&object.name, &object.model));
    }
    output
}
