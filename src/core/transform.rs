use glam::{IVec3, Mat4, Vec3};
use log::debug;

use super::SceneObject;

/// What the user has dialed in. Angles are absolute degrees per axis, not
/// increments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    pub rotation: IVec3,
    pub scale: f32,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            rotation: IVec3::ZERO,
            scale: 1.0,
        }
    }
}

/// Build a model matrix: translate to `base`, rotate about X, then Y, then Z
/// (degrees), then scale uniformly.
pub fn model_matrix(base: Vec3, rotation: IVec3, scale: f32) -> Mat4 {
    Mat4::from_translation(base)
        * Mat4::from_rotation_x((rotation.x as f32).to_radians())
        * Mat4::from_rotation_y((rotation.y as f32).to_radians())
        * Mat4::from_rotation_z((rotation.z as f32).to_radians())
        * Mat4::from_scale(Vec3::splat(scale))
}

/// Owns the interaction state and rebuilds every object's model matrix
/// from it. Angles are not wrapped and the scale is not validated, so zero
/// or negative factors go straight into the matrix.
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    state: InteractionState,
}

impl TransformController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn set_rotation(&mut self, objects: &mut [SceneObject], x: i32, y: i32, z: i32) {
        self.state.rotation = IVec3::new(x, y, z);
        self.apply(objects);
    }

    pub fn set_scale(&mut self, objects: &mut [SceneObject], scale: f32) {
        self.state.scale = scale;
        self.apply(objects);
    }

    pub fn reset_rotation(&mut self, objects: &mut [SceneObject]) {
        self.set_rotation(objects, 0, 0, 0);
    }

    pub fn reset_scale(&mut self, objects: &mut [SceneObject]) {
        self.set_scale(objects, 1.0);
    }

    /// Recompute all model matrices together from the current state.
    pub fn apply(&self, objects: &mut [SceneObject]) {
        let InteractionState { rotation, scale } = self.state;
        debug!("rotation {:?} scale {}", rotation.to_array(), scale);
        for object in objects {
            object.model = model_matrix(object.base_translation, rotation, scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::pyramid;

    fn objects() -> Vec<SceneObject> {
        vec![
            SceneObject::new("pyramid", pyramid(), Vec3::new(-2.0, 0.0, -6.0)),
            SceneObject::new("model", pyramid(), Vec3::new(2.0, 0.0, -6.0)),
        ]
    }

    #[test]
    fn starts_at_base_translation() {
        let objs = objects();
        assert_eq!(objs[0].model, Mat4::from_translation(Vec3::new(-2.0, 0.0, -6.0)));
        assert_eq!(TransformController::new().state(), InteractionState::default());
    }

    #[test]
    fn rotation_state_is_absolute() {
        let mut stepped = objects();
        let mut ctl = TransformController::new();
        ctl.set_rotation(&mut stepped, 90, 0, 0);
        ctl.set_rotation(&mut stepped, 90, 90, 0);

        let mut direct = objects();
        TransformController::new().set_rotation(&mut direct, 90, 90, 0);

        for (a, b) in stepped.iter().zip(&direct) {
            assert_eq!(a.model, b.model);
        }
    }

    #[test]
    fn axis_order_is_x_then_y_then_z() {
        let m = model_matrix(Vec3::ZERO, IVec3::new(90, 90, 0), 1.0);
        let expected = Mat4::from_rotation_x(90f32.to_radians()) * Mat4::from_rotation_y(90f32.to_radians());
        assert!(m.abs_diff_eq(expected, 1e-6));

        // and it is not the same as composing the other way round
        let swapped = Mat4::from_rotation_y(90f32.to_radians()) * Mat4::from_rotation_x(90f32.to_radians());
        assert!(!m.abs_diff_eq(swapped, 1e-3));
    }

    #[test]
    fn translation_is_unaffected_by_rotation_and_scale() {
        let mut objs = objects();
        let mut ctl = TransformController::new();
        ctl.set_rotation(&mut objs, 30, 45, 60);
        ctl.set_scale(&mut objs, 2.5);
        for obj in &objs {
            let origin = obj.model.transform_point3(Vec3::ZERO);
            assert!(origin.abs_diff_eq(obj.base_translation, 1e-6));
        }
    }

    #[test]
    fn zero_scale_collapses_to_translation() {
        let mut objs = objects();
        let mut ctl = TransformController::new();
        ctl.set_rotation(&mut objs, 10, 20, 30);
        ctl.set_scale(&mut objs, 0.0);
        for obj in &objs {
            for v in &obj.vertices {
                assert_eq!(obj.model.transform_point3(v.pos), obj.base_translation);
            }
        }
    }

    #[test]
    fn negative_scale_passes_through() {
        let mut objs = objects();
        let mut ctl = TransformController::new();
        ctl.set_scale(&mut objs, -1.0);
        assert_eq!(ctl.state().scale, -1.0);
        let p = objs[0].model.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(-3.0, 0.0, -6.0), 1e-6));
    }

    #[test]
    fn angles_wrap_through_the_rotation() {
        let full = model_matrix(Vec3::ZERO, IVec3::new(360, -360, 720), 1.0);
        assert!(full.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn resets() {
        let mut objs = objects();
        let mut ctl = TransformController::new();
        ctl.set_rotation(&mut objs, 1, 2, 3);
        ctl.set_scale(&mut objs, 0.5);
        ctl.reset_rotation(&mut objs);
        assert_eq!(ctl.state().rotation, IVec3::ZERO);
        assert_eq!(ctl.state().scale, 0.5);
        ctl.reset_scale(&mut objs);
        assert_eq!(ctl.state(), InteractionState::default());
        assert_eq!(objs[1].model, Mat4::from_translation(Vec3::new(2.0, 0.0, -6.0)));
    }
}
