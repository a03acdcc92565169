use std::fmt::{self, Display, Formatter};

use glam::{Mat4, Vec3};

use super::{camera::Projection, geometry::Vertex};

/// A drawable: flat triangle vertices plus where the object sits in the world.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub vertices: Vec<Vertex>,
    /// Fixed placement, never changed by rotation or scale
    pub base_translation: Vec3,
    pub model: Mat4,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, base_translation: Vec3) -> Self {
        Self {
            name: name.into(),
            vertices,
            base_translation,
            model: Mat4::from_translation(base_translation),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl Display for SceneObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} triangles at {})",
            self.name,
            self.vertex_count() / 3,
            self.base_translation
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub projection: Projection,
}

impl Scene {
    pub fn new(projection: Projection) -> Self {
        Self {
            objects: Vec::new(),
            projection,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::pyramid;

    #[test]
    fn object_reports_its_draw_count() {
        let obj = SceneObject::new("pyramid", pyramid(), Vec3::new(-2.0, 0.0, -6.0));
        assert_eq!(obj.vertex_count(), 18);
        assert_eq!(obj.to_string(), "pyramid (6 triangles at [-2, 0, -6])");
    }

    #[test]
    fn objects_keep_insertion_order() {
        let mut scene = Scene::default();
        scene.add_object(SceneObject::new("a", Vec::new(), Vec3::ZERO));
        scene.add_object(SceneObject::new("b", Vec::new(), Vec3::ONE));
        let names: Vec<_> = scene.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
