pub mod camera;
pub mod color;
pub mod geometry;
pub mod scene;
pub mod transform;

pub use camera::Projection;
pub use color::Color;
pub use scene::{Scene, SceneObject};
pub use transform::{InteractionState, TransformController};
