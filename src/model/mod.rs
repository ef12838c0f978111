// MODEL: Scene data, camera and mesh loading
pub mod camera;
pub mod loader;
pub mod scene;

pub use camera::{Camera, CameraMovement};
pub use loader::load_obj;
pub use scene::{normal_matrix, AnimationState, Material, SceneObject};
