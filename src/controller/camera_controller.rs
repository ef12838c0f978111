use crate::model::{Camera, CameraMovement};

use super::input::{Key, KeyState};

/// W/A/S/D bindings, checked once per frame
const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
];

/// Feeds held keys and mouse offsets into the camera
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraController;

impl CameraController {
    pub fn new() -> Self {
        Self
    }

    /// Apply mouse look delta to camera
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.process_mouse_movement(dx, dy);
    }

    /// Update camera position based on pressed keys
    pub fn update_movement(&self, camera: &mut Camera, keys: &KeyState, dt: f32) {
        for (key, direction) in MOVEMENT_KEYS {
            if keys.is_pressed(key) {
                camera.process_keyboard(direction, dt);
            }
        }
    }
}
