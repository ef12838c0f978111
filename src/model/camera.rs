use glam::{Mat4, Vec3};

/// Pitch limit, slightly less than π/2 to avoid flipping over the pole.
const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera. Angles are in radians.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Radians per pixel of mouse travel.
    pub mouse_sensitivity: f32,
    /// Keeps the eye at its starting height while moving.
    pub on_ground: bool,
    ground_height: f32,
}

impl Camera {
    pub fn new(eye: Vec3, on_ground: bool) -> Self {
        Self {
            eye,
            yaw: -90f32.to_radians(),
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            aspect: 4.0 / 3.0,
            z_near: 0.1,
            z_far: 10000.0,
            movement_speed: 3.0,
            mouse_sensitivity: 0.25f32.to_radians(),
            on_ground,
            ground_height: eye.y,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch;
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target(), self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.eye += self.forward() * velocity,
            CameraMovement::Backward => self.eye -= self.forward() * velocity,
            CameraMovement::Left => self.eye -= self.right() * velocity,
            CameraMovement::Right => self.eye += self.right() * velocity,
        }
        if self.on_ground {
            self.eye.y = self.ground_height;
        }
    }

    /// Apply a mouse offset in pixels. Positive `dy` looks up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch = (self.pitch + dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}
