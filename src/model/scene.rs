use glam::{Mat3, Mat4, Vec3};

/// Surface parameters consumed by the illumination models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    /// Phong and Blinn-Phong exponent.
    pub shininess: f32,
    /// GGX roughness.
    pub alpha: f32,
    /// Fresnel reflectance at normal incidence (Schlick).
    pub f0: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.1),
            diffuse_color: Vec3::splat(0.5),
            specular_color: Vec3::ONE,
            ka: 0.1,
            kd: 0.5,
            ks: 0.4,
            shininess: 25.0,
            alpha: 0.2,
            f0: 0.9,
        }
    }
}

impl Material {
    /// The ground only ever uses Lambert, so only the diffuse terms are set.
    pub fn ground() -> Self {
        Self {
            ambient_color: Vec3::ZERO,
            diffuse_color: Vec3::new(0.0, 0.5, 0.0),
            specular_color: Vec3::ZERO,
            ka: 0.0,
            kd: 0.5,
            ks: 0.0,
            shininess: 1.0,
            alpha: 1.0,
            f0: 0.0,
        }
    }
}

/// Placement of a drawable. The model matrix is rebuilt from identity every
/// frame as `translate * rotate_y(angle) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub translation: Vec3,
    pub scale: Vec3,
    /// Whether the shared spin angle is applied.
    pub spins: bool,
}

impl SceneObject {
    pub fn ground() -> Self {
        Self {
            translation: Vec3::new(0.0, -1.0, 0.0),
            scale: Vec3::new(10.0, 1.0, 10.0),
            spins: false,
        }
    }

    pub fn centerpiece() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            spins: true,
        }
    }

    pub fn model_matrix(&self, orientation_y_degrees: f32) -> Mat4 {
        let rotation = if self.spins {
            Mat4::from_rotation_y(orientation_y_degrees.to_radians())
        } else {
            Mat4::IDENTITY
        };
        Mat4::from_translation(self.translation) * rotation * Mat4::from_scale(self.scale)
    }
}

/// Inverse-transpose of the linear part of `view * model`, i.e. the normal
/// transform into camera space.
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model).inverse().transpose()
}

/// Spin and polygon-mode toggles plus the accumulated rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Degrees, kept in `[0, 360)`.
    pub orientation_y: f32,
    /// Degrees per second.
    pub spin_speed: f32,
    pub spinning: bool,
    pub wireframe: bool,
}

impl AnimationState {
    pub fn new(spin_speed: f32) -> Self {
        Self {
            orientation_y: 0.0,
            spin_speed,
            spinning: true,
            wireframe: false,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.spinning {
            self.orientation_y = (self.orientation_y + dt * self.spin_speed).rem_euclid(360.0);
        }
    }

    pub fn toggle_spinning(&mut self) {
        self.spinning = !self.spinning;
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat3_eq(a: Mat3, b: Mat3) {
        assert!(
            a.to_cols_array().iter().zip(b.to_cols_array()).all(|(x, y)| (x - y).abs() < 1e-5),
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn uniform_scale_normal_matrix() {
        let model = Mat4::from_scale(Vec3::splat(2.0));
        assert_mat3_eq(normal_matrix(Mat4::IDENTITY, model), Mat3::IDENTITY * 0.5);
    }

    #[test]
    fn normal_matrix_is_in_camera_space() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y)
            * Mat4::from_rotation_y(0.3);
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let expected = Mat3::from_mat4(view).inverse().transpose() * 0.5;
        assert_mat3_eq(normal_matrix(view, model), expected);
    }

    #[test]
    fn non_uniform_scale_keeps_normals_perpendicular() {
        let model = Mat4::from_scale(Vec3::new(10.0, 1.0, 10.0));
        let n = normal_matrix(Mat4::IDENTITY, model);
        // A 45° slope in object space, tangent (1, 1, 0) and normal (1, -1, 0).
        let tangent = Mat3::from_mat4(model) * Vec3::new(1.0, 1.0, 0.0);
        let normal = n * Vec3::new(1.0, -1.0, 0.0);
        assert!(tangent.dot(normal).abs() < 1e-5);
    }

    #[test]
    fn ground_is_lowered_and_stretched() {
        let m = SceneObject::ground().model_matrix(123.0);
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 1.0));
        assert!((p - Vec3::new(10.0, -1.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn centerpiece_rotates_about_y() {
        let m = SceneObject::centerpiece().model_matrix(90.0);
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn rotation_advances_by_speed_times_time() {
        let mut anim = AnimationState::new(30.0);
        for dt in [0.016, 0.017, 0.5, 0.25, 0.217] {
            anim.advance(dt);
        }
        assert!((anim.orientation_y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_wraps_at_full_turn() {
        let mut anim = AnimationState::new(30.0);
        anim.advance(13.0);
        assert!((anim.orientation_y - 30.0).abs() < 1e-3);
    }

    #[test]
    fn paused_rotation_does_not_advance() {
        let mut anim = AnimationState::new(30.0);
        anim.toggle_spinning();
        anim.advance(1.0);
        assert_eq!(anim.orientation_y, 0.0);
    }

    #[test]
    fn toggles_are_involutions() {
        let mut anim = AnimationState::new(30.0);
        let before = anim;
        anim.toggle_spinning();
        anim.toggle_spinning();
        anim.toggle_wireframe();
        anim.toggle_wireframe();
        assert_eq!(anim, before);
    }
}
