//! Startup configuration.
//!
//! Everything the viewer needs before the first frame lives here: window
//! geometry, asset locations, the scene constants and the two materials.
//! Asset paths can be redirected through the environment:
//!
//! - `ILLUMINATION_ASSETS`: root directory holding `shaders/` and `models/`
//! - `ILLUMINATION_MESH`: mesh file drawn with the swappable shading

use std::env;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::model::Material;

pub const ASSETS_ENV: &str = "ILLUMINATION_ASSETS";
pub const MESH_ENV: &str = "ILLUMINATION_MESH";

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "illumination models".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Files loaded at startup. Any of them failing to load aborts the process.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub plane_mesh: PathBuf,
    pub main_mesh: PathBuf,
}

impl AssetPaths {
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            vertex_shader: root.join("shaders/illumination_models.vert.wgsl"),
            fragment_shader: root.join("shaders/illumination_models.frag.wgsl"),
            plane_mesh: root.join("models/plane.obj"),
            main_mesh: root.join("models/sphere.obj"),
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::under("assets")
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub assets: AssetPaths,
    pub clear_color: [f64; 4],
    pub camera_position: Vec3,
    pub point_light_position: Vec3,
    /// Degrees per second around Y while spinning.
    pub spin_speed: f32,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub plane_material: Material,
    pub mesh_material: Material,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetPaths::default(),
            clear_color: [0.26, 0.46, 0.98, 1.0],
            camera_position: Vec3::new(0.0, 0.0, 4.0),
            point_light_position: Vec3::new(0.0, 2.5, 4.0),
            spin_speed: 30.0,
            fov_y_degrees: 45.0,
            z_near: 0.1,
            z_far: 10000.0,
            plane_material: Material::ground(),
            mesh_material: Material::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, with asset locations overridden from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = env::var(ASSETS_ENV) {
            config.assets = AssetPaths::under(root);
        }
        if let Ok(mesh) = env::var(MESH_ENV) {
            config.assets.main_mesh = PathBuf::from(mesh);
        }
        tracing::debug!(assets = ?config.assets, "configuration loaded");
        config
    }

    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height as f32
    }
}
