use std::time::Instant;

use glam::{Mat3, Mat4, Vec3};

use crate::config::AppConfig;
use crate::model::{normal_matrix, AnimationState, Camera, Material, SceneObject};
use crate::view::subroutine::SubroutineTable;

use super::camera_controller::CameraController;
use super::input::{InputEvent, InputSource, Key, KeyAction, KeyState, MouseTracker};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub point_light_position: [f32; 4],
}

impl GlobalUniform {
    pub fn new(projection: Mat4, view: Mat4, light: Vec3) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            point_light_position: light.extend(1.0).to_array(),
        }
    }
}

/// Per-object block. `normal_matrix` columns are padded to 16 bytes as WGSL
/// lays out `mat3x3<f32>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
    pub ambient_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 4],
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub shininess: f32,
    pub alpha: f32,
    pub f0: f32,
    pub _pad: [f32; 2],
}

impl ObjectUniform {
    pub fn new(model: Mat4, normal: Mat3, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
            ambient_color: material.ambient_color.extend(1.0).to_array(),
            diffuse_color: material.diffuse_color.extend(1.0).to_array(),
            specular_color: material.specular_color.extend(1.0).to_array(),
            ka: material.ka,
            kd: material.kd,
            ks: material.ks,
            shininess: material.shininess,
            alpha: material.alpha,
            f0: material.f0,
            _pad: [0.0; 2],
        }
    }
}

/// Everything the GPU side needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub globals: GlobalUniform,
    pub plane: ObjectUniform,
    pub mesh: ObjectUniform,
    pub wireframe: bool,
    /// Selected table index and its subroutine name; `None` skips the main mesh.
    pub subroutine: Option<(usize, String)>,
}

/// Index into the subroutine table chosen with keys 1-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubroutineSelection {
    index: Option<usize>,
}

impl SubroutineSelection {
    /// Second entry when there is one, else the first.
    pub fn initial(table: &SubroutineTable) -> Self {
        let index = match table.len() {
            0 => None,
            1 => Some(0),
            _ => Some(1),
        };
        Self { index }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Digit `n` in 1-9 selects entry `n - 1` if the table has it.
    /// Returns the new index, or `None` when the digit was ignored.
    pub fn select(&mut self, digit: u8, table: &SubroutineTable) -> Option<usize> {
        if !(1..=9).contains(&digit) {
            return None;
        }
        let index = usize::from(digit - 1);
        if index >= table.len() {
            return None;
        }
        self.index = Some(index);
        Some(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Handled,
    CloseRequested,
    SubroutineSelected { index: usize, name: String },
}

/// All mutable viewer state, owned by the frame loop.
pub struct AppState {
    pub table: SubroutineTable,
    pub selection: SubroutineSelection,
    pub animation: AnimationState,
    pub keys: KeyState,
    pub mouse: MouseTracker,
    pub camera: Camera,
    pub controller: CameraController,
    pub plane: SceneObject,
    pub mesh: SceneObject,
    pub plane_material: Material,
    pub mesh_material: Material,
    pub point_light_position: Vec3,
    pub close_requested: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, table: SubroutineTable) -> Self {
        let mut camera = Camera::new(config.camera_position, true);
        camera.fov_y = config.fov_y_degrees.to_radians();
        camera.aspect = config.aspect();
        camera.z_near = config.z_near;
        camera.z_far = config.z_far;

        Self {
            selection: SubroutineSelection::initial(&table),
            table,
            animation: AnimationState::new(config.spin_speed),
            keys: KeyState::new(),
            mouse: MouseTracker::new(),
            camera,
            controller: CameraController::new(),
            plane: SceneObject::ground(),
            mesh: SceneObject::centerpiece(),
            plane_material: config.plane_material,
            mesh_material: config.mesh_material,
            point_light_position: config.point_light_position,
            close_requested: false,
        }
    }

    pub fn current_subroutine(&self) -> Option<(usize, &str)> {
        let index = self.selection.index()?;
        self.table.get(index).map(|name| (index, name))
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match *event {
            InputEvent::Key { key, action } => {
                self.keys.apply(key, action);
                if action == KeyAction::Press {
                    self.handle_press(key)
                } else {
                    EventOutcome::Handled
                }
            }
            InputEvent::CursorMoved { x, y } => {
                let (dx, dy) = self.mouse.delta(x, y);
                self.controller.apply_look(&mut self.camera, dx, dy);
                EventOutcome::Handled
            }
            InputEvent::CloseRequested => {
                self.close_requested = true;
                EventOutcome::CloseRequested
            }
        }
    }

    fn handle_press(&mut self, key: Key) -> EventOutcome {
        match key {
            Key::Escape => {
                self.close_requested = true;
                EventOutcome::CloseRequested
            }
            Key::P => {
                self.animation.toggle_spinning();
                EventOutcome::Handled
            }
            Key::L => {
                self.animation.toggle_wireframe();
                EventOutcome::Handled
            }
            Key::Digit(digit) => match self.selection.select(digit, &self.table) {
                Some(index) => {
                    let name = self.table.get(index).unwrap_or_default().to_string();
                    tracing::info!("Current shader subroutine: {name}");
                    EventOutcome::SubroutineSelected { index, name }
                }
                None => EventOutcome::Ignored,
            },
            Key::W | Key::A | Key::S | Key::D => EventOutcome::Handled,
        }
    }

    /// Drain the input source and apply every event in arrival order.
    pub fn dispatch(&mut self, source: &mut impl InputSource) {
        for event in source.poll_events() {
            self.handle_event(&event);
        }
    }

    /// Advance one frame: input, movement, rotation, then the draw plan.
    pub fn update(&mut self, source: &mut impl InputSource, dt: f32) -> FramePlan {
        self.dispatch(source);
        self.controller.update_movement(&mut self.camera, &self.keys, dt);
        self.animation.advance(dt);
        self.plan()
    }

    pub fn plan(&self) -> FramePlan {
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();

        let plane_model = self.plane.model_matrix(self.animation.orientation_y);
        let mesh_model = self.mesh.model_matrix(self.animation.orientation_y);

        FramePlan {
            globals: GlobalUniform::new(projection, view, self.point_light_position),
            plane: ObjectUniform::new(plane_model, normal_matrix(view, plane_model), &self.plane_material),
            mesh: ObjectUniform::new(mesh_model, normal_matrix(view, mesh_model), &self.mesh_material),
            wireframe: self.animation.wireframe,
            subroutine: self
                .current_subroutine()
                .map(|(index, name)| (index, name.to_string())),
        }
    }
}

/// Wall-clock frame timer. The delta is not clamped.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self { last: Instant::now() }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::EventQueue;

    fn models() -> SubroutineTable {
        SubroutineTable::new(
            ["Lambert", "Phong", "BlinnPhong", "GGX"].map(String::from).to_vec(),
        )
    }

    fn table_of(n: usize) -> SubroutineTable {
        SubroutineTable::new((0..n).map(|i| format!("model{i}")).collect())
    }

    fn press(key: Key) -> InputEvent {
        InputEvent::Key { key, action: KeyAction::Press }
    }

    fn state() -> AppState {
        AppState::new(&AppConfig::default(), models())
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 144);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 192);
    }

    #[test]
    fn initial_selection_prefers_second_entry() {
        assert_eq!(SubroutineSelection::initial(&table_of(0)).index(), None);
        assert_eq!(SubroutineSelection::initial(&table_of(1)).index(), Some(0));
        assert_eq!(SubroutineSelection::initial(&models()).index(), Some(1));
    }

    #[test]
    fn digit_selects_iff_in_range() {
        for len in 0..=10 {
            let table = table_of(len);
            for digit in 1..=9u8 {
                let mut selection = SubroutineSelection::initial(&table);
                let before = selection.index();
                let result = selection.select(digit, &table);
                let index = usize::from(digit - 1);
                if index < len {
                    assert_eq!(result, Some(index));
                    assert_eq!(selection.index(), Some(index));
                } else {
                    assert_eq!(result, None);
                    assert_eq!(selection.index(), before);
                }
            }
        }
    }

    #[test]
    fn digit_zero_is_ignored() {
        let mut selection = SubroutineSelection::initial(&models());
        assert_eq!(selection.select(0, &models()), None);
        assert_eq!(selection.index(), Some(1));
    }

    #[test]
    fn digit_three_then_seven() {
        let mut app = state();
        assert_eq!(
            app.handle_event(&press(Key::Digit(3))),
            EventOutcome::SubroutineSelected { index: 2, name: "BlinnPhong".to_string() }
        );
        assert_eq!(app.handle_event(&press(Key::Digit(7))), EventOutcome::Ignored);
        assert_eq!(app.current_subroutine(), Some((2, "BlinnPhong")));
    }

    #[test]
    fn repeated_digit_reports_each_press() {
        let mut app = state();
        let first = app.handle_event(&press(Key::Digit(4)));
        let second = app.handle_event(&press(Key::Digit(4)));
        assert_eq!(first, second);
        assert_eq!(app.selection.index(), Some(3));
    }

    /// Log sink for asserting on emitted diagnostics.
    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLog {
        fn selection_lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .filter(|line| line.contains("Current shader subroutine:"))
                .map(str::to_string)
                .collect()
        }
    }

    fn with_captured_log(f: impl FnOnce()) -> CapturedLog {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        log
    }

    #[test]
    fn selection_logs_one_line_per_valid_press() {
        let mut app = state();
        let log = with_captured_log(|| {
            app.handle_event(&press(Key::Digit(3)));
        });
        let lines = log.selection_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("Current shader subroutine: BlinnPhong"), "{lines:?}");

        let log = with_captured_log(|| {
            app.handle_event(&press(Key::Digit(7)));
            app.handle_event(&press(Key::Digit(0)));
        });
        assert!(log.selection_lines().is_empty());

        let log = with_captured_log(|| {
            app.handle_event(&press(Key::Digit(4)));
            app.handle_event(&press(Key::Digit(4)));
        });
        assert_eq!(log.selection_lines().len(), 2);
        assert_eq!(app.selection.index(), Some(3));
    }

    #[test]
    fn key_repeat_does_not_toggle() {
        let mut app = state();
        app.handle_event(&press(Key::P));
        app.handle_event(&InputEvent::Key { key: Key::P, action: KeyAction::Repeat });
        assert!(!app.animation.spinning);
    }

    #[test]
    fn double_toggles_restore_state() {
        let mut app = state();
        let before = app.animation;
        for key in [Key::P, Key::P, Key::L, Key::L] {
            app.handle_event(&press(key));
            app.handle_event(&InputEvent::Key { key, action: KeyAction::Release });
        }
        assert_eq!(app.animation, before);
    }

    #[test]
    fn escape_and_close_request_end_loop() {
        let mut app = state();
        assert_eq!(app.handle_event(&press(Key::Escape)), EventOutcome::CloseRequested);
        assert!(app.close_requested);

        let mut app = state();
        app.handle_event(&InputEvent::CloseRequested);
        assert!(app.close_requested);
    }

    #[test]
    fn mouse_moves_camera_after_first_event() {
        let mut app = state();
        let yaw = app.camera.yaw;
        app.handle_event(&InputEvent::CursorMoved { x: 400.0, y: 300.0 });
        assert_eq!(app.camera.yaw, yaw);
        app.handle_event(&InputEvent::CursorMoved { x: 440.0, y: 300.0 });
        assert!(app.camera.yaw > yaw);
    }

    #[test]
    fn update_dispatches_then_animates() {
        let mut app = state();
        let mut queue = EventQueue::new();
        queue.push(press(Key::Digit(1)));
        queue.push(press(Key::W));

        let plan = app.update(&mut queue, 0.5);
        assert_eq!(plan.subroutine, Some((0, "Lambert".to_string())));
        assert!((app.animation.orientation_y - 15.0).abs() < 1e-4);
        assert!((app.camera.eye.z - 2.5).abs() < 1e-4);

        // W is still held on the next frame.
        app.update(&mut queue, 0.5);
        assert!((app.camera.eye.z - 1.0).abs() < 1e-4);
        assert!((app.animation.orientation_y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn paused_spin_keeps_orientation() {
        let mut app = state();
        let mut queue = EventQueue::new();
        queue.push(press(Key::P));
        app.update(&mut queue, 1.0);
        assert_eq!(app.animation.orientation_y, 0.0);
    }

    #[test]
    fn plan_carries_materials_and_light() {
        let app = state();
        let plan = app.plan();
        assert_eq!(plan.globals.point_light_position, [0.0, 2.5, 4.0, 1.0]);
        assert_eq!(plan.plane.diffuse_color, [0.0, 0.5, 0.0, 1.0]);
        assert_eq!(plan.mesh.shininess, 25.0);
        assert!(!plan.wireframe);
        assert_eq!(plan.subroutine, Some((1, "Phong".to_string())));
    }

    #[test]
    fn empty_table_skips_main_mesh() {
        let app = AppState::new(&AppConfig::default(), SubroutineTable::default());
        assert_eq!(app.plan().subroutine, None);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = FrameClock::start();
        assert!(clock.tick() >= 0.0);
    }
}
