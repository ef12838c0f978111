use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use illumination::{
    controller::{AppState, FrameClock, WinitInput},
    logging,
    model::load_obj,
    view::{DriverLimits, GpuContext, RenderState, ShaderProgram, SubroutineRegistry},
    AppConfig, StartupError,
};

/// Everything that exists once the window is up.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    // Dropped after the pipelines built from it.
    _program: ShaderProgram,
    state: AppState,
    input: WinitInput,
    clock: FrameClock,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, StartupError> {
        let attributes = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = pollster::block_on(GpuContext::new(&instance, surface, size.width, size.height))?;

        let program = ShaderProgram::load(
            &gpu.device,
            &config.assets.vertex_shader,
            &config.assets.fragment_shader,
        )?;
        let registry = SubroutineRegistry::discover(
            &program.fragment_ir,
            DriverLimits::from_limits(&gpu.device.limits()),
        );
        registry.log_report();

        let plane_mesh = load_obj(&config.assets.plane_mesh)?.upload(&gpu.device, "plane");
        let main_mesh = load_obj(&config.assets.main_mesh)?.upload(&gpu.device, "main_mesh");

        let render_state = RenderState::new(
            &gpu,
            &program,
            &registry.table,
            plane_mesh,
            main_mesh,
            config.clear_color,
        )?;

        let mut state = AppState::new(config, registry.table);
        state.camera.set_aspect(size.width, size.height);
        if let Some((_, name)) = state.current_subroutine() {
            tracing::info!("Current shader subroutine: {name}");
        }

        window.set_cursor_visible(false);
        let locked = grab_cursor(&window);

        Ok(Self {
            window,
            gpu,
            render_state,
            _program: program,
            state,
            input: WinitInput::new(locked),
            clock: FrameClock::start(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.render_state.resize(&self.gpu.device, width, height);
        self.state.camera.set_aspect(width, height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        let plan = self.state.update(&mut self.input, dt);

        match self.render_state.draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface, &plan) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, stopping");
                event_loop.exit();
            }
            Err(e) => tracing::warn!("Skipped frame: {e}"),
        }

        if self.state.close_requested {
            event_loop.exit();
        }
    }
}

/// Locked gives raw motion with the cursor pinned; Confined still reports
/// absolute positions. Returns whether the cursor is locked.
fn grab_cursor(window: &Window) -> bool {
    if window.set_cursor_grab(CursorGrabMode::Locked).is_ok() {
        return true;
    }
    if let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined) {
        tracing::warn!("Could not grab cursor: {e}");
    }
    false
}

struct App {
    config: AppConfig,
    viewer: Option<Viewer>,
    failure: Option<StartupError>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        match Viewer::new(event_loop, &self.config) {
            Ok(viewer) => {
                viewer.window.request_redraw();
                self.viewer = Some(viewer);
            }
            Err(e) => {
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if window_id != viewer.window.id() {
            return;
        }

        viewer.input.handle_window_event(&event);
        match event {
            WindowEvent::Resized(size) => viewer.resize(size.width, size.height),
            WindowEvent::RedrawRequested => viewer.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.input.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(viewer) = &self.viewer {
            viewer.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.viewer = None;
    }
}

fn run(config: AppConfig) -> Result<(), StartupError> {
    let event_loop = EventLoop::new()?;
    let mut app = App {
        config,
        viewer: None,
        failure: None,
    };
    event_loop.run_app(&mut app)?;
    match app.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    logging::init();

    let config = AppConfig::from_env();
    if let Err(e) = run(config) {
        tracing::error!("{e}");
        std::process::exit(-1);
    }
}
