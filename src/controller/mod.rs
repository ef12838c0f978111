// CONTROLLER: Input, per-frame state updates
pub mod input;
pub mod winit_input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{EventQueue, InputEvent, InputSource, Key, KeyAction, KeyState, MouseTracker};
pub use winit_input::WinitInput;
pub use camera_controller::CameraController;
pub use frame_loop::{AppState, EventOutcome, FrameClock, FramePlan, GlobalUniform, ObjectUniform, SubroutineSelection};
