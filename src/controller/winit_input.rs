//! winit adapter for [`InputSource`].
//!
//! Window and device events are translated as they arrive and queued until the
//! frame loop drains them.

use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::input::{EventQueue, InputEvent, InputSource, Key, KeyAction};

pub fn translate_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyL => Key::L,
        KeyCode::Digit0 => Key::Digit(0),
        KeyCode::Digit1 => Key::Digit(1),
        KeyCode::Digit2 => Key::Digit(2),
        KeyCode::Digit3 => Key::Digit(3),
        KeyCode::Digit4 => Key::Digit(4),
        KeyCode::Digit5 => Key::Digit(5),
        KeyCode::Digit6 => Key::Digit(6),
        KeyCode::Digit7 => Key::Digit(7),
        KeyCode::Digit8 => Key::Digit(8),
        KeyCode::Digit9 => Key::Digit(9),
        _ => return None,
    };
    Some(key)
}

pub fn translate_key_event(event: &KeyEvent) -> Option<InputEvent> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    let key = translate_key(code)?;
    let action = match (event.state, event.repeat) {
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Pressed, false) => KeyAction::Press,
        (ElementState::Released, _) => KeyAction::Release,
    };
    Some(InputEvent::Key { key, action })
}

pub fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => translate_key_event(event),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x,
            y: position.y,
        }),
        WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
        _ => None,
    }
}

/// Collects winit events for the frame loop.
///
/// A locked cursor stops producing `CursorMoved`, so while grabbed the raw
/// motion deltas are summed into a virtual position instead.
#[derive(Debug, Default)]
pub struct WinitInput {
    queue: EventQueue,
    cursor_grabbed: bool,
    virtual_cursor: (f64, f64),
}

impl WinitInput {
    pub fn new(cursor_grabbed: bool) -> Self {
        Self {
            cursor_grabbed,
            ..Self::default()
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if self.cursor_grabbed && matches!(event, WindowEvent::CursorMoved { .. }) {
            return;
        }
        if let Some(event) = translate_window_event(event) {
            self.queue.push(event);
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if !self.cursor_grabbed {
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.virtual_cursor.0 += dx;
            self.virtual_cursor.1 += dy;
            let (x, y) = self.virtual_cursor;
            self.queue.push(InputEvent::CursorMoved { x, y });
        }
    }
}

impl InputSource for WinitInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.queue.poll_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_keys_are_translated() {
        assert_eq!(translate_key(KeyCode::KeyL), Some(Key::L));
        assert_eq!(translate_key(KeyCode::Digit7), Some(Key::Digit(7)));
        assert_eq!(translate_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(translate_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn close_request_is_forwarded() {
        assert_eq!(
            translate_window_event(&WindowEvent::CloseRequested),
            Some(InputEvent::CloseRequested)
        );
        assert_eq!(translate_window_event(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn grabbed_motion_accumulates() {
        let mut input = WinitInput::new(true);
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -2.0) });
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (1.0, 1.0) });
        assert_eq!(
            input.poll_events(),
            vec![
                InputEvent::CursorMoved { x: 3.0, y: -2.0 },
                InputEvent::CursorMoved { x: 4.0, y: -1.0 },
            ]
        );
    }

    #[test]
    fn free_cursor_ignores_raw_motion() {
        let mut input = WinitInput::new(false);
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -2.0) });
        assert!(input.poll_events().is_empty());
    }
}
