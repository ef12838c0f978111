//! Platform-agnostic input handling
use std::collections::{HashSet, VecDeque};

/// Keys the viewer reacts to. Everything else is dropped at the platform edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    W,
    A,
    S,
    D,
    P,
    L,
    /// Number row, 0-9.
    Digit(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    /// Auto-repeat while held. Neither fires one-shots nor changes the key set.
    Repeat,
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, action: KeyAction },
    /// Cursor position in window pixels, y growing downwards.
    CursorMoved { x: f64, y: f64 },
    CloseRequested,
}

/// Currently held keys
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    pressed: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, key: Key, action: KeyAction) {
        match action {
            KeyAction::Press => {
                self.pressed.insert(key);
            }
            KeyAction::Release => {
                self.pressed.remove(&key);
            }
            KeyAction::Repeat => {}
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Turns absolute cursor positions into look offsets.
#[derive(Debug, Default, Clone)]
pub struct MouseTracker {
    last: Option<(f64, f64)>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset since the previous position; zero for the first one.
    /// `dy` is reversed since window y grows downwards.
    pub fn delta(&mut self, x: f64, y: f64) -> (f32, f32) {
        let delta = match self.last {
            Some((last_x, last_y)) => ((x - last_x) as f32, (last_y - y) as f32),
            None => (0.0, 0.0),
        };
        self.last = Some((x, y));
        delta
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Anything that can hand over the input collected since the last frame.
pub trait InputSource {
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// Plain FIFO of events, used by the platform adapter and by tests.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputSource for EventQueue {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_track_keys() {
        let mut keys = KeyState::new();
        keys.apply(Key::W, KeyAction::Press);
        keys.apply(Key::D, KeyAction::Press);
        assert!(keys.is_pressed(Key::W));
        keys.apply(Key::W, KeyAction::Release);
        assert!(!keys.is_pressed(Key::W));
        assert!(keys.is_pressed(Key::D));
    }

    #[test]
    fn repeat_leaves_keys_alone() {
        let mut keys = KeyState::new();
        keys.apply(Key::A, KeyAction::Repeat);
        assert!(!keys.is_pressed(Key::A));
        keys.apply(Key::A, KeyAction::Press);
        keys.apply(Key::A, KeyAction::Repeat);
        assert!(keys.is_pressed(Key::A));
    }

    #[test]
    fn first_cursor_position_gives_no_offset() {
        let mut mouse = MouseTracker::new();
        assert_eq!(mouse.delta(400.0, 300.0), (0.0, 0.0));
        assert_eq!(mouse.delta(410.0, 295.0), (10.0, 5.0));
        assert_eq!(mouse.delta(400.0, 305.0), (-10.0, -10.0));
    }

    #[test]
    fn reset_forgets_last_position() {
        let mut mouse = MouseTracker::new();
        mouse.delta(1.0, 1.0);
        mouse.reset();
        assert_eq!(mouse.delta(100.0, 100.0), (0.0, 0.0));
    }

    #[test]
    fn queue_drains_in_order() {
        let mut queue = EventQueue::new();
        queue.push(InputEvent::Key { key: Key::P, action: KeyAction::Press });
        queue.push(InputEvent::CloseRequested);
        assert_eq!(queue.len(), 2);
        let events = queue.poll_events();
        assert_eq!(events[1], InputEvent::CloseRequested);
        assert!(queue.is_empty());
        assert!(queue.poll_events().is_empty());
    }
}
