//! Keyboard and mouse state, and the key bindings that drive the ride.
//!
//! [`Input`] is fed raw `winit` window events by whoever owns the window and
//! answers per-frame questions ("was this key pressed this frame?").
//! [`Bindings`] turns those presses into [`RideCommand`]s.
//!
//! ```
//! use rollercoaster::{Bindings, Input, KeyCode, RideCommand};
//!
//! let bindings = Bindings::default();
//! let mut input = Input::new();
//!
//! input.press_key(KeyCode::Space);
//! input.press_key(KeyCode::Digit3);
//! assert_eq!(
//!     bindings.commands(&input),
//!     vec![RideCommand::AddPassenger, RideCommand::Seat(2)]
//! );
//!
//! input.begin_frame();
//! assert!(bindings.commands(&input).is_empty());
//! ```

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::passenger::SEAT_COUNT;
use crate::ride::RideCommand;

/// Tracks input state for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_position: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_buttons_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if !self.mouse_buttons_down.contains(button) {
                        self.mouse_buttons_pressed.insert(*button);
                    }
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            _ => {}
        }
    }

    /// Registers a key press. Held keys (auto-repeat) count as pressed once.
    pub fn press_key(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_released.insert(key);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }
}

const SEAT_KEYS: [KeyCode; SEAT_COUNT] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
];

/// Key → command table.
///
/// Commands come out in binding order, so a frame with several presses is
/// replayed deterministically.
#[derive(Clone, Debug)]
pub struct Bindings {
    entries: Vec<(KeyCode, RideCommand)>,
}

impl Default for Bindings {
    /// `Space` boards a passenger, `Enter` starts the ride, `1`–`8` interact
    /// with seats 0–7.
    fn default() -> Self {
        let mut bindings = Self::empty()
            .bind(KeyCode::Space, RideCommand::AddPassenger)
            .bind(KeyCode::Enter, RideCommand::StartRide);
        for (seat, key) in SEAT_KEYS.into_iter().enumerate() {
            bindings = bindings.bind(key, RideCommand::Seat(seat));
        }
        bindings
    }
}

impl Bindings {
    /// No bindings at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Binds `key` to `command`, replacing any previous binding of that key.
    pub fn bind(mut self, key: KeyCode, command: RideCommand) -> Self {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, command));
        self
    }

    pub fn command_for(&self, key: KeyCode) -> Option<RideCommand> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, command)| *command)
    }

    /// Commands whose key was pressed this frame.
    pub fn commands(&self, input: &Input) -> Vec<RideCommand> {
        self.entries
            .iter()
            .filter(|(key, _)| input.key_pressed(*key))
            .map(|(_, command)| *command)
            .collect()
    }
}
