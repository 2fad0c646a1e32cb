//! Held keys and buttons, and raw pointer motion per frame.

use std::collections::HashSet;

use glam::Vec2;
use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Keys and mouse buttons currently held, plus the raw pointer motion
/// accumulated since the last [`InputState::end_frame`].
///
/// Fed from window and device events; queried by the renderer when applying
/// camera controls. Focus loss clears every held key and button so nothing
/// stays stuck when a release happens in another window.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    /// Unaccelerated device motion; keeps reporting while the cursor is
    /// locked or pinned to a window edge.
    mouse_motion: Vec2,
}

impl InputState {
    /// Creates a state with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the held state from a window event. Events that carry no input
    /// state are ignored.
    pub fn apply_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(code),
                        ElementState::Released => self.release_key(code),
                    }
                }
            },
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press_button(*button),
                ElementState::Released => self.release_button(*button),
            },
            WindowEvent::Focused(false) => self.clear(),
            _ => {},
        }
    }

    /// Accumulates raw pointer motion. Other device events are ignored.
    pub fn apply_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.add_mouse_motion(Vec2::new(*dx as f32, *dy as f32));
        }
    }

    /// Marks `key` as held.
    pub fn press_key(&mut self, key: KeyCode) {
        self.keys_down.insert(key);
    }

    /// Marks `key` as released.
    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Marks `button` as held.
    pub fn press_button(&mut self, button: MouseButton) {
        self.buttons_down.insert(button);
    }

    /// Marks `button` as released.
    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons_down.remove(&button);
    }

    /// Adds device motion in counts; y grows downwards.
    pub fn add_mouse_motion(&mut self, delta: Vec2) {
        self.mouse_motion += delta;
    }

    /// Releases every key and button and drops pending motion.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.buttons_down.clear();
        self.mouse_motion = Vec2::ZERO;
    }

    /// Drops the motion consumed by the frame that just rendered.
    pub fn end_frame(&mut self) {
        self.mouse_motion = Vec2::ZERO;
    }

    /// True while `key` is held.
    #[must_use]
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// True while `button` is held.
    #[must_use]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Device motion since the last [`InputState::end_frame`].
    #[must_use]
    pub fn mouse_motion(&self) -> Vec2 {
        self.mouse_motion
    }
}

#[cfg(test)]
mod tests {
    use winit::event::DeviceId;

    use super::*;

    #[test]
    fn held_keys_and_buttons() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyW);
        input.press_key(KeyCode::KeyW);
        input.press_button(MouseButton::Right);

        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_down(KeyCode::KeyS));
        assert!(input.button_down(MouseButton::Right));

        input.release_key(KeyCode::KeyW);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyA);
        input.press_button(MouseButton::Left);

        input.apply_window_event(&WindowEvent::Focused(false));

        assert!(!input.key_down(KeyCode::KeyA));
        assert!(!input.button_down(MouseButton::Left));
    }

    #[test]
    fn device_motion_accumulates_until_the_frame_ends() {
        let mut input = InputState::new();
        assert_eq!(input.mouse_motion(), Vec2::ZERO);

        input.apply_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -2.0) });
        input.apply_device_event(&DeviceEvent::MouseMotion { delta: (4.5, 1.0) });
        input.apply_device_event(&DeviceEvent::MouseWheel {
            delta: winit::event::MouseScrollDelta::LineDelta(0.0, 1.0),
        });
        assert_eq!(input.mouse_motion(), Vec2::new(7.5, -1.0));

        input.end_frame();
        assert_eq!(input.mouse_motion(), Vec2::ZERO);

        input.add_mouse_motion(Vec2::new(1.0, 1.0));
        input.apply_window_event(&WindowEvent::Focused(false));
        assert_eq!(input.mouse_motion(), Vec2::ZERO);
    }

    #[test]
    fn mouse_button_events() {
        let device_id = unsafe { DeviceId::dummy() };
        let mut input = InputState::new();

        input.apply_window_event(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Right,
        });
        assert!(input.button_down(MouseButton::Right));

        input.apply_window_event(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Released,
            button: MouseButton::Right,
        });
        assert!(!input.button_down(MouseButton::Right));
    }
}
