//! Keyboard and mouse bindings for the scene camera.

use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    camera::{Camera, CameraMovement, MouseLook},
    input::InputState,
};

/// Held key to camera movement bindings.
pub const KEY_BINDINGS: [(KeyCode, CameraMovement); 6] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
    (KeyCode::KeyE, CameraMovement::Up),
    (KeyCode::KeyQ, CameraMovement::Down),
];

/// Mouse button that turns pointer motion into camera rotation.
pub const LOOK_BUTTON: MouseButton = MouseButton::Right;

/// Applies the held input state to a camera once per frame.
#[derive(Debug, Default)]
pub struct CameraControls {
    look: MouseLook,
}

impl CameraControls {
    /// Creates controls with the look button not yet engaged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the camera for every bound key that is held and, while the look
    /// button is held, turns it by the pointer motion of this frame.
    ///
    /// Returns true while looking around.
    pub fn update(&mut self, camera: &mut Camera, input: &InputState, delta_time: f32) -> bool {
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| input.key_down(*key))
            .for_each(|(_, movement)| camera.process_keyboard(*movement, delta_time));

        let looking = input.button_down(LOOK_BUTTON);
        if looking {
            let delta = self.look.track(input.mouse_motion());
            if delta != glam::Vec2::ZERO {
                camera.process_mouse_movement(delta.x, delta.y);
            }
        } else {
            self.look.reset();
        }

        looking
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;

    #[test]
    fn held_keys_move_the_camera() {
        let mut camera = Camera::new(Vec3::ZERO);
        let mut controls = CameraControls::new();
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyW);
        input.press_key(KeyCode::KeyE);

        let looking = controls.update(&mut camera, &input, 1.0);

        assert!(!looking);
        assert!(camera.position().z < 0.0);
        assert!(camera.position().y > 0.0);
    }

    #[test]
    fn opposite_keys_cancel_out() {
        let mut camera = Camera::new(Vec3::ZERO);
        let mut controls = CameraControls::new();
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyA);
        input.press_key(KeyCode::KeyD);

        controls.update(&mut camera, &input, 0.5);
        assert!(camera.position().length() < 1e-6);
    }

    #[test]
    fn look_follows_accumulated_motion_past_the_window_edge() {
        let mut camera = Camera::default();
        let mut controls = CameraControls::new();
        let mut input = InputState::new();
        input.press_button(LOOK_BUTTON);

        // the frame that grabs the cursor drops its motion
        input.add_mouse_motion(Vec2::new(250.0, 0.0));
        assert!(controls.update(&mut camera, &input, 0.016));
        assert_eq!(camera.yaw(), -90.0);
        input.end_frame();

        // a locked or edge-pinned cursor still yields device motion every frame
        for _ in 0..3 {
            input.add_mouse_motion(Vec2::new(40.0, 0.0));
            input.add_mouse_motion(Vec2::new(60.0, 0.0));
            controls.update(&mut camera, &input, 0.016);
            input.end_frame();
        }
        assert!((camera.yaw() - -60.0).abs() < 1e-4);

        // device y grows downwards; pushing the mouse away looks up
        input.add_mouse_motion(Vec2::new(0.0, -100.0));
        controls.update(&mut camera, &input, 0.016);
        input.end_frame();
        assert!((camera.pitch() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn motion_without_the_look_button_is_ignored() {
        let mut camera = Camera::default();
        let mut controls = CameraControls::new();
        let mut input = InputState::new();

        input.add_mouse_motion(Vec2::new(500.0, 500.0));
        assert!(!controls.update(&mut camera, &input, 0.016));
        assert_eq!((camera.yaw(), camera.pitch()), (-90.0, 0.0));

        // releasing and re-grabbing drops the first frame again
        input.end_frame();
        input.press_button(LOOK_BUTTON);
        input.add_mouse_motion(Vec2::new(10.0, 0.0));
        controls.update(&mut camera, &input, 0.016);
        input.end_frame();
        input.add_mouse_motion(Vec2::new(10.0, 0.0));
        controls.update(&mut camera, &input, 0.016);
        assert!((camera.yaw() - -89.0).abs() < 1e-4);

        input.release_button(LOOK_BUTTON);
        assert!(!controls.update(&mut camera, &input, 0.016));
        input.press_button(LOOK_BUTTON);
        controls.update(&mut camera, &input, 0.016);
        assert!((camera.yaw() - -89.0).abs() < 1e-4);
    }
}
