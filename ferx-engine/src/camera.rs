//! Free-fly camera.
//!
//! Angles are kept in degrees to match the input deltas they are driven by;
//! conversion to radians happens when the basis vectors are rebuilt.

use glam::{Mat4, Vec2, Vec3};

const YAW: f32 = -90.0;
const PITCH: f32 = 0.0;
const SPEED: f32 = 2.5;
const SENSITIVITY: f32 = 0.1;
const ZOOM: f32 = 45.0;

/// Pitch limit in degrees; looking straight up or down flips the basis.
pub const PITCH_LIMIT: f32 = 89.0;
/// Narrowest zoom (vertical field of view) in degrees.
pub const ZOOM_MIN: f32 = 1.0;
/// Widest zoom (vertical field of view) in degrees.
pub const ZOOM_MAX: f32 = 45.0;

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    /// Along the front vector
    Forward,
    /// Against the front vector
    Backward,
    /// Against the right vector
    Left,
    /// Along the right vector
    Right,
    /// Along the camera up vector
    Up,
    /// Against the camera up vector
    Down,
}

/// Free-fly camera producing a right-handed view matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    /// Degrees
    yaw: f32,
    /// Degrees, within +-PITCH_LIMIT when constrained
    pitch: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    zoom: f32,
}

impl Camera {
    /// Creates a camera at `position` looking down -Z.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, YAW, PITCH)
    }

    /// Creates a camera with explicit world-up vector and angles (degrees).
    #[must_use]
    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Look-at matrix from the camera position along its front vector.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Moves along the camera basis by `speed * delta_time`.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
            CameraMovement::Up => self.position += self.up * velocity,
            CameraMovement::Down => self.position -= self.up * velocity,
        }
    }

    /// Turns the camera by a cursor delta, clamping pitch to +-89 degrees.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.process_mouse_movement_with(x_offset, y_offset, true);
    }

    /// Turns the camera by a cursor delta. `y_offset` is positive upwards.
    pub fn process_mouse_movement_with(
        &mut self,
        x_offset: f32,
        y_offset: f32,
        constrain_pitch: bool,
    ) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Narrows (positive `y_offset`) or widens the field of view.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit up vector of the camera basis.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit right vector of the camera basis.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Yaw in degrees; -90 looks down -Z.
    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees.
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());

        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

/// Turns raw pointer motion into look deltas.
///
/// The motion of the first sample after [`MouseLook::reset`] is dropped:
/// grabbing the cursor can warp it, and that warp must not turn the view.
#[derive(Debug, Default, Clone, Copy)]
pub struct MouseLook {
    engaged: bool,
}

impl MouseLook {
    /// Returns `(dx, dy)` for one frame of device motion, with `dy` positive
    /// upwards (device y grows downwards).
    pub fn track(&mut self, motion: Vec2) -> Vec2 {
        let delta = if self.engaged { Vec2::new(motion.x, -motion.y) } else { Vec2::ZERO };
        self.engaged = true;
        delta
    }

    /// Disengages; the next sample is treated as the first.
    pub fn reset(&mut self) {
        self.engaged = false;
    }

    /// True until the first sample after construction or a reset.
    #[must_use]
    pub fn is_first_sample(&self) -> bool {
        !self.engaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(approx(camera.front(), Vec3::NEG_Z));
        assert!(approx(camera.right(), Vec3::X));
        assert!(approx(camera.up(), Vec3::Y));
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn pitch_never_exceeds_limit() {
        let mut camera = Camera::default();
        for _ in 0..1000 {
            camera.process_mouse_movement(0.0, 50.0);
            assert!(camera.pitch() <= PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), PITCH_LIMIT);

        for _ in 0..1000 {
            camera.process_mouse_movement(0.0, -50.0);
            assert!(camera.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn unconstrained_pitch_passes_the_limit() {
        let mut camera = Camera::default();
        camera.process_mouse_movement_with(0.0, 1000.0, false);
        assert!(camera.pitch() > PITCH_LIMIT);
    }

    #[test]
    fn keyboard_moves_scale_with_delta_time() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(approx(camera.position(), Vec3::new(0.0, 0.0, -SPEED)));

        camera.process_keyboard(CameraMovement::Backward, 1.0);
        camera.process_keyboard(CameraMovement::Right, 0.5);
        assert!(approx(camera.position(), Vec3::new(SPEED * 0.5, 0.0, 0.0)));

        camera.process_keyboard(CameraMovement::Left, 0.5);
        camera.process_keyboard(CameraMovement::Up, 2.0);
        assert!(approx(camera.position(), Vec3::new(0.0, SPEED * 2.0, 0.0)));

        camera.process_keyboard(CameraMovement::Down, 2.0);
        assert!(approx(camera.position(), Vec3::ZERO));
    }

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom(), 35.0);

        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), ZOOM_MIN);

        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom(), ZOOM_MAX);
    }

    #[test]
    fn yaw_turns_the_front_vector() {
        let mut camera = Camera::default();
        // 900 * 0.1 = 90 degrees: from -Z to +X
        camera.process_mouse_movement(900.0, 0.0);
        assert!(approx(camera.front(), Vec3::X));
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = Camera::default();
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(origin_in_view, Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn first_mouse_sample_does_not_jump() {
        let mut look = MouseLook::default();
        assert!(look.is_first_sample());
        assert_eq!(look.track(Vec2::new(400.0, 300.0)), Vec2::ZERO);
        assert!(!look.is_first_sample());

        // y is inverted: moving the mouse away from the user is a positive delta
        assert_eq!(look.track(Vec2::new(10.0, -10.0)), Vec2::new(10.0, 10.0));

        look.reset();
        assert_eq!(look.track(Vec2::new(-50.0, 0.0)), Vec2::ZERO);
        assert_eq!(look.track(Vec2::new(-50.0, 0.0)), Vec2::new(-50.0, 0.0));
    }
}
