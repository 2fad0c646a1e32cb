//! Window, renderer and input wired together.

use winit::{
    event::{DeviceEvent, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
};

use crate::{
    controls::LOOK_BUTTON,
    error::Error,
    gl::RenderContext,
    input::InputState,
    renderer::{Renderer, RendererEvent, ResourcePaths},
    window::{Window, WindowConfig, WindowSize},
};

/// Pixel scroll deltas (touchpads) are converted to lines at this rate.
const PIXELS_PER_LINE: f64 = 20.0;

/// Parameters for [`Engine::init`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Native window and context settings
    pub window: WindowConfig,
    /// Shader and icon locations
    pub resources: ResourcePaths,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let resources = ResourcePaths::default();
        let window = WindowConfig { icon: Some(resources.icon()), ..WindowConfig::default() };
        Self { window, resources }
    }
}

/// Owns the window, the renderer and the input state, and routes window
/// events between them.
///
/// Shutdown releases the renderer before the window, since deleting GPU
/// resources needs a live context.
#[derive(Debug)]
pub struct Engine {
    window: Window,
    renderer: Renderer,
    input: InputState,
}

impl Engine {
    /// Opens the window and initializes the renderer against its context.
    ///
    /// # Errors
    /// Returns the window or renderer error; if the renderer fails the window
    /// is closed before returning.
    pub fn init(event_loop: &ActiveEventLoop, config: &EngineConfig) -> Result<Self, Error> {
        let mut window = Window::create(event_loop, &config.window)?;
        let mut renderer = Renderer::new(config.resources.clone());

        let size = window.size();
        let gl = window.gl().ok_or_else(Error::window_closed)?;
        if let Err(e) = renderer.init(gl, size) {
            tracing::error!(error = %e, "renderer initialization failed");
            window.shutdown();
            return Err(e);
        }

        tracing::info!(title = window.title(), "engine started");
        Ok(Self { window, renderer, input: InputState::new() })
    }

    /// Renders the scene into the renderer's framebuffer. The cursor is
    /// captured while the look button is held. Pointer motion gathered since
    /// the previous frame is consumed.
    ///
    /// # Errors
    /// Returns [`Error::Unavailable`] after shutdown.
    pub fn render(&mut self) -> Result<(), Error> {
        self.window.set_cursor_captured(self.input.button_down(LOOK_BUTTON));

        let size = self.window.size();
        let gl = self.window.gl().ok_or_else(Error::window_closed)?;
        let rendered = self.renderer.render(gl, &self.input, size);
        self.input.end_frame();
        rendered
    }

    /// Feeds a device event (raw pointer motion) to the input state.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        self.input.apply_device_event(event);
    }

    /// Feeds a window event to the input state and the renderer.
    ///
    /// # Errors
    /// Returns the renderer's error when a resize cannot rebuild its buffers,
    /// or [`Error::Unavailable`] after shutdown.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Result<(), Error> {
        self.input.apply_window_event(event);

        match event {
            WindowEvent::Resized(physical) => {
                let size = WindowSize::from(*physical);
                self.window.resize_surface(size);

                let gl = self.window.gl().ok_or_else(Error::window_closed)?;
                self.renderer.handle_event(gl, RendererEvent::WindowResized(size))?;
                self.renderer.handle_event(gl, RendererEvent::FramebufferResized(size))?;
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };

                let gl = self.window.gl().ok_or_else(Error::window_closed)?;
                self.renderer.handle_event(gl, RendererEvent::Scrolled(lines))?;
            },
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                tracing::debug!(scale_factor, "content scale changed");
            },
            _ => {},
        }

        Ok(())
    }

    /// The engine's window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The engine's window, for size queries and cursor changes.
    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    /// The scene renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The scene renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Input gathered from window and device events.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// GL context and tracked state for passes drawn after the scene, `None`
    /// after shutdown.
    pub fn render_context(&mut self) -> Option<RenderContext<'_>> {
        let gl = self.window.gl()?;
        Some(RenderContext { gl, state: self.renderer.gl_state_mut() })
    }

    /// Shuts down the renderer, then the window. Subsequent calls are no-ops.
    pub fn shutdown(&mut self) {
        if let Some(gl) = self.window.gl() {
            self.renderer.shutdown(gl);
        }
        self.window.shutdown();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_bundled_icon() {
        let config = EngineConfig::default();
        assert_eq!(config.window.icon, Some(config.resources.icon()));
        assert_eq!(config.window.title, "Ferx");
    }
}
