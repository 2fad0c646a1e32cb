use std::path::PathBuf;

use color_eyre::{
    Report,
    eyre::{Result, WrapErr},
};
use ferx_engine::{Engine, EngineConfig, Error};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use crate::gui::Gui;

/// Everything the editor needs to start.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Window and renderer settings
    pub engine: EngineConfig,
    /// GUI layout file, loaded at startup and saved on shutdown
    pub layout_path: PathBuf,
    /// Exit after this many rendered frames
    pub frame_limit: Option<u64>,
}

/// Top-level application: owns the engine and the GUI and drives the frame
/// loop from winit callbacks.
///
/// Each redraw runs one frame: GUI begin, scene render, GUI composite, swap.
/// Shutdown releases the GUI before the engine.
pub struct Editor {
    config: EditorConfig,
    engine: Option<Engine>,
    gui: Gui,
    started: bool,
    frames: u64,
    error: Option<Report>,
}

impl Editor {
    /// An editor that starts once the event loop resumes.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let gui = Gui::new(config.layout_path.clone());
        Self { config, engine: None, gui, started: false, frames: 0, error: None }
    }

    /// The running engine, `None` before startup and after shutdown.
    #[must_use]
    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    /// Shuts down the GUI, then the engine. Subsequent calls are no-ops.
    pub fn shutdown(&mut self) {
        let Some(mut engine) = self.engine.take() else { return };

        // the painter's objects need the engine's context
        self.gui.shutdown();
        engine.shutdown();

        tracing::info!(frames = self.frames, "editor shut down");
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut engine = Engine::init(event_loop, &self.config.engine)?;

        let gui_ready = match (engine.window().shared_gl(), engine.window().native()) {
            (Some(gl), Some(window)) => self.gui.init(gl, window),
            _ => Err(Report::new(Error::Unavailable("window closed during startup".to_string()))),
        };
        if let Err(e) = gui_ready {
            engine.shutdown();
            return Err(e);
        }
        self.gui.load_configs();

        self.engine = Some(engine);
        Ok(())
    }

    fn frame(&mut self) -> Result<(), Error> {
        let Some(engine) = self.engine.as_mut() else { return Ok(()) };

        if let Some(window) = engine.window().native() {
            self.gui.run(window, engine.renderer());
        }

        engine.render()?;

        let size = engine.window_mut().size();
        if let Some(mut context) = engine.render_context() {
            self.gui.render(&mut context, size);
        }

        engine.window().swap_buffers()?;
        self.frames += 1;
        Ok(())
    }

    fn frame_limit_reached(&self) -> bool {
        self.config.frame_limit.is_some_and(|limit| self.frames >= limit)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, report: Report) {
        tracing::error!(error = %report, "stopping editor");
        self.error.get_or_insert(report);
        self.shutdown();
        event_loop.exit();
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler for Editor {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e.wrap_err("Failed to start the editor"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.engine().is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                tracing::info!("close requested");
                self.stop(event_loop);
            },
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, Report::new(e).wrap_err("Frame failed"));
                } else if self.frame_limit_reached() {
                    tracing::info!(frames = self.frames, "frame limit reached");
                    self.stop(event_loop);
                }
            },
            event => {
                let Some(engine) = self.engine.as_mut() else { return };
                let forward = match engine.window().native() {
                    Some(window) => self.gui.on_window_event(window, &event),
                    None => true,
                };

                if forward && let Err(e) = engine.handle_window_event(&event) {
                    // the renderer keeps its previous buffers on a failed rebuild
                    tracing::error!(error = %e, "window event not handled");
                }
            },
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(engine) = self.engine.as_mut() {
            engine.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(engine) = self.engine() {
            engine.window().request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Runs the editor until its window closes.
///
/// # Errors
/// Returns the first startup or frame error, or an event loop failure.
pub fn run(config: EditorConfig) -> Result<()> {
    let event_loop = EventLoop::new().wrap_err("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut editor = Editor::new(config);
    event_loop.run_app(&mut editor).wrap_err("Event loop failed")?;
    editor.shutdown();

    match editor.error.take() {
        Some(report) => Err(report),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(frame_limit: Option<u64>) -> EditorConfig {
        EditorConfig {
            engine: EngineConfig::default(),
            layout_path: PathBuf::from("/does/not/exist.json"),
            frame_limit,
        }
    }

    #[test]
    fn new_editor_has_no_engine() {
        let mut editor = Editor::new(config(None));
        assert!(editor.engine().is_none());
        assert_eq!(editor.frames, 0);

        // shutting down before startup is harmless, twice
        editor.shutdown();
        editor.shutdown();
        assert!(editor.engine().is_none());
    }

    #[test]
    fn frame_limit() {
        let mut editor = Editor::new(config(Some(2)));
        assert!(!editor.frame_limit_reached());
        editor.frames = 2;
        assert!(editor.frame_limit_reached());

        let mut unlimited = Editor::new(config(None));
        unlimited.frames = u64::MAX;
        assert!(!unlimited.frame_limit_reached());
    }
}
