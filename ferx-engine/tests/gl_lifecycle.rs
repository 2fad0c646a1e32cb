//! End-to-end checks against a real OpenGL context.
//!
//! Needs a display, so it is ignored by default:
//! ```sh
//! cargo test -p ferx-engine --test gl_lifecycle -- --ignored
//! ```
//! Everything runs in one test because winit allows a single event loop per
//! process.

use ferx_engine::{Engine, EngineConfig, RendererState, WindowConfig, WindowSize};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::WindowId,
};

#[derive(Default)]
struct Lifecycle {
    outcome: Option<Result<(), String>>,
}

impl ApplicationHandler for Lifecycle {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.outcome.is_none() {
            self.outcome = Some(run_checks(event_loop));
        }
        event_loop.exit();
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

fn ensure(condition: bool, what: impl Into<String>) -> Result<(), String> {
    if condition { Ok(()) } else { Err(what.into()) }
}

fn resize(engine: &mut Engine, size: WindowSize) -> Result<(), String> {
    let event = WindowEvent::Resized(PhysicalSize::new(size.width, size.height));
    engine.handle_window_event(&event).map_err(|e| e.to_string())?;

    let renderer = engine.renderer();
    let fbo = renderer.framebuffer().ok_or("framebuffer missing after resize")?;
    let (w, h) = (size.width as i32, size.height as i32);
    ensure(fbo.size() == (w, h), format!("attachment {:?} != {size:?}", fbo.size()))?;
    ensure(renderer.viewport() == [0, 0, w, h], format!("viewport {:?}", renderer.viewport()))
}

fn run_checks(event_loop: &ActiveEventLoop) -> Result<(), String> {
    let config = EngineConfig {
        window: WindowConfig {
            title: "ferx lifecycle".into(),
            width: 800,
            height: 600,
            visible: false,
            ..WindowConfig::default()
        },
        ..EngineConfig::default()
    };

    let mut engine = Engine::init(event_loop, &config).map_err(|e| e.to_string())?;

    let scale = engine.window_mut().scale();
    let size = engine.window_mut().size();
    ensure(
        size == WindowSize::new((800.0 * scale.x).round() as u32, (600.0 * scale.y).round() as u32),
        format!("initial size {size:?} at scale {scale:?}"),
    )?;
    ensure(engine.renderer().state() == RendererState::Ready, "renderer not ready")?;

    engine.render().map_err(|e| e.to_string())?;
    engine.window().swap_buffers().map_err(|e| e.to_string())?;

    resize(&mut engine, WindowSize::new(1920, 1080))?;
    resize(&mut engine, WindowSize::new(800, 600))?;
    engine.render().map_err(|e| e.to_string())?;

    engine.shutdown();
    engine.shutdown();
    ensure(engine.renderer().is_released(), "renderer still holds resources")?;
    ensure(engine.renderer().state() == RendererState::Destroyed, "renderer not destroyed")?;
    ensure(!engine.window().is_open(), "window still open")?;
    ensure(engine.render().is_err(), "render after shutdown succeeded")
}

#[test]
#[ignore = "needs a display and an OpenGL 3.3 driver"]
fn engine_lifecycle_on_real_context() {
    #[cfg(target_os = "linux")]
    let event_loop = {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoop::builder().with_any_thread(true).build()
    };
    #[cfg(not(target_os = "linux"))]
    let event_loop = EventLoop::new();

    let event_loop = event_loop.expect("event loop");
    let mut app = Lifecycle::default();
    event_loop.run_app(&mut app).expect("event loop run");

    match app.outcome {
        Some(Ok(())) => {},
        Some(Err(failure)) => panic!("{failure}"),
        None => panic!("event loop exited before resuming"),
    }
}
