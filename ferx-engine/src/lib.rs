//! OpenGL 3.3 scene runtime for the Ferx editor: a native window with a core
//! profile context, a free-fly camera, and a renderer that draws the scene
//! into an off-screen framebuffer.

pub mod camera;
pub mod controls;
pub mod cube;
pub mod engine;
pub mod error;
pub mod gl;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod time;
pub mod window;

pub use camera::{Camera, CameraMovement, MouseLook};
pub use controls::CameraControls;
pub use cube::Cube;
pub use engine::{Engine, EngineConfig};
pub use error::Error;
pub use gl::{
    Drawable, FrameBuffer, GlState, IndexBuffer, RenderContext, Shader, VertexArray, VertexBuffer,
};
pub use input::InputState;
pub use renderer::{Renderer, RendererData, RendererEvent, RendererState, ResourcePaths};
pub use scene::Scene;
pub use time::{FrameClock, FrameTime};
pub use window::{Window, WindowConfig, WindowScale, WindowSize};
