//! Thin wrappers over `glow` objects and tracked GL state.

mod buffer;
pub(crate) mod context;
mod drawable;
mod framebuffer;
mod program;

pub use buffer::{IndexBuffer, VertexArray, VertexBuffer};
pub use context::GlState;
pub use drawable::{Drawable, RenderContext};
pub use framebuffer::FrameBuffer;
pub use program::Shader;
