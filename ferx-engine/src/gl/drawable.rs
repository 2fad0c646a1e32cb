//! Render pass abstraction.

use crate::gl::context::GlState;

/// Rendering context that provides access to GL state.
pub struct RenderContext<'a> {
    /// The current GL context.
    pub gl: &'a glow::Context,
    /// Cached state shared by every pass of the frame.
    pub state: &'a mut GlState,
}

/// Trait for objects that can be rendered.
pub trait Drawable {
    /// Prepares the object for rendering.
    ///
    /// This method should bind the shader, upload per-pass uniforms and bind
    /// the vertex data required for rendering.
    fn prepare(&self, context: &mut RenderContext);

    /// Performs the actual rendering.
    ///
    /// This method should issue draw calls. All necessary state should
    /// already be set up from the `prepare()` call.
    fn draw(&self, context: &mut RenderContext);

    /// Cleans up after rendering.
    ///
    /// This method should unbind any resources that were bound during
    /// `prepare()`, leaving the context clean for the next pass.
    fn cleanup(&self, context: &mut RenderContext);

    /// Runs `prepare`, `draw` and `cleanup` in order.
    fn render(&self, context: &mut RenderContext) {
        self.prepare(context);
        self.draw(context);
        self.cleanup(context);
    }
}
