//! Engine error type.

use std::path::{Path, PathBuf};

/// Error categories for the engine runtime.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Shader compilation, linking, or program creation errors.
    #[error("Shader error: {0}")]
    Shader(String),

    /// GL resource creation or management errors.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Native window or display creation errors.
    #[error("Window error: {0}")]
    Window(String),

    /// OpenGL context creation or function loading errors.
    #[error("Context error: {0}")]
    Context(String),

    /// A file required at startup could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Image decoding errors.
    #[error("Image error: {0}")]
    Image(String),

    /// A subsystem was used before initialization or after shutdown.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// Returns true for failures raised while bringing a subsystem up, as
    /// opposed to accessing one that is not (or no longer) available.
    #[must_use]
    pub fn is_initialization_failure(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }

    // Shader errors
    pub(crate) fn shader_creation_failed(detail: &str) -> Self {
        Self::Shader(format!("Shader creation failed: {detail}"))
    }

    pub(crate) fn shader_compile_failed(stage: &str, log: impl std::fmt::Display) -> Self {
        Self::Shader(format!("{stage} shader compilation failed: {log}"))
    }

    pub(crate) fn shader_program_creation_failed(detail: impl std::fmt::Display) -> Self {
        Self::Shader(format!("Shader program creation failed: {detail}"))
    }

    pub(crate) fn shader_link_failed(log: impl std::fmt::Display) -> Self {
        Self::Shader(format!("Shader linking failed: {log}"))
    }

    // Resource errors
    pub(crate) fn buffer_creation_failed(
        buffer_type: &str,
        detail: impl std::fmt::Display,
    ) -> Self {
        Self::Resource(format!("Failed to create {buffer_type} buffer: {detail}"))
    }

    pub(crate) fn vertex_array_creation_failed(detail: impl std::fmt::Display) -> Self {
        Self::Resource(format!("Failed to create vertex array object: {detail}"))
    }

    pub(crate) fn texture_creation_failed(detail: impl std::fmt::Display) -> Self {
        Self::Resource(format!("Failed to create texture: {detail}"))
    }

    pub(crate) fn framebuffer_creation_failed(detail: impl std::fmt::Display) -> Self {
        Self::Resource(format!("Failed to create framebuffer: {detail}"))
    }

    pub(crate) fn framebuffer_incomplete(status: u32) -> Self {
        Self::Resource(format!("Framebuffer incomplete: 0x{status:x}"))
    }

    // Window and context errors
    pub(crate) fn window_creation_failed(detail: impl std::fmt::Display) -> Self {
        Self::Window(format!("Failed to create window: {detail}"))
    }

    pub(crate) fn context_creation_failed(detail: impl std::fmt::Display) -> Self {
        Self::Context(format!("Failed to create OpenGL context: {detail}"))
    }

    pub(crate) fn unsupported_gl_version(major: u32, minor: u32) -> Self {
        Self::Context(format!("OpenGL 3.3 core required, driver reports {major}.{minor}"))
    }

    pub(crate) fn buffer_swap_failed(detail: impl std::fmt::Display) -> Self {
        Self::Context(format!("Failed to swap buffers: {detail}"))
    }

    // Image errors
    pub(crate) fn icon_decode_failed(detail: impl std::fmt::Display) -> Self {
        Self::Image(format!("Failed to decode icon: {detail}"))
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    // Lifecycle errors
    pub(crate) fn renderer_not_ready() -> Self {
        Self::Unavailable("renderer is not initialized".to_string())
    }

    pub(crate) fn renderer_destroyed() -> Self {
        Self::Unavailable("renderer has been shut down".to_string())
    }

    pub(crate) fn window_closed() -> Self {
        Self::Unavailable("window has been shut down".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_not_an_initialization_failure() {
        assert!(!Error::renderer_not_ready().is_initialization_failure());
        assert!(!Error::window_closed().is_initialization_failure());

        assert!(Error::shader_link_failed("boom").is_initialization_failure());
        assert!(Error::unsupported_gl_version(2, 1).is_initialization_failure());
    }

    #[test]
    fn io_error_names_the_path() {
        let err = Error::io(
            Path::new("shaders/vertex.glsl"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );

        let msg = err.to_string();
        assert!(msg.contains("shaders/vertex.glsl"), "{msg}");
        assert!(msg.contains("missing"), "{msg}");
    }
}
