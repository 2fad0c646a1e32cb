//! Shader programs.

use std::path::Path;

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::error::Error;

/// A linked vertex + fragment shader program.
#[derive(Debug)]
pub struct Shader {
    program: glow::Program,
}

impl Shader {
    /// Compiles and links a program from in-memory GLSL sources.
    ///
    /// # Errors
    /// Returns [`Error::Shader`] when either stage fails to compile or the
    /// program fails to link; the compiler or linker log is included.
    pub fn create(
        gl: &glow::Context,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, Error> {
        let program =
            unsafe { gl.create_program() }.map_err(Error::shader_program_creation_failed)?;

        // compile shaders
        let vertex_shader = match compile_shader(gl, ShaderType::Vertex, vertex_source) {
            Ok(shader) => shader,
            Err(e) => {
                unsafe { gl.delete_program(program) };
                return Err(e);
            },
        };
        let fragment_shader = match compile_shader(gl, ShaderType::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(e) => {
                unsafe {
                    gl.delete_shader(vertex_shader);
                    gl.delete_program(program);
                }
                return Err(e);
            },
        };

        // attach shaders and link program
        unsafe {
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);
        }
        let linked = check_link_status(gl, program);

        // delete shaders (no longer needed after linking)
        unsafe {
            gl.detach_shader(program, vertex_shader);
            gl.detach_shader(program, fragment_shader);
            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);
        }

        if let Err(e) = linked {
            unsafe { gl.delete_program(program) };
            return Err(e);
        }

        Ok(Shader { program })
    }

    /// Reads both stages from disk and builds the program.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if a file cannot be read, otherwise the errors of
    /// [`Shader::create`].
    pub fn from_files(
        gl: &glow::Context,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, Error> {
        let vertex_source =
            std::fs::read_to_string(vertex_path).map_err(|e| Error::io(vertex_path, e))?;
        let fragment_source =
            std::fs::read_to_string(fragment_path).map_err(|e| Error::io(fragment_path, e))?;

        tracing::debug!(
            vertex = %vertex_path.display(),
            fragment = %fragment_path.display(),
            "compiling shader program"
        );

        Self::create(gl, &vertex_source, &fragment_source)
    }

    /// Use the shader program.
    pub fn use_program(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    /// Returns the raw program handle.
    #[must_use]
    pub fn program(&self) -> glow::Program {
        self.program
    }

    /// Looks up a uniform; `None` when the name is unknown or optimized out.
    #[must_use]
    pub fn uniform_location(
        &self,
        gl: &glow::Context,
        name: &str,
    ) -> Option<glow::UniformLocation> {
        unsafe { gl.get_uniform_location(self.program, name) }
    }

    /// Uploads a column-major 4x4 matrix. The program must be in use.
    pub fn set_mat4(&self, gl: &glow::Context, name: &str, value: &Mat4) {
        let location = self.uniform_location(gl, name);
        unsafe {
            gl.uniform_matrix_4_f32_slice(location.as_ref(), false, &value.to_cols_array());
        }
    }

    /// Uploads a vec3. The program must be in use.
    pub fn set_vec3(&self, gl: &glow::Context, name: &str, value: Vec3) {
        let location = self.uniform_location(gl, name);
        unsafe { gl.uniform_3_f32(location.as_ref(), value.x, value.y, value.z) };
    }

    /// Binds a sampler uniform to a texture unit index. The program must be in use.
    pub fn set_sampler(&self, gl: &glow::Context, name: &str, unit: i32) {
        let location = self.uniform_location(gl, name);
        unsafe { gl.uniform_1_i32(location.as_ref(), unit) };
    }

    /// Deletes the program, releasing the GPU resource.
    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

fn compile_shader(
    gl: &glow::Context,
    shader_type: ShaderType,
    source: &str,
) -> Result<glow::Shader, Error> {
    let shader = unsafe { gl.create_shader(shader_type.into()) }
        .map_err(|e| Error::shader_creation_failed(&e))?;

    unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
    }

    if !unsafe { gl.get_shader_compile_status(shader) } {
        let log = unsafe { gl.get_shader_info_log(shader) };
        unsafe { gl.delete_shader(shader) };
        return Err(Error::shader_compile_failed(shader_type.label(), log));
    }

    Ok(shader)
}

fn check_link_status(gl: &glow::Context, program: glow::Program) -> Result<(), Error> {
    let status = unsafe { gl.get_program_link_status(program) };
    if !status {
        let log = unsafe { gl.get_program_info_log(program) };
        return Err(Error::shader_link_failed(log));
    }

    Ok(())
}

/// Enum representing the type of shader.
#[derive(Clone, Copy)]
enum ShaderType {
    Vertex,
    Fragment,
}

impl ShaderType {
    fn label(self) -> &'static str {
        match self {
            ShaderType::Vertex => "vertex",
            ShaderType::Fragment => "fragment",
        }
    }
}

impl From<ShaderType> for u32 {
    fn from(val: ShaderType) -> Self {
        use ShaderType::*;

        match val {
            Vertex => glow::VERTEX_SHADER,
            Fragment => glow::FRAGMENT_SHADER,
        }
    }
}
