//! Vertex arrays and GPU buffers.

use glow::HasContext;

use crate::error::Error;

/// Uploads a slice of plain data to the buffer currently bound at `target`.
///
/// # Safety
/// `T` must be plain old data without padding, and a buffer must be bound
/// to `target`.
pub(crate) unsafe fn buffer_upload_array<T: Copy>(
    gl: &glow::Context,
    target: u32,
    data: &[T],
    usage: u32,
) {
    unsafe {
        let bytes =
            std::slice::from_raw_parts(data.as_ptr().cast::<u8>(), std::mem::size_of_val(data));
        gl.buffer_data_u8_slice(target, bytes, usage);
    }
}

/// Vertex layout descriptor (VAO).
#[derive(Debug)]
pub struct VertexArray {
    vao: glow::VertexArray,
}

impl VertexArray {
    /// Creates an empty vertex array object.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] if the driver refuses the allocation.
    pub fn create(gl: &glow::Context) -> Result<Self, Error> {
        let vao =
            unsafe { gl.create_vertex_array() }.map_err(Error::vertex_array_creation_failed)?;
        Ok(Self { vao })
    }

    /// Makes this VAO current.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.bind_vertex_array(Some(self.vao)) };
    }

    /// Unbinds any VAO.
    pub fn unbind(gl: &glow::Context) {
        unsafe { gl.bind_vertex_array(None) };
    }

    /// Declares a float attribute sourced from the currently bound vertex
    /// buffer. The VAO must be bound.
    ///
    /// `components`, `stride` and `offset` follow `glVertexAttribPointer`;
    /// stride and offset are in bytes.
    pub fn float_attribute(
        &self,
        gl: &glow::Context,
        index: u32,
        components: i32,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            gl.vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, stride, offset);
            gl.enable_vertex_attrib_array(index);
        }
    }

    /// The underlying GL name.
    #[must_use]
    pub fn raw(&self) -> glow::VertexArray {
        self.vao
    }

    /// Deletes the VAO, releasing the GPU resource.
    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_vertex_array(self.vao) };
    }
}

/// Vertex data store (VBO).
#[derive(Debug)]
pub struct VertexBuffer {
    buffer: glow::Buffer,
    size_bytes: usize,
}

impl VertexBuffer {
    /// Creates an empty array buffer.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] if the driver refuses the allocation.
    pub fn create(gl: &glow::Context) -> Result<Self, Error> {
        let buffer =
            unsafe { gl.create_buffer() }.map_err(|e| Error::buffer_creation_failed("vertex", e))?;
        Ok(Self { buffer, size_bytes: 0 })
    }

    /// Binds the buffer and replaces its contents with `data` (static draw).
    pub fn set_data<T: Copy>(&mut self, gl: &glow::Context, data: &[T]) {
        self.bind(gl);
        unsafe { buffer_upload_array(gl, glow::ARRAY_BUFFER, data, glow::STATIC_DRAW) };
        self.size_bytes = std::mem::size_of_val(data);
    }

    /// Binds to `ARRAY_BUFFER`.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer)) };
    }

    /// Clears the `ARRAY_BUFFER` binding.
    pub fn unbind(gl: &glow::Context) {
        unsafe { gl.bind_buffer(glow::ARRAY_BUFFER, None) };
    }

    /// Size of the last upload, in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Deletes the VBO, releasing the GPU resource.
    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_buffer(self.buffer) };
    }
}

/// Element index store (IBO) holding `u32` indices.
#[derive(Debug)]
pub struct IndexBuffer {
    buffer: glow::Buffer,
    count: i32,
}

impl IndexBuffer {
    /// Creates an empty element array buffer.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] if the driver refuses the allocation.
    pub fn create(gl: &glow::Context) -> Result<Self, Error> {
        let buffer =
            unsafe { gl.create_buffer() }.map_err(|e| Error::buffer_creation_failed("index", e))?;
        Ok(Self { buffer, count: 0 })
    }

    /// Binds the buffer and replaces its contents with `indices`.
    ///
    /// Binding an element buffer is recorded in the currently bound VAO.
    pub fn set_data(&mut self, gl: &glow::Context, indices: &[u32]) {
        self.bind(gl);
        unsafe { buffer_upload_array(gl, glow::ELEMENT_ARRAY_BUFFER, indices, glow::STATIC_DRAW) };
        self.count = indices.len() as i32;
    }

    /// Binds to `ELEMENT_ARRAY_BUFFER`.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.buffer)) };
    }

    /// Clears the `ELEMENT_ARRAY_BUFFER` binding.
    pub fn unbind(gl: &glow::Context) {
        unsafe { gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None) };
    }

    /// Number of indices uploaded.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Deletes the IBO, releasing the GPU resource.
    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_buffer(self.buffer) };
    }
}
