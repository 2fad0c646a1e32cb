//! Off-screen render targets.

use glow::HasContext;

use crate::error::Error;

/// Off-screen render target with an RGBA8 color texture and a
/// depth-stencil renderbuffer.
///
/// The color attachment is what the editor samples when compositing the
/// scene into its panel.
#[derive(Debug)]
pub struct FrameBuffer {
    framebuffer: glow::Framebuffer,
    color: glow::Texture,
    depth_stencil: glow::Renderbuffer,
    /// Attachment dimensions (width, height)
    size: (i32, i32),
}

impl FrameBuffer {
    /// Creates the framebuffer and attaches freshly allocated storage of
    /// `width` x `height` pixels. Leaves the default framebuffer bound.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] when an object cannot be created or the
    /// framebuffer is incomplete; partially created objects are deleted.
    pub fn create(gl: &glow::Context, width: i32, height: i32) -> Result<Self, Error> {
        let (width, height) = (width.max(1), height.max(1));

        let framebuffer =
            unsafe { gl.create_framebuffer() }.map_err(Error::framebuffer_creation_failed)?;

        let color = match create_color_texture(gl, width, height) {
            Ok(texture) => texture,
            Err(e) => {
                unsafe { gl.delete_framebuffer(framebuffer) };
                return Err(e);
            },
        };

        let depth_stencil = match create_depth_stencil(gl, width, height) {
            Ok(renderbuffer) => renderbuffer,
            Err(e) => {
                unsafe {
                    gl.delete_texture(color);
                    gl.delete_framebuffer(framebuffer);
                }
                return Err(e);
            },
        };

        let status = unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_STENCIL_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(depth_stencil),
            );
            gl.check_framebuffer_status(glow::FRAMEBUFFER)
        };

        Self::unbind(gl);

        let fb = Self { framebuffer, color, depth_stencil, size: (width, height) };
        if status != glow::FRAMEBUFFER_COMPLETE {
            fb.delete(gl);
            return Err(Error::framebuffer_incomplete(status));
        }

        Ok(fb)
    }

    /// Makes this framebuffer the draw and read target.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer)) };
    }

    /// Restores the default (window) framebuffer.
    pub fn unbind(gl: &glow::Context) {
        unsafe { gl.bind_framebuffer(glow::FRAMEBUFFER, None) };
    }

    /// Texture holding the rendered color output.
    #[must_use]
    pub fn color_attachment(&self) -> glow::Texture {
        self.color
    }

    /// Returns the attachment dimensions (width, height)
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    /// Deletes the framebuffer and both attachments.
    pub fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
            gl.delete_texture(self.color);
            gl.delete_renderbuffer(self.depth_stencil);
        }
    }
}

fn create_color_texture(
    gl: &glow::Context,
    width: i32,
    height: i32,
) -> Result<glow::Texture, Error> {
    let texture = unsafe { gl.create_texture() }.map_err(Error::texture_creation_failed)?;

    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            width,
            height,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(None),
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);
    }

    Ok(texture)
}

fn create_depth_stencil(
    gl: &glow::Context,
    width: i32,
    height: i32,
) -> Result<glow::Renderbuffer, Error> {
    let renderbuffer = unsafe { gl.create_renderbuffer() }
        .map_err(|e| Error::buffer_creation_failed("depth-stencil", e))?;

    unsafe {
        gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
        gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH24_STENCIL8, width, height);
        gl.bind_renderbuffer(glow::RENDERBUFFER, None);
    }

    Ok(renderbuffer)
}
