//! Tracked GL state.

use glow::HasContext;

/// Manages simple GL state to reduce redundant state changes
#[derive(Debug)]
pub struct GlState {
    // Viewport dimensions
    viewport: [i32; 4], // [x, y, width, height]

    // Clear color
    clear_color: [f32; 4],

    // Depth testing enabled
    depth_test: bool,

    // Blend function state, None when blending is disabled
    blend_func: Option<(u32, u32)>, // (src_factor, dst_factor)

    // Active texture unit
    active_texture_unit: u32,
}

impl GlState {
    /// Create a new GLState object with GL defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            viewport: [0, 0, 0, 0],
            clear_color: [0.0, 0.0, 0.0, 0.0],
            depth_test: false,
            blend_func: None,
            active_texture_unit: glow::TEXTURE0,
        }
    }

    /// Set viewport dimensions
    pub fn viewport(
        &mut self,
        gl: &glow::Context,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> &mut Self {
        let new_viewport = [x, y, width, height];
        if self.viewport != new_viewport {
            unsafe { gl.viewport(x, y, width, height) };
            self.viewport = new_viewport;
        }
        self
    }

    /// Returns the last viewport set through this state, as `[x, y, width, height]`.
    #[must_use]
    pub fn current_viewport(&self) -> [i32; 4] {
        self.viewport
    }

    /// Set clear color
    pub fn clear_color(
        &mut self,
        gl: &glow::Context,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> &mut Self {
        let new_color = [r, g, b, a];
        if self.clear_color != new_color {
            unsafe { gl.clear_color(r, g, b, a) };
            self.clear_color = new_color;
        }
        self
    }

    /// Enable or disable depth testing
    pub fn depth_test(&mut self, gl: &glow::Context, enable: bool) -> &mut Self {
        if self.depth_test != enable {
            if enable {
                unsafe { gl.enable(glow::DEPTH_TEST) };
            } else {
                unsafe { gl.disable(glow::DEPTH_TEST) };
            }
            self.depth_test = enable;
        }
        self
    }

    /// Enable blending with the given factors, or disable it with `None`
    pub fn blend(&mut self, gl: &glow::Context, func: Option<(u32, u32)>) -> &mut Self {
        if self.blend_func != func {
            match func {
                Some((src, dst)) => unsafe {
                    gl.enable(glow::BLEND);
                    gl.blend_func(src, dst);
                },
                None => unsafe { gl.disable(glow::BLEND) },
            }
            self.blend_func = func;
        }
        self
    }

    /// Set active texture unit
    pub fn active_texture(&mut self, gl: &glow::Context, texture_unit: u32) -> &mut Self {
        if self.active_texture_unit != texture_unit {
            unsafe { gl.active_texture(texture_unit) };
            self.active_texture_unit = texture_unit;
        }
        self
    }

    /// Reset all tracked state to GL defaults
    pub fn reset(&mut self, gl: &glow::Context) {
        self.blend(gl, None);
        self.depth_test(gl, false);
        self.active_texture(gl, glow::TEXTURE0);

        // viewport and clear_color follow the window and the caller
    }

    /// Re-issues every cached value to GL.
    ///
    /// Needed after code outside this tracker has changed state behind its
    /// back, such as a GUI painter.
    pub fn reapply(&self, gl: &glow::Context) {
        let [x, y, width, height] = self.viewport;
        let [r, g, b, a] = self.clear_color;
        unsafe {
            gl.viewport(x, y, width, height);
            gl.clear_color(r, g, b, a);
            gl.active_texture(self.active_texture_unit);
        }

        if self.depth_test {
            unsafe { gl.enable(glow::DEPTH_TEST) };
        } else {
            unsafe { gl.disable(glow::DEPTH_TEST) };
        }
        match self.blend_func {
            Some((src, dst)) => unsafe {
                gl.enable(glow::BLEND);
                gl.blend_func(src, dst);
            },
            None => unsafe { gl.disable(glow::BLEND) },
        }
    }
}

impl Default for GlState {
    fn default() -> Self {
        Self::new()
    }
}
