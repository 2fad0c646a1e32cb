//! Native window and OpenGL context.

use std::{
    num::NonZeroU32,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    sync::Arc,
};

use glow::HasContext;
use glutin::{
    config::{Config, ConfigTemplateBuilder, GlConfig},
    context::{
        ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext,
        PossiblyCurrentContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::{
    dpi::LogicalSize,
    event_loop::ActiveEventLoop,
    window::{CursorGrabMode, Icon, WindowAttributes},
};

use crate::error::Error;

/// Window dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
}

impl WindowSize {
    /// Creates a size from physical pixel dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 when the height is zero.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 { 1.0 } else { self.width as f32 / self.height as f32 }
    }

    /// True when either dimension is zero, e.g. while minimized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for WindowSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Content scale (physical pixels per logical pixel) per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScale {
    /// Horizontal scale factor
    pub x: f32,
    /// Vertical scale factor
    pub y: f32,
}

impl Default for WindowScale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

/// Parameters for [`Window::create`].
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Logical width
    pub width: u32,
    /// Logical height
    pub height: u32,
    /// Wait for vertical blank on swap (swap interval 1)
    pub vsync: bool,
    /// Show the window once created
    pub visible: bool,
    /// PNG file used as the window icon.
    pub icon: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Ferx".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            visible: true,
            icon: None,
        }
    }
}

/// A native window with a current OpenGL 3.3 core context.
///
/// The window is released exactly once: by [`Window::shutdown`] or on drop,
/// whichever comes first. Cached size and scale stay readable afterwards.
#[derive(Debug)]
pub struct Window {
    title: String,
    size: WindowSize,
    scale: WindowScale,
    cursor_captured: bool,
    native: Option<NativeWindow>,
}

// field order is drop order: GL function table, surface, context, then window
struct NativeWindow {
    gl: Arc<glow::Context>,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: winit::window::Window,
}

impl std::fmt::Debug for NativeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeWindow").field("window", &self.window.id()).finish_non_exhaustive()
    }
}

impl Window {
    /// Opens the window, creates and activates the GL context and loads the
    /// GL function table.
    ///
    /// # Errors
    /// Returns [`Error::Window`] if the native window cannot be created and
    /// [`Error::Context`] if no OpenGL 3.3 core context is available. A bad
    /// icon is only logged.
    pub fn create(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, Error> {
        let attributes = window_attributes(config);
        let template = ConfigTemplateBuilder::new().with_alpha_size(8).with_depth_size(24);

        // glutin's picker cannot fail; an empty match list unwinds out of it
        let built = std::panic::catch_unwind(AssertUnwindSafe(|| {
            DisplayBuilder::new().with_window_attributes(Some(attributes)).build(
                event_loop,
                template,
                |configs| match select_config(configs, |c: &Config| c.num_samples()) {
                    Some(config) => config,
                    None => panic!("no framebuffer configuration matches"),
                },
            )
        }));
        let (window, gl_config) = match built {
            Ok(result) => result.map_err(Error::window_creation_failed)?,
            Err(_) => {
                return Err(Error::window_creation_failed("no framebuffer configuration matches"));
            },
        };

        let window = window.ok_or_else(|| Error::window_creation_failed("no window returned"))?;
        let raw_handle = window
            .window_handle()
            .map_err(Error::window_creation_failed)?
            .as_raw();

        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_handle));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(Error::context_creation_failed)?;

        let size = WindowSize::from(window.inner_size());
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        let gl_surface =
            unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
                .map_err(Error::context_creation_failed)?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .map_err(Error::context_creation_failed)?;

        let interval =
            if config.vsync { SwapInterval::Wait(NonZeroU32::MIN) } else { SwapInterval::DontWait };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
            tracing::warn!(error = %e, vsync = config.vsync, "could not set swap interval");
        }

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };

        let version = gl.version();
        if (version.major, version.minor) < (3, 3) {
            return Err(Error::unsupported_gl_version(version.major, version.minor));
        }

        let (gl_version, gl_renderer) = unsafe {
            (gl.get_parameter_string(glow::VERSION), gl.get_parameter_string(glow::RENDERER))
        };
        tracing::info!(
            gl_version = %gl_version,
            gl_renderer = %gl_renderer,
            width = size.width,
            height = size.height,
            "window created"
        );

        if let Some(path) = &config.icon {
            match load_icon(path) {
                Ok(icon) => window.set_window_icon(Some(icon)),
                Err(e) => tracing::warn!(error = %e, "window icon not set"),
            }
        }

        let scale_factor = window.scale_factor() as f32;
        Ok(Self {
            title: config.title.clone(),
            size,
            scale: WindowScale { x: scale_factor, y: scale_factor },
            cursor_captured: false,
            native: Some(NativeWindow { gl: Arc::new(gl), gl_surface, gl_context, window }),
        })
    }

    /// Current size of the drawable area in physical pixels.
    pub fn size(&mut self) -> WindowSize {
        if let Some(native) = &self.native {
            self.size = native.window.inner_size().into();
        }
        self.size
    }

    /// Current content scale.
    pub fn scale(&mut self) -> WindowScale {
        if let Some(native) = &self.native {
            let factor = native.window.scale_factor() as f32;
            self.scale = WindowScale { x: factor, y: factor };
        }
        self.scale
    }

    /// Title the window was created with.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The native window, `None` after shutdown.
    #[must_use]
    pub fn native(&self) -> Option<&winit::window::Window> {
        self.native.as_ref().map(|n| &n.window)
    }

    /// The GL function table of this window's context, `None` after shutdown.
    #[must_use]
    pub fn gl(&self) -> Option<&glow::Context> {
        self.native.as_ref().map(|n| n.gl.as_ref())
    }

    /// Shared handle to the GL function table, for collaborators that keep
    /// their own reference (such as a GUI painter). `None` after shutdown.
    #[must_use]
    pub fn shared_gl(&self) -> Option<Arc<glow::Context>> {
        self.native.as_ref().map(|n| Arc::clone(&n.gl))
    }

    /// True until [`Window::shutdown`].
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.native.is_some()
    }

    /// Resizes the GL surface to match the window. Empty sizes are ignored.
    pub fn resize_surface(&mut self, size: WindowSize) {
        let Some(native) = &self.native else { return };
        if size.is_empty() {
            return;
        }

        native.gl_surface.resize(&native.gl_context, non_zero(size.width), non_zero(size.height));
        self.size = size;
    }

    /// Presents the back buffer.
    ///
    /// # Errors
    /// Returns [`Error::Unavailable`] after shutdown, or [`Error::Context`] if
    /// the swap fails.
    pub fn swap_buffers(&self) -> Result<(), Error> {
        let native = self.native.as_ref().ok_or_else(Error::window_closed)?;
        native
            .gl_surface
            .swap_buffers(&native.gl_context)
            .map_err(Error::buffer_swap_failed)
    }

    /// Schedules a `RedrawRequested` event.
    pub fn request_redraw(&self) {
        if let Some(native) = &self.native {
            native.window.request_redraw();
        }
    }

    /// Hides and locks the cursor while `captured`, restores it otherwise.
    ///
    /// Platforms without pointer locking fall back to confining the cursor.
    /// Look input comes from raw device motion, so it keeps flowing in both
    /// modes.
    pub fn set_cursor_captured(&mut self, captured: bool) {
        if self.cursor_captured == captured {
            return;
        }
        let Some(native) = &self.native else { return };

        let grab = if captured {
            native
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| native.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            native.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!(error = %e, captured, "cursor grab not supported");
        }

        native.window.set_cursor_visible(!captured);
        self.cursor_captured = captured;
    }

    /// True while the cursor is hidden and grabbed.
    #[must_use]
    pub fn is_cursor_captured(&self) -> bool {
        self.cursor_captured
    }

    /// Releases the GL surface, context and native window. Subsequent calls
    /// are no-ops.
    pub fn shutdown(&mut self) {
        if let Some(native) = self.native.take() {
            drop(native);
            self.cursor_captured = false;
            tracing::info!(title = %self.title, "window closed");
        }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn window_attributes(config: &WindowConfig) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(config.width, config.height))
        .with_visible(config.visible);

    #[cfg(target_os = "linux")]
    let attributes = {
        use winit::platform::x11::WindowAttributesExtX11;
        attributes.with_name("ferx", "Ferx")
    };

    attributes
}

/// Picks the candidate with the most samples; the first one wins ties.
fn select_config<C>(
    candidates: impl Iterator<Item = C>,
    samples: impl Fn(&C) -> u8,
) -> Option<C> {
    candidates.reduce(|best, candidate| {
        if samples(&candidate) > samples(&best) { candidate } else { best }
    })
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

fn load_icon(path: &Path) -> Result<Icon, Error> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;

    let mut decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(Error::icon_decode_failed)?;

    let (color_type, _) = reader.output_color_type();
    let (width, height) = (reader.info().width, reader.info().height);
    let mut buf = vec![0; width as usize * height as usize * color_type.samples()];
    let frame = reader.next_frame(&mut buf).map_err(Error::icon_decode_failed)?;
    buf.truncate(frame.buffer_size());

    let rgba = expand_to_rgba(frame.color_type, &buf)?;
    Icon::from_rgba(rgba, frame.width, frame.height).map_err(Error::icon_decode_failed)
}

/// Widens 8-bit gray, gray-alpha and RGB pixels to RGBA.
fn expand_to_rgba(color_type: png::ColorType, pixels: &[u8]) -> Result<Vec<u8>, Error> {
    let rgba = match color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => {
            pixels.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], u8::MAX]).collect()
        },
        png::ColorType::GrayscaleAlpha => {
            pixels.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect()
        },
        png::ColorType::Grayscale => pixels.iter().flat_map(|&v| [v, v, v, u8::MAX]).collect(),
        png::ColorType::Indexed => {
            return Err(Error::icon_decode_failed("palette was not expanded"));
        },
    };

    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_handles_zero_height() {
        assert_eq!(WindowSize::new(1920, 1080).aspect_ratio(), 1920.0 / 1080.0);
        assert_eq!(WindowSize::new(800, 0).aspect_ratio(), 1.0);
        assert!(WindowSize::new(800, 0).is_empty());
        assert!(WindowSize::new(0, 600).is_empty());
        assert!(!WindowSize::new(1, 1).is_empty());
    }

    #[test]
    fn default_config() {
        let config = WindowConfig::default();
        assert_eq!(config.title, "Ferx");
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(config.vsync);
        assert!(config.visible);
        assert!(config.icon.is_none());
    }

    #[test]
    fn pixels_expand_to_rgba() {
        let rgb = expand_to_rgba(png::ColorType::Rgb, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(rgb, [1, 2, 3, 255, 4, 5, 6, 255]);

        let gray_alpha = expand_to_rgba(png::ColorType::GrayscaleAlpha, &[9, 128]).unwrap();
        assert_eq!(gray_alpha, [9, 9, 9, 128]);

        let gray = expand_to_rgba(png::ColorType::Grayscale, &[7]).unwrap();
        assert_eq!(gray, [7, 7, 7, 255]);

        assert!(expand_to_rgba(png::ColorType::Indexed, &[0]).is_err());
    }

    #[test]
    fn bundled_icon_decodes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/icons/icon.png");
        assert!(load_icon(&path).is_ok());
    }

    #[test]
    fn missing_icon_is_an_io_error() {
        let err = load_icon(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn config_selection_prefers_samples_and_reports_empty_lists() {
        let candidates = [("a", 0u8), ("b", 4), ("c", 4), ("d", 2)];
        let best = select_config(candidates.into_iter(), |c| c.1);
        assert_eq!(best, Some(("b", 4)));

        let none = select_config(std::iter::empty::<(&str, u8)>(), |c| c.1);
        assert_eq!(none, None);
    }

    #[test]
    fn zero_dimensions_become_one() {
        assert_eq!(non_zero(0).get(), 1);
        assert_eq!(non_zero(640).get(), 640);
    }
}
