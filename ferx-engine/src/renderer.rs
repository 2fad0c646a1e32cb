//! Off-screen cube renderer.
//!
//! The renderer draws the scene into its own framebuffer; presenting that
//! framebuffer (and swapping the window) is left to the caller. GPU resources
//! live in [`RendererData`], which exists only between a successful
//! [`Renderer::init`] and [`Renderer::shutdown`].

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::{
    camera::Camera,
    controls::CameraControls,
    cube::{Cube, FLOATS_PER_VERTEX},
    error::Error,
    gl::{
        Drawable, FrameBuffer, GlState, IndexBuffer, RenderContext, Shader, VertexArray,
        VertexBuffer,
    },
    input::InputState,
    scene::Scene,
    time::FrameClock,
    window::WindowSize,
};

const CLEAR_COLOR: Vec3 = Vec3::new(0.0, 0.1, 0.2);
const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 3.0);
const PRIMARY_CUBE: &str = "Cube";

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Location of the files the renderer loads at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    root: PathBuf,
}

impl ResourcePaths {
    /// Paths resolved against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory every resource is resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `shaders/vertex.glsl` under the root.
    #[must_use]
    pub fn vertex_shader(&self) -> PathBuf {
        self.root.join("shaders/vertex.glsl")
    }

    /// `shaders/fragment.glsl` under the root.
    #[must_use]
    pub fn fragment_shader(&self) -> PathBuf {
        self.root.join("shaders/fragment.glsl")
    }

    /// `icons/icon.png` under the root.
    #[must_use]
    pub fn icon(&self) -> PathBuf {
        self.root.join("icons/icon.png")
    }
}

impl Default for ResourcePaths {
    /// The `resources/` directory shipped with this crate.
    fn default() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
    }
}

/// Lifecycle of a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Created; [`Renderer::init`] not yet successful.
    Uninitialized,
    /// GPU resources held; frames can be rendered.
    Ready,
    /// Shut down; cannot be initialized again.
    Destroyed,
}

/// Window-system notifications the renderer reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RendererEvent {
    /// The window changed size; all buffers are rebuilt at the new size.
    WindowResized(WindowSize),
    /// The default framebuffer changed size; the viewport follows it.
    FramebufferResized(WindowSize),
    /// Vertical scroll in lines; adjusts the camera zoom.
    Scrolled(f32),
}

/// Everything the renderer owns while it is ready.
#[derive(Debug)]
pub struct RendererData {
    scene: Scene,
    camera: Camera,
    cube: Rc<Cube>,
    clear_color: Vec3,
    shader: Shader,
    buffers: BufferSet,
}

impl RendererData {
    /// Cubes drawn every frame.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Viewpoint driven by the camera controls.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The cube created at startup; also present in the scene.
    #[must_use]
    pub fn cube(&self) -> &Rc<Cube> {
        &self.cube
    }

    /// Color the framebuffer is cleared to.
    #[must_use]
    pub fn clear_color(&self) -> Vec3 {
        self.clear_color
    }

    /// The linked cube program.
    #[must_use]
    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    /// Off-screen target the scene is drawn into.
    #[must_use]
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.buffers.fbo
    }
}

/// Cube geometry and the off-screen target, created and destroyed together.
#[derive(Debug)]
struct BufferSet {
    vao: VertexArray,
    vbo: VertexBuffer,
    ibo: IndexBuffer,
    fbo: FrameBuffer,
}

impl BufferSet {
    fn create(gl: &glow::Context, size: WindowSize) -> Result<Self, Error> {
        let vao = VertexArray::create(gl)?;
        let mut vbo = match VertexBuffer::create(gl) {
            Ok(vbo) => vbo,
            Err(e) => {
                vao.delete(gl);
                return Err(e);
            },
        };
        let mut ibo = match IndexBuffer::create(gl) {
            Ok(ibo) => ibo,
            Err(e) => {
                vbo.delete(gl);
                vao.delete(gl);
                return Err(e);
            },
        };

        let stride = (FLOATS_PER_VERTEX * size_of::<f32>()) as i32;
        vao.bind(gl);
        vbo.set_data(gl, Cube::vertices());
        ibo.set_data(gl, Cube::indices());
        vao.float_attribute(gl, 0, 3, stride, 0);
        vao.float_attribute(gl, 1, 3, stride, 3 * size_of::<f32>() as i32);
        VertexArray::unbind(gl);
        VertexBuffer::unbind(gl);

        let fbo = match FrameBuffer::create(gl, size.width as i32, size.height as i32) {
            Ok(fbo) => fbo,
            Err(e) => {
                ibo.delete(gl);
                vbo.delete(gl);
                vao.delete(gl);
                return Err(e);
            },
        };

        Ok(Self { vao, vbo, ibo, fbo })
    }

    fn delete(&self, gl: &glow::Context) {
        self.fbo.delete(gl);
        self.ibo.delete(gl);
        self.vbo.delete(gl);
        self.vao.delete(gl);
    }
}

/// Draws the scene's cubes into an off-screen framebuffer.
#[derive(Debug)]
pub struct Renderer {
    state: RendererState,
    resources: ResourcePaths,
    data: Option<RendererData>,
    gl_state: GlState,
    clock: FrameClock,
    controls: CameraControls,
}

impl Renderer {
    /// An uninitialized renderer loading its files from `resources`.
    #[must_use]
    pub fn new(resources: ResourcePaths) -> Self {
        Self {
            state: RendererState::Uninitialized,
            resources,
            data: None,
            gl_state: GlState::new(),
            clock: FrameClock::new(),
            controls: CameraControls::new(),
        }
    }

    /// Builds the scene, compiles the shader, uploads the cube and creates
    /// the framebuffer at `window_size`, in that order.
    ///
    /// Calling this on a ready renderer only logs a warning.
    ///
    /// # Errors
    /// Returns the first failing stage's error; resources created by earlier
    /// stages are released and the renderer stays uninitialized. Returns
    /// [`Error::Unavailable`] after shutdown.
    pub fn init(&mut self, gl: &glow::Context, window_size: WindowSize) -> Result<(), Error> {
        match self.state {
            RendererState::Ready => {
                tracing::warn!("renderer already initialized");
                return Ok(());
            },
            RendererState::Destroyed => return Err(Error::renderer_destroyed()),
            RendererState::Uninitialized => {},
        }

        let (scene, camera, cube) = setup_scene();

        let shader = Shader::from_files(
            gl,
            &self.resources.vertex_shader(),
            &self.resources.fragment_shader(),
        )?;

        let buffers = match BufferSet::create(gl, window_size) {
            Ok(buffers) => buffers,
            Err(e) => {
                shader.delete(gl);
                return Err(e);
            },
        };

        let (width, height) = buffers.fbo.size();
        self.gl_state.viewport(gl, 0, 0, width, height);

        self.data =
            Some(RendererData { scene, camera, cube, clear_color: CLEAR_COLOR, shader, buffers });
        self.state = RendererState::Ready;
        self.clock.reset();

        let resources = self.resources.root().display();
        tracing::info!(width, height, resources = %resources, "renderer ready");
        Ok(())
    }

    /// Renders one frame into the off-screen framebuffer and rebinds the
    /// default framebuffer. Applies camera controls from `input` first.
    ///
    /// # Errors
    /// Returns [`Error::Unavailable`] unless the renderer is ready.
    pub fn render(
        &mut self,
        gl: &glow::Context,
        input: &InputState,
        window_size: WindowSize,
    ) -> Result<(), Error> {
        let data = self.data.as_mut().ok_or_else(Error::renderer_not_ready)?;

        let frame = self.clock.tick();
        self.controls.update(&mut data.camera, input, frame.dt);

        let fbo = &data.buffers.fbo;
        let (width, height) = fbo.size();
        let clear = data.clear_color;

        fbo.bind(gl);
        self.gl_state
            .depth_test(gl, true)
            .viewport(gl, 0, 0, width, height)
            .clear_color(gl, clear.x, clear.y, clear.z, 1.0);
        unsafe { gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT) };

        let view = data.camera.view_matrix();
        let projection = projection_matrix(window_size, data.camera.zoom());

        let mut context = RenderContext { gl, state: &mut self.gl_state };
        for cube in data.scene.cubes() {
            let pass = CubePass {
                shader: &data.shader,
                vao: &data.buffers.vao,
                index_count: data.buffers.ibo.count(),
                model: cube.model(),
                view,
                projection,
                color: cube.color(),
            };
            pass.render(&mut context);
        }

        FrameBuffer::unbind(gl);
        Ok(())
    }

    /// Reacts to a window-system notification.
    ///
    /// A window resize rebuilds every buffer at the new size; the new set is
    /// created before the old one is deleted so a failed rebuild leaves the
    /// previous buffers in place. Empty sizes (minimized windows) are ignored.
    ///
    /// # Errors
    /// Returns [`Error::Unavailable`] unless the renderer is ready, or the
    /// resource error of a failed rebuild.
    pub fn handle_event(&mut self, gl: &glow::Context, event: RendererEvent) -> Result<(), Error> {
        let data = self.data.as_mut().ok_or_else(Error::renderer_not_ready)?;

        match event {
            RendererEvent::WindowResized(size) if size.is_empty() => {
                tracing::debug!(?size, "ignoring resize to empty window");
            },
            RendererEvent::WindowResized(size) => {
                let rebuilt = BufferSet::create(gl, size)?;
                std::mem::replace(&mut data.buffers, rebuilt).delete(gl);
                tracing::debug!(width = size.width, height = size.height, "buffers rebuilt");
            },
            RendererEvent::FramebufferResized(size) => {
                if !size.is_empty() {
                    self.gl_state.viewport(gl, 0, 0, size.width as i32, size.height as i32);
                }
            },
            RendererEvent::Scrolled(y_offset) => data.camera.process_mouse_scroll(y_offset),
        }

        Ok(())
    }

    /// Deletes all GPU resources and drops the scene. Subsequent calls are
    /// no-ops.
    pub fn shutdown(&mut self, gl: &glow::Context) {
        if let Some(data) = self.data.take() {
            data.buffers.delete(gl);
            data.shader.delete(gl);
            unsafe { gl.use_program(None) };
            self.gl_state.reset(gl);
            tracing::info!("renderer shut down");
        }
        self.state = RendererState::Destroyed;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// True when no GPU resources or scene data are held.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.data.is_none()
    }

    /// Scene and GPU resources, while ready.
    #[must_use]
    pub fn data(&self) -> Option<&RendererData> {
        self.data.as_ref()
    }

    /// The camera, while ready.
    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.data.as_ref().map(|d| &d.camera)
    }

    /// The off-screen target, while ready.
    #[must_use]
    pub fn framebuffer(&self) -> Option<&FrameBuffer> {
        self.data.as_ref().map(|d| &d.buffers.fbo)
    }

    /// The texture the scene was last rendered into.
    #[must_use]
    pub fn color_attachment(&self) -> Option<glow::Texture> {
        self.framebuffer().map(FrameBuffer::color_attachment)
    }

    /// Last viewport set, as `[x, y, width, height]`.
    #[must_use]
    pub fn viewport(&self) -> [i32; 4] {
        self.gl_state.current_viewport()
    }

    /// Where shaders and the icon are loaded from.
    #[must_use]
    pub fn resources(&self) -> &ResourcePaths {
        &self.resources
    }

    /// Tracked GL state, shared with passes drawn after the scene.
    pub fn gl_state_mut(&mut self) -> &mut GlState {
        &mut self.gl_state
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if self.data.is_some() {
            tracing::warn!("renderer dropped without shutdown, GPU resources leaked");
        }
    }
}

/// Perspective projection with `fov_degrees` vertical field of view and the
/// aspect ratio of `size`.
#[must_use]
pub fn projection_matrix(size: WindowSize, fov_degrees: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_degrees.to_radians(), size.aspect_ratio(), Z_NEAR, Z_FAR)
}

fn setup_scene() -> (Scene, Camera, Rc<Cube>) {
    let cube = Rc::new(Cube::new(PRIMARY_CUBE));
    let mut scene = Scene::new();
    scene.add_cube(Rc::clone(&cube));

    (scene, Camera::new(CAMERA_START), cube)
}

/// One indexed draw of the cube geometry with per-cube uniforms.
struct CubePass<'a> {
    shader: &'a Shader,
    vao: &'a VertexArray,
    index_count: i32,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    color: Vec3,
}

impl Drawable for CubePass<'_> {
    fn prepare(&self, context: &mut RenderContext) {
        let gl = context.gl;
        self.shader.use_program(gl);
        self.shader.set_mat4(gl, "model", &self.model);
        self.shader.set_mat4(gl, "view", &self.view);
        self.shader.set_mat4(gl, "projection", &self.projection);
        self.shader.set_vec3(gl, "color", self.color);
        self.vao.bind(gl);
    }

    fn draw(&self, context: &mut RenderContext) {
        unsafe {
            context.gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
        }
    }

    fn cleanup(&self, context: &mut RenderContext) {
        VertexArray::unbind(context.gl);
        unsafe { context.gl.use_program(None) };
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    #[test]
    fn scene_setup_shares_the_primary_cube() {
        let (scene, camera, cube) = setup_scene();

        assert_eq!(scene.len(), 1);
        let found = scene.cube_by_name("Cube").expect("primary cube in scene");
        assert!(Rc::ptr_eq(&found, &cube));
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn projection_uses_aspect_and_fov() {
        let size = WindowSize::new(1920, 1080);
        let expected = Mat4::perspective_rh_gl(45f32.to_radians(), 1920.0 / 1080.0, 0.1, 100.0);
        assert_eq!(projection_matrix(size, 45.0), expected);

        // a point on the near plane center maps to ndc z = -1
        let clip = projection_matrix(size, 45.0) * Vec4::new(0.0, 0.0, -Z_NEAR, 1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-5);
    }

    #[test]
    fn narrower_fov_magnifies() {
        let size = WindowSize::new(800, 600);
        let wide = projection_matrix(size, 45.0);
        let narrow = projection_matrix(size, 10.0);
        assert!(narrow.x_axis.x > wide.x_axis.x);
    }

    #[test]
    fn default_resources_exist() {
        let resources = ResourcePaths::default();
        assert!(resources.vertex_shader().is_file());
        assert!(resources.fragment_shader().is_file());
        assert!(resources.icon().is_file());
    }

    #[test]
    fn bundled_shaders_target_glsl_330_core() {
        let resources = ResourcePaths::default();
        for path in [resources.vertex_shader(), resources.fragment_shader()] {
            let source = std::fs::read_to_string(&path).unwrap();
            assert!(source.starts_with("#version 330 core"), "{}", path.display());
        }
    }

    #[test]
    fn new_renderer_holds_nothing() {
        let renderer = Renderer::new(ResourcePaths::new("/nonexistent"));
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert!(renderer.is_released());
        assert!(renderer.color_attachment().is_none());
        assert_eq!(
            renderer.resources().vertex_shader(),
            Path::new("/nonexistent/shaders/vertex.glsl")
        );
    }
}
