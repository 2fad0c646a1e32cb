//! Editor chrome drawn with egui: a sidebar and a "Scene" panel showing the
//! renderer's off-screen image.

mod backend;
mod layout;

use std::{path::PathBuf, sync::Arc};

use backend::GuiBackend;
use color_eyre::eyre::Result;
use egui::{Rect, TextureId, load::SizedTexture, pos2};
use ferx_engine::{Camera, RenderContext, Renderer, WindowSize};
use glow::HasContext;
pub use layout::{GuiLayout, MAX_MARGIN};
use winit::{
    event::{ElementState, WindowEvent},
    window::Window,
};

const SIDEBAR_ID: &str = "ferx-sidebar";

/// GUI collaborator of the editor loop.
///
/// Per frame: [`Gui::run`] builds the widgets, the engine renders the scene,
/// then [`Gui::render`] paints the widgets into the default framebuffer.
pub struct Gui {
    layout_path: PathBuf,
    layout: GuiLayout,
    backend: Option<GuiBackend>,
    scene_hovered: bool,
}

impl Gui {
    /// A GUI that loads and saves its layout at `layout_path`.
    #[must_use]
    pub fn new(layout_path: PathBuf) -> Self {
        Self { layout_path, layout: GuiLayout::default(), backend: None, scene_hovered: false }
    }

    /// Creates the egui context and painter for `window`.
    ///
    /// # Errors
    /// Returns the painter's shader or buffer error.
    pub fn init(&mut self, gl: Arc<glow::Context>, window: &Window) -> Result<()> {
        if self.backend.is_some() {
            tracing::warn!("gui already initialized");
            return Ok(());
        }

        self.backend = Some(GuiBackend::new(gl, window)?);
        tracing::info!("gui initialized");
        Ok(())
    }

    /// Loads the persisted layout; defaults are used if there is none.
    pub fn load_configs(&mut self) {
        self.layout = GuiLayout::load(&self.layout_path);
        tracing::debug!(path = %self.layout_path.display(), layout = ?self.layout, "layout loaded");
    }

    /// The current layout settings.
    #[must_use]
    pub fn layout(&self) -> &GuiLayout {
        &self.layout
    }

    /// Offers a window event to the widgets. Returns true when the engine
    /// should see it too.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let consumed = match self.backend.as_mut() {
            Some(backend) => backend.on_window_event(window, event),
            None => false,
        };
        forwards_to_engine(event, consumed, self.scene_hovered)
    }

    /// Begins a frame: builds the sidebar and the "Scene" panel around the
    /// renderer's last image.
    pub fn run(&mut self, window: &Window, renderer: &Renderer) {
        let Some(backend) = self.backend.as_mut() else { return };

        let scene = backend.sync_scene_texture(renderer.color_attachment());
        let aspect = renderer
            .framebuffer()
            .map(|fbo| fbo.size())
            .filter(|&(w, h)| w > 0 && h > 0)
            .map_or(1.0, |(w, h)| w as f32 / h as f32);

        let layout = &mut self.layout;
        let mut scene_hovered = false;
        backend.run(window, |ui| {
            egui::Panel::left(SIDEBAR_ID).show_inside(ui, |ui| sidebar(ui, layout, renderer));

            // the rest of the root ui is the "Scene" panel
            if let Some(id) = scene {
                scene_hovered = scene_image(ui, layout, id, aspect).hovered();
            }
        });
        self.scene_hovered = scene_hovered;
    }

    /// Clears the default framebuffer to the layout background and paints the
    /// widgets built by the last [`Gui::run`]. GL state tracked in `context`
    /// is restored afterwards.
    ///
    /// Does nothing before [`Gui::init`] or for an empty window.
    pub fn render(&mut self, context: &mut RenderContext, window_size: WindowSize) {
        let Some(backend) = self.backend.as_mut() else { return };
        if window_size.is_empty() {
            return;
        }

        let gl = context.gl;
        let (width, height) = (window_size.width as i32, window_size.height as i32);
        let [r, g, b] = self.layout.background;
        context.state.viewport(gl, 0, 0, width, height).depth_test(gl, false);
        context.state.clear_color(gl, r, g, b, 1.0);
        unsafe { gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT) };

        backend.paint([window_size.width, window_size.height]);

        // the painter sets blend, viewport and program behind the tracker
        unsafe { gl.use_program(None) };
        context.state.reapply(gl);
    }

    /// Saves the layout and deletes the painter's GPU objects. Subsequent
    /// calls are no-ops.
    pub fn shutdown(&mut self) {
        let Some(mut backend) = self.backend.take() else { return };
        backend.destroy();
        self.scene_hovered = false;

        match self.layout.save(&self.layout_path) {
            Ok(()) => tracing::debug!(path = %self.layout_path.display(), "layout saved"),
            Err(e) => tracing::warn!(error = %e, "layout not saved"),
        }
        tracing::info!("gui shut down");
    }
}

/// Whether a window event the widgets have seen still reaches the engine.
///
/// Releases, resizes and focus changes always pass so held keys and the
/// framebuffer stay in sync. Presses and scrolls over the scene image pass
/// even when egui claims them.
fn forwards_to_engine(event: &WindowEvent, consumed: bool, scene_hovered: bool) -> bool {
    if !consumed {
        return true;
    }

    match event {
        WindowEvent::KeyboardInput { event, .. } => event.state == ElementState::Released,
        WindowEvent::MouseInput { state: ElementState::Released, .. } => true,
        WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. } => scene_hovered,
        WindowEvent::CursorMoved { .. } | WindowEvent::Ime(_) => false,
        _ => true,
    }
}

fn sidebar(ui: &mut egui::Ui, layout: &mut GuiLayout, renderer: &Renderer) {
    ui.heading("Ferx");
    ui.separator();

    ui.label("Display");
    ui.horizontal(|ui| {
        ui.label("Background");
        ui.color_edit_button_rgb(&mut layout.background);
    });
    ui.checkbox(&mut layout.preserve_aspect, "Keep aspect ratio");
    ui.add(egui::Slider::new(&mut layout.margin, 0..=MAX_MARGIN).text("Margin"));
    ui.checkbox(&mut layout.show_stats, "Show details");

    if !layout.show_stats {
        return;
    }
    ui.separator();

    match (renderer.camera(), renderer.data()) {
        (Some(camera), Some(data)) => {
            camera_details(ui, camera);
            ui.label(format!("Cubes: {}", data.scene().len()));
            let (width, height) = data.framebuffer().size();
            ui.label(format!("Framebuffer: {width}x{height}"));
        },
        _ => {
            ui.label(format!("Renderer: {:?}", renderer.state()));
        },
    }
}

fn camera_details(ui: &mut egui::Ui, camera: &Camera) {
    let position = camera.position();
    ui.label("Camera");
    ui.monospace(format!("pos   {:>7.2} {:>7.2} {:>7.2}", position.x, position.y, position.z));
    ui.monospace(format!("yaw   {:>7.1}", camera.yaw()));
    ui.monospace(format!("pitch {:>7.1}", camera.pitch()));
    ui.monospace(format!("fov   {:>7.1}", camera.zoom()));
}

/// Shows the scene texture inside the remaining panel area. GL textures
/// start at the bottom row, so the image is flipped vertically.
fn scene_image(
    ui: &mut egui::Ui,
    layout: &GuiLayout,
    id: TextureId,
    aspect: f32,
) -> egui::Response {
    let rect = layout.scene_image_rect(ui.available_rect_before_wrap(), aspect);
    let image = egui::Image::new(SizedTexture::new(id, rect.size()))
        .uv(Rect::from_min_max(pos2(0.0, 1.0), pos2(1.0, 0.0)));
    ui.put(rect, image)
}

#[cfg(test)]
mod tests {
    use winit::{
        dpi::PhysicalSize,
        event::{DeviceId, MouseButton, MouseScrollDelta, TouchPhase},
    };

    use super::*;

    fn mouse(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: unsafe { DeviceId::dummy() },
            state,
            button: MouseButton::Right,
        }
    }

    fn scroll() -> WindowEvent {
        WindowEvent::MouseWheel {
            device_id: unsafe { DeviceId::dummy() },
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        }
    }

    #[test]
    fn unclaimed_events_reach_the_engine() {
        assert!(forwards_to_engine(&mouse(ElementState::Pressed), false, false));
        assert!(forwards_to_engine(&scroll(), false, false));
    }

    #[test]
    fn claimed_presses_stay_with_the_widgets() {
        assert!(!forwards_to_engine(&mouse(ElementState::Pressed), true, false));
        assert!(!forwards_to_engine(&scroll(), true, false));
    }

    #[test]
    fn presses_over_the_scene_image_reach_the_engine() {
        assert!(forwards_to_engine(&mouse(ElementState::Pressed), true, true));
        assert!(forwards_to_engine(&scroll(), true, true));
    }

    #[test]
    fn releases_and_resizes_always_reach_the_engine() {
        assert!(forwards_to_engine(&mouse(ElementState::Released), true, false));
        let resized = WindowEvent::Resized(PhysicalSize::new(640, 480));
        assert!(forwards_to_engine(&resized, true, false));
        assert!(forwards_to_engine(&WindowEvent::Focused(false), true, false));
    }

    #[test]
    fn gui_without_backend_is_inert() {
        let mut gui = Gui::new(PathBuf::from("/does/not/exist.json"));
        gui.load_configs();
        assert_eq!(gui.layout(), &GuiLayout::default());

        // no painter yet: nothing registered, shutdown does not save
        gui.shutdown();
        assert!(gui.backend.is_none());
        assert!(!PathBuf::from("/does/not/exist.json").exists());
    }
}
