use std::sync::Arc;

use color_eyre::eyre::{Result, eyre};
use egui::{TextureId, ViewportId};
use egui_winit::EventResponse;
use winit::{event::WindowEvent, window::Window};

/// egui context, winit input translation and the glow painter.
///
/// The scene texture is registered with the painter as a native texture; the
/// renderer owns it, and it is swapped in place when the framebuffer is
/// rebuilt.
pub(super) struct GuiBackend {
    ctx: egui::Context,
    state: egui_winit::State,
    painter: egui_glow::Painter,
    shapes: Vec<egui::epaint::ClippedShape>,
    pixels_per_point: f32,
    textures_delta: egui::TexturesDelta,
    scene: Option<(TextureId, glow::Texture)>,
}

impl GuiBackend {
    pub(super) fn new(gl: Arc<glow::Context>, window: &Window) -> Result<Self> {
        let painter = egui_glow::Painter::new(gl, "", None, false)
            .map_err(|e| eyre!("Failed to create the GUI painter: {e}"))?;

        let ctx = egui::Context::default();
        let pixels_per_point = window.scale_factor() as f32;
        let state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(pixels_per_point),
            window.theme(),
            Some(painter.max_texture_side()),
        );

        Ok(Self {
            ctx,
            state,
            painter,
            shapes: Vec::new(),
            pixels_per_point,
            textures_delta: egui::TexturesDelta::default(),
            scene: None,
        })
    }

    pub(super) fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let EventResponse { consumed, .. } = self.state.on_window_event(window, event);
        consumed
    }

    /// Keeps the painter pointed at the renderer's current color attachment.
    pub(super) fn sync_scene_texture(
        &mut self,
        texture: Option<glow::Texture>,
    ) -> Option<TextureId> {
        let texture = texture?;

        match self.scene {
            Some((id, registered)) if registered == texture => Some(id),
            Some((id, _)) => {
                // the previous attachment was deleted by the renderer's rebuild
                self.painter.replace_native_texture(id, texture);
                self.scene = Some((id, texture));
                Some(id)
            },
            None => {
                let id = self.painter.register_native_texture(texture);
                tracing::debug!(?id, "scene texture registered");
                self.scene = Some((id, texture));
                Some(id)
            },
        }
    }

    /// Runs one egui pass; the output is painted by [`GuiBackend::paint`].
    pub(super) fn run(&mut self, window: &Window, run_ui: impl FnMut(&mut egui::Ui)) {
        let raw_input = self.state.take_egui_input(window);
        let egui::FullOutput { platform_output, textures_delta, shapes, pixels_per_point, .. } =
            self.ctx.run_ui(raw_input, run_ui);

        self.state.handle_platform_output(window, platform_output);

        self.shapes = shapes;
        self.pixels_per_point = pixels_per_point;
        self.textures_delta.append(textures_delta);
    }

    /// Paints the last pass into the bound framebuffer of `size_px`.
    pub(super) fn paint(&mut self, size_px: [u32; 2]) {
        let shapes = std::mem::take(&mut self.shapes);
        let textures_delta = std::mem::take(&mut self.textures_delta);

        let primitives = self.ctx.tessellate(shapes, self.pixels_per_point);
        self.painter.paint_and_update_textures(
            size_px,
            self.pixels_per_point,
            &primitives,
            &textures_delta,
        );
    }

    /// Deletes the painter's GL objects. Must run while the context is current.
    pub(super) fn destroy(&mut self) {
        self.scene = None;
        self.painter.destroy();
    }
}
