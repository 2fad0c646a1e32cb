use std::path::{Path, PathBuf};

use color_eyre::{Report, eyre::WrapErr};
use directories::ProjectDirs;
use egui::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Largest accepted gap around the scene image, in points.
pub const MAX_MARGIN: u32 = 1024;

/// Persisted editor chrome settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiLayout {
    /// Window background behind the panels, RGB in `[0, 1]`
    pub background: [f32; 3],
    /// Gap between the "Scene" panel border and the image, in points
    pub margin: u32,
    /// Letterbox the scene image instead of stretching it
    pub preserve_aspect: bool,
    /// Show camera and framebuffer details in the sidebar
    pub show_stats: bool,
}

impl Default for GuiLayout {
    fn default() -> Self {
        Self { background: [0.08, 0.08, 0.09], margin: 8, preserve_aspect: true, show_stats: true }
    }
}

impl GuiLayout {
    /// `layout.json` in the OS config directory.
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("", "", "ferx") {
            Some(dirs) => dirs.config_dir().join("layout.json"),
            None => PathBuf::from("ferx-layout.json"),
        }
    }

    /// Reads a layout, falling back to the defaults when the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Self>(&json) {
                Ok(layout) => layout.sanitized(),
                Err(e) => {
                    let path = path.display();
                    tracing::warn!(path = %path, error = %e, "invalid layout, using defaults");
                    Self::default()
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved layout");
                Self::default()
            },
            Err(e) => {
                let path = path.display();
                tracing::warn!(path = %path, error = %e, "layout unreadable, using defaults");
                Self::default()
            },
        }
    }

    /// Writes the layout as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), Report> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).wrap_err_with(|| format!("Failed to write '{}'", path.display()))
    }

    /// Clamps every field into its valid range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.background =
            self.background.map(|c| if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 });
        self.margin = self.margin.min(MAX_MARGIN);
        self
    }

    /// Where the scene image goes inside `panel`: inset by the margin, then
    /// letterboxed to `aspect` when `preserve_aspect` is set. Degenerate
    /// panels yield a zero-sized rectangle at the panel's center.
    #[must_use]
    pub fn scene_image_rect(&self, panel: Rect, aspect: f32) -> Rect {
        let margin = self.margin.min(MAX_MARGIN) as f32;
        let content = (panel.size() - Vec2::splat(2.0 * margin)).max(Vec2::ZERO);

        let size = if self.preserve_aspect { fit_aspect(content, aspect) } else { content };
        Rect::from_center_size(panel.center(), size)
    }
}

/// Largest size inside `area` with the given width / height ratio.
fn fit_aspect(area: Vec2, aspect: f32) -> Vec2 {
    if area.x <= 0.0 || area.y <= 0.0 || !(aspect.is_finite() && aspect > 0.0) {
        return area;
    }

    if area.x / area.y > aspect {
        Vec2::new(area.y * aspect, area.y)
    } else {
        Vec2::new(area.x, area.x / aspect)
    }
}

#[cfg(test)]
mod tests {
    use egui::{Pos2, pos2, vec2};

    use super::*;

    fn panel(width: f32, height: f32) -> Rect {
        Rect::from_min_size(pos2(200.0, 0.0), vec2(width, height))
    }

    #[test]
    fn image_keeps_window_aspect_inside_scene_panel() {
        let layout = GuiLayout { margin: 0, ..GuiLayout::default() };

        // 800x500 panel, 2:1 window -> 800x400 centered vertically
        let image = layout.scene_image_rect(panel(800.0, 500.0), 2.0);
        assert_eq!(image, Rect::from_min_size(pos2(200.0, 50.0), vec2(800.0, 400.0)));
    }

    #[test]
    fn stretched_image_fills_the_content_area() {
        let layout = GuiLayout { preserve_aspect: false, margin: 10, ..GuiLayout::default() };
        let image = layout.scene_image_rect(panel(800.0, 500.0), 2.0);
        assert_eq!(image, Rect::from_min_size(pos2(210.0, 10.0), vec2(780.0, 480.0)));
    }

    #[test]
    fn tall_panels_letterbox_top_and_bottom() {
        let layout = GuiLayout { margin: 0, ..GuiLayout::default() };
        let image = layout.scene_image_rect(panel(400.0, 800.0), 2.0);
        assert_eq!(image.size(), vec2(400.0, 200.0));
        assert_eq!(image.center(), pos2(400.0, 400.0));

        assert_eq!(fit_aspect(vec2(400.0, 800.0), f32::NAN), vec2(400.0, 800.0));
    }

    #[test]
    fn tiny_and_empty_panels_collapse_to_their_center() {
        let layout = GuiLayout::default();

        let image = layout.scene_image_rect(Rect::from_min_size(Pos2::ZERO, Vec2::ZERO), 1.5);
        assert_eq!(image.size(), Vec2::ZERO);

        let image = layout.scene_image_rect(panel(10.0, 10.0), 1.5);
        assert_eq!(image.size(), Vec2::ZERO);
        assert_eq!(image.center(), pos2(205.0, 5.0));
    }

    #[test]
    fn huge_margins_are_clamped_on_load() {
        let dir = std::env::temp_dir().join(format!("ferx-margin-{}", std::process::id()));
        let path = dir.join("layout.json");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, r#"{ "margin": 1500000000 }"#).unwrap();

        let layout = GuiLayout::load(&path);
        assert_eq!(layout.margin, MAX_MARGIN);

        let image = layout.scene_image_rect(panel(1280.0, 720.0), 16.0 / 9.0);
        assert_eq!(image.size(), Vec2::ZERO);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unsanitized_margins_do_not_overflow() {
        let layout = GuiLayout { margin: u32::MAX, ..GuiLayout::default() };
        let image = layout.scene_image_rect(panel(800.0, 500.0), 2.0);
        assert_eq!(image.size(), Vec2::ZERO);
    }

    #[test]
    fn sanitizing_clamps_out_of_range_values() {
        let layout = GuiLayout { background: [2.0, -1.0, f32::NAN], ..GuiLayout::default() };
        assert_eq!(layout.sanitized().background, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let layout: GuiLayout = serde_json::from_str(r#"{ "margin": 2 }"#).unwrap();
        assert_eq!(layout.margin, 2);
        assert_eq!(layout.preserve_aspect, GuiLayout::default().preserve_aspect);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("ferx-layout-{}", std::process::id()));
        let path = dir.join("nested/layout.json");

        let layout = GuiLayout { margin: 3, preserve_aspect: false, ..GuiLayout::default() };
        layout.save(&path).unwrap();
        assert_eq!(GuiLayout::load(&path), layout);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(GuiLayout::load(&path), GuiLayout::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_loads_defaults() {
        assert_eq!(GuiLayout::load(Path::new("/does/not/exist.json")), GuiLayout::default());
    }
}
