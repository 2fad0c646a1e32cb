use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Report, eyre::eyre};
use ferx_engine::{EngineConfig, ResourcePaths, WindowConfig};
use tracing::Level;

use crate::{editor::EditorConfig, gui::GuiLayout};

/// Command line arguments of `ferx-editor`.
#[derive(Parser, Debug)]
#[command(
    name = "ferx-editor",
    version,
    about = "Real-time cube viewer and editor shell",
    long_about = "Renders a cube off-screen with OpenGL 3.3 and shows it in an editor \
                  panel. Hold the right mouse button to look around, move with \
                  W/A/S/D/Q/E, scroll to zoom."
)]
pub struct Cli {
    /// Window title
    #[arg(long, default_value = "Ferx")]
    pub title: String,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280, value_name = "PIXELS")]
    pub width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720, value_name = "PIXELS")]
    pub height: u32,

    /// Directory holding shaders/ and icons/ (defaults to the bundled resources)
    #[arg(long, value_name = "DIR", value_parser = validate_dir_exists)]
    pub resources: Option<PathBuf>,

    /// GUI layout file, read at startup and written on exit
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Exit after rendering this many frames
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,

    /// Disable vertical sync
    #[arg(long)]
    pub no_vsync: bool,

    /// Create the window hidden
    #[arg(long)]
    pub hidden: bool,

    /// Console log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", value_parser = parse_level)]
    pub log_level: Option<Level>,
}

impl Cli {
    /// Validates the CLI arguments
    pub fn validate(&self) -> Result<(), Report> {
        if self.width == 0 || self.height == 0 {
            return Err(eyre!("Window size must be positive, got {}x{}", self.width, self.height));
        }

        if self.frames == Some(0) {
            return Err(eyre!("Frame limit must be at least 1"));
        }

        Ok(())
    }

    /// Builds the editor configuration from the arguments.
    #[must_use]
    pub fn editor_config(&self) -> EditorConfig {
        let resources =
            self.resources.clone().map_or_else(ResourcePaths::default, ResourcePaths::new);

        let window = WindowConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            vsync: !self.no_vsync,
            visible: !self.hidden,
            icon: Some(resources.icon()),
        };

        EditorConfig {
            engine: EngineConfig { window, resources },
            layout_path: self.layout.clone().unwrap_or_else(GuiLayout::default_path),
            frame_limit: self.frames,
        }
    }
}

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>()
        .map_err(|_| format!("Invalid log level '{s}'. Use error, warn, info, debug or trace"))
}

fn validate_dir_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    match () {
        _ if !path.exists() => Err(format!("Directory does not exist: {s}")),
        _ if !path.is_dir() => Err(format!("Path is not a directory: {s}")),
        _ => Ok(path),
    }
}
