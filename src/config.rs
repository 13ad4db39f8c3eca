use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::renderer::UniformValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_vertex_shader")]
    pub vertex_shader: PathBuf,

    #[serde(default = "default_fragment_shader")]
    pub fragment_shader: PathBuf,

    #[serde(default)]
    pub layer: Layer,

    /// Zero in either dimension stretches the surface across the output.
    #[serde(default)]
    pub size: Size,

    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,

    #[serde(default = "default_hot_reload")]
    pub hot_reload: bool,

    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],

    #[serde(default)]
    pub uniforms: BTreeMap<String, UniformValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    #[default]
    Background,
    Bottom,
    Top,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn fills_output(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vertex_shader: default_vertex_shader(),
            fragment_shader: default_fragment_shader(),
            layer: Layer::default(),
            size: Size::default(),
            fps_cap: default_fps_cap(),
            hot_reload: default_hot_reload(),
            clear_color: default_clear_color(),
            uniforms: BTreeMap::new(),
        }
    }
}

fn default_vertex_shader() -> PathBuf {
    PathBuf::from("assets/shaders/slime.vert.glsl")
}

fn default_fragment_shader() -> PathBuf {
    PathBuf::from("assets/shaders/slime.frag.glsl")
}

fn default_fps_cap() -> u32 {
    60
}

fn default_hot_reload() -> bool {
    true
}

fn default_clear_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("slime").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Missing files yield the defaults; unreadable or malformed ones are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Frame interval implied by `fps_cap`; a cap of zero is treated as one.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1) / self.fps_cap.max(1)
    }
}
