use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Instant, SystemTime};

use anyhow::Result;
use log::{error, info};

use crate::config::Config;
use crate::renderer::quad::Quad;
use crate::renderer::{GlBackend, Shader, UniformValue};

/// Tracks modification times of a set of source files.
pub struct SourceWatcher {
    files: Vec<(PathBuf, Option<SystemTime>)>,
}

impl SourceWatcher {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let files = paths
            .into_iter()
            .map(|p| {
                let path = p.as_ref().to_path_buf();
                let stamp = modified(&path);
                (path, stamp)
            })
            .collect();
        Self { files }
    }

    /// True once for every observed change, including a file appearing or
    /// disappearing.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        for (path, stamp) in &mut self.files {
            let now = modified(path);
            if now != *stamp {
                *stamp = now;
                changed = true;
            }
        }
        changed
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Values fed to every frame before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub frame: i32,
    pub resolution: [u32; 2],
}

impl FrameUniforms {
    pub fn apply<G: GlBackend>(&self, shader: &Shader<G>) {
        shader.set_float("uTime", self.time);
        shader.set_int("uFrame", self.frame);
        shader.set_vec3_components(
            "uResolution",
            self.resolution[0] as f32,
            self.resolution[1] as f32,
            1.0,
        );
    }
}

pub fn apply_static_uniforms<G: GlBackend>(shader: &Shader<G>, uniforms: &BTreeMap<String, UniformValue>) {
    for (name, value) in uniforms {
        value.apply(shader, name);
    }
}

/// Builds a replacement shader, keeping `current` when the new sources fail.
/// Returns whether the shader was replaced.
pub fn rebuild<G: GlBackend>(
    current: &mut Shader<G>,
    gl: &Rc<G>,
    vertex_path: &Path,
    fragment_path: &Path,
) -> bool {
    match Shader::new(Rc::clone(gl), vertex_path, fragment_path) {
        Ok(shader) => {
            *current = shader;
            info!("Reloaded shaders");
            true
        }
        Err(e) => {
            error!("Shader reload failed, keeping previous program: {}", e);
            false
        }
    }
}

/// The shader preview: one program drawn over a full-screen quad.
pub struct Preview {
    gl: Rc<glow::Context>,
    shader: Shader,
    quad: Quad,
    watcher: Option<SourceWatcher>,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
    uniforms: BTreeMap<String, UniformValue>,
    clear_color: [f32; 4],
    started: Instant,
    frame: i32,
}

impl Preview {
    pub fn new(gl: Rc<glow::Context>, config: &Config) -> Result<Self> {
        let shader = Shader::new(Rc::clone(&gl), &config.vertex_shader, &config.fragment_shader)?;
        let quad = Quad::new(Rc::clone(&gl))?;
        let watcher = config
            .hot_reload
            .then(|| SourceWatcher::new([&config.vertex_shader, &config.fragment_shader]));

        info!(
            "Loaded {} + {}",
            config.vertex_shader.display(),
            config.fragment_shader.display()
        );

        Ok(Self {
            gl,
            shader,
            quad,
            watcher,
            vertex_path: config.vertex_shader.clone(),
            fragment_path: config.fragment_shader.clone(),
            uniforms: config.uniforms.clone(),
            clear_color: config.clear_color,
            started: Instant::now(),
            frame: 0,
        })
    }

    /// Rebuilds the program if a watched source changed on disk.
    pub fn poll_reload(&mut self) -> bool {
        let changed = self.watcher.as_mut().map_or(false, SourceWatcher::poll);
        changed && self.reload()
    }

    pub fn reload(&mut self) -> bool {
        rebuild(&mut self.shader, &self.gl, &self.vertex_path, &self.fragment_path)
    }

    pub fn render(&mut self, size: [u32; 2]) {
        self.quad.begin(size, self.clear_color);

        self.shader.use_program();
        apply_static_uniforms(&self.shader, &self.uniforms);
        FrameUniforms {
            time: self.started.elapsed().as_secs_f32(),
            frame: self.frame,
            resolution: size,
        }
        .apply(&self.shader);

        self.quad.draw(&self.shader);
        self.frame = self.frame.wrapping_add(1);
    }
}
