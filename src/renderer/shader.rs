//! An owned, linked vertex + fragment program.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::debug;

use super::error::ShaderError;
use super::gl::{build_program, GlBackend, Stage};

/// A linked GPU program, deleted when dropped.
///
/// Construction either yields a linked program or an error; there is no
/// half-built state. Uniform setters look the name up on every call and do
/// nothing when the program has no such active uniform.
///
/// GL uploads uniforms into the *current* program, so call
/// [`use_program`](Self::use_program) before any `set_*`. A setter issued
/// while another program is current does not reach this one; the driver
/// reports `GL_INVALID_OPERATION` instead.
pub struct Shader<G: GlBackend = glow::Context> {
    gl: Rc<G>,
    program: G::Program,
}

impl<G: GlBackend> Shader<G> {
    /// Reads, compiles and links the two stage sources at the given paths.
    pub fn new(
        gl: Rc<G>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vert_src = read_source(Stage::Vertex, vertex_path.as_ref())?;
        let frag_src = read_source(Stage::Fragment, fragment_path.as_ref())?;
        Self::from_sources(gl, &vert_src, &frag_src)
    }

    pub fn from_sources(gl: Rc<G>, vert_src: &str, frag_src: &str) -> Result<Self, ShaderError> {
        let program = build_program(gl.as_ref(), vert_src, frag_src)?;
        Ok(Self { gl, program })
    }

    /// Makes this the current program of the context.
    pub fn use_program(&self) {
        self.gl.use_program(Some(self.program));
    }

    /// Raw handle, for GL calls this wrapper does not cover.
    pub fn id(&self) -> G::Program {
        self.program
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.with_location(name, |gl, loc| gl.uniform_1_i32(loc, value as i32));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.with_location(name, |gl, loc| gl.uniform_1_i32(loc, value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.with_location(name, |gl, loc| gl.uniform_1_f32(loc, value));
    }

    pub fn set_vec2(&self, name: &str, value: Vec2) {
        self.with_location(name, |gl, loc| gl.uniform_2_f32(loc, value.x, value.y));
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_vec3_components(name, value.x, value.y, value.z);
    }

    pub fn set_vec3_components(&self, name: &str, x: f32, y: f32, z: f32) {
        self.with_location(name, |gl, loc| gl.uniform_3_f32(loc, x, y, z));
    }

    pub fn set_vec4(&self, name: &str, value: Vec4) {
        self.with_location(name, |gl, loc| {
            gl.uniform_4_f32(loc, value.x, value.y, value.z, value.w)
        });
    }

    /// Uploads a column-major matrix.
    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        let columns = value.to_cols_array();
        self.with_location(name, |gl, loc| gl.uniform_matrix_4_f32(loc, &columns));
    }

    fn with_location(&self, name: &str, upload: impl FnOnce(&G, &G::UniformLocation)) {
        if let Some(loc) = self.gl.uniform_location(self.program, name) {
            upload(self.gl.as_ref(), &loc);
        }
    }
}

impl<G: GlBackend> Drop for Shader<G> {
    fn drop(&mut self) {
        debug!("deleting program {:?}", self.program);
        self.gl.delete_program(self.program);
    }
}

fn read_source(stage: Stage, path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        stage,
        path: path.to_path_buf(),
        source,
    })
}
