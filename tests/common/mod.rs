//! A recording GL backend: compiles by inspecting the source text, links by
//! collecting `uniform` declarations, and keeps uniform storage per program.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use slime::renderer::{GlBackend, Stage};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    program: ProgramId,
    index: usize,
}

struct ShaderObject {
    stage: Stage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<ShaderId>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    values: HashMap<usize, Value>,
}

#[derive(Default)]
pub struct RecordingGl {
    next_id: Cell<u32>,
    shaders: RefCell<BTreeMap<ShaderId, ShaderObject>>,
    programs: RefCell<BTreeMap<ProgramId, ProgramObject>>,
    deleted_programs: RefCell<Vec<ProgramId>>,
    current: Cell<Option<ProgramId>>,
    invalid_operations: Cell<u32>,
    pub fail_link: Cell<bool>,
    pub compile_warning: RefCell<Option<String>>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn live_programs(&self) -> BTreeSet<ProgramId> {
        self.programs.borrow().keys().copied().collect()
    }

    pub fn live_shader_objects(&self) -> usize {
        self.shaders.borrow().len()
    }

    pub fn deleted_programs(&self) -> Vec<ProgramId> {
        self.deleted_programs.borrow().clone()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current.get()
    }

    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<Value> {
        let programs = self.programs.borrow();
        let object = programs.get(&program)?;
        let index = object.uniforms.iter().position(|u| u == name)?;
        object.values.get(&index).cloned()
    }

    /// Uploads rejected because the location belonged to a program other
    /// than the current one.
    pub fn invalid_operations(&self) -> u32 {
        self.invalid_operations.get()
    }

    pub fn uniform_count(&self, program: ProgramId) -> usize {
        self.programs.borrow().get(&program).map_or(0, |p| p.values.len())
    }

    /// Uploads go to the current program, as glUniform* does.
    fn store(&self, location: &Location, value: Value) {
        let current = self
            .current
            .get()
            .expect("uniform upload with no current program");
        if current != location.program {
            self.invalid_operations.set(self.invalid_operations.get() + 1);
            return;
        }
        let mut programs = self.programs.borrow_mut();
        let object = programs
            .get_mut(&current)
            .expect("uniform upload to a deleted program");
        object.values.insert(location.index, value);
    }
}

/// Collects `uniform <type> <name>;` declarations.
fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut words = line.trim().trim_end_matches(';').split_whitespace();
            match (words.next(), words.next(), words.next()) {
                (Some("uniform"), Some(_), Some(name)) => Some(name.to_string()),
                _ => None,
            }
        })
        .collect()
}

impl GlBackend for RecordingGl {
    type Shader = ShaderId;
    type Program = ProgramId;
    type UniformLocation = Location;

    fn create_shader(&self, stage: Stage) -> Result<ShaderId, String> {
        let id = ShaderId(self.next());
        self.shaders.borrow_mut().insert(
            id,
            ShaderObject { stage, source: String::new(), compiled: false, log: String::new() },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(object) = self.shaders.borrow_mut().get_mut(&shader) {
            object.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        let warning = self.compile_warning.borrow().clone();
        if let Some(object) = self.shaders.borrow_mut().get_mut(&shader) {
            if object.source.contains("void main()") && !object.source.contains("@@") {
                object.compiled = true;
                object.log = warning.unwrap_or_default();
            } else {
                object.compiled = false;
                object.log = format!("0:1: error: syntax error in {} stage", object.stage);
            }
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.shaders.borrow().get(&shader).map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.shaders.borrow().get(&shader).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.shaders.borrow_mut().remove(&shader);
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let id = ProgramId(self.next());
        self.programs.borrow_mut().insert(id, ProgramObject::default());
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(object) = self.programs.borrow_mut().get_mut(&program) {
            object.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(object) = self.programs.borrow_mut().get_mut(&program) {
            object.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: ProgramId) {
        let shaders = self.shaders.borrow();
        let mut programs = self.programs.borrow_mut();
        let Some(object) = programs.get_mut(&program) else { return };

        if self.fail_link.get() {
            object.linked = false;
            object.log = "error: varying vColor not written by vertex shader".to_string();
            return;
        }

        let mut uniforms = Vec::new();
        for shader in &object.attached {
            if let Some(stage) = shaders.get(shader) {
                for name in declared_uniforms(&stage.source) {
                    if !uniforms.contains(&name) {
                        uniforms.push(name);
                    }
                }
            }
        }
        object.uniforms = uniforms;
        object.linked = true;
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.programs.borrow().get(&program).map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.programs.borrow().get(&program).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        assert!(
            self.programs.borrow_mut().remove(&program).is_some(),
            "program {:?} deleted twice",
            program
        );
        self.deleted_programs.borrow_mut().push(program);
        if self.current.get() == Some(program) {
            self.current.set(None);
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.current.set(program);
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<Location> {
        let programs = self.programs.borrow();
        let object = programs.get(&program)?;
        let index = object.uniforms.iter().position(|u| u == name)?;
        Some(Location { program, index })
    }

    fn uniform_1_i32(&self, location: &Location, x: i32) {
        self.store(location, Value::Int(x));
    }

    fn uniform_1_f32(&self, location: &Location, x: f32) {
        self.store(location, Value::Float(x));
    }

    fn uniform_2_f32(&self, location: &Location, x: f32, y: f32) {
        self.store(location, Value::Vec2([x, y]));
    }

    fn uniform_3_f32(&self, location: &Location, x: f32, y: f32, z: f32) {
        self.store(location, Value::Vec3([x, y, z]));
    }

    fn uniform_4_f32(&self, location: &Location, x: f32, y: f32, z: f32, w: f32) {
        self.store(location, Value::Vec4([x, y, z, w]));
    }

    fn uniform_matrix_4_f32(&self, location: &Location, columns: &[f32; 16]) {
        self.store(location, Value::Mat4(*columns));
    }
}

pub const VERTEX: &str = "\
attribute vec2 aPos;
uniform float uScale;
void main() {
    gl_Position = vec4(aPos * uScale, 0.0, 1.0);
}
";

pub const FRAGMENT: &str = "\
precision mediump float;
uniform bool uEnabled;
uniform int uMode;
uniform float uTime;
uniform vec2 uOffset;
uniform vec3 uTint;
uniform vec4 uColor;
uniform mat4 uTransform;
uniform vec3 uResolution;
uniform int uFrame;
void main() {
    gl_FragColor = vec4(uTint, 1.0);
}
";

/// Source the mock compiler rejects.
pub const BROKEN: &str = "void main() { @@ }";
