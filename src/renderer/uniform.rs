use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::gl::GlBackend;
use super::shader::Shader;

/// A uniform value as written in the config file.
///
/// TOML integers become `Int`, floats `Float`, and arrays of two to four
/// floats the matching vector. The TOML type decides, not the GLSL one:
/// `uSpeed = 2` is an `Int` and GL silently drops it on a `float` uniform,
/// so write float uniforms with a decimal point (`uSpeed = 2.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl UniformValue {
    pub fn apply<G: GlBackend>(&self, shader: &Shader<G>, name: &str) {
        match *self {
            UniformValue::Bool(v) => shader.set_bool(name, v),
            UniformValue::Int(v) => shader.set_int(name, v),
            UniformValue::Float(v) => shader.set_float(name, v),
            UniformValue::Vec2(v) => shader.set_vec2(name, Vec2::from_array(v)),
            UniformValue::Vec3(v) => shader.set_vec3(name, Vec3::from_array(v)),
            UniformValue::Vec4(v) => shader.set_vec4(name, Vec4::from_array(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Deserialize)]
    struct Table {
        uniforms: BTreeMap<String, UniformValue>,
    }

    #[test]
    fn parses_each_kind_from_toml() {
        let table: Table = toml::from_str(
            r#"
            [uniforms]
            uEnabled = true
            uCount = 3
            uSpeed = 0.5
            uOffset = [1.0, 2.0]
            uTint = [0.2, 0.4, 0.6]
            uColor = [1.0, 0.5, 0.25, 1.0]
            "#,
        )
        .unwrap();

        let u = &table.uniforms;
        assert_eq!(u["uEnabled"], UniformValue::Bool(true));
        assert_eq!(u["uCount"], UniformValue::Int(3));
        assert_eq!(u["uSpeed"], UniformValue::Float(0.5));
        assert_eq!(u["uOffset"], UniformValue::Vec2([1.0, 2.0]));
        assert_eq!(u["uTint"], UniformValue::Vec3([0.2, 0.4, 0.6]));
        assert_eq!(u["uColor"], UniformValue::Vec4([1.0, 0.5, 0.25, 1.0]));
    }

    #[test]
    fn whole_numbers_stay_integers() {
        let table: Table = toml::from_str("[uniforms]\nuSpeed = 2\nuScale = 2.0\n").unwrap();
        assert_eq!(table.uniforms["uSpeed"], UniformValue::Int(2));
        assert_eq!(table.uniforms["uScale"], UniformValue::Float(2.0));
    }

    #[test]
    fn rejects_oversized_arrays() {
        let result: Result<Table, _> = toml::from_str("[uniforms]\nuBad = [1.0, 2.0, 3.0, 4.0, 5.0]\n");
        assert!(result.is_err());
    }
}
