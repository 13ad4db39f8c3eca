pub mod error;
pub mod gl;
pub mod quad;
pub mod shader;
pub mod uniform;

pub use error::ShaderError;
pub use gl::{GlBackend, Stage};
pub use shader::Shader;
pub use uniform::UniformValue;
