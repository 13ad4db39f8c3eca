use std::io;
use std::path::PathBuf;

use super::gl::Stage;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read {stage} shader source {}: {source}", path.display())]
    Read {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create {object}: {message}")]
    Create { object: &'static str, message: String },
    #[error("{stage} shader compilation failed: {log}")]
    Compile { stage: Stage, log: String },
    #[error("program linking failed: {log}")]
    Link { log: String },
}

impl ShaderError {
    /// The stage the error is attributed to, if any. Link errors span both.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ShaderError::Read { stage, .. } | ShaderError::Compile { stage, .. } => Some(*stage),
            ShaderError::Create { .. } | ShaderError::Link { .. } => None,
        }
    }
}
