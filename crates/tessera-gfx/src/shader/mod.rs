//! Shader stages and linked programs.

mod program;
mod shader;

pub use program::ShaderProgram;
pub use shader::Shader;
