// Backend module - OpenGL abstraction layer
//
// Thin RAII wrappers around glow. Everything above `context` and `window`
// talks to the GL through the `GlApi` trait so it can run against a fake.

pub mod buffer;
pub mod context;
pub mod gl;
pub mod shader;
pub mod window;

#[cfg(test)]
pub mod testing;

pub use context::GraphicsContext;
pub use shader::ShaderProgram;
pub use window::MainWindow;
