// Shader compilation and program linking
//
// GLSL sources are compiled at runtime by the driver. Compile and link
// failures carry the driver's info log so the user sees the exact line.

use std::fmt;
use std::rc::Rc;

use super::gl::GlApi;
use crate::error::{InitError, Result};
use crate::resources::ResourceLoader;

/// Programmable pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A compiled shader object, deleted on drop.
pub struct Shader<G: GlApi> {
    gl: Rc<G>,
    handle: G::Shader,
    stage: ShaderStage,
}

impl<G: GlApi> Shader<G> {
    pub fn compile(gl: &Rc<G>, stage: ShaderStage, source: &str) -> Result<Self> {
        let handle = gl
            .create_shader(stage)
            .map_err(|reason| InitError::ResourceCreate {
                what: "shader object",
                reason,
            })?;

        // Owned from here on so every early return below releases the handle.
        let shader = Self {
            gl: Rc::clone(gl),
            handle,
            stage,
        };

        gl.shader_source(handle, source);
        gl.compile_shader(handle);

        if !gl.shader_compile_status(handle) {
            let log = gl.shader_info_log(handle);
            return Err(InitError::ShaderCompile {
                stage,
                log: log.trim_end().to_string(),
            });
        }

        log::debug!("Compiled {} shader {:?}", stage, handle);
        Ok(shader)
    }

    pub fn handle(&self) -> G::Shader {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<G: GlApi> Drop for Shader<G> {
    fn drop(&mut self) {
        log::trace!("Deleting {} shader {:?}", self.stage(), self.handle);
        self.gl.delete_shader(self.handle);
    }
}

/// Vertex stage shader.
pub struct VertexShader<G: GlApi>(Shader<G>);

impl<G: GlApi> VertexShader<G> {
    pub fn new(gl: &Rc<G>, source: &str) -> Result<Self> {
        Shader::compile(gl, ShaderStage::Vertex, source).map(Self)
    }

    pub fn handle(&self) -> G::Shader {
        self.0.handle()
    }
}

/// Fragment stage shader.
pub struct FragmentShader<G: GlApi>(Shader<G>);

impl<G: GlApi> FragmentShader<G> {
    pub fn new(gl: &Rc<G>, source: &str) -> Result<Self> {
        Shader::compile(gl, ShaderStage::Fragment, source).map(Self)
    }

    pub fn handle(&self) -> G::Shader {
        self.0.handle()
    }
}

/// A linked vertex + fragment program, deleted on drop.
pub struct ShaderProgram<G: GlApi> {
    gl: Rc<G>,
    handle: G::Program,
}

impl<G: GlApi> ShaderProgram<G> {
    /// Link two already compiled stages.
    ///
    /// The shaders are detached again after a successful link; the program
    /// keeps its own copy of the binary and the caller may drop them.
    pub fn link(
        gl: &Rc<G>,
        vertex: &VertexShader<G>,
        fragment: &FragmentShader<G>,
    ) -> Result<Self> {
        let handle = gl
            .create_program()
            .map_err(|reason| InitError::ResourceCreate {
                what: "shader program",
                reason,
            })?;

        let program = Self {
            gl: Rc::clone(gl),
            handle,
        };

        gl.attach_shader(handle, vertex.handle());
        gl.attach_shader(handle, fragment.handle());
        gl.link_program(handle);

        if !gl.program_link_status(handle) {
            let log = gl.program_info_log(handle);
            return Err(InitError::ProgramLink {
                log: log.trim_end().to_string(),
            });
        }

        gl.detach_shader(handle, vertex.handle());
        gl.detach_shader(handle, fragment.handle());

        log::debug!("Linked shader program {:?}", handle);
        Ok(program)
    }

    /// Compile both stages from source text and link them.
    pub fn from_sources(gl: &Rc<G>, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = VertexShader::new(gl, vertex_source)?;
        let fragment = FragmentShader::new(gl, fragment_source)?;
        Self::link(gl, &vertex, &fragment)
    }

    /// Read both stages through the resource loader, then compile and link.
    pub fn load(
        gl: &Rc<G>,
        loader: &ResourceLoader,
        vertex_name: &str,
        fragment_name: &str,
    ) -> Result<Self> {
        let vertex_source = loader.load_text(vertex_name)?;
        let fragment_source = loader.load_text(fragment_name)?;
        log::info!("Building shader program from {} + {}", vertex_name, fragment_name);
        Self::from_sources(gl, &vertex_source, &fragment_source)
    }

    pub fn handle(&self) -> G::Program {
        self.handle
    }

    /// Location of a named uniform, `None` if the program has no such
    /// active uniform (unused uniforms are stripped by the linker).
    pub fn uniform_location(&self, name: &str) -> Option<G::UniformLocation> {
        let location = self.gl.uniform_location(self.handle, name);
        if location.is_none() {
            log::warn!("Uniform '{}' not active in program {:?}", name, self.handle);
        }
        location
    }
}

impl<G: GlApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.handle);
    }
}
