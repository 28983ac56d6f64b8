// Graphics API seam
//
// The sandbox only touches a few dozen OpenGL entry points. They are gathered
// behind `GlApi` so the resource wrappers can be exercised against a fake
// implementation in tests. The production implementation forwards to glow.

use glow::HasContext;
use std::fmt::Debug;

use super::shader::ShaderStage;

/// Narrow view of the OpenGL API used by the sandbox.
///
/// Implementors guarantee that a context is current on the calling thread for
/// as long as the implementor is alive; that is what makes these methods safe
/// to call.
pub trait GlApi {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;
    type UniformLocation: Clone + Debug;

    // Shaders
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // Programs
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    // Buffers
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Upload to the bound ARRAY_BUFFER with STATIC_DRAW usage.
    fn array_buffer_data(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    // Vertex arrays
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// Describe a non-normalized f32 attribute; `stride` and `offset` in bytes.
    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    // Drawing
    fn viewport(&self, width: i32, height: i32);
    fn clear_color_buffer(&self, color: [f32; 4]);
    fn use_program(&self, program: Option<Self::Program>);
    fn uniform_1_f32(&self, location: &Self::UniformLocation, value: f32);
    fn draw_triangle_strip(&self, first: i32, count: i32);
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

// SAFETY (all methods): glow::Context is only constructed by GraphicsContext
// after its context has been made current, and never leaves that thread.
impl GlApi for glow::Context {
    type Shader = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type Buffer = <glow::Context as HasContext>::Buffer;
    type VertexArray = <glow::Context as HasContext>::VertexArray;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_enum()) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { HasContext::get_uniform_location(self, program, name) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, glow::ARRAY_BUFFER, buffer) }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe {
            HasContext::buffer_data_u8_slice(self, glow::ARRAY_BUFFER, data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                index,
                components,
                glow::FLOAT,
                false,
                stride,
                offset,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, 0, 0, width, height) }
    }

    fn clear_color_buffer(&self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            HasContext::clear_color(self, r, g, b, a);
            HasContext::clear(self, glow::COLOR_BUFFER_BIT);
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, value: f32) {
        unsafe { HasContext::uniform_1_f32(self, Some(location), value) }
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, glow::TRIANGLE_STRIP, first, count) }
    }
}
