// Test double for the GL seam
//
// Hands out sequential integer handles, tracks which ones are still alive per
// object kind and records draw-relevant calls so tests can assert on ordering.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use super::gl::GlApi;
use super::shader::ShaderStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Shader,
    Program,
    Buffer,
    VertexArray,
}

/// Calls whose order matters to the draw path.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Viewport(i32, i32),
    Clear([f32; 4]),
    UseProgram(Option<u32>),
    BindVertexArray(Option<u32>),
    BindArrayBuffer(Option<u32>),
    BufferData(usize),
    AttribPointer { index: u32, components: i32, stride: i32, offset: i32 },
    EnableAttrib(u32),
    Uniform(u32, f32),
    DrawStrip(i32, i32),
}

#[derive(Default)]
pub struct CountingGl {
    next_handle: Cell<u32>,
    live: RefCell<HashMap<Kind, HashSet<u32>>>,
    released_twice: Cell<u32>,
    shader_stages: RefCell<HashMap<u32, ShaderStage>>,
    attached: RefCell<HashMap<u32, Vec<u32>>>,
    calls: RefCell<Vec<Call>>,
    fail_compile: Cell<Option<ShaderStage>>,
    fail_link: Cell<bool>,
    missing_uniforms: Cell<bool>,
}

impl CountingGl {
    pub fn new() -> Self {
        Self {
            next_handle: Cell::new(1),
            ..Default::default()
        }
    }

    /// Make every compile of `stage` fail.
    pub fn failing_compile(self, stage: ShaderStage) -> Self {
        self.fail_compile.set(Some(stage));
        self
    }

    /// Make every link fail.
    pub fn failing_link(self) -> Self {
        self.fail_link.set(true);
        self
    }

    /// Report every uniform as optimized away.
    pub fn without_uniforms(self) -> Self {
        self.missing_uniforms.set(true);
        self
    }

    pub fn live(&self, kind: Kind) -> usize {
        self.live.borrow().get(&kind).map_or(0, HashSet::len)
    }

    pub fn live_total(&self) -> usize {
        self.live.borrow().values().map(HashSet::len).sum()
    }

    /// Number of delete calls on handles that were not alive.
    pub fn double_releases(&self) -> u32 {
        self.released_twice.get()
    }

    pub fn attached_to(&self, program: u32) -> Vec<u32> {
        self.attached.borrow().get(&program).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn allocate(&self, kind: Kind) -> u32 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.live.borrow_mut().entry(kind).or_default().insert(handle);
        handle
    }

    fn release(&self, kind: Kind, handle: u32) {
        let removed = self
            .live
            .borrow_mut()
            .get_mut(&kind)
            .is_some_and(|set| set.remove(&handle));
        if !removed {
            self.released_twice.set(self.released_twice.get() + 1);
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GlApi for CountingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let handle = self.allocate(Kind::Shader);
        self.shader_stages.borrow_mut().insert(handle, stage);
        Ok(handle)
    }

    fn shader_source(&self, _shader: u32, _source: &str) {}

    fn compile_shader(&self, _shader: u32) {}

    fn shader_compile_status(&self, shader: u32) -> bool {
        let stage = self.shader_stages.borrow().get(&shader).copied();
        stage.is_none() || stage != self.fail_compile.get()
    }

    fn shader_info_log(&self, shader: u32) -> String {
        format!("0:1(1): error: shader {} rejected", shader)
    }

    fn delete_shader(&self, shader: u32) {
        self.release(Kind::Shader, shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        Ok(self.allocate(Kind::Program))
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.attached.borrow_mut().entry(program).or_default().push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(shaders) = self.attached.borrow_mut().get_mut(&program) {
            shaders.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, _program: u32) {}

    fn program_link_status(&self, _program: u32) -> bool {
        !self.fail_link.get()
    }

    fn program_info_log(&self, _program: u32) -> String {
        "error: vertex output `uv` not consumed".to_string()
    }

    fn delete_program(&self, program: u32) {
        self.release(Kind::Program, program);
    }

    fn uniform_location(&self, program: u32, _name: &str) -> Option<u32> {
        if self.missing_uniforms.get() {
            None
        } else {
            Some(program * 100)
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        Ok(self.allocate(Kind::Buffer))
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(Call::BindArrayBuffer(buffer));
    }

    fn array_buffer_data(&self, data: &[u8]) {
        self.record(Call::BufferData(data.len()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.release(Kind::Buffer, buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        Ok(self.allocate(Kind::VertexArray))
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32) {
        self.record(Call::AttribPointer {
            index,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableAttrib(index));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.release(Kind::VertexArray, vertex_array);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport(width, height));
    }

    fn clear_color_buffer(&self, color: [f32; 4]) {
        self.record(Call::Clear(color));
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_1_f32(&self, location: &u32, value: f32) {
        self.record(Call::Uniform(*location, value));
    }

    fn draw_triangle_strip(&self, first: i32, count: i32) {
        self.record(Call::DrawStrip(first, count));
    }
}
