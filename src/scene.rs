//! Render state for the rotating quad and its per-step update.

use std::f32::consts::TAU;

use winit::keyboard::KeyCode;

use crate::backend::gl::GlApi;

/// Loop state. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Input the simulation cares about, already translated from window events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyPressed(KeyCode),
}

/// Angular speed of the quad in radians per second.
const ANGULAR_SPEED: f32 = 1.0;

/// Minimal render state.
///
/// Handles are plain copies; the wrappers that own them must outlive the
/// scene. `Renderer` guarantees this through its field order.
pub struct Scene<G: GlApi> {
    program: G::Program,
    vertex_array: G::VertexArray,
    vertex_count: i32,
    angle_location: Option<G::UniformLocation>,
    angle: f32,
    state: RunState,
    quit_key: KeyCode,
    clear_color: [f32; 4],
}

impl<G: GlApi> Scene<G> {
    pub fn new(
        program: G::Program,
        vertex_array: G::VertexArray,
        vertex_count: usize,
        angle_location: Option<G::UniformLocation>,
    ) -> Self {
        Self {
            program,
            vertex_array,
            vertex_count: i32::try_from(vertex_count).unwrap_or(i32::MAX),
            angle_location,
            angle: 0.0,
            state: RunState::Running,
            quit_key: KeyCode::KeyQ,
            clear_color: [0.15, 0.15, 0.15, 1.0],
        }
    }

    pub fn with_quit_key(mut self, key: KeyCode) -> Self {
        self.quit_key = key;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Point the scene at a rebuilt program.
    pub fn set_program(&mut self, program: G::Program, angle_location: Option<G::UniformLocation>) {
        self.program = program;
        self.angle_location = angle_location;
    }

    /// Advance the simulation by one fixed step.
    ///
    /// Drains every pending event first. A quit request stops the scene and
    /// the angle is left untouched; a stopped scene never advances again.
    pub fn update<I>(&mut self, events: I, delta: f64)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        for event in events {
            match event {
                InputEvent::Quit => self.stop("quit requested"),
                InputEvent::KeyPressed(key) if key == self.quit_key => {
                    self.stop("quit key pressed")
                }
                InputEvent::KeyPressed(_) => {}
            }
        }

        if self.state == RunState::Stopped {
            return;
        }

        self.angle = wrap_angle(self.angle + ANGULAR_SPEED * delta as f32);
    }

    /// Issue the draw for the current state. Presenting is the caller's job.
    pub fn draw(&self, gl: &G) {
        gl.clear_color_buffer(self.clear_color);

        gl.use_program(Some(self.program));
        if let Some(location) = &self.angle_location {
            gl.uniform_1_f32(location, self.angle);
        }
        gl.bind_vertex_array(Some(self.vertex_array));
        gl.draw_triangle_strip(0, self.vertex_count);
        gl.bind_vertex_array(None);
        gl.use_program(None);
    }

    fn stop(&mut self, reason: &str) {
        if self.state == RunState::Running {
            log::info!("Stopping: {}", reason);
            self.state = RunState::Stopped;
        }
    }
}

/// Wrap into `[0, 2π)`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for inputs just below zero.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
