// =============================================================================
// APPLICATION - window lifecycle and the fixed-timestep loop
// =============================================================================
//
// FRAME FLOW (one `about_to_wait` call per iteration):
// 1. Window events since the last iteration are queued as `InputEvent`s
// 2. Measure elapsed time, feed the fixed-timestep accumulator
// 3. Run zero or more fixed `update` steps (the first drains the queue)
// 4. Stop here if the scene stopped, otherwise draw once and present
//
// Steps 2-4 live in `advance_and_draw`, generic over the GL backend.
//
// =============================================================================

use glam::Vec2;
use std::rc::Rc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use crate::backend::buffer::{describe_position_2d, vertex_count, VertexArray, VertexBuffer};
use crate::backend::gl::GlApi;
use crate::backend::{GraphicsContext, MainWindow, ShaderProgram};
use crate::config::Config;
use crate::error::{InitError, Result};
use crate::reload::ShaderWatcher;
use crate::resources::ResourceLoader;
use crate::scene::{InputEvent, RunState, Scene};
use crate::timestep::{FixedTimestep, FpsCounter, FrameClock};

/// Full-window quad drawn as a triangle strip.
const QUAD_VERTICES: [Vec2; 4] = [
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, -1.0),
];

const FLOATS_PER_VERTEX: usize = 2;

/// Name of the rotation uniform in both shader stages.
const ANGLE_UNIFORM: &str = "angle";

/// Every GPU object of the sandbox together with the scene that uses them.
///
/// IMPORTANT: Field order matters for Drop! Fields drop top to bottom, so the
/// scene goes before the objects it references, GL objects before the
/// context, and the context before the window.
pub struct Renderer {
    scene: Scene<glow::Context>,
    vertex_array: VertexArray<glow::Context>,
    _vertex_buffer: VertexBuffer<glow::Context>,
    program: ShaderProgram<glow::Context>,
    context: GraphicsContext,
    window: MainWindow,
}

impl Renderer {
    /// Create the window, context and all GPU resources.
    ///
    /// STEPS:
    /// 1. Window with GL pixel format
    /// 2. Core profile context (+ vsync)
    /// 3. Shader program from the two source files
    /// 4. Vertex buffer + vertex array
    /// 5. Scene referencing all of the above
    pub fn new(
        event_loop: &ActiveEventLoop,
        config: &Config,
        loader: &ResourceLoader,
    ) -> Result<Self> {
        log::info!("Initializing renderer...");

        let window = MainWindow::new(event_loop, &config.window)?;
        let context = GraphicsContext::new(&window, config.graphics.vsync)?;
        let gl = Rc::clone(context.gl());

        let program = ShaderProgram::load(
            &gl,
            loader,
            &config.resources.vertex_shader,
            &config.resources.fragment_shader,
        )?;
        let angle_location = program.uniform_location(ANGLE_UNIFORM);

        let vertex_buffer = VertexBuffer::new(&gl, &QUAD_VERTICES)?;
        let vertex_array = VertexArray::new(&gl, |gl| describe_position_2d(gl, &vertex_buffer))?;

        let floats = vertex_buffer.size_bytes() / std::mem::size_of::<f32>();
        let count = vertex_count(floats, FLOATS_PER_VERTEX);
        let scene = Scene::new(program.handle(), vertex_array.handle(), count, angle_location)
            .with_quit_key(config.controls.quit_key)
            .with_clear_color(config.graphics.clear_color);

        log::info!(
            "Renderer initialized: {} vertices, quit with {:?}",
            scene.vertex_count(),
            config.controls.quit_key
        );

        Ok(Self {
            scene,
            vertex_array,
            _vertex_buffer: vertex_buffer,
            program,
            context,
            window,
        })
    }

    pub fn scene(&self) -> &Scene<glow::Context> {
        &self.scene
    }

    /// Simulate and draw one loop iteration, presenting if the scene is
    /// still running afterwards.
    pub fn frame(
        &mut self,
        timestep: &mut FixedTimestep,
        pending: &mut Vec<InputEvent>,
        elapsed: f64,
    ) -> RunState {
        let state = advance_and_draw(
            &mut self.scene,
            self.context.gl().as_ref(),
            timestep,
            pending,
            elapsed,
        );
        if state == RunState::Running {
            self.context.swap_buffers();
        }
        state
    }

    /// Rebuild the shader program from disk, keeping the old one on failure.
    pub fn reload_program(&mut self, config: &Config, loader: &ResourceLoader) {
        let gl = Rc::clone(self.context.gl());
        match ShaderProgram::load(
            &gl,
            loader,
            &config.resources.vertex_shader,
            &config.resources.fragment_shader,
        ) {
            Ok(program) => {
                let angle_location = program.uniform_location(ANGLE_UNIFORM);
                self.scene.set_program(program.handle(), angle_location);
                // Old program is deleted here, after the scene stopped using it.
                self.program = program;
                log::info!("Shader program reloaded");
            }
            Err(e) => log::error!("Shader reload failed, keeping previous program: {}", e),
        }
    }

    pub fn window(&self) -> &MainWindow {
        &self.window
    }

    pub fn context(&self) -> &GraphicsContext {
        &self.context
    }
}

/// Loop body shared by every backend.
///
/// Feeds `elapsed` into the accumulator and runs the due update steps. The
/// first step takes every queued event; with no step due they stay queued.
/// Stops stepping as soon as the scene stops, and only draws while running.
fn advance_and_draw<G: GlApi>(
    scene: &mut Scene<G>,
    gl: &G,
    timestep: &mut FixedTimestep,
    pending: &mut Vec<InputEvent>,
    elapsed: f64,
) -> RunState {
    timestep.accumulate(elapsed);
    log::trace!("Accumulated {:.6}s", timestep.accumulated());

    while timestep.step() {
        scene.update(pending.drain(..), timestep.interval());
        if !scene.is_running() {
            break;
        }
    }

    if scene.is_running() {
        scene.draw(gl);
    }
    scene.state()
}

/// winit handler that owns the renderer and runs the loop.
pub struct App {
    config: Config,
    loader: ResourceLoader,
    renderer: Option<Renderer>,
    watcher: Option<ShaderWatcher>,
    pending: Vec<InputEvent>,
    clock: FrameClock,
    timestep: FixedTimestep,
    fps: FpsCounter,
    /// First fatal error; the loop exits as soon as it is set.
    fatal: Option<InitError>,
}

impl App {
    pub fn new(config: Config, loader: ResourceLoader) -> Self {
        let timestep = FixedTimestep::new(
            config.graphics.update_interval(),
            config.graphics.max_updates_per_frame,
        );
        Self {
            config,
            loader,
            renderer: None,
            watcher: None,
            pending: Vec::new(),
            clock: FrameClock::new(),
            timestep,
            fps: FpsCounter::new(Instant::now()),
            fatal: None,
        }
    }

    /// Fatal error that ended the loop, if any.
    pub fn take_fatal(&mut self) -> Option<InitError> {
        self.fatal.take()
    }

    fn start_watcher(&mut self) {
        if !self.config.debug.hot_reload_shaders {
            return;
        }
        let files = [
            self.config.resources.vertex_shader.as_str(),
            self.config.resources.fragment_shader.as_str(),
        ];
        match ShaderWatcher::new(self.loader.base_path(), &files) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => log::warn!("Shader hot reload disabled: {}", e),
        }
    }

    /// One iteration of the fixed-timestep loop.
    fn run_iteration(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        if self.watcher.as_ref().is_some_and(ShaderWatcher::take_changes) {
            renderer.reload_program(&self.config, &self.loader);
        }

        let elapsed = self.clock.tick();
        if renderer.frame(&mut self.timestep, &mut self.pending, elapsed) == RunState::Stopped {
            event_loop.exit();
            return;
        }

        self.update_fps();
    }

    fn update_fps(&mut self) {
        if !self.config.debug.show_fps {
            return;
        }
        let Some(sample) = self.fps.record_frame(Instant::now()) else {
            return;
        };
        if let Some(renderer) = &self.renderer {
            renderer.window().window().set_title(&format!(
                "{} - {:.0} FPS ({:.2}ms)",
                self.config.window.title, sample.fps, sample.frame_ms
            ));
        }
    }
}

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() || self.fatal.is_some() {
            return;
        }

        match Renderer::new(event_loop, &self.config, &self.loader) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.start_watcher();
                // Don't count initialization time as simulation time.
                self.clock = FrameClock::new();
            }
            Err(e) => {
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                self.pending.push(InputEvent::Quit);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.pending.push(InputEvent::KeyPressed(key));
                    }
                }
            }

            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
                if let Some(renderer) = &self.renderer {
                    renderer.context().resize(size);
                }
            }

            WindowEvent::Destroyed => {
                log::info!("Window destroyed, shutting down...");
                event_loop.exit();
            }

            _ => {}
        }
    }

    /// Called when the event loop is about to block waiting for events.
    /// With `ControlFlow::Poll` it never blocks, so this is the loop body.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.run_iteration(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release every GL object while the event loop is still alive.
        self.watcher = None;
        if let Some(renderer) = self.renderer.take() {
            let scene = renderer.scene();
            log::info!(
                "Scene {:?} at angle {:.3} rad",
                scene.state(),
                scene.angle()
            );
            drop(renderer);
            log::info!("Cleanup complete");
        }
    }
}
