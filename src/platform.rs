// Platform session - the process-wide winit event loop
//
// Exactly one per process. Every window and GL object is created inside the
// handler passed to `run` and dropped before `run` returns, so the session
// always outlives them.

use winit::application::ApplicationHandler;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::error::{InitError, Result};

pub struct Session {
    event_loop: EventLoop<()>,
}

impl Session {
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::new().map_err(|e| InitError::Session(e.to_string()))?;

        // Busy loop: the fixed-timestep loop runs from `about_to_wait` and
        // paces itself on vsync.
        event_loop.set_control_flow(ControlFlow::Poll);

        log::info!("Windowing session started");
        Ok(Self { event_loop })
    }

    /// Drive `handler` until it asks the loop to exit.
    pub fn run<H: ApplicationHandler>(self, handler: &mut H) -> Result<()> {
        self.event_loop
            .run_app(handler)
            .map_err(|e| InitError::Session(e.to_string()))?;
        log::info!("Windowing session ended");
        Ok(())
    }
}
