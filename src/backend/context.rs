// OpenGL context bound to the main window
//
// Responsibilities:
// - OpenGL 3.3 core profile context creation
// - Window surface creation and making the pair current
// - Swap interval (vsync) with a non-fatal fallback
// - Loading GL function pointers into glow

use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use std::num::NonZeroU32;
use std::rc::Rc;
use winit::dpi::PhysicalSize;

use super::gl::GlApi;
use super::window::MainWindow;
use crate::error::{InitError, Result};

/// Requested context version; the lowest with core profiles on every desktop.
const GL_VERSION: (u8, u8) = (3, 3);

/// Current OpenGL context plus the window surface it renders to.
///
/// Field order matters for Drop: the function table goes first, then the
/// surface, then the context. The window itself must outlive all three.
pub struct GraphicsContext {
    gl: Rc<glow::Context>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GraphicsContext {
    pub fn new(window: &MainWindow, vsync: bool) -> Result<Self> {
        let raw_handle = window.raw_window_handle()?;
        let gl_config = window.gl_config();
        let gl_display = gl_config.display();

        let (major, minor) = GL_VERSION;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_handle));

        let not_current = unsafe { gl_display.create_context(gl_config, &context_attributes) }
            .map_err(|e| InitError::Context(e.to_string()))?;

        let (width, height) = non_zero(window.window().inner_size())
            .ok_or_else(|| InitError::Context("window has zero area".to_string()))?;

        let surface_attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_handle, width, height);

        let surface = unsafe { gl_display.create_window_surface(gl_config, &surface_attributes) }
            .map_err(|e| InitError::Context(e.to_string()))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|e| InitError::Context(e.to_string()))?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("Could not set the swap interval, presenting unsynchronized: {}", e);
        }

        // SAFETY: the context was made current on this thread just above.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };

        let version = glow::HasContext::version(&gl);
        log::info!(
            "OpenGL {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info
        );

        Ok(Self {
            gl: Rc::new(gl),
            surface,
            context,
        })
    }

    /// Shared function table for resource wrappers.
    pub fn gl(&self) -> &Rc<glow::Context> {
        &self.gl
    }

    /// Present the back buffer.
    pub fn swap_buffers(&self) {
        if let Err(e) = self.surface.swap_buffers(&self.context) {
            log::error!("Failed to swap buffers: {}", e);
        }
    }

    /// Follow a change of the window's physical size (e.g. moving to a
    /// monitor with a different scale factor).
    pub fn resize(&self, size: PhysicalSize<u32>) {
        let Some((width, height)) = non_zero(size) else {
            return;
        };
        self.surface.resize(&self.context, width, height);
        set_viewport(self.gl.as_ref(), size);
        log::debug!("Surface resized to {}x{}", size.width, size.height);
    }
}

impl Drop for GraphicsContext {
    fn drop(&mut self) {
        log::debug!("Destroying OpenGL context");
    }
}

fn non_zero(size: PhysicalSize<u32>) -> Option<(NonZeroU32, NonZeroU32)> {
    Some((NonZeroU32::new(size.width)?, NonZeroU32::new(size.height)?))
}

/// Cover the whole surface. GL takes signed sizes, so huge ones saturate.
fn set_viewport<G: GlApi>(gl: &G, size: PhysicalSize<u32>) {
    let width = i32::try_from(size.width).unwrap_or(i32::MAX);
    let height = i32::try_from(size.height).unwrap_or(i32::MAX);
    gl.viewport(width, height);
}
