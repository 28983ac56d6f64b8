// Main window creation
//
// The GL pixel format has to be chosen together with the window (some
// platforms bake it into the native window), so this goes through
// glutin-winit's DisplayBuilder rather than plain winit.

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin_winit::DisplayBuilder;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::config::WindowConfig;
use crate::error::{InitError, Result};

/// The single top-level window plus the GL config it was created with.
pub struct MainWindow {
    gl_config: Config,
    window: Window,
}

impl MainWindow {
    pub fn new(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self> {
        // Logical size: the window scales with the monitor's DPI.
        let size = LogicalSize::new(config.width, config.height);
        let mut attributes = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(size)
            .with_resizable(false);

        if let Some(monitor) = event_loop.primary_monitor() {
            let physical: PhysicalSize<u32> = size.to_physical(monitor.scale_factor());
            attributes = attributes.with_position(centered_position(
                monitor.position(),
                monitor.size(),
                physical,
            ));
        }

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_single_buffering(false)
            .prefer_hardware_accelerated(Some(true));

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|e| InitError::Window(e.to_string()))?;

        let window = window
            .ok_or_else(|| InitError::Window("display builder returned no window".to_string()))?;

        log::info!(
            "Created window '{}' ({}x{} physical, scale {:.2}), depth {} bits, {} samples",
            config.title,
            window.inner_size().width,
            window.inner_size().height,
            window.scale_factor(),
            gl_config.depth_size(),
            gl_config.num_samples(),
        );

        Ok(Self { gl_config, window })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn gl_config(&self) -> &Config {
        &self.gl_config
    }

    pub fn raw_window_handle(&self) -> Result<RawWindowHandle> {
        self.window
            .window_handle()
            .map(|handle| handle.as_raw())
            .map_err(|e| InitError::Window(e.to_string()))
    }
}

impl Drop for MainWindow {
    fn drop(&mut self) {
        log::debug!("Releasing main window");
    }
}

/// Prefer a hardware-accelerated config, otherwise take the first offered.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    // The picker has to return a config, so it has no error path of its own.
    // glutin's `find_configs` fails with `BadConfig` when nothing matches the
    // template, and `DisplayBuilder::build` returns that error before the
    // picker is called, so the iterator is never empty here.
    prefer_accelerated(configs, GlConfig::hardware_accelerated)
        .expect("glutin offered no GL configs")
}

/// First accelerated candidate, else the first candidate at all.
fn prefer_accelerated<C>(
    candidates: impl Iterator<Item = C>,
    accelerated: impl Fn(&C) -> bool,
) -> Option<C> {
    candidates.reduce(|best, candidate| {
        if accelerated(&candidate) && !accelerated(&best) {
            candidate
        } else {
            best
        }
    })
}

/// Top-left corner that centers `window` on a monitor. Windows larger than
/// the monitor are pinned to its origin.
fn centered_position(
    monitor_origin: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |monitor: u32, window: u32| -> i32 {
        let slack = monitor.saturating_sub(window) / 2;
        i32::try_from(slack).unwrap_or(0)
    };

    PhysicalPosition::new(
        monitor_origin.x + offset(monitor_size.width, window.width),
        monitor_origin.y + offset(monitor_size.height, window.height),
    )
}
