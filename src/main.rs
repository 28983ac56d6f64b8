// =============================================================================
// OPENGL SANDBOX - rotating quad on a fixed-timestep loop
// =============================================================================
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────────────────────────────────────────────────────┐
// │  Session (winit event loop, one per process)                    │
// │    └── App (ApplicationHandler, fixed-timestep loop)            │
// │          └── Renderer                                           │
// │                ├── MainWindow + GraphicsContext (GL 3.3 core)   │
// │                ├── ShaderProgram / VertexBuffer / VertexArray   │
// │                └── Scene (angle, run state, draw)               │
// └─────────────────────────────────────────────────────────────────┘
//
// STARTUP:
// 1. Load config.toml, set up logging
// 2. Resolve the resource directory (defaults to the executable's)
// 3. Start the windowing session and run the app
// 4. Any initialization failure is logged, shown in an alert, and exits
//
// =============================================================================

mod app;
mod backend;
mod config;
mod error;
mod platform;
mod reload;
mod resources;
mod scene;
mod timestep;

use anyhow::Result;
use app::App;
use config::Config;
use platform::Session;
use resources::ResourceLoader;
use std::fs::OpenOptions;

fn main() -> Result<()> {
    // Load configuration from config.toml
    let config = Config::load();

    init_logging(&config);
    log::info!("Starting OpenGL sandbox");
    log::info!(
        "Window: {}x{}, {} updates/s",
        config.window.width,
        config.window.height,
        config.graphics.updates_per_second
    );

    if let Err(e) = run(config) {
        error::report_fatal(&e);
        return Err(e.into());
    }

    log::info!("Exited cleanly");
    Ok(())
}

fn run(config: Config) -> error::Result<()> {
    let loader = match &config.resources.directory {
        Some(directory) => ResourceLoader::with_base_path(directory.clone()),
        None => ResourceLoader::new()?,
    };
    log::info!("Resources: {}", loader.base_path().display());

    let session = Session::new()?;
    let mut app = App::new(config, loader);
    session.run(&mut app)?;

    match app.take_fatal() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Initialize logging based on config. `RUST_LOG` overrides the default
/// `info` level.
fn init_logging(config: &Config) {
    use env_logger::{Builder, Target};
    use log::LevelFilter;

    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();

    if config.debug.log_to_file {
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.debug.log_file)
        {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!(
                "Could not open log file {}: {}, logging to stderr",
                config.debug.log_file, e
            ),
        }
    }

    builder.init();
}
