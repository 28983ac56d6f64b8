//! Startup failures and how they are reported.
//!
//! Nothing here is recoverable: every variant ends the process once it has
//! been logged and, where a display is available, shown in a native alert.

use std::path::PathBuf;
use thiserror::Error;

use crate::backend::shader::ShaderStage;

/// Title used for the native alert.
const ALERT_TITLE: &str = "OpenGL Sandbox";

/// Result type for initialization steps.
pub type Result<T> = std::result::Result<T, InitError>;

/// Errors that abort startup.
#[derive(Error, Debug)]
pub enum InitError {
    /// The windowing/event subsystem could not start.
    #[error("Failed to initialize the windowing system: {0}")]
    Session(String),

    /// Window (or its pixel format) could not be created.
    #[error("Failed to create main window: {0}")]
    Window(String),

    /// OpenGL context could not be created or made current.
    #[error("Failed to create OpenGL context: {0}")]
    Context(String),

    /// The executable's install directory could not be determined.
    #[error("Failed to resolve the application base path: {0}")]
    BasePath(#[source] std::io::Error),

    #[error("Error opening file: {} - {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not valid UTF-8: {}", .path.display())]
    Encoding { path: PathBuf },

    #[error("Error compiling {stage} shader:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("Error linking vertex and fragment shaders:\n{log}")]
    ProgramLink { log: String },

    /// The driver refused to hand out a new object handle.
    #[error("Failed to create {what}: {reason}")]
    ResourceCreate { what: &'static str, reason: String },
}

impl InitError {
    /// Whether a native alert can be shown for this error.
    ///
    /// A failed session means there is no windowing system to draw one with.
    pub fn shows_alert(&self) -> bool {
        !matches!(self, InitError::Session(_))
    }
}

/// Log a fatal error and show it in a native alert when possible.
///
/// The caller is still responsible for terminating; `main` does so by
/// returning the error, which also prints it to standard error.
pub fn report_fatal(error: &InitError) {
    log::error!("{}", error);

    if error.shows_alert() {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(ALERT_TITLE)
            .set_description(error.to_string())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}
