//! Whole-file asset loading relative to the application's install directory.

use std::path::{Path, PathBuf};

use crate::error::{InitError, Result};

/// Resolves asset names against a base directory fixed at construction.
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    base_path: PathBuf,
}

impl ResourceLoader {
    /// Use the directory containing the running executable.
    pub fn new() -> Result<Self> {
        let exe = std::env::current_exe().map_err(InitError::BasePath)?;
        let base_path = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                InitError::BasePath(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} has no parent directory", exe.display()),
                ))
            })?;

        log::info!("Resource base path: {}", base_path.display());
        Ok(Self { base_path })
    }

    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Read the entire file into memory.
    pub fn load_file(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name);
        let contents = std::fs::read(&path).map_err(|source| InitError::FileOpen {
            path: path.clone(),
            source,
        })?;

        log::debug!("Loaded {} ({} bytes)", path.display(), contents.len());
        Ok(contents)
    }

    /// Read the entire file as UTF-8 text.
    pub fn load_text(&self, name: &str) -> Result<String> {
        let bytes = self.load_file(name)?;
        String::from_utf8(bytes).map_err(|_| InitError::Encoding {
            path: self.resolve(name),
        })
    }
}
