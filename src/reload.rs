// Shader hot reload
//
// Watches the resource directory and reports when either shader source
// changed. The notify callback runs on its own thread and only forwards
// events over a channel; the loop thread drains it once per iteration.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

pub struct ShaderWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    files: Vec<PathBuf>,
}

impl ShaderWatcher {
    /// Watch `directory` for changes to any of `file_names`.
    pub fn new(directory: &Path, file_names: &[&str]) -> notify::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(directory, RecursiveMode::NonRecursive)?;

        log::info!("Watching {} for shader changes", directory.display());

        Ok(Self {
            _watcher: watcher,
            events: rx,
            files: file_names.iter().map(|name| directory.join(name)).collect(),
        })
    }

    /// Drain pending notifications; true if a watched shader changed.
    pub fn take_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.events.try_recv() {
            match result {
                Ok(event) => changed |= touches(&event, &self.files),
                Err(e) => log::warn!("Shader watcher error: {}", e),
            }
        }
        changed
    }
}

/// Whether `event` writes to one of `files`.
///
/// Editors often save by writing a temp file and renaming it over the
/// original, so creations and renames count as well as modifications.
fn touches(event: &Event, files: &[PathBuf]) -> bool {
    let relevant = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
    relevant
        && event
            .paths
            .iter()
            .any(|path| files.iter().any(|file| same_file_name(path, file)))
}

// Watchers may report canonicalized paths, so compare the directory loosely.
fn same_file_name(reported: &Path, watched: &Path) -> bool {
    reported == watched || reported.file_name() == watched.file_name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};

    fn files() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/app/shader.vert"),
            PathBuf::from("/app/shader.frag"),
        ]
    }

    #[test]
    fn modification_of_watched_shader_counts() {
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/app/shader.frag"));
        assert!(touches(&event, &files()));
    }

    #[test]
    fn atomic_save_via_create_counts() {
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/private/app/shader.vert"));
        assert!(touches(&event, &files()));
    }

    #[test]
    fn unrelated_files_and_kinds_are_ignored() {
        let other_file = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/app/config.toml"));
        assert!(!touches(&other_file, &files()));

        let read_only = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/app/shader.vert"));
        assert!(!touches(&read_only, &files()));

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/app/shader.vert"));
        assert!(!touches(&removed, &files()));
    }

    #[test]
    fn watcher_starts_on_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = ShaderWatcher::new(dir.path(), &["shader.vert", "shader.frag"]).unwrap();
        assert_eq!(watcher.files.len(), 2);
        assert!(ShaderWatcher::new(&dir.path().join("missing"), &["shader.vert"]).is_err());
    }
}
