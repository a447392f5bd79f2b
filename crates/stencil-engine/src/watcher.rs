//! Recompiles bundles when template files change on disk.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use stencil_common_config::TemplatesConfig;
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::Result;
use crate::path::to_logical_name;

/// What happened to a template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// A processed change: the file and the bundles rebuilt because of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub name: String,
    pub kind: ChangeKind,
    pub rebuilt: Vec<String>,
}

/// Watches the engine root and invalidates bundles as files change.
pub struct TemplateWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<WatchEvent>,
}

impl TemplateWatcher {
    pub fn new(engine: Arc<Engine>) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let root = engine.root().to_path_buf();
        let templates = engine.config().templates.clone();

        let handler = Arc::clone(&engine);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "watch error");
                    return;
                }
            };
            for (path, kind) in classify_event(&event, &templates) {
                let Ok(name) = to_logical_name(&path, &root) else {
                    continue;
                };
                match handler.invalidate(&name) {
                    Ok(rebuilt) => {
                        debug!(
                            template = %name,
                            ?kind,
                            rebuilt = rebuilt.len(),
                            "template changed"
                        );
                        let _ = tx.send(WatchEvent { name, kind, rebuilt });
                    }
                    Err(err) => {
                        warn!(template = %name, error = %err, "failed to invalidate template")
                    }
                }
            }
        })?;

        watcher.watch(engine.root(), RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Block until the next processed change.
    pub fn next_event(&self) -> Option<WatchEvent> {
        self.receiver.recv().ok()
    }

    /// Wait at most `timeout` for the next processed change.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Template files touched by `event`, with the kind of change.
fn classify_event(event: &Event, templates: &TemplatesConfig) -> Vec<(PathBuf, ChangeKind)> {
    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Removed,
        _ => return Vec::new(),
    };
    event
        .paths
        .iter()
        .filter(|p| is_template(p, templates))
        .map(|p| (p.clone(), kind))
        .collect()
}

fn is_template(path: &Path, templates: &TemplatesConfig) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| templates.matches_extension(n))
}
