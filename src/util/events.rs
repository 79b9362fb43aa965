//! Pipeline events.
//!
//! The prefetch pipeline reports progress through an injected [`EventSink`]
//! instead of logging directly, so callers decide where diagnostics go and
//! tests can inspect them.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

/// An event emitted while prefetching a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum PrefetchEvent {
    /// Processing of a project subpath started.
    ProjectStarted {
        /// Project source directory
        path: PathBuf,
    },

    /// The yarn version resolved in the prefetch environment was accepted.
    YarnVersion {
        /// Version reported by `yarn --version`
        version: String,
    },

    /// `yarn install` is about to run.
    InstallStarted {
        /// Full command line
        command: String,
        /// Offline mirror directory
        mirror_dir: PathBuf,
    },

    /// The resolver returned the package set.
    PackagesResolved {
        /// Number of resolved packages
        count: usize,
    },

    /// Several identical lockfile entries share one mirror tarball.
    DuplicateMirrorEntries {
        /// Mirror filename
        filename: String,
        /// Number of entries sharing it
        count: usize,
    },

    /// Processing of a project subpath finished.
    ProjectFinished {
        /// Project source directory
        path: PathBuf,
        /// Number of components produced
        components: usize,
    },
}

impl PrefetchEvent {
    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Destination for [`PrefetchEvent`]s.
pub trait EventSink {
    fn emit(&self, event: PrefetchEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PrefetchEvent) {
        tracing::trace!("{}", event.to_json());

        match event {
            PrefetchEvent::ProjectStarted { path } => {
                tracing::info!(
                    "Fetching the yarn dependencies at the subpath {}",
                    path.display()
                );
            }
            PrefetchEvent::YarnVersion { version } => {
                tracing::info!("Processing the request using yarn@{}", version);
            }
            PrefetchEvent::InstallStarted {
                command,
                mirror_dir,
            } => {
                tracing::debug!("Running `{}` (mirror: {})", command, mirror_dir.display());
            }
            PrefetchEvent::PackagesResolved { count } => {
                tracing::info!("Resolved {} packages", count);
            }
            PrefetchEvent::DuplicateMirrorEntries { filename, count } => {
                tracing::debug!("{} identical entries share {}", count, filename);
            }
            PrefetchEvent::ProjectFinished { path, components } => {
                tracing::debug!("{}: {} components", path.display(), components);
            }
        }
    }
}

/// Records events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PrefetchEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<PrefetchEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: PrefetchEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
