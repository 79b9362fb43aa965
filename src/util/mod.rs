//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod events;
pub mod fs;
pub mod process;
pub mod version;

pub use config::Config;
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use events::{EventSink, MemorySink, PrefetchEvent, TracingSink};
pub use fs::RootedPath;
pub use process::{CommandRunner, ProcessBuilder, ProcessOutput, SystemRunner};
pub use version::VersionsRange;
