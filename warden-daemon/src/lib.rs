//! Warden runtime: process probing, detached watcher spawning, selector
//! resolution and the lifecycle operations built on them.

mod error;
pub mod launcher;
pub mod lifecycle;
pub mod probe;
pub mod registry;
pub mod settings;

pub use error::{DaemonError, EXIT_CONFLICT, EXIT_FAILURE};
pub use lifecycle::{
    expand_path, freeze, invoke, log_file, rekindle, slay, tally, BatchReport, Failure, Frozen,
    InvokeRequest, Rekindled, Slain, Tally, TallyRow,
};
pub use probe::{ProcessState, SignalKind, SignalOutcome};
pub use registry::Selector;
pub use settings::{Settings, WatcherCommand};
