//! Warden core library: daemon records, state layout, metadata store.
//!
//! - [`types`]: [`DaemonName`] and [`DaemonRecord`]
//! - [`paths`]: `~/.warden/` layout helpers
//! - [`store`]: save / load / list / remove, one JSON file per daemon
//! - [`error`]: [`StoreError`]

pub mod error;
pub mod paths;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use types::{DaemonName, DaemonRecord};
