//! Stateful content panes: asynchronous (re)loading with optional
//! confirmation, scoped submit-and-reconcile calls, per-container disable
//! and read-only coordination, and modification tracking.

pub mod collaborators;
pub mod config;
pub mod disable;
pub mod drivers;
pub mod error;
pub mod events;
pub mod manager;
pub mod pane;
pub mod refresh;
pub mod render;
pub mod selector;
pub mod tracing_sub;
pub mod tracking;

pub use error::{ErrorKind, PaneError, TransportError};
pub use manager::{Environment, ModifiedPane, PaneManager};
pub use pane::{CallParams, LoadOption, LoadStep, PaneBuilder, PaneMut, PaneOption, PaneStatus, RequestSettings};
