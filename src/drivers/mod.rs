//! Headless collaborator implementations.
//!
//! Each driver is a cheap handle over shared state: one clone goes into the
//! [`Environment`] and the host keeps another to inspect or drive it.

pub mod dialog;
pub mod disabler;
pub mod form;
pub mod transport;
pub mod tree;

pub use dialog::MemoryDialog;
pub use disabler::MemoryDisablers;
pub use form::{MemoryForm, MemoryTrackers};
pub use transport::{FileTransport, MemoryTransport};
pub use tree::MemoryTree;

use crate::collaborators::Transport;
use crate::manager::{Environment, PaneManager};

/// A manager wired to in-memory drivers, plus host-side handles to each.
#[derive(Debug)]
pub struct Headless {
    pub manager: PaneManager,
    pub tree: MemoryTree,
    pub form: MemoryForm,
    pub dialog: MemoryDialog,
    pub disablers: MemoryDisablers,
    pub trackers: MemoryTrackers,
    pub transport: MemoryTransport,
}

/// In-memory collaborators sharing one form between tracker and host.
#[derive(Debug, Clone)]
pub struct MemoryDrivers {
    pub tree: MemoryTree,
    pub form: MemoryForm,
    pub dialog: MemoryDialog,
    pub disablers: MemoryDisablers,
    pub trackers: MemoryTrackers,
}

impl MemoryDrivers {
    pub fn new() -> Self {
        let form = MemoryForm::new();
        Self {
            tree: MemoryTree::new(),
            trackers: MemoryTrackers::new(form.clone()),
            form,
            dialog: MemoryDialog::new(),
            disablers: MemoryDisablers::new(),
        }
    }

    /// An environment over clones of these drivers and `transport`.
    pub fn environment(&self, transport: Box<dyn Transport>) -> Environment {
        Environment::new(
            Box::new(self.tree.clone()),
            Box::new(self.dialog.clone()),
            transport,
            Box::new(self.disablers.clone()),
            Box::new(self.trackers.clone()),
        )
    }
}

impl Default for MemoryDrivers {
    fn default() -> Self {
        Self::new()
    }
}

pub fn headless() -> Headless {
    let drivers = MemoryDrivers::new();
    let transport = MemoryTransport::new();
    let manager = PaneManager::new(drivers.environment(Box::new(transport.clone())));
    let MemoryDrivers {
        tree,
        form,
        dialog,
        disablers,
        trackers,
    } = drivers;
    Headless {
        manager,
        tree,
        form,
        dialog,
        disablers,
        trackers,
        transport,
    }
}
