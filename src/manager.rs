//! Registry of live panes and the collaborators they share.
//!
//! Panes are kept in registration order. All operations run on the caller's
//! thread; a request stays outstanding until its completion is handed back
//! through [`PaneManager::complete`] or [`PaneManager::pump`].

use crate::collaborators::{
    Column, ConfirmAction, ConfirmDialog, DisablerFactory, Outcome, RequestToken, TrackerFactory,
    Transport, UiTree,
};
use crate::error::PaneError;
use crate::pane::{LoadStep, PANE_MARKER_CLASS, Pane, PaneBuilder, PaneMut};

/// Title reported for a modified pane without a usable header title.
pub const NO_TITLE: &str = "[no title]";

/// Collaborators shared by every pane of a manager.
pub struct Environment {
    pub ui: Box<dyn UiTree>,
    pub dialog: Box<dyn ConfirmDialog>,
    pub transport: Box<dyn Transport>,
    pub disablers: Box<dyn DisablerFactory>,
    pub trackers: Box<dyn TrackerFactory>,
    next_token: u64,
    /// Pane that opened the confirmation dialog, if it is open.
    pub(crate) dialog_owner: Option<String>,
}

impl Environment {
    pub fn new(
        ui: Box<dyn UiTree>,
        dialog: Box<dyn ConfirmDialog>,
        transport: Box<dyn Transport>,
        disablers: Box<dyn DisablerFactory>,
        trackers: Box<dyn TrackerFactory>,
    ) -> Self {
        Self {
            ui,
            dialog,
            transport,
            disablers,
            trackers,
            next_token: 0,
            dialog_owner: None,
        }
    }

    pub(crate) fn next_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    pub fn dialog_owner(&self) -> Option<&str> {
        self.dialog_owner.as_deref()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("next_token", &self.next_token)
            .field("dialog_owner", &self.dialog_owner)
            .finish_non_exhaustive()
    }
}

/// One entry of [`PaneManager::all_modified_pane_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedPane {
    pub id: String,
    pub title: String,
    pub columns: Vec<Column>,
}

#[derive(Debug)]
pub struct PaneManager {
    env: Environment,
    panes: Vec<Pane>,
}

impl PaneManager {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            panes: Vec::new(),
        }
    }

    /// Register and initialise a pane. Fails without side effects when the
    /// id is blank or already taken, or the configuration is unusable.
    pub fn create(&mut self, builder: PaneBuilder) -> Result<PaneMut<'_>, PaneError> {
        if builder.id().trim().is_empty() {
            return Err(PaneError::MissingId);
        }
        if self.position(builder.id()).is_some() {
            return Err(PaneError::DuplicateId {
                id: builder.id().to_string(),
            });
        }
        let pane = builder.build();
        pane.config().validate()?;
        tracing::debug!(pane_id = %pane.id(), "registering pane");

        self.panes.push(pane);
        let index = self.panes.len() - 1;
        let mut handle = PaneMut::new(&mut self.panes[index], &mut self.env);
        handle.initialize();
        Ok(handle)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.panes.iter().position(|p| p.id() == id)
    }

    pub fn pane(&self, id: &str) -> Option<&Pane> {
        self.panes.iter().find(|p| p.id() == id)
    }

    pub fn pane_mut(&mut self, id: &str) -> Option<PaneMut<'_>> {
        let index = self.position(id)?;
        Some(PaneMut::new(&mut self.panes[index], &mut self.env))
    }

    pub fn try_pane_mut(&mut self, id: &str) -> Result<PaneMut<'_>, PaneError> {
        self.pane_mut(id).ok_or_else(|| PaneError::UnknownPane { id: id.to_string() })
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.panes.iter().map(Pane::id)
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    /// Release a pane's attachments and unregister it. Responses still in
    /// flight for it are ignored when they arrive.
    pub fn destroy(&mut self, id: &str) -> Result<(), PaneError> {
        let index = self
            .position(id)
            .ok_or_else(|| PaneError::UnknownPane { id: id.to_string() })?;
        let mut pane = self.panes.remove(index);
        pane.release();
        self.env.ui.remove_class(pane.selector(), PANE_MARKER_CLASS);
        if self.env.dialog_owner.as_deref() == Some(id) {
            self.env.dialog.close();
            self.env.dialog_owner = None;
        }
        tracing::debug!(pane_id = %id, "pane destroyed");
        Ok(())
    }

    /// Deliver a transport completion to the pane that issued it.
    pub fn complete(&mut self, token: RequestToken, outcome: Outcome) -> bool {
        let env = &mut self.env;
        let delivered = self
            .panes
            .iter_mut()
            .find(|p| p.is_pending(token))
            .is_some_and(|pane| PaneMut::new(pane, env).complete(token, outcome));
        if !delivered {
            tracing::warn!(token = token.0, "response for an unknown or destroyed pane ignored");
        }
        delivered
    }

    /// Drain ready completions from the transport. Returns how many were
    /// delivered to a pane.
    pub fn pump(&mut self) -> usize {
        let ready = self.env.transport.poll();
        let mut delivered = 0;
        for (token, outcome) in ready {
            if self.complete(token, outcome) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Route the user's answer to the pane that opened the dialog.
    pub fn answer_dialog(&mut self, action: ConfirmAction) -> Option<LoadStep> {
        self.env.dialog.close();
        let owner = self.env.dialog_owner.take()?;
        let mut pane = self.pane_mut(&owner)?;
        Some(pane.answer(action == ConfirmAction::Confirm))
    }

    /// Every pane with at least one modified column, in registration order.
    pub fn all_modified_pane_columns(&mut self) -> Vec<ModifiedPane> {
        let env = &mut self.env;
        self.panes
            .iter_mut()
            .filter_map(|pane| {
                let mut handle = PaneMut::new(pane, env);
                let columns = handle.modified_columns(None);
                if columns.is_empty() {
                    return None;
                }
                let title = handle.config().pane_header_title.as_str();
                Some(ModifiedPane {
                    id: handle.id().to_string(),
                    title: if title.trim().is_empty() { NO_TITLE } else { title }.to_string(),
                    columns,
                })
            })
            .collect()
    }

    pub fn is_any_pane_modified(&mut self) -> bool {
        !self.all_modified_pane_columns().is_empty()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }
}
