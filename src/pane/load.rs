//! (Re)loading pane content.

use std::fmt;
use std::str::FromStr;

use crate::collaborators::{Request, RequestToken, Response};
use crate::config::Method;
use crate::error::TransportError;
use crate::refresh::with_refresh_param;

use super::{Pane, PaneMut, PaneOption, PaneStatus, Pending};

pub const MISSING_SOURCE_MESSAGE: &str =
    "You must supply a URL as an option to this pane before the content is loaded";

/// How [`PaneMut::load`] asks for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOption {
    PromptOnlyIfModified,
    NoPrompt,
    #[default]
    PromptAlways,
}

impl LoadOption {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadOption::PromptOnlyIfModified => "PROMPT-ONLY-IF-MODIFIED",
            LoadOption::NoPrompt => "NO-PROMPT",
            LoadOption::PromptAlways => "PROMPT-ALWAYS",
        }
    }
}

impl fmt::Display for LoadOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "PROMPT-ONLY-IF-MODIFIED" => Ok(LoadOption::PromptOnlyIfModified),
            "NO-PROMPT" => Ok(LoadOption::NoPrompt),
            "PROMPT-ALWAYS" => Ok(LoadOption::PromptAlways),
            other => Err(format!("unknown load option: {other}")),
        }
    }
}

/// What a call to [`PaneMut::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    /// A `beforePaneLoad` listener vetoed the load.
    Vetoed,
    /// The confirmation dialog is already open; nothing happened.
    Gated,
    /// The confirmation dialog was opened.
    Prompting,
    /// The user declined the confirmation prompt.
    Declined,
    /// A request was issued; the pane is loading.
    Issued(RequestToken),
    /// Content was placed synchronously without a request.
    Loaded,
}

impl Pane {
    fn settle(&mut self, status: PaneStatus) {
        self.status = status;
        self.resting = status;
    }
}

impl PaneMut<'_> {
    /// Load the contents of this pane from its source, confirming first as
    /// `option` requires.
    pub fn load(&mut self, option: LoadOption) -> LoadStep {
        if self.env.dialog.is_open() {
            tracing::warn!(pane_id = %self.pane.id, "load ignored while the confirmation dialog is open");
            return LoadStep::Gated;
        }
        let pane = &mut *self.pane;
        if !pane.listeners.fire_before_load(&pane.id) {
            tracing::debug!(pane_id = %pane.id, "load vetoed by beforePaneLoad listener");
            return LoadStep::Vetoed;
        }
        match option {
            LoadOption::NoPrompt => self.begin_load(true),
            LoadOption::PromptAlways => {
                let body = self.pane.config.pane_load_always_prompt_message.clone();
                self.prompt(&body)
            }
            LoadOption::PromptOnlyIfModified => {
                if self.modified_columns(None).is_empty() {
                    self.begin_load(true)
                } else {
                    let body = self.pane.config.pane_load_prompt_when_modified_message.clone();
                    self.prompt(&body)
                }
            }
        }
    }

    fn prompt(&mut self, body: &str) -> LoadStep {
        let dialog = self.env.dialog.as_mut();
        dialog.configure(&self.pane.config.pane_load_dialog_title, body);
        dialog.open();
        self.env.dialog_owner = Some(self.pane.id.clone());
        if self.pane.status != PaneStatus::AwaitingConfirmation {
            self.pane.resting = self.pane.status;
        }
        self.pane.status = PaneStatus::AwaitingConfirmation;
        tracing::debug!(pane_id = %self.pane.id, "awaiting load confirmation");
        LoadStep::Prompting
    }

    /// The user answered the confirmation dialog this pane opened.
    pub(crate) fn answer(&mut self, confirmed: bool) -> LoadStep {
        self.pane.status = self.pane.resting;
        if confirmed {
            self.begin_load(true)
        } else {
            tracing::debug!(pane_id = %self.pane.id, "load declined");
            LoadStep::Declined
        }
    }

    pub(crate) fn begin_load(&mut self, refresh: bool) -> LoadStep {
        let source = self.pane.config.pane_action_url.trim().to_string();

        if source.is_empty() {
            tracing::warn!(pane_id = %self.pane.id, "no load source configured");
            self.before_load();
            self.finish_load(MISSING_SOURCE_MESSAGE);
            return LoadStep::Loaded;
        }

        if source.starts_with('#') {
            self.before_load();
            let content = self.env.ui.fragment(&source).unwrap_or_default();
            self.finish_load(&content);
            return LoadStep::Loaded;
        }

        let config = &self.pane.config;
        let url = with_refresh_param(&source, &config.refresh_parameter_name, refresh);
        let overrides = &config.pane_ajax_load_settings;
        let mut request = Request::new(url, overrides.method.unwrap_or(Method::Get));
        request.options = overrides.options.clone();

        self.pane.status = PaneStatus::Loading;
        self.before_load();
        self.pane.load_hooks.run_before_send(&mut request);

        let token = self.env.next_token();
        self.pane.pending.insert(token, Pending::Load);
        tracing::info!(pane_id = %self.pane.id, url = %request.url, token = token.0, "loading pane");
        self.env.transport.issue(token, request);
        LoadStep::Issued(token)
    }

    /// Busy indicator on, group box off. The configured group box setting is
    /// held by the first of any overlapping loads.
    fn before_load(&mut self) {
        if self.pane.held_group_box.is_none() {
            self.pane.held_group_box = Some(self.pane.config.enable_pane_group_box);
        }
        self.show_progress(true);
        self.set_option_unchecked(PaneOption::EnablePaneGroupBox(false));
    }

    /// Put the held group box setting back once no load is outstanding.
    fn restore_group_box(&mut self) {
        if self.pane.loads_in_flight() {
            return;
        }
        if let Some(held) = self.pane.held_group_box.take() {
            self.pane.config.enable_pane_group_box = held;
        }
    }

    fn finish_load(&mut self, content: &str) {
        self.restore_group_box();
        let pane = self.pane.selector.clone();
        self.env.ui.replace_content(&pane, content);
        self.reassert_visual_options();
        self.after_pane_load(None);
        self.show_progress(false);
        self.pane.settle(PaneStatus::Loaded);
        tracing::debug!(pane_id = %self.pane.id, "pane loaded");
    }

    pub(super) fn load_succeeded(&mut self, response: &Response) {
        self.finish_load(&response.body);
        self.pane.load_hooks.run_success(response);
    }

    pub(super) fn load_failed(&mut self, error: &TransportError) {
        tracing::warn!(pane_id = %self.pane.id, error = %error, "pane load failed");
        self.show_progress(false);
        self.restore_group_box();
        let pane = self.pane.selector.clone();
        let message = self.pane.config.friendly_exception_message.clone();
        self.env.ui.replace_content(&pane, &message);
        self.reassert_visual_options();
        self.pane.settle(PaneStatus::Failed);
        self.pane.load_hooks.run_error(error);
    }
}
