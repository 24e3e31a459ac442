//! Submitting a container and reconciling its modification state.

use std::collections::BTreeMap;

use crate::collaborators::{Column, Cursor, Request, RequestToken, Response};
use crate::config::Method;
use crate::error::{PaneError, TransportError};
use crate::events::{RequestHooks, SuccessHook};
use crate::selector::Selector;

use super::{PaneMut, Pending};

/// Target and transport settings of a call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestSettings {
    pub url: String,
    /// Defaults to `POST` when unset.
    pub method: Option<Method>,
    pub options: BTreeMap<String, String>,
}

impl RequestSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Parameters of [`PaneMut::call`].
#[derive(Default)]
pub struct CallParams {
    pub container_id: String,
    pub request_settings: Option<RequestSettings>,
    /// Probe searched within the container after a successful call. When it
    /// resolves to non-blank text the columns modified before the call stay
    /// modified; typically an element listing validation errors.
    pub keep_modified_if_exist_in_dom: Option<String>,
    /// Place the response body into the container before snapshotting it.
    pub render_response: bool,
    pub hooks: RequestHooks,
    /// Run after the success hooks.
    pub after_call: Vec<SuccessHook>,
}

impl CallParams {
    pub fn new(container_id: impl Into<String>, settings: RequestSettings) -> Self {
        Self {
            container_id: container_id.into(),
            request_settings: Some(settings),
            ..Self::default()
        }
    }

    pub fn keep_modified_if_exists(mut self, probe: impl Into<String>) -> Self {
        self.keep_modified_if_exist_in_dom = Some(probe.into());
        self
    }

    pub fn render_response(mut self, render: bool) -> Self {
        self.render_response = render;
        self
    }

    pub fn hooks(mut self, hooks: RequestHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Runs after the success hooks once the call has been reconciled.
    pub fn after_call(mut self, hook: impl FnMut(&Response) + 'static) -> Self {
        self.after_call.push(Box::new(hook));
        self
    }

    fn validate(&self) -> Result<&RequestSettings, PaneError> {
        let settings = self
            .request_settings
            .as_ref()
            .ok_or(PaneError::MissingCallParams)?;
        if self.container_id.trim().is_empty() {
            return Err(PaneError::MissingContainerId);
        }
        if settings.url.trim().is_empty() {
            return Err(PaneError::MissingCallUrl);
        }
        Ok(settings)
    }
}

impl std::fmt::Debug for CallParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallParams")
            .field("container_id", &self.container_id)
            .field("request_settings", &self.request_settings)
            .field("keep_modified_if_exist_in_dom", &self.keep_modified_if_exist_in_dom)
            .field("render_response", &self.render_response)
            .field("hooks", &self.hooks)
            .field("after_call", &self.after_call.len())
            .finish()
    }
}

pub(super) struct PendingCall {
    scope: Selector,
    keep_modified_probe: Option<String>,
    render_response: bool,
    hooks: RequestHooks,
    after_call: Vec<SuccessHook>,
}

impl std::fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCall")
            .field("scope", &self.scope)
            .field("keep_modified_probe", &self.keep_modified_probe)
            .field("render_response", &self.render_response)
            .finish_non_exhaustive()
    }
}

impl PaneMut<'_> {
    /// Issue a request on behalf of a container within this pane.
    pub fn call(&mut self, params: CallParams) -> Result<RequestToken, PaneError> {
        let settings = params.validate()?;
        let scope = self.scope(Some(&params.container_id));
        let mut request = Request::new(
            settings.url.trim(),
            settings.method.unwrap_or(Method::Post),
        );
        request.options = settings.options.clone();

        let CallParams {
            keep_modified_if_exist_in_dom,
            render_response,
            mut hooks,
            after_call,
            ..
        } = params;

        let ui = self.env.ui.as_mut();
        ui.set_cursor(Cursor::Progress);
        ui.add_class(&scope, &self.pane.config.disabled_class);
        hooks.run_before_send(&mut request);

        let token = self.env.next_token();
        tracing::info!(
            pane_id = %self.pane.id,
            container = %scope,
            url = %request.url,
            method = %request.method,
            token = token.0,
            "issuing call"
        );
        self.pane.pending.insert(
            token,
            Pending::Call(PendingCall {
                scope,
                keep_modified_probe: keep_modified_if_exist_in_dom,
                render_response,
                hooks,
                after_call,
            }),
        );
        self.env.transport.issue(token, request);
        Ok(token)
    }

    fn clear_call_progress(&mut self, scope: &Selector) {
        let ui = self.env.ui.as_mut();
        ui.set_cursor(Cursor::Auto);
        ui.remove_class(scope, &self.pane.config.disabled_class);
    }

    pub(super) fn call_succeeded(&mut self, mut call: PendingCall, response: &Response) {
        let modified_before = self.modified_columns(call.scope.container_id());
        self.clear_call_progress(&call.scope);
        if call.render_response {
            self.env.ui.replace_content(&call.scope, &response.body);
        }
        self.after_pane_load(call.scope.container_id());
        self.keep_modified_if_flagged(&call, modified_before);

        call.hooks.run_success(response);
        for hook in &mut call.after_call {
            hook(response);
        }
    }

    /// Restore the pre-call modified columns when the container's probe
    /// resolves to non-blank text.
    fn keep_modified_if_flagged(&mut self, call: &PendingCall, modified_before: Vec<Column>) {
        let Some(probe) = call
            .keep_modified_probe
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        else {
            return;
        };
        let flagged = self
            .env
            .ui
            .find_text(&call.scope, probe)
            .is_some_and(|text| !text.trim().is_empty());
        if !flagged {
            return;
        }
        tracing::debug!(
            pane_id = %self.pane.id,
            probe = %call.scope.descendant(probe),
            columns = modified_before.len(),
            "keeping columns modified after call"
        );
        self.tracker()
            .set_original_values(&call.scope, &modified_before);
    }

    pub(super) fn call_failed(&mut self, mut call: PendingCall, error: &TransportError) {
        tracing::warn!(pane_id = %self.pane.id, container = %call.scope, error = %error, "call failed");
        self.clear_call_progress(&call.scope);
        let message = self.pane.config.friendly_exception_message.clone();
        self.env.ui.replace_content(&call.scope, &message);
        call.hooks.run_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_is_reported_first() {
        let params = CallParams {
            container_id: String::new(),
            ..CallParams::default()
        };
        assert!(matches!(params.validate(), Err(PaneError::MissingCallParams)));
    }

    #[test]
    fn blank_container_and_url_are_rejected() {
        let params = CallParams::new("  ", RequestSettings::new("/save"));
        assert!(matches!(params.validate(), Err(PaneError::MissingContainerId)));
        let params = CallParams::new("form", RequestSettings::new(" "));
        assert!(matches!(params.validate(), Err(PaneError::MissingCallUrl)));
        let params = CallParams::new("form", RequestSettings::new("/save"));
        assert!(params.validate().is_ok());
    }
}
