//! The pane: a lifecycle-managed region with its own load source.
//!
//! A [`Pane`] is owned by the [`PaneManager`](crate::manager::PaneManager);
//! operations run through a [`PaneMut`] handle that pairs the pane with the
//! shared collaborators.

mod call;
mod load;
mod options;

use std::collections::BTreeMap;

pub use call::{CallParams, RequestSettings};
pub use load::{LoadOption, LoadStep, MISSING_SOURCE_MESSAGE};
pub use options::{OptionKey, PaneOption};

use crate::collaborators::{
    Column, Cursor, Disabler, DisablerFlag, GroupBox, Header, ModificationTracker, Outcome,
    RequestToken, UiTree,
};
use crate::config::PaneConfig;
use crate::disable::DisableCoordinator;
use crate::events::{AfterPaneLoad, BeforePaneLoad, Listeners, RequestHooks};
use crate::manager::Environment;
use crate::selector::Selector;
use crate::tracking::TrackingCoordinator;

/// Marker class carried by every registered pane element.
pub const PANE_MARKER_CLASS: &str = "hasPane";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneStatus {
    Idle,
    AwaitingConfirmation,
    Loading,
    Loaded,
    Failed,
}

/// Everything needed to construct a pane.
#[derive(Debug)]
pub struct PaneBuilder {
    id: String,
    config: PaneConfig,
    load_hooks: RequestHooks,
    listeners: Listeners,
}

impl PaneBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: PaneConfig::default(),
            load_hooks: RequestHooks::default(),
            listeners: Listeners::default(),
        }
    }

    pub fn config(mut self, config: PaneConfig) -> Self {
        self.config = config;
        self
    }

    /// Caller extensions run after the built-in load request handling.
    pub fn load_hooks(mut self, hooks: RequestHooks) -> Self {
        self.load_hooks = hooks;
        self
    }

    pub fn on_before_load(mut self, listener: impl FnMut(&mut BeforePaneLoad<'_>) + 'static) -> Self {
        self.listeners.on_before_load(listener);
        self
    }

    pub fn on_after_load(mut self, listener: impl FnMut(&AfterPaneLoad<'_>) + 'static) -> Self {
        self.listeners.on_after_load(listener);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn build(self) -> Pane {
        let selector = Selector::pane(self.id.clone());
        Pane {
            id: self.id,
            selector,
            config: self.config,
            status: PaneStatus::Idle,
            resting: PaneStatus::Idle,
            held_group_box: None,
            load_hooks: self.load_hooks,
            listeners: self.listeners,
            disablers: DisableCoordinator::new(),
            tracking: TrackingCoordinator::new(),
            pending: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
enum Pending {
    Load,
    Call(call::PendingCall),
}

#[derive(Debug)]
pub struct Pane {
    id: String,
    selector: Selector,
    config: PaneConfig,
    status: PaneStatus,
    /// Status to fall back to when a prompt is declined.
    resting: PaneStatus,
    /// Configured group box setting while loads suppress it.
    held_group_box: Option<bool>,
    load_hooks: RequestHooks,
    listeners: Listeners,
    disablers: DisableCoordinator,
    tracking: TrackingCoordinator,
    pending: BTreeMap<RequestToken, Pending>,
}

impl Pane {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn config(&self) -> &PaneConfig {
        &self.config
    }

    pub fn status(&self) -> PaneStatus {
        self.status
    }

    pub fn is_pending(&self, token: RequestToken) -> bool {
        self.pending.contains_key(&token)
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn disabler(&self, container_id: Option<&str>) -> Option<&dyn Disabler> {
        self.disablers
            .get(&Selector::scoped(&self.id, container_id))
    }

    pub fn disabler_count(&self) -> usize {
        self.disablers.len()
    }

    pub(crate) fn release(&mut self) {
        self.disablers.release();
        self.tracking.release();
        self.pending.clear();
        self.held_group_box = None;
    }

    fn loads_in_flight(&self) -> bool {
        self.pending.values().any(|p| matches!(p, Pending::Load))
    }
}

/// A pane paired with the shared collaborators.
pub struct PaneMut<'a> {
    pane: &'a mut Pane,
    env: &'a mut Environment,
}

impl std::fmt::Debug for PaneMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaneMut").field("pane", &self.pane).finish_non_exhaustive()
    }
}

impl<'a> PaneMut<'a> {
    pub(crate) fn new(pane: &'a mut Pane, env: &'a mut Environment) -> Self {
        Self { pane, env }
    }

    pub fn pane(&self) -> &Pane {
        self.pane
    }

    pub fn id(&self) -> &str {
        &self.pane.id
    }

    pub fn status(&self) -> PaneStatus {
        self.pane.status
    }

    pub fn config(&self) -> &PaneConfig {
        &self.pane.config
    }

    fn scope(&self, container_id: Option<&str>) -> Selector {
        Selector::scoped(&self.pane.id, container_id)
    }

    fn tracker(&mut self) -> &mut dyn ModificationTracker {
        let pane = &mut *self.pane;
        pane.tracking.tracker(
            self.env.trackers.as_mut(),
            &pane.selector,
            &pane.config.modification_highlighter_options,
        )
    }

    pub fn enable(&mut self) {
        self.set_option_unchecked(PaneOption::Disable(false));
    }

    pub fn disable(&mut self) {
        self.set_option_unchecked(PaneOption::Disable(true));
    }

    /// Set the inputs within a container (the whole pane when `None`) to
    /// read-only, or undo it.
    pub fn read_only(&mut self, container_id: Option<&str>, flag: bool) {
        let target = self.scope(container_id);
        let effective = self.apply_disabler(&target, DisablerFlag::Readonly, flag);
        if target.is_pane() {
            self.pane.config.readonly = effective;
        }
    }

    fn do_disable(&mut self, container_id: Option<&str>, flag: bool) {
        let target = self.scope(container_id);
        let effective = self.apply_disabler(&target, DisablerFlag::Disable, flag);
        if target.is_pane() {
            self.pane.config.disable = effective;
        }
    }

    fn apply_disabler(&mut self, target: &Selector, flag: DisablerFlag, value: bool) -> bool {
        let pane = &mut *self.pane;
        pane.disablers.apply(
            self.env.disablers.as_mut(),
            target,
            &pane.config.disabler_options,
            flag,
            value,
        )
    }

    pub fn modified_columns(&mut self, container_id: Option<&str>) -> Vec<Column> {
        let scope = self.scope(container_id);
        let pane = &mut *self.pane;
        pane.tracking.modified_columns(
            self.env.trackers.as_mut(),
            &scope,
            &pane.config.modification_highlighter_options,
        )
    }

    pub fn columns_with_class(&mut self, container_id: Option<&str>, class: &str) -> Vec<Column> {
        let scope = self.scope(container_id);
        self.tracker().columns_with_class(&scope, class)
    }

    pub fn stored_input_value(&mut self, container_id: Option<&str>, column_id: &str) -> Option<Column> {
        let scope = self.scope(container_id);
        self.tracker().stored_input_value(&scope, column_id)
    }

    pub fn stored_input_columns(&mut self, container_id: Option<&str>) -> Vec<Column> {
        let scope = self.scope(container_id);
        self.tracker().stored_input_columns(&scope)
    }

    pub fn store_original_values(&mut self, container_id: Option<&str>) {
        let scope = self.scope(container_id);
        self.tracker().store_original_values(&scope);
    }

    pub fn reset_modified_columns(&mut self, container_id: Option<&str>) {
        let scope = self.scope(container_id);
        self.tracker().reset(&scope);
    }

    /// Snapshot the refreshed region and announce it.
    fn after_pane_load(&mut self, container_id: Option<&str>) {
        let scope = self.scope(container_id);
        self.tracker().store_original_values(&scope);
        let pane = &mut *self.pane;
        pane.listeners
            .fire_after_load(&pane.id, scope.container_id());
    }

    /// Busy indicator for whole-pane loads. An empty pane shows the progress
    /// indicator; a populated one is greyed out with the disabled class.
    fn show_progress(&mut self, starting: bool) {
        let pane = &self.pane.selector;
        let config = &self.pane.config;
        let ui: &mut dyn UiTree = self.env.ui.as_mut();
        if starting {
            let empty = ui
                .content(pane)
                .is_none_or(|content| content.trim().is_empty());
            ui.set_cursor(Cursor::Progress);
            if empty {
                ui.add_class(pane, &config.pane_progress_indicator_class);
            } else {
                ui.add_class(pane, &config.disabled_class);
            }
        } else {
            ui.set_cursor(Cursor::Auto);
            ui.remove_class(pane, &config.pane_progress_indicator_class);
            ui.remove_class(pane, &config.disabled_class);
        }
    }

    fn apply_header(&mut self) {
        let pane = &self.pane.selector;
        let config = &self.pane.config;
        let ui = self.env.ui.as_mut();
        if !config.enable_pane_header {
            if ui.header(pane).is_some() {
                ui.set_header(pane, None);
            }
            return;
        }
        if ui.header(pane).is_none() {
            let class = config.pane_header_title_bar_class.clone();
            let align_class = format!("{}-{}", class, config.pane_header_align);
            ui.set_header(
                pane,
                Some(Header {
                    class,
                    align_class,
                    title: config.pane_header_title.clone(),
                }),
            );
        }
    }

    fn retitle_header(&mut self) {
        let pane = &self.pane.selector;
        let ui = self.env.ui.as_mut();
        if let Some(mut header) = ui.header(pane) {
            header.title = self.pane.config.pane_header_title.clone();
            ui.set_header(pane, Some(header));
        }
    }

    fn realign_header(&mut self) {
        let pane = &self.pane.selector;
        let config = &self.pane.config;
        let ui = self.env.ui.as_mut();
        if let Some(mut header) = ui.header(pane) {
            header.align_class = format!(
                "{}-{}",
                config.pane_header_title_bar_class, config.pane_header_align
            );
            ui.set_header(pane, Some(header));
        }
    }

    fn apply_group_box(&mut self) {
        let pane = &self.pane.selector;
        let config = &self.pane.config;
        let ui = self.env.ui.as_mut();
        let boxed = ui.has_group_box(pane);
        if config.enable_pane_group_box && !boxed {
            ui.wrap_group_box(
                pane,
                &GroupBox {
                    content_class: config.pane_group_box_content_class.clone(),
                    wrapper_class: config.pane_group_box_wrapper_class.clone(),
                },
            );
        } else if !config.enable_pane_group_box && boxed {
            ui.unwrap_group_box(pane);
        }
    }

    fn apply_highlighting(&mut self) {
        let pane = &mut *self.pane;
        let factory = self.env.trackers.as_mut();
        let options = &mut pane.config.modification_highlighter_options;
        if pane.config.highlight_modifications {
            pane.tracking
                .enable_highlighting(factory, self.env.ui.as_ref(), &pane.selector, options);
        } else {
            pane.tracking
                .disable_highlighting(factory, self.env.ui.as_mut(), &pane.selector, options);
        }
    }

    /// Re-apply every configuration-derived visual option.
    fn reassert_visual_options(&mut self) {
        self.apply_header();
        self.retitle_header();
        self.realign_header();
        self.apply_group_box();
        let disable = self.pane.config.disable;
        self.do_disable(None, disable);
        if self.pane.config.readonly {
            self.read_only(None, true);
        }
        self.apply_highlighting();
    }

    /// Called once right after registration.
    pub(crate) fn initialize(&mut self) {
        let pane = self.pane.selector.clone();
        self.env.ui.add_class(&pane, PANE_MARKER_CLASS);
        if self.pane.config.pane_refresh_on_first_access {
            self.begin_load(true);
        } else {
            self.reassert_visual_options();
            self.store_original_values(None);
        }
    }

    /// Deliver a transport completion. Returns `false` if the token does not
    /// belong to this pane.
    pub fn complete(&mut self, token: RequestToken, outcome: Outcome) -> bool {
        let Some(pending) = self.pane.pending.remove(&token) else {
            return false;
        };
        match (pending, outcome) {
            (Pending::Load, Ok(response)) => self.load_succeeded(&response),
            (Pending::Load, Err(err)) => self.load_failed(&err),
            (Pending::Call(call), Ok(response)) => self.call_succeeded(call, &response),
            (Pending::Call(call), Err(err)) => self.call_failed(call, &err),
        }
        true
    }
}
