//! Interfaces of the components a pane drives but does not implement.
//!
//! A host supplies one implementation of each trait through an
//! [`Environment`](crate::manager::Environment). Headless implementations
//! live in [`crate::drivers`].

use std::collections::BTreeMap;

use crate::config::{DisablerOptions, HighlighterOptions, Method};
use crate::error::TransportError;
use crate::selector::Selector;

/// Identifies an issued request until its completion is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub cache: bool,
    pub options: BTreeMap<String, String>,
}

impl Request {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            cache: false,
            options: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Opaque document fragment.
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

pub type Outcome = Result<Response, TransportError>;

/// Executes requests. Completions are reported back through
/// [`PaneManager::complete`](crate::manager::PaneManager::complete), either by
/// the host directly or by draining [`Transport::poll`].
pub trait Transport {
    fn issue(&mut self, token: RequestToken, request: Request);

    /// Completions that became ready since the last poll.
    fn poll(&mut self) -> Vec<(RequestToken, Outcome)> {
        Vec::new()
    }
}

/// Choice made in the confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

pub trait ConfirmDialog {
    fn configure(&mut self, title: &str, body: &str);
    fn open(&mut self);
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Auto,
    Progress,
}

/// Title bar placed at the top of a pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub class: String,
    pub align_class: String,
    pub title: String,
}

/// Classes of the two regions wrapped around a pane when it is boxed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBox {
    pub content_class: String,
    pub wrapper_class: String,
}

/// Primitive operations on the displayed element tree.
pub trait UiTree {
    fn add_class(&mut self, target: &Selector, class: &str);
    fn remove_class(&mut self, target: &Selector, class: &str);
    fn has_class(&self, target: &Selector, class: &str) -> bool;
    /// Remove `class` from every element within `scope` that carries it.
    fn strip_class(&mut self, scope: &Selector, class: &str);

    fn attribute(&self, target: &Selector, name: &str) -> Option<String>;
    fn set_attribute(&mut self, target: &Selector, name: &str, value: &str);

    fn content(&self, target: &Selector) -> Option<String>;
    fn replace_content(&mut self, target: &Selector, content: &str);
    /// Current content of an in-tree anchor such as `#template`.
    fn fragment(&self, anchor: &str) -> Option<String>;
    /// Text of the first element matching `probe` within `scope`.
    fn find_text(&self, scope: &Selector, probe: &str) -> Option<String>;

    fn header(&self, pane: &Selector) -> Option<Header>;
    fn set_header(&mut self, pane: &Selector, header: Option<Header>);
    fn has_group_box(&self, pane: &Selector) -> bool;
    fn wrap_group_box(&mut self, pane: &Selector, group_box: &GroupBox);
    fn unwrap_group_box(&mut self, pane: &Selector);

    fn set_cursor(&mut self, cursor: Cursor);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisablerSetting {
    Disable(bool),
    Readonly(bool),
    DisabledClass(String),
    Expression(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisablerFlag {
    Disable,
    Readonly,
}

/// Mechanically disables or read-onlys the controls of one container.
pub trait Disabler {
    fn set(&mut self, setting: DisablerSetting);
    fn get(&self, flag: DisablerFlag) -> bool;
    fn disabled_class(&self) -> &str;
    fn expression(&self) -> &str;
}

pub trait DisablerFactory {
    fn attach(&mut self, target: &Selector, options: &DisablerOptions) -> Box<dyn Disabler>;
}

/// One tracked input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: String,
    pub label: Option<String>,
    pub original: String,
    pub current: String,
}

/// Snapshots and diffs the field values of one pane.
pub trait ModificationTracker {
    fn configure(&mut self, options: &HighlighterOptions);
    fn evaluate(&mut self);
    fn modified_columns(&self, scope: &Selector) -> Vec<Column>;
    fn columns_with_class(&self, scope: &Selector, class: &str) -> Vec<Column>;
    fn stored_input_value(&self, scope: &Selector, column_id: &str) -> Option<Column>;
    fn stored_input_columns(&self, scope: &Selector) -> Vec<Column>;
    fn store_original_values(&mut self, scope: &Selector);
    fn reset(&mut self, scope: &Selector);
    fn set_original_values(&mut self, scope: &Selector, columns: &[Column]);
}

pub trait TrackerFactory {
    fn attach(
        &mut self,
        pane: &Selector,
        options: &HighlighterOptions,
    ) -> Box<dyn ModificationTracker>;
}
