//! Pane configuration.
//!
//! [`PaneConfig`] mirrors the option names a pane understands
//! (`paneActionUrl`, `refreshParameterName`, ...) so any subset of options
//! can be supplied as a JSON object; omitted options keep their defaults.
//!
//! ```json
//! {
//!   "paneActionUrl": "/api/p1",
//!   "enablePaneHeader": "true",
//!   "paneHeaderTitle": "Customer"
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use indoc::indoc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PaneError;

pub const DEFAULT_REFRESH_PARAMETER: &str = "refresh";
pub const DEFAULT_DIALOG_TITLE: &str = "Reload Pane";
pub const DEFAULT_ALWAYS_PROMPT_MESSAGE: &str =
    "You have chosen to refresh the data on this pane.\n\nContinue?";
pub const DEFAULT_MODIFIED_PROMPT_MESSAGE: &str = indoc! {"
    You have chosen to refresh the data on this pane. There are unsaved changes \
    which will be lost if you continue.

    Continue?"};
pub const DEFAULT_FRIENDLY_EXCEPTION_MESSAGE: &str = indoc! {"
    This page is having trouble communicating to the web server while processing \
    your request. You may retry the transaction, however, if it keeps having problems \
    please call the help desk and relay to them as much information as you have which \
    led up to the error occurring.

    We apologize for any inconvenience."};

/// Horizontal placement of the header title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HeaderAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            HeaderAlign::Left => "left",
            HeaderAlign::Center => "center",
            HeaderAlign::Right => "right",
        }
    }
}

impl fmt::Display for HeaderAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Serialisable part of the transport overrides applied to load requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOverrides {
    pub method: Option<Method>,
    /// Opaque settings forwarded to the transport untouched.
    pub options: BTreeMap<String, String>,
}

/// Settings handed to each container's disabler when it is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisablerOptions {
    #[serde(deserialize_with = "lenient_bool")]
    pub disable: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub readonly: bool,
    /// Predicate selecting the controls a disabler acts on.
    pub expression: String,
    pub disabled_class: String,
}

impl Default for DisablerOptions {
    fn default() -> Self {
        Self {
            disable: false,
            readonly: false,
            expression: "*:not(.disabler-ignore-readonly):not(label)".to_string(),
            disabled_class: "ui-state-disabled".to_string(),
        }
    }
}

/// Settings handed to the pane's modification tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlighterOptions {
    pub addl_selectable_input_types: String,
    /// Fields carrying this class are never reported as modified.
    pub input_not_modified_if_has_class: String,
    pub modified_column_class: String,
    pub modified_label_class: String,
}

impl Default for HighlighterOptions {
    fn default() -> Self {
        Self {
            addl_selectable_input_types: String::new(),
            input_not_modified_if_has_class: "error".to_string(),
            modified_column_class: "ui-state-highlight".to_string(),
            modified_label_class: "ui-state-highlight".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaneConfig {
    /// Load source: a remote locator, or `#anchor` for a local fragment.
    pub pane_action_url: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub pane_refresh_on_first_access: bool,
    pub pane_load_always_prompt_message: String,
    pub pane_load_prompt_when_modified_message: String,
    pub pane_load_dialog_title: String,
    pub pane_ajax_load_settings: RequestOverrides,
    pub friendly_exception_message: String,
    pub refresh_parameter_name: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub enable_pane_header: bool,
    pub pane_header_title: String,
    pub pane_header_align: HeaderAlign,
    #[serde(deserialize_with = "lenient_bool")]
    pub enable_pane_group_box: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub disable: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub readonly: bool,
    pub disabler_options: DisablerOptions,
    pub modification_highlighter_options: HighlighterOptions,
    #[serde(deserialize_with = "lenient_bool")]
    pub highlight_modifications: bool,
    pub disabled_class: String,
    pub pane_progress_indicator_class: String,
    pub pane_header_title_bar_class: String,
    pub pane_group_box_content_class: String,
    pub pane_group_box_wrapper_class: String,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            pane_action_url: String::new(),
            pane_refresh_on_first_access: true,
            pane_load_always_prompt_message: DEFAULT_ALWAYS_PROMPT_MESSAGE.to_string(),
            pane_load_prompt_when_modified_message: DEFAULT_MODIFIED_PROMPT_MESSAGE.to_string(),
            pane_load_dialog_title: DEFAULT_DIALOG_TITLE.to_string(),
            pane_ajax_load_settings: RequestOverrides::default(),
            friendly_exception_message: DEFAULT_FRIENDLY_EXCEPTION_MESSAGE.to_string(),
            refresh_parameter_name: DEFAULT_REFRESH_PARAMETER.to_string(),
            enable_pane_header: false,
            pane_header_title: String::new(),
            pane_header_align: HeaderAlign::Center,
            enable_pane_group_box: false,
            disable: false,
            readonly: false,
            disabler_options: DisablerOptions::default(),
            modification_highlighter_options: HighlighterOptions::default(),
            highlight_modifications: true,
            disabled_class: "ui-state-disabled".to_string(),
            pane_progress_indicator_class: "pane-progress-indicator".to_string(),
            pane_header_title_bar_class: "pane-header-title-bar".to_string(),
            pane_group_box_content_class: "pane-group-box-content".to_string(),
            pane_group_box_wrapper_class: "pane-group-box-wrapper".to_string(),
        }
    }
}

impl PaneConfig {
    pub fn with_action_url(url: impl Into<String>) -> Self {
        Self {
            pane_action_url: url.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, PaneError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PaneError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub(crate) fn validate(&self) -> Result<(), PaneError> {
        if self.refresh_parameter_name.trim().is_empty() {
            return Err(PaneError::BlankRefreshParameter);
        }
        Ok(())
    }
}

/// Accept `true`/`false` or any string; strings are true only when they
/// read `"true"` ignoring case.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Bool(bool),
        Text(String),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Bool(b) => b,
        Lenient::Text(s) => s.trim().eq_ignore_ascii_case("true"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PaneConfig::default();
        assert!(cfg.pane_refresh_on_first_access);
        assert!(cfg.highlight_modifications);
        assert_eq!(cfg.refresh_parameter_name, "refresh");
        assert_eq!(cfg.pane_load_dialog_title, "Reload Pane");
        assert_eq!(cfg.pane_header_align, HeaderAlign::Center);
        assert_eq!(
            cfg.disabler_options.expression,
            "*:not(.disabler-ignore-readonly):not(label)"
        );
        assert!(cfg.friendly_exception_message.starts_with("This page is having trouble"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PaneConfig::from_json_str(
            r#"{"paneActionUrl": "/api/p1", "paneHeaderAlign": "right"}"#,
        )
        .unwrap();
        assert_eq!(cfg.pane_action_url, "/api/p1");
        assert_eq!(cfg.pane_header_align, HeaderAlign::Right);
        assert_eq!(cfg.pane_progress_indicator_class, "pane-progress-indicator");
    }

    #[test]
    fn booleans_accept_strings() {
        let cfg = PaneConfig::from_json_str(
            r#"{"enablePaneHeader": "TRUE", "highlightModifications": "no", "readonly": true}"#,
        )
        .unwrap();
        assert!(cfg.enable_pane_header);
        assert!(!cfg.highlight_modifications);
        assert!(cfg.readonly);
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = PaneConfig::from_json_str("{").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn blank_refresh_parameter_fails_validation() {
        let cfg = PaneConfig {
            refresh_parameter_name: " ".into(),
            ..PaneConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PaneError::BlankRefreshParameter)
        ));
    }
}
