//! Runtime option changes.
//!
//! Every settable option is a [`PaneOption`] variant. Setting one stores the
//! value into the pane's [`PaneConfig`] and then runs the side effect listed
//! for its key in [`SIDE_EFFECTS`]; keys without an entry re-apply the
//! disable state.

use crate::config::{DisablerOptions, HeaderAlign, HighlighterOptions, PaneConfig, RequestOverrides};
use crate::error::PaneError;

use super::PaneMut;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneOption {
    ActionUrl(String),
    RefreshOnFirstAccess(bool),
    LoadAlwaysPromptMessage(String),
    LoadPromptWhenModifiedMessage(String),
    LoadDialogTitle(String),
    LoadSettings(RequestOverrides),
    FriendlyExceptionMessage(String),
    RefreshParameterName(String),
    EnablePaneHeader(bool),
    PaneHeaderTitle(String),
    PaneHeaderAlign(HeaderAlign),
    EnablePaneGroupBox(bool),
    Disable(bool),
    Readonly(bool),
    DisablerOptions(DisablerOptions),
    HighlighterOptions(HighlighterOptions),
    HighlightModifications(bool),
    DisabledClass(String),
    ProgressIndicatorClass(String),
    HeaderTitleBarClass(String),
    GroupBoxContentClass(String),
    GroupBoxWrapperClass(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    ActionUrl,
    RefreshOnFirstAccess,
    LoadAlwaysPromptMessage,
    LoadPromptWhenModifiedMessage,
    LoadDialogTitle,
    LoadSettings,
    FriendlyExceptionMessage,
    RefreshParameterName,
    EnablePaneHeader,
    PaneHeaderTitle,
    PaneHeaderAlign,
    EnablePaneGroupBox,
    Disable,
    Readonly,
    DisablerOptions,
    HighlighterOptions,
    HighlightModifications,
    DisabledClass,
    ProgressIndicatorClass,
    HeaderTitleBarClass,
    GroupBoxContentClass,
    GroupBoxWrapperClass,
}

impl OptionKey {
    /// Option name as it appears in configuration JSON.
    pub fn name(self) -> &'static str {
        match self {
            OptionKey::ActionUrl => "paneActionUrl",
            OptionKey::RefreshOnFirstAccess => "paneRefreshOnFirstAccess",
            OptionKey::LoadAlwaysPromptMessage => "paneLoadAlwaysPromptMessage",
            OptionKey::LoadPromptWhenModifiedMessage => "paneLoadPromptWhenModifiedMessage",
            OptionKey::LoadDialogTitle => "paneLoadDialogTitle",
            OptionKey::LoadSettings => "paneAjaxLoadSettings",
            OptionKey::FriendlyExceptionMessage => "friendlyExceptionMessage",
            OptionKey::RefreshParameterName => "refreshParameterName",
            OptionKey::EnablePaneHeader => "enablePaneHeader",
            OptionKey::PaneHeaderTitle => "paneHeaderTitle",
            OptionKey::PaneHeaderAlign => "paneHeaderAlign",
            OptionKey::EnablePaneGroupBox => "enablePaneGroupBox",
            OptionKey::Disable => "disable",
            OptionKey::Readonly => "readonly",
            OptionKey::DisablerOptions => "disablerOptions",
            OptionKey::HighlighterOptions => "modificationHighlighterOptions",
            OptionKey::HighlightModifications => "highlightModifications",
            OptionKey::DisabledClass => "disabledClass",
            OptionKey::ProgressIndicatorClass => "paneProgressIndicatorClass",
            OptionKey::HeaderTitleBarClass => "paneHeaderTitleBarClass",
            OptionKey::GroupBoxContentClass => "paneGroupBoxContentClass",
            OptionKey::GroupBoxWrapperClass => "paneGroupBoxWrapperClass",
        }
    }
}

impl PaneOption {
    pub fn key(&self) -> OptionKey {
        match self {
            PaneOption::ActionUrl(_) => OptionKey::ActionUrl,
            PaneOption::RefreshOnFirstAccess(_) => OptionKey::RefreshOnFirstAccess,
            PaneOption::LoadAlwaysPromptMessage(_) => OptionKey::LoadAlwaysPromptMessage,
            PaneOption::LoadPromptWhenModifiedMessage(_) => OptionKey::LoadPromptWhenModifiedMessage,
            PaneOption::LoadDialogTitle(_) => OptionKey::LoadDialogTitle,
            PaneOption::LoadSettings(_) => OptionKey::LoadSettings,
            PaneOption::FriendlyExceptionMessage(_) => OptionKey::FriendlyExceptionMessage,
            PaneOption::RefreshParameterName(_) => OptionKey::RefreshParameterName,
            PaneOption::EnablePaneHeader(_) => OptionKey::EnablePaneHeader,
            PaneOption::PaneHeaderTitle(_) => OptionKey::PaneHeaderTitle,
            PaneOption::PaneHeaderAlign(_) => OptionKey::PaneHeaderAlign,
            PaneOption::EnablePaneGroupBox(_) => OptionKey::EnablePaneGroupBox,
            PaneOption::Disable(_) => OptionKey::Disable,
            PaneOption::Readonly(_) => OptionKey::Readonly,
            PaneOption::DisablerOptions(_) => OptionKey::DisablerOptions,
            PaneOption::HighlighterOptions(_) => OptionKey::HighlighterOptions,
            PaneOption::HighlightModifications(_) => OptionKey::HighlightModifications,
            PaneOption::DisabledClass(_) => OptionKey::DisabledClass,
            PaneOption::ProgressIndicatorClass(_) => OptionKey::ProgressIndicatorClass,
            PaneOption::HeaderTitleBarClass(_) => OptionKey::HeaderTitleBarClass,
            PaneOption::GroupBoxContentClass(_) => OptionKey::GroupBoxContentClass,
            PaneOption::GroupBoxWrapperClass(_) => OptionKey::GroupBoxWrapperClass,
        }
    }

    fn validate(&self) -> Result<(), PaneError> {
        match self {
            PaneOption::RefreshParameterName(name) if name.trim().is_empty() => {
                Err(PaneError::BlankRefreshParameter)
            }
            _ => Ok(()),
        }
    }

    fn store(self, config: &mut PaneConfig) {
        match self {
            PaneOption::ActionUrl(v) => config.pane_action_url = v,
            PaneOption::RefreshOnFirstAccess(v) => config.pane_refresh_on_first_access = v,
            PaneOption::LoadAlwaysPromptMessage(v) => config.pane_load_always_prompt_message = v,
            PaneOption::LoadPromptWhenModifiedMessage(v) => {
                config.pane_load_prompt_when_modified_message = v
            }
            PaneOption::LoadDialogTitle(v) => config.pane_load_dialog_title = v,
            PaneOption::LoadSettings(v) => config.pane_ajax_load_settings = v,
            PaneOption::FriendlyExceptionMessage(v) => config.friendly_exception_message = v,
            PaneOption::RefreshParameterName(v) => config.refresh_parameter_name = v,
            PaneOption::EnablePaneHeader(v) => config.enable_pane_header = v,
            PaneOption::PaneHeaderTitle(v) => config.pane_header_title = v,
            PaneOption::PaneHeaderAlign(v) => config.pane_header_align = v,
            PaneOption::EnablePaneGroupBox(v) => config.enable_pane_group_box = v,
            PaneOption::Disable(v) => config.disable = v,
            PaneOption::Readonly(v) => config.readonly = v,
            PaneOption::DisablerOptions(v) => config.disabler_options = v,
            PaneOption::HighlighterOptions(v) => config.modification_highlighter_options = v,
            PaneOption::HighlightModifications(v) => config.highlight_modifications = v,
            PaneOption::DisabledClass(v) => config.disabled_class = v,
            PaneOption::ProgressIndicatorClass(v) => config.pane_progress_indicator_class = v,
            PaneOption::HeaderTitleBarClass(v) => config.pane_header_title_bar_class = v,
            PaneOption::GroupBoxContentClass(v) => config.pane_group_box_content_class = v,
            PaneOption::GroupBoxWrapperClass(v) => config.pane_group_box_wrapper_class = v,
        }
    }
}

pub type SideEffect = fn(&mut PaneMut<'_>);

pub static SIDE_EFFECTS: &[(OptionKey, SideEffect)] = &[
    (OptionKey::EnablePaneHeader, apply_header),
    (OptionKey::PaneHeaderTitle, retitle_header),
    (OptionKey::PaneHeaderAlign, realign_header),
    (OptionKey::EnablePaneGroupBox, apply_group_box),
    (OptionKey::Disable, apply_disable),
    (OptionKey::Readonly, apply_readonly),
    (OptionKey::HighlightModifications, apply_highlighting),
];

fn side_effect(key: OptionKey) -> SideEffect {
    SIDE_EFFECTS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(apply_disable as SideEffect, |(_, effect)| *effect)
}

fn apply_header(pane: &mut PaneMut<'_>) {
    pane.apply_header();
}

fn retitle_header(pane: &mut PaneMut<'_>) {
    pane.retitle_header();
}

fn realign_header(pane: &mut PaneMut<'_>) {
    pane.realign_header();
}

fn apply_group_box(pane: &mut PaneMut<'_>) {
    pane.apply_group_box();
}

fn apply_disable(pane: &mut PaneMut<'_>) {
    let flag = pane.pane.config.disable;
    pane.do_disable(None, flag);
}

fn apply_readonly(pane: &mut PaneMut<'_>) {
    let flag = pane.pane.config.readonly;
    pane.read_only(None, flag);
}

fn apply_highlighting(pane: &mut PaneMut<'_>) {
    pane.apply_highlighting();
}

impl PaneMut<'_> {
    /// Change one option and run its side effect.
    pub fn set_option(&mut self, option: PaneOption) -> Result<(), PaneError> {
        option.validate()?;
        if let (PaneOption::EnablePaneGroupBox(flag), Some(held)) =
            (&option, self.pane.held_group_box.as_mut())
        {
            *held = *flag;
        }
        self.set_option_unchecked(option);
        Ok(())
    }

    pub(crate) fn set_option_unchecked(&mut self, option: PaneOption) {
        let key = option.key();
        tracing::debug!(pane_id = %self.pane.id, option = key.name(), "setting option");
        option.store(&mut self.pane.config);
        side_effect(key)(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::UiTree;
    use crate::drivers::headless;
    use crate::pane::PaneBuilder;
    use crate::selector::Selector;

    fn idle_config() -> PaneConfig {
        PaneConfig {
            pane_refresh_on_first_access: false,
            ..PaneConfig::default()
        }
    }

    #[test]
    fn every_key_has_a_json_name_matching_the_config() {
        let json = serde_json::to_value(PaneConfig::default()).unwrap();
        let keys = [
            OptionKey::ActionUrl,
            OptionKey::RefreshOnFirstAccess,
            OptionKey::LoadSettings,
            OptionKey::HighlighterOptions,
            OptionKey::GroupBoxWrapperClass,
        ];
        for key in keys {
            assert!(json.get(key.name()).is_some(), "{}", key.name());
        }
    }

    #[test]
    fn side_effect_table_lists_each_key_once() {
        for (i, (key, _)) in SIDE_EFFECTS.iter().enumerate() {
            assert!(
                SIDE_EFFECTS[i + 1..].iter().all(|(k, _)| k != key),
                "{} listed twice",
                key.name()
            );
        }
        assert!(SIDE_EFFECTS.iter().all(|(k, _)| *k != OptionKey::DisablerOptions));
    }

    #[test]
    fn blank_refresh_parameter_is_rejected() {
        let mut h = headless();
        let mut pane = h.manager.create(PaneBuilder::new("p1").config(idle_config())).unwrap();
        let err = pane
            .set_option(PaneOption::RefreshParameterName("  ".into()))
            .unwrap_err();
        assert!(matches!(err, PaneError::BlankRefreshParameter));
        assert_eq!(pane.config().refresh_parameter_name, "refresh");
    }

    #[test]
    fn header_follows_its_options() {
        let mut h = headless();
        let mut pane = h.manager.create(PaneBuilder::new("p1").config(idle_config())).unwrap();
        let sel = Selector::pane("p1");

        pane.set_option(PaneOption::EnablePaneHeader(true)).unwrap();
        let header = h.tree.header(&sel).unwrap();
        assert_eq!(header.align_class, "pane-header-title-bar-center");

        let mut pane = h.manager.pane_mut("p1").unwrap();
        pane.set_option(PaneOption::PaneHeaderTitle("Orders".into())).unwrap();
        pane.set_option(PaneOption::PaneHeaderAlign(HeaderAlign::Right)).unwrap();
        let header = h.tree.header(&sel).unwrap();
        assert_eq!(header.title, "Orders");
        assert_eq!(header.align_class, "pane-header-title-bar-right");

        let mut pane = h.manager.pane_mut("p1").unwrap();
        pane.set_option(PaneOption::EnablePaneHeader(false)).unwrap();
        assert!(h.tree.header(&sel).is_none());
    }

    #[test]
    fn group_box_wraps_and_unwraps() {
        let mut h = headless();
        let mut pane = h.manager.create(PaneBuilder::new("p1").config(idle_config())).unwrap();
        pane.set_option(PaneOption::EnablePaneGroupBox(true)).unwrap();
        pane.set_option(PaneOption::EnablePaneGroupBox(true)).unwrap();
        assert!(h.tree.has_group_box(&Selector::pane("p1")));
        let mut pane = h.manager.pane_mut("p1").unwrap();
        pane.set_option(PaneOption::EnablePaneGroupBox(false)).unwrap();
        assert!(!h.tree.has_group_box(&Selector::pane("p1")));
    }

    #[test]
    fn disabled_class_change_reaches_the_existing_disabler() {
        let mut h = headless();
        let mut pane = h.manager.create(PaneBuilder::new("p1").config(idle_config())).unwrap();
        let mut options = pane.config().disabler_options.clone();
        options.disabled_class = "greyed".into();
        pane.set_option(PaneOption::DisablerOptions(options)).unwrap();
        assert_eq!(pane.pane().disabler(None).unwrap().disabled_class(), "greyed");
        assert_eq!(pane.pane().disabler_count(), 1);
    }
}
