//! Modification tracking for a pane.
//!
//! The tracker is attached lazily on first use. Switching highlighting off
//! strips the highlight classes from the tree and parks their names on the
//! pane element so switching it back on can restore them.

use crate::collaborators::{Column, ModificationTracker, TrackerFactory, UiTree};
use crate::config::HighlighterOptions;
use crate::selector::Selector;

pub const HIGHLIGHT_COLUMN_HINT: &str = "data-pane-highlight-column-class-name";
pub const HIGHLIGHT_LABEL_HINT: &str = "data-pane-highlight-label-class-name";

#[derive(Default)]
pub struct TrackingCoordinator {
    tracker: Option<Box<dyn ModificationTracker>>,
}

impl TrackingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.tracker.is_some()
    }

    /// The pane's tracker, attached with `options` if this is the first use.
    pub fn tracker(
        &mut self,
        factory: &mut dyn TrackerFactory,
        pane: &Selector,
        options: &HighlighterOptions,
    ) -> &mut dyn ModificationTracker {
        self.tracker
            .get_or_insert_with(|| {
                tracing::debug!(pane = %pane, "attaching modification tracker");
                factory.attach(pane, options)
            })
            .as_mut()
    }

    /// Restore highlight classes from the pane's hint attributes, if any, and
    /// re-evaluate modification state.
    pub fn enable_highlighting(
        &mut self,
        factory: &mut dyn TrackerFactory,
        ui: &dyn UiTree,
        pane: &Selector,
        options: &mut HighlighterOptions,
    ) {
        if let Some(column_class) = ui.attribute(pane, HIGHLIGHT_COLUMN_HINT) {
            options.modified_column_class = column_class;
            options.modified_label_class =
                ui.attribute(pane, HIGHLIGHT_LABEL_HINT).unwrap_or_default();
        }
        let tracker = self.tracker(factory, pane, options);
        tracker.configure(options);
        tracker.evaluate();
    }

    /// Remove applied highlight classes and remember them on the pane.
    pub fn disable_highlighting(
        &mut self,
        factory: &mut dyn TrackerFactory,
        ui: &mut dyn UiTree,
        pane: &Selector,
        options: &mut HighlighterOptions,
    ) {
        let column_class = std::mem::take(&mut options.modified_column_class);
        if column_class.trim().is_empty() {
            options.modified_column_class = column_class;
        } else {
            ui.strip_class(pane, &column_class);
            ui.set_attribute(pane, HIGHLIGHT_COLUMN_HINT, &column_class);
        }
        let label_class = std::mem::take(&mut options.modified_label_class);
        if label_class.trim().is_empty() {
            options.modified_label_class = label_class;
        } else {
            ui.strip_class(pane, &label_class);
            ui.set_attribute(pane, HIGHLIGHT_LABEL_HINT, &label_class);
        }
        self.tracker(factory, pane, options).configure(options);
    }

    /// Modified columns within `scope`, attaching the tracker if needed.
    pub fn modified_columns(
        &mut self,
        factory: &mut dyn TrackerFactory,
        scope: &Selector,
        options: &HighlighterOptions,
    ) -> Vec<Column> {
        let pane = Selector::pane(scope.pane_id());
        self.tracker(factory, &pane, options).modified_columns(scope)
    }

    pub fn release(&mut self) {
        self.tracker = None;
    }
}

impl std::fmt::Debug for TrackingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingCoordinator")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{MemoryForm, MemoryTrackers, MemoryTree};

    fn setup() -> (MemoryForm, MemoryTrackers, MemoryTree, Selector) {
        let form = MemoryForm::new();
        let trackers = MemoryTrackers::new(form.clone());
        let mut tree = MemoryTree::new();
        tree.insert("p1");
        (form, trackers, tree, Selector::pane("p1"))
    }

    #[test]
    fn attaches_once() {
        let (_form, mut trackers, _tree, pane) = setup();
        let mut coord = TrackingCoordinator::new();
        let options = HighlighterOptions::default();
        assert!(!coord.is_attached());
        coord.tracker(&mut trackers, &pane, &options);
        coord.tracker(&mut trackers, &pane, &options);
        assert!(coord.is_attached());
        assert_eq!(trackers.attached(), 1);
    }

    #[test]
    fn disabling_parks_classes_and_enabling_restores_them() {
        let (form, mut trackers, mut tree, pane) = setup();
        form.insert_field("p1", None, "name", "Ada");
        let mut coord = TrackingCoordinator::new();
        let mut options = HighlighterOptions::default();
        coord
            .tracker(&mut trackers, &pane, &options)
            .store_original_values(&pane);
        form.set_value("p1", "name", "Grace");
        tree.add_class(&pane, "ui-state-highlight");

        coord.disable_highlighting(&mut trackers, &mut tree, &pane, &mut options);
        assert_eq!(options.modified_column_class, "");
        assert_eq!(options.modified_label_class, "");
        assert!(!tree.has_class(&pane, "ui-state-highlight"));
        assert_eq!(
            tree.attribute(&pane, HIGHLIGHT_COLUMN_HINT).as_deref(),
            Some("ui-state-highlight")
        );
        assert!(form.highlighted("p1").is_empty());

        coord.enable_highlighting(&mut trackers, &tree, &pane, &mut options);
        assert_eq!(options.modified_column_class, "ui-state-highlight");
        assert_eq!(options.modified_label_class, "ui-state-highlight");
        assert_eq!(form.highlighted("p1"), vec!["name".to_string()]);
    }

    #[test]
    fn enabling_without_hint_keeps_configured_classes() {
        let (_form, mut trackers, tree, pane) = setup();
        let mut coord = TrackingCoordinator::new();
        let mut options = HighlighterOptions {
            modified_column_class: "dirty".into(),
            ..HighlighterOptions::default()
        };
        coord.enable_highlighting(&mut trackers, &tree, &pane, &mut options);
        assert_eq!(options.modified_column_class, "dirty");
    }
}
