use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::collaborators::{Column, ModificationTracker, TrackerFactory};
use crate::config::HighlighterOptions;
use crate::selector::Selector;

#[derive(Debug, Clone)]
struct Field {
    pane: String,
    container: Option<String>,
    id: String,
    label: Option<String>,
    original: String,
    current: String,
    classes: BTreeSet<String>,
    highlighted: bool,
}

impl Field {
    fn in_scope(&self, scope: &Selector) -> bool {
        self.pane == scope.pane_id()
            && scope
                .container_id()
                .is_none_or(|c| self.container.as_deref() == Some(c))
    }

    fn column(&self) -> Column {
        Column {
            id: self.id.clone(),
            label: self.label.clone(),
            original: self.original.clone(),
            current: self.current.clone(),
        }
    }
}

/// Input fields of every pane, shared between the host and the trackers.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    fields: Rc<RefCell<Vec<Field>>>,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field whose original and current value are both `value`.
    pub fn insert_field(&self, pane: &str, container: Option<&str>, id: &str, value: &str) {
        self.fields.borrow_mut().push(Field {
            pane: pane.to_string(),
            container: container.map(str::to_string),
            id: id.to_string(),
            label: None,
            original: value.to_string(),
            current: value.to_string(),
            classes: BTreeSet::new(),
            highlighted: false,
        });
    }

    pub fn set_label(&self, pane: &str, id: &str, label: &str) {
        self.with_field(pane, id, |f| f.label = Some(label.to_string()));
    }

    /// Simulate the user editing a field.
    pub fn set_value(&self, pane: &str, id: &str, value: &str) {
        self.with_field(pane, id, |f| f.current = value.to_string());
    }

    pub fn add_class(&self, pane: &str, id: &str, class: &str) {
        self.with_field(pane, id, |f| {
            f.classes.insert(class.to_string());
        });
    }

    pub fn value(&self, pane: &str, id: &str) -> Option<String> {
        self.fields
            .borrow()
            .iter()
            .find(|f| f.pane == pane && f.id == id)
            .map(|f| f.current.clone())
    }

    /// Ids of the fields currently carrying the highlight.
    pub fn highlighted(&self, pane: &str) -> Vec<String> {
        self.fields
            .borrow()
            .iter()
            .filter(|f| f.pane == pane && f.highlighted)
            .map(|f| f.id.clone())
            .collect()
    }

    /// Field ids of a pane, in insertion order.
    pub fn field_ids(&self, pane: &str) -> Vec<String> {
        self.fields
            .borrow()
            .iter()
            .filter(|f| f.pane == pane)
            .map(|f| f.id.clone())
            .collect()
    }

    fn with_field(&self, pane: &str, id: &str, apply: impl FnOnce(&mut Field)) {
        if let Some(field) = self
            .fields
            .borrow_mut()
            .iter_mut()
            .find(|f| f.pane == pane && f.id == id)
        {
            apply(field);
        }
    }
}

/// Attaches a [`MemoryTracker`] per pane over a shared [`MemoryForm`].
#[derive(Debug, Clone)]
pub struct MemoryTrackers {
    form: MemoryForm,
    attached: Rc<Cell<usize>>,
}

impl MemoryTrackers {
    pub fn new(form: MemoryForm) -> Self {
        Self {
            form,
            attached: Rc::new(Cell::new(0)),
        }
    }

    /// Number of trackers attached so far.
    pub fn attached(&self) -> usize {
        self.attached.get()
    }
}

impl TrackerFactory for MemoryTrackers {
    fn attach(
        &mut self,
        pane: &Selector,
        options: &HighlighterOptions,
    ) -> Box<dyn ModificationTracker> {
        self.attached.set(self.attached.get() + 1);
        Box::new(MemoryTracker {
            form: self.form.clone(),
            pane: Selector::pane(pane.pane_id()),
            options: options.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MemoryTracker {
    form: MemoryForm,
    pane: Selector,
    options: HighlighterOptions,
}

impl MemoryTracker {
    fn is_modified(&self, field: &Field) -> bool {
        let ignore = self.options.input_not_modified_if_has_class.trim();
        field.current != field.original && (ignore.is_empty() || !field.classes.contains(ignore))
    }

    fn collect(&self, scope: &Selector, keep: impl Fn(&Field) -> bool) -> Vec<Column> {
        self.form
            .fields
            .borrow()
            .iter()
            .filter(|f| f.in_scope(scope) && keep(f))
            .map(Field::column)
            .collect()
    }

    fn update(&self, scope: &Selector, mut apply: impl FnMut(&mut Field)) {
        for field in self.form.fields.borrow_mut().iter_mut() {
            if field.in_scope(scope) {
                apply(field);
            }
        }
    }
}

impl ModificationTracker for MemoryTracker {
    fn configure(&mut self, options: &HighlighterOptions) {
        self.options = options.clone();
        if self.options.modified_column_class.trim().is_empty() {
            let pane = self.pane.clone();
            self.update(&pane, |f| f.highlighted = false);
        }
    }

    fn evaluate(&mut self) {
        let highlight = !self.options.modified_column_class.trim().is_empty();
        let mut fields = self.form.fields.borrow_mut();
        for field in fields.iter_mut().filter(|f| f.in_scope(&self.pane)) {
            field.highlighted = highlight && self.is_modified(field);
        }
    }

    fn modified_columns(&self, scope: &Selector) -> Vec<Column> {
        self.collect(scope, |f| self.is_modified(f))
    }

    fn columns_with_class(&self, scope: &Selector, class: &str) -> Vec<Column> {
        self.collect(scope, |f| f.classes.contains(class))
    }

    fn stored_input_value(&self, scope: &Selector, column_id: &str) -> Option<Column> {
        self.collect(scope, |f| f.id == column_id).into_iter().next()
    }

    fn stored_input_columns(&self, scope: &Selector) -> Vec<Column> {
        self.collect(scope, |_| true)
    }

    fn store_original_values(&mut self, scope: &Selector) {
        self.update(scope, |f| {
            f.original = f.current.clone();
            f.highlighted = false;
        });
    }

    fn reset(&mut self, scope: &Selector) {
        self.update(scope, |f| {
            f.current = f.original.clone();
            f.highlighted = false;
        });
    }

    fn set_original_values(&mut self, scope: &Selector, columns: &[Column]) {
        self.update(scope, |f| {
            if let Some(column) = columns.iter().find(|c| c.id == f.id) {
                f.original = column.original.clone();
            }
        });
        self.evaluate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(form: &MemoryForm) -> Box<dyn ModificationTracker> {
        MemoryTrackers::new(form.clone()).attach(&Selector::pane("p1"), &HighlighterOptions::default())
    }

    #[test]
    fn modified_means_current_differs_from_original() {
        let form = MemoryForm::new();
        form.insert_field("p1", None, "name", "Ada");
        form.insert_field("p1", Some("addr"), "city", "Paris");
        let mut t = tracker(&form);
        assert!(t.modified_columns(&Selector::pane("p1")).is_empty());

        form.set_value("p1", "city", "Rome");
        let modified = t.modified_columns(&Selector::pane("p1"));
        assert_eq!(modified.len(), 1);
        assert_eq!(modified[0].original, "Paris");
        assert_eq!(modified[0].current, "Rome");
        assert!(t.modified_columns(&Selector::scoped("p1", Some("other"))).is_empty());

        t.store_original_values(&Selector::scoped("p1", Some("addr")));
        assert!(t.modified_columns(&Selector::pane("p1")).is_empty());
    }

    #[test]
    fn ignore_marker_excludes_fields() {
        let form = MemoryForm::new();
        form.insert_field("p1", None, "name", "Ada");
        form.add_class("p1", "name", "error");
        form.set_value("p1", "name", "");
        let t = tracker(&form);
        assert!(t.modified_columns(&Selector::pane("p1")).is_empty());
        assert_eq!(t.columns_with_class(&Selector::pane("p1"), "error").len(), 1);
    }

    #[test]
    fn reset_and_restore_originals() {
        let form = MemoryForm::new();
        form.insert_field("p1", None, "name", "Ada");
        let mut t = tracker(&form);
        let pane = Selector::pane("p1");
        form.set_value("p1", "name", "Grace");
        let before = t.modified_columns(&pane);

        t.store_original_values(&pane);
        assert!(t.modified_columns(&pane).is_empty());
        t.set_original_values(&pane, &before);
        assert_eq!(t.modified_columns(&pane), before);
        assert_eq!(form.highlighted("p1"), vec!["name".to_string()]);

        t.reset(&pane);
        assert_eq!(form.value("p1", "name").as_deref(), Some("Ada"));
        assert!(t.modified_columns(&pane).is_empty());
    }
}
