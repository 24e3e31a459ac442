use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::collaborators::{Cursor, GroupBox, Header, UiTree};
use crate::selector::Selector;

#[derive(Debug, Default, Clone)]
struct Element {
    parent: Option<String>,
    content: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    header: Option<Header>,
    group_box: Option<GroupBox>,
}

#[derive(Debug, Default)]
struct TreeState {
    elements: BTreeMap<String, Element>,
    cursor: Cursor,
}

impl TreeState {
    /// Element addressed by `target`, created on first write.
    fn element_mut(&mut self, target: &Selector) -> &mut Element {
        let id = target.target_id().to_string();
        let parent = target.container_id().map(|_| target.pane_id().to_string());
        let element = self.elements.entry(id).or_default();
        if element.parent.is_none() {
            element.parent = parent;
        }
        element
    }

    /// Walks parent links from `id`. A cycle ends the walk after every
    /// element has been visited once.
    fn is_within(&self, id: &str, ancestor: &str) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.elements.len() {
                return false;
            }
            current = self
                .elements
                .get(node)
                .and_then(|e| e.parent.as_deref());
        }
        false
    }

    fn scope_contents<'a>(&'a self, scope: &'a Selector) -> impl Iterator<Item = &'a str> + 'a {
        let root = scope.target_id();
        self.elements
            .iter()
            .filter(move |(id, _)| self.is_within(id, root))
            .map(|(_, e)| e.content.as_str())
    }
}

/// In-memory element tree. Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    state: Rc<RefCell<TreeState>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty element with `id` unless it exists.
    pub fn insert(&self, id: &str) {
        self.state.borrow_mut().elements.entry(id.to_string()).or_default();
    }

    /// Add an element nested inside `parent`. An element is never moved
    /// below one of its own descendants.
    pub fn insert_child(&self, parent: &str, id: &str) {
        let mut state = self.state.borrow_mut();
        if state.is_within(parent, id) {
            tracing::warn!(parent, id, "refusing to nest an element inside itself");
            return;
        }
        let element = state.elements.entry(id.to_string()).or_default();
        element.parent = Some(parent.to_string());
    }

    /// Define the content served for the anchor `#id`.
    pub fn set_fragment(&self, id: &str, content: &str) {
        self.state
            .borrow_mut()
            .elements
            .entry(id.to_string())
            .or_default()
            .content = content.to_string();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().elements.contains_key(id)
    }

    pub fn classes(&self, id: &str) -> Vec<String> {
        self.state
            .borrow()
            .elements
            .get(id)
            .map(|e| e.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> Cursor {
        self.state.borrow().cursor
    }
}

impl UiTree for MemoryTree {
    fn add_class(&mut self, target: &Selector, class: &str) {
        if class.trim().is_empty() {
            return;
        }
        self.state
            .borrow_mut()
            .element_mut(target)
            .classes
            .insert(class.to_string());
    }

    fn remove_class(&mut self, target: &Selector, class: &str) {
        if let Some(e) = self.state.borrow_mut().elements.get_mut(target.target_id()) {
            e.classes.remove(class);
        }
    }

    fn has_class(&self, target: &Selector, class: &str) -> bool {
        self.state
            .borrow()
            .elements
            .get(target.target_id())
            .is_some_and(|e| e.classes.contains(class))
    }

    fn strip_class(&mut self, scope: &Selector, class: &str) {
        let mut state = self.state.borrow_mut();
        let root = scope.target_id();
        let ids: Vec<String> = state
            .elements
            .keys()
            .filter(|id| state.is_within(id, root))
            .cloned()
            .collect();
        for id in ids {
            if let Some(e) = state.elements.get_mut(&id) {
                e.classes.remove(class);
            }
        }
    }

    fn attribute(&self, target: &Selector, name: &str) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(target.target_id())
            .and_then(|e| e.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, target: &Selector, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .element_mut(target)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn content(&self, target: &Selector) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(target.target_id())
            .map(|e| e.content.clone())
    }

    fn replace_content(&mut self, target: &Selector, content: &str) {
        self.state.borrow_mut().element_mut(target).content = content.to_string();
    }

    fn fragment(&self, anchor: &str) -> Option<String> {
        let id = anchor.trim().strip_prefix('#')?;
        self.state.borrow().elements.get(id).map(|e| e.content.clone())
    }

    fn find_text(&self, scope: &Selector, probe: &str) -> Option<String> {
        let probe = Probe::parse(probe)?;
        let state = self.state.borrow();
        let found = state
            .scope_contents(scope)
            .find_map(|content| probe.first_match(content));
        found
    }

    fn header(&self, pane: &Selector) -> Option<Header> {
        self.state
            .borrow()
            .elements
            .get(pane.target_id())
            .and_then(|e| e.header.clone())
    }

    fn set_header(&mut self, pane: &Selector, header: Option<Header>) {
        self.state.borrow_mut().element_mut(pane).header = header;
    }

    fn has_group_box(&self, pane: &Selector) -> bool {
        self.state
            .borrow()
            .elements
            .get(pane.target_id())
            .is_some_and(|e| e.group_box.is_some())
    }

    fn wrap_group_box(&mut self, pane: &Selector, group_box: &GroupBox) {
        self.state.borrow_mut().element_mut(pane).group_box = Some(group_box.clone());
    }

    fn unwrap_group_box(&mut self, pane: &Selector) {
        if let Some(e) = self.state.borrow_mut().elements.get_mut(pane.target_id()) {
            e.group_box = None;
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.state.borrow_mut().cursor = cursor;
    }
}

/// `tag.class`, `.class` or `tag` matched against markup in element content.
#[derive(Debug, PartialEq, Eq)]
struct Probe {
    tag: Option<String>,
    class: Option<String>,
}

impl Probe {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (tag, class) = match raw.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (raw, None),
        };
        Some(Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            class: class.filter(|c| !c.is_empty()).map(str::to_string),
        })
    }

    /// Text following the first opening tag in `markup` that matches.
    fn first_match(&self, markup: &str) -> Option<String> {
        let mut rest = markup;
        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let end = after.find('>')?;
            let tag_body = &after[..end];
            let remainder = &after[end + 1..];
            if !tag_body.starts_with('/') && self.matches(tag_body) {
                let text = remainder.split('<').next().unwrap_or_default();
                return Some(text.trim().to_string());
            }
            rest = remainder;
        }
        None
    }

    fn matches(&self, tag_body: &str) -> bool {
        let name = tag_body
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_ascii_lowercase();
        if self.tag.as_ref().is_some_and(|tag| *tag != name) {
            return false;
        }
        match &self.class {
            Some(class) => class_attribute(tag_body)
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            None => true,
        }
    }
}

fn class_attribute(tag_body: &str) -> Option<&str> {
    let start = tag_body.find("class=")? + "class=".len();
    let value = &tag_body[start..];
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    value.find(quote).map(|end| &value[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_finds_text_of_matching_element() {
        let mut tree = MemoryTree::new();
        let form = Selector::scoped("p1", Some("form"));
        tree.replace_content(
            &form,
            r#"<p>ok</p><div class="field error">Name is required</div>"#,
        );
        assert_eq!(
            tree.find_text(&form, "div.error").as_deref(),
            Some("Name is required")
        );
        assert_eq!(
            tree.find_text(&form, ".field").as_deref(),
            Some("Name is required")
        );
        assert_eq!(tree.find_text(&form, "span.error"), None);
        assert_eq!(tree.find_text(&form, "p").as_deref(), Some("ok"));
    }

    #[test]
    fn probe_searches_descendants_of_the_scope() {
        let mut tree = MemoryTree::new();
        tree.insert("p1");
        tree.replace_content(
            &Selector::scoped("p1", Some("form")),
            "<span class='error'>bad</span>",
        );
        assert_eq!(
            tree.find_text(&Selector::pane("p1"), "span.error").as_deref(),
            Some("bad")
        );
        assert_eq!(tree.find_text(&Selector::pane("p2"), "span.error"), None);
    }

    #[test]
    fn strip_class_reaches_nested_elements() {
        let mut tree = MemoryTree::new();
        tree.insert("p1");
        tree.insert_child("p1", "field");
        tree.insert("other");
        for id in ["p1", "field", "other"] {
            tree.add_class(&Selector::pane(id), "hl");
        }
        tree.strip_class(&Selector::pane("p1"), "hl");
        assert!(tree.classes("p1").is_empty());
        assert!(tree.classes("field").is_empty());
        assert_eq!(tree.classes("other"), vec!["hl".to_string()]);
    }

    #[test]
    fn fragments_resolve_by_anchor() {
        let tree = MemoryTree::new();
        tree.set_fragment("tmpl", "<b>local</b>");
        assert_eq!(tree.fragment("#tmpl").as_deref(), Some("<b>local</b>"));
        assert_eq!(tree.fragment("tmpl"), None);
        assert_eq!(tree.fragment("#missing"), None);
    }

    #[test]
    fn nesting_an_ancestor_inside_its_descendant_is_refused() {
        let mut tree = MemoryTree::new();
        tree.insert("p1");
        tree.insert_child("p1", "a");
        tree.insert_child("a", "p1");
        tree.add_class(&Selector::pane("p1"), "hl");
        tree.strip_class(&Selector::pane("a"), "hl");
        assert_eq!(tree.classes("p1"), vec!["hl".to_string()]);
    }

    #[test]
    fn parent_cycles_do_not_hang_scope_walks() {
        let mut tree = MemoryTree::new();
        tree.insert_child("x", "p1");
        tree.add_class(&Selector::scoped("p1", Some("x")), "hl");
        tree.add_class(&Selector::pane("q"), "hl");
        tree.strip_class(&Selector::pane("q"), "hl");
        assert!(tree.classes("q").is_empty());
        assert_eq!(tree.classes("x"), vec!["hl".to_string()]);
    }
}
