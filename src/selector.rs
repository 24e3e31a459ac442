//! Scoped lookup expressions for panes and the containers nested inside them.

use std::fmt;

/// Characters that carry meaning inside a lookup expression and must be
/// prefixed with a backslash when they appear in an identifier.
const SPECIAL_CHARS: &[char] = &[
    '\\', '+', '/', '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', ',', '.', ':', ';', '<',
    '=', '>', '?', '@', '[', ']', '^', '`', '{', '}', '|', '~', ' ',
];

/// Escape `raw` so it can be embedded in a lookup expression as an id.
pub fn escape_identifier(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Addresses either a whole pane or one container inside it.
///
/// The rendered form is `#<pane>` or `#<pane> #<container>` with both ids
/// escaped. A container id equal to the pane id, or a blank one, addresses
/// the pane itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector {
    pane: String,
    container: Option<String>,
}

impl Selector {
    pub fn pane(pane_id: impl Into<String>) -> Self {
        Self {
            pane: pane_id.into(),
            container: None,
        }
    }

    pub fn scoped(pane_id: &str, container_id: Option<&str>) -> Self {
        let container = container_id
            .filter(|id| !id.trim().is_empty() && *id != pane_id)
            .map(str::to_string);
        Self {
            pane: pane_id.to_string(),
            container,
        }
    }

    pub fn pane_id(&self) -> &str {
        &self.pane
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Id of the element this selector resolves to.
    pub fn target_id(&self) -> &str {
        self.container.as_deref().unwrap_or(&self.pane)
    }

    pub fn is_pane(&self) -> bool {
        self.container.is_none()
    }

    /// Expression for `probe` searched within this scope.
    pub fn descendant(&self, probe: &str) -> String {
        format!("{} {}", self, probe.trim())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", escape_identifier(&self.pane))?;
        if let Some(container) = &self.container {
            write!(f, " #{}", escape_identifier(container))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_expression_metacharacters() {
        assert_eq!(escape_identifier("plain-id_1"), "plain-id_1");
        assert_eq!(escape_identifier("a.b:c"), "a\\.b\\:c");
        assert_eq!(escape_identifier("x[0]"), "x\\[0\\]");
        assert_eq!(escape_identifier("it's"), "it\\'s");
        assert_eq!(escape_identifier("a\\b"), "a\\\\b");
        assert_eq!(escape_identifier("a b"), "a\\ b");
    }

    #[test]
    fn container_equal_to_pane_is_unscoped() {
        let sel = Selector::scoped("p1", Some("p1"));
        assert!(sel.is_pane());
        assert_eq!(sel.to_string(), "#p1");
        assert_eq!(sel.target_id(), "p1");
    }

    #[test]
    fn blank_container_is_unscoped() {
        assert!(Selector::scoped("p1", Some("  ")).is_pane());
        assert!(Selector::scoped("p1", None).is_pane());
    }

    #[test]
    fn scoped_selector_renders_both_ids() {
        let sel = Selector::scoped("p.1", Some("form:a"));
        assert_eq!(sel.to_string(), "#p\\.1 #form\\:a");
        assert_eq!(sel.target_id(), "form:a");
        assert_eq!(sel.descendant(" div.error "), "#p\\.1 #form\\:a div.error");
    }
}
