//! Read-only view of the current page handed to extraction strategies.

use crate::dom::{DomTree, NodeId};

/// Everything a strategy may inspect: the page URL, the raw HTML source
/// (inline script payloads included), and the parsed tree.
pub struct PageContext<'a> {
    pub url: &'a str,
    pub source: &'a str,
    pub dom: &'a DomTree,
}

impl<'a> PageContext<'a> {
    pub fn new(url: &'a str, source: &'a str, dom: &'a DomTree) -> Self {
        Self { url, source, dom }
    }

    /// Text payloads of all inline `<script>` elements, in document order.
    pub fn inline_scripts(&self) -> Vec<String> {
        self.dom
            .find_by_tag(self.dom.root(), "script")
            .into_iter()
            .map(|id| self.dom.text_content(id))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// The `<title>` text, trimmed.
    pub fn title(&self) -> Option<String> {
        self.dom
            .find_by_tag(self.dom.root(), "title")
            .first()
            .map(|&id| self.dom.text_content(id).trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// All `<meta>` tags as (name-or-property, content) pairs.
    pub fn meta_tags(&self) -> Vec<(String, String)> {
        self.dom
            .find_by_tag(self.dom.root(), "meta")
            .into_iter()
            .filter_map(|id| {
                let el = self.dom.element(id)?;
                let key = el.attr("name").or_else(|| el.attr("property"))?;
                let content = el.attr("content")?;
                Some((key.to_string(), content.to_string()))
            })
            .collect()
    }

    /// Content of the first meta tag whose name or property equals `key`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.meta_tags()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Trimmed text of the first element carrying `class`, if non-empty.
    pub fn first_text_by_class(&self, class: &str) -> Option<String> {
        self.dom
            .find_by_class(self.dom.root(), class)
            .first()
            .map(|&id| self.dom.text_content(id).trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// First element carrying `class`.
    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.dom.find_by_class(self.dom.root(), class).first().copied()
    }

    /// Trimmed text of the first `tag` descendant of `scope`, if non-empty.
    pub fn first_text_by_tag_under(&self, scope: NodeId, tag: &str) -> Option<String> {
        self.dom
            .find_by_tag(scope, tag)
            .first()
            .map(|&id| self.dom.text_content(id).trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
