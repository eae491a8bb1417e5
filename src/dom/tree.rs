//! Arena document tree with a journaled mutation log.

/// Index of a node in the arena. Ids stay valid for the life of the tree;
/// detached nodes keep their id but drop out of traversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// Tag name and attributes of an element node.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set or overwrite an attribute.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_ascii_lowercase(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Who caused a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    /// The host page (or any caller outside the masking engine).
    External,
    /// The masking engine rewriting or reverting its own spans.
    Masking,
}

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildListChanged,
    TextChanged,
    AttributeChanged,
}

/// One journaled mutation. Stands in for a mutation-observer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomMutation {
    pub origin: MutationOrigin,
    pub kind: MutationKind,
    pub target: NodeId,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
    attached: bool,
}

/// The arena tree. The root is a synthetic `#document` element; real content
/// hangs below it.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    root: NodeId,
    journal: Vec<DomMutation>,
    origin: MutationOrigin,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(ElementData::new("#document")),
            attached: true,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            journal: Vec::new(),
            origin: MutationOrigin::External,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            attached: false,
        });
        id
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.push_node(NodeData::Element(data))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Text payload of a text node. `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(t) => Some(t.as_str()),
            NodeData::Element(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).attached
    }

    /// Append a (detached) child under `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        let attached = self.node(parent).attached;
        self.set_attachment(child, attached);
        self.record(MutationKind::ChildListChanged, parent);
    }

    /// Overwrite the payload of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeData::Text(t) = &mut self.node_mut(id).data {
            *t = text.into();
            self.record(MutationKind::TextChanged, id);
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element(el) = &mut self.node_mut(id).data {
            el.set_attr(name, value);
            self.record(MutationKind::AttributeChanged, id);
        }
    }

    /// Detach a node (and its subtree) from its parent.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|&c| c != id);
        self.node_mut(id).parent = None;
        self.set_attachment(id, false);
        self.record(MutationKind::ChildListChanged, parent);
    }

    /// Replace `target` with a sequence of nodes at the same position.
    ///
    /// Returns false when the target is detached or has no parent; the stale
    /// reference is simply skipped.
    pub fn replace_with_nodes(&mut self, target: NodeId, replacements: Vec<NodeId>) -> bool {
        let Some(parent) = self.node(target).parent else {
            return false;
        };
        if !self.node(target).attached {
            return false;
        }
        let Some(pos) = self.node(parent).children.iter().position(|&c| c == target) else {
            return false;
        };

        self.node_mut(parent)
            .children
            .splice(pos..=pos, replacements.iter().copied());
        let attached = self.node(parent).attached;
        for &r in &replacements {
            self.node_mut(r).parent = Some(parent);
            self.set_attachment(r, attached);
        }
        self.node_mut(target).parent = None;
        self.set_attachment(target, false);
        self.record(MutationKind::ChildListChanged, parent);
        true
    }

    /// Replace `target` with a single plain text node.
    pub fn replace_with_text(&mut self, target: NodeId, text: impl Into<String>) -> Option<NodeId> {
        let node = self.create_text(text);
        if self.replace_with_nodes(target, vec![node]) {
            Some(node)
        } else {
            None
        }
    }

    fn set_attachment(&mut self, id: NodeId, attached: bool) {
        self.node_mut(id).attached = attached;
        let children = self.node(id).children.clone();
        for child in children {
            self.set_attachment(child, attached);
        }
    }

    /// Preorder (document order) descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            for &c in self.node(n).children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Concatenated text of `id` and everything below it.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(t) = &self.node(id).data {
            out.push_str(t);
        }
        for d in self.descendants(id) {
            if let NodeData::Text(t) = &self.node(d).data {
                out.push_str(t);
            }
        }
        out
    }

    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.tag(id).is_some_and(|t| t == tag))
            .collect()
    }

    pub fn find_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|el| el.has_class(class)))
            .collect()
    }

    pub fn find_by_attr(&self, root: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|el| el.attr(name) == Some(value)))
            .collect()
    }

    /// Merge adjacent text children and drop empty text nodes, recursively.
    pub fn normalize(&mut self, id: NodeId) {
        let child_ids = self.node(id).children.clone();
        let mut rebuilt: Vec<NodeId> = Vec::with_capacity(child_ids.len());
        let mut changed = false;

        for child in child_ids {
            let text = match &self.node(child).data {
                NodeData::Text(t) => Some(t.clone()),
                NodeData::Element(_) => None,
            };
            match text {
                Some(t) if t.is_empty() => {
                    self.node_mut(child).parent = None;
                    self.set_attachment(child, false);
                    changed = true;
                }
                Some(t) => {
                    let merged = rebuilt.last().copied().is_some_and(|prev| {
                        match &mut self.node_mut(prev).data {
                            NodeData::Text(pt) => {
                                pt.push_str(&t);
                                true
                            }
                            NodeData::Element(_) => false,
                        }
                    });
                    if merged {
                        self.node_mut(child).parent = None;
                        self.set_attachment(child, false);
                        changed = true;
                    } else {
                        rebuilt.push(child);
                    }
                }
                None => rebuilt.push(child),
            }
        }

        if changed {
            self.node_mut(id).children = rebuilt;
            self.record(MutationKind::ChildListChanged, id);
        }

        let final_children = self.node(id).children.clone();
        for child in final_children {
            if matches!(self.node(child).data, NodeData::Element(_)) {
                self.normalize(child);
            }
        }
    }

    /// Run `f` with mutations journaled under the given origin.
    pub fn with_origin<R>(&mut self, origin: MutationOrigin, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = self.origin;
        self.origin = origin;
        let out = f(self);
        self.origin = prev;
        out
    }

    fn record(&mut self, kind: MutationKind, target: NodeId) {
        self.journal.push(DomMutation {
            origin: self.origin,
            kind,
            target,
        });
    }

    /// Take everything journaled since the last drain.
    pub fn drain_mutations(&mut self) -> Vec<DomMutation> {
        std::mem::take(&mut self.journal)
    }
}
