//! Serialize the arena tree back to HTML text.

use super::tree::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are emitted raw.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Render `id` and its subtree as HTML. The synthetic `#document` root
/// renders as its children only.
pub fn to_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, false, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, raw_text: bool, out: &mut String) {
    match tree.data(id) {
        NodeData::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                push_escaped_text(text, out);
            }
        }
        NodeData::Element(el) if el.tag == "#document" => {
            for &child in tree.children(id) {
                write_node(tree, child, false, out);
            }
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                push_escaped_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
            for &child in tree.children(id) {
                write_node(tree, child, raw, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn push_escaped_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_escaped_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
