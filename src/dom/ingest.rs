//! HTML ingestion — parse page text into the arena tree.

use ego_tree::NodeRef;
use scraper::node::Node as HtmlNode;
use scraper::Html;

use super::tree::{DomTree, ElementData, NodeId};

/// Parse a full HTML document. The parser synthesizes `html`/`head`/`body`
/// the way a browser does.
pub fn parse_document(html: &str) -> DomTree {
    build(Html::parse_document(html))
}

/// Parse an HTML fragment. No `body` is synthesized; content hangs directly
/// under the document root.
pub fn parse_fragment(html: &str) -> DomTree {
    build(Html::parse_fragment(html))
}

fn build(doc: Html) -> DomTree {
    let mut tree = DomTree::new();
    let root = tree.root();
    for child in doc.tree.root().children() {
        copy_node(&mut tree, root, child);
    }
    // Ingestion is not a mutation anyone observes.
    tree.drain_mutations();
    tree
}

fn copy_node(tree: &mut DomTree, parent: NodeId, node: NodeRef<'_, HtmlNode>) {
    match node.value() {
        HtmlNode::Element(el) => {
            let mut data = ElementData::new(el.name());
            for (name, value) in el.attrs() {
                data.set_attr(name, value);
            }
            let id = tree.create_element(data);
            tree.append_child(parent, id);
            for child in node.children() {
                copy_node(tree, id, child);
            }
        }
        HtmlNode::Text(text) => {
            let id = tree.create_text(text.text.to_string());
            tree.append_child(parent, id);
        }
        // Doctype, comments and processing instructions carry no maskable text.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_builds_body() {
        let tree = parse_document("<html><body><p id=\"x\">hi</p></body></html>");
        let body = tree.find_by_tag(tree.root(), "body");
        assert_eq!(body.len(), 1);
        let p = tree.find_by_attr(tree.root(), "id", "x");
        assert_eq!(p.len(), 1);
        assert_eq!(tree.text_content(p[0]), "hi");
    }

    #[test]
    fn test_parse_preserves_script_text() {
        let tree = parse_document("<script>var a = {\"k\": 1};</script><p>b</p>");
        let scripts = tree.find_by_tag(tree.root(), "script");
        assert_eq!(scripts.len(), 1);
        assert_eq!(tree.text_content(scripts[0]), "var a = {\"k\": 1};");
    }

    #[test]
    fn test_parse_fragment_has_no_body() {
        let tree = parse_fragment("<p>loose</p>");
        assert!(tree.find_by_tag(tree.root(), "body").is_empty());
        assert_eq!(tree.text_content(tree.root()), "loose");
    }

    #[test]
    fn test_ingest_journal_is_empty() {
        let mut tree = parse_document("<p>x</p>");
        assert!(tree.drain_mutations().is_empty());
    }
}
