//! Scan and revert passes over the document tree.

use tracing::debug;

use crate::dom::{DomTree, ElementData, MutationOrigin, NodeId};

use super::rules::{MaskMode, Rule, RuleSet};
use super::segment::{segment_text, Segment};

/// Class carried by blur spans. The visible text is the original.
pub const BLUR_CLASS: &str = "veil-blur";
/// Class carried by replacement spans.
pub const REPLACE_CLASS: &str = "veil-replaced";
/// Attribute holding the original text of a replacement span.
pub const ORIGINAL_ATTR: &str = "data-veil-original";

/// Counters from one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub text_nodes_seen: usize,
    pub nodes_rewritten: usize,
    pub spans_created: usize,
}

/// Rewrite every qualifying text node under `root` according to the rules.
///
/// Text already inside a masked span is skipped, as is script and style
/// content. With no active rule this is a no-op. The pass never stacks
/// spans; callers guarantee a [`revert`] ran first when content overlaps a
/// previous scan.
pub fn scan(tree: &mut DomTree, root: NodeId, rules: &RuleSet) -> ScanStats {
    let mut stats = ScanStats::default();
    let Some(compiled) = rules.compile() else {
        return stats;
    };

    tree.with_origin(MutationOrigin::Masking, |tree| {
        // Collect first: rewriting splices siblings under the walked nodes.
        let targets: Vec<NodeId> = tree
            .descendants(root)
            .into_iter()
            .filter(|&id| tree.text(id).is_some() && !excluded(tree, id))
            .collect();

        for id in targets {
            // A prior rewrite in this pass may have detached the node.
            if !tree.is_attached(id) {
                continue;
            }
            let Some(text) = tree.text(id).map(str::to_string) else {
                continue;
            };
            stats.text_nodes_seen += 1;
            let Some(segments) = segment_text(&text, &compiled) else {
                continue;
            };

            let mut replacements = Vec::with_capacity(segments.len());
            for segment in segments {
                match segment {
                    Segment::Plain(plain) => replacements.push(tree.create_text(plain)),
                    Segment::Matched { text, rule } => {
                        replacements.push(masked_span(tree, &text, compiled.rule(rule)));
                        stats.spans_created += 1;
                    }
                }
            }
            if tree.replace_with_nodes(id, replacements) {
                stats.nodes_rewritten += 1;
            }
        }
    });

    debug!(
        seen = stats.text_nodes_seen,
        rewritten = stats.nodes_rewritten,
        spans = stats.spans_created,
        "scan pass complete"
    );
    stats
}

/// Collapse every masked span under `root` back to its original text.
/// Returns the number of spans reverted. Adjacent text siblings are merged
/// afterwards so a scan/revert round trip converges.
pub fn revert(tree: &mut DomTree, root: NodeId) -> usize {
    tree.with_origin(MutationOrigin::Masking, |tree| {
        let spans: Vec<NodeId> = tree
            .descendants(root)
            .into_iter()
            .filter(|&id| {
                tree.element(id)
                    .is_some_and(|el| el.has_class(BLUR_CLASS) || el.has_class(REPLACE_CLASS))
            })
            .collect();

        let mut reverted = 0;
        for span in spans {
            if !tree.is_attached(span) {
                continue;
            }
            let original = original_text(tree, span);
            if tree.replace_with_text(span, original).is_some() {
                reverted += 1;
            }
        }
        if reverted > 0 {
            tree.normalize(root);
        }
        debug!(spans = reverted, "revert pass complete");
        reverted
    })
}

/// The pre-transform content of a masked span. For blur spans the visible
/// text is the original; for replacement spans it lives in the metadata
/// attribute (falling back to the visible text if the host page stripped
/// the attribute).
fn original_text(tree: &DomTree, span: NodeId) -> String {
    let is_replace = tree
        .element(span)
        .is_some_and(|el| el.has_class(REPLACE_CLASS));
    if is_replace {
        if let Some(original) = tree.element(span).and_then(|el| el.attr(ORIGINAL_ATTR)) {
            return original.to_string();
        }
    }
    tree.text_content(span)
}

fn masked_span(tree: &mut DomTree, matched: &str, rule: &Rule) -> NodeId {
    match rule.mode {
        MaskMode::Blur => {
            let mut el = ElementData::new("span");
            el.set_attr("class", BLUR_CLASS);
            let span = tree.create_element(el);
            let text = tree.create_text(matched);
            tree.append_child(span, text);
            span
        }
        MaskMode::Replace => {
            let mut el = ElementData::new("span");
            el.set_attr("class", REPLACE_CLASS);
            el.set_attr(ORIGINAL_ATTR, matched);
            let span = tree.create_element(el);
            let text = tree.create_text(rule.replacement.clone());
            tree.append_child(span, text);
            span
        }
    }
}

fn excluded(tree: &DomTree, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    while let Some(ancestor) = current {
        if let Some(el) = tree.element(ancestor) {
            if el.tag == "script" || el.tag == "style" {
                return true;
            }
            if el.has_class(BLUR_CLASS) || el.has_class(REPLACE_CLASS) {
                return true;
            }
        }
        current = tree.parent(ancestor);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_fragment, to_html};
    use crate::extract::Identity;
    use crate::settings::{EffectiveSettings, Settings};

    fn effective() -> EffectiveSettings {
        Settings::default().effective(Some(crate::extract::Platform::Twitter))
    }

    fn identity() -> Identity {
        Identity::new(Some("jdoe".to_string()), Some("Jane Doe".to_string()))
    }

    #[test]
    fn test_end_to_end_blur_and_replace() {
        let mut settings = effective();
        settings.full_name_replace = true;
        settings.full_name_replace_text = "[name]".to_string();
        let rules = RuleSet::build(Some(&identity()), &settings);

        let mut tree = parse_fragment("<p>jdoe posted: Jane Doe was here</p>");
        let root = tree.root();
        let stats = scan(&mut tree, root, &rules);
        assert_eq!(stats.spans_created, 2);
        assert_eq!(stats.nodes_rewritten, 1);

        let html = to_html(&tree, root);
        assert!(html.contains("<span class=\"veil-blur\">jdoe</span>"));
        assert!(html.contains(
            "<span class=\"veil-replaced\" data-veil-original=\"Jane Doe\">[name]</span>"
        ));
        assert!(html.contains(" posted: "));
        assert!(html.contains(" was here"));
    }

    #[test]
    fn test_scan_is_idempotent_without_revert() {
        let rules = RuleSet::build(Some(&identity()), &effective());
        let mut tree = parse_fragment("<p>jdoe says hi</p>");
        let root = tree.root();

        scan(&mut tree, root, &rules);
        let first = to_html(&tree, root);
        let stats = scan(&mut tree, root, &rules);
        assert_eq!(stats.spans_created, 0);
        assert_eq!(to_html(&tree, root), first);
    }

    #[test]
    fn test_revert_round_trips_exactly() {
        let mut settings = effective();
        settings.full_name_replace = true;
        settings.full_name_replace_text = "[name]".to_string();
        let rules = RuleSet::build(Some(&identity()), &settings);

        let original = "jdoe posted: Jane Doe was here";
        let mut tree = parse_fragment(&format!("<p>{original}</p>"));
        let root = tree.root();
        let p = tree.find_by_tag(root, "p")[0];

        scan(&mut tree, root, &rules);
        assert_ne!(tree.text_content(p), original);
        let reverted = revert(&mut tree, root);
        assert_eq!(reverted, 2);
        assert_eq!(tree.text_content(p), original);
        // The paragraph is back to a single text child.
        assert_eq!(tree.children(p).len(), 1);
    }

    #[test]
    fn test_script_and_style_content_is_untouched() {
        let rules = RuleSet::build(Some(&identity()), &effective());
        let mut tree = parse_fragment("<script>var jdoe = 1;</script><p>jdoe</p>");
        let root = tree.root();
        scan(&mut tree, root, &rules);

        let script = tree.find_by_tag(root, "script")[0];
        assert_eq!(tree.text_content(script), "var jdoe = 1;");
        let html = to_html(&tree, root);
        assert!(html.contains("<span class=\"veil-blur\">jdoe</span>"));
    }

    #[test]
    fn test_case_preserved_in_blur_span() {
        let rules = RuleSet::build(Some(&identity()), &effective());
        let mut tree = parse_fragment("<p>JDOE was loud</p>");
        let root = tree.root();
        scan(&mut tree, root, &rules);
        let html = to_html(&tree, root);
        assert!(html.contains("<span class=\"veil-blur\">JDOE</span>"));
    }

    #[test]
    fn test_no_active_rules_is_a_noop() {
        let rules = RuleSet::build(None, &effective());
        let mut tree = parse_fragment("<p>jdoe</p>");
        let root = tree.root();
        let before = to_html(&tree, root);
        let stats = scan(&mut tree, root, &rules);
        assert_eq!(stats, ScanStats::default());
        assert_eq!(to_html(&tree, root), before);
    }

    #[test]
    fn test_precedence_custom_word_over_identity() {
        let mut settings = effective();
        settings.custom_words = "jdoe".to_string();
        settings.custom_words_replace = true;
        settings.custom_words_replace_text = "[hidden]".to_string();
        let rules = RuleSet::build(Some(&identity()), &settings);

        let mut tree = parse_fragment("<p>jdoe!</p>");
        let root = tree.root();
        scan(&mut tree, root, &rules);
        let html = to_html(&tree, root);
        // The custom-word rule's mode wins over the username rule's blur.
        assert!(html.contains(
            "<span class=\"veil-replaced\" data-veil-original=\"jdoe\">[hidden]</span>"
        ));
    }

    #[test]
    fn test_revert_handles_stripped_original_attr() {
        let mut settings = effective();
        settings.full_name_replace = true;
        settings.full_name_replace_text = "[name]".to_string();
        let rules = RuleSet::build(Some(&identity()), &settings);

        let mut tree = parse_fragment("<p>Jane Doe</p>");
        let root = tree.root();
        scan(&mut tree, root, &rules);

        let span = tree.find_by_class(root, REPLACE_CLASS)[0];
        if let Some(el) = tree.element_mut(span) {
            el.remove_attr(ORIGINAL_ATTR);
        }
        revert(&mut tree, root);

        let p = tree.find_by_tag(root, "p")[0];
        assert_eq!(tree.text_content(p), "[name]");
    }
}
