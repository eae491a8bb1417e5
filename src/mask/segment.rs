//! Split text node content into plain and matched segments.

use super::rules::CompiledRules;

/// One slice of a text node's content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Untouched text, preserved exactly.
    Plain(String),
    /// Text matched by a rule, original casing intact.
    Matched { text: String, rule: usize },
}

/// Segment `text` against the compiled rules. `None` when nothing matched
/// and the node can be left alone.
///
/// Matched segments keep their original casing; attribution picks the first
/// rule in construction order whose own pattern matches the segment. A
/// matched region no single rule claims degrades to plain text.
pub fn segment_text(text: &str, rules: &CompiledRules) -> Option<Vec<Segment>> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut cursor = 0;
    let mut any_matched = false;

    for m in rules.combined().find_iter(text) {
        if m.start() > cursor {
            push_plain(&mut segments, &text[cursor..m.start()]);
        }
        match rules.attribute(m.as_str()) {
            Some(rule) => {
                any_matched = true;
                segments.push(Segment::Matched {
                    text: m.as_str().to_string(),
                    rule,
                });
            }
            None => push_plain(&mut segments, m.as_str()),
        }
        cursor = m.end();
    }

    if !any_matched {
        return None;
    }
    if cursor < text.len() {
        push_plain(&mut segments, &text[cursor..]);
    }
    Some(segments)
}

fn push_plain(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Plain(existing)) = segments.last_mut() {
        existing.push_str(text);
        return;
    }
    segments.push(Segment::Plain(text.to_string()));
}
