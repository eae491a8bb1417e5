//! Marker-key scanning of script-embedded state.
//!
//! Profile data tends to sit inside large serialized blobs in inline scripts.
//! The scan finds occurrences of a marker key, cuts out the smallest
//! enclosing brace-delimited object, and decodes it: structured JSON first,
//! direct field regexes when the blob is malformed but the two fields are
//! still pattern-extractable.

use regex::Regex;

/// Maximum distance between paired field occurrences in raw source.
pub const PROXIMITY_WINDOW: usize = 500;

/// Smallest brace-delimited object slices containing `marker`, deduplicated,
/// in order of appearance.
pub fn candidate_objects<'a>(source: &'a str, marker: &str) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = Vec::new();
    if marker.is_empty() {
        return out;
    }
    let mut from = 0;
    while let Some(rel) = source[from..].find(marker) {
        let at = from + rel;
        if let Some(obj) = enclosing_object(source, at, at + marker.len()) {
            if !out.contains(&obj) {
                out.push(obj);
            }
        }
        from = at + marker.len();
    }
    out
}

/// The innermost `{ ... }` around `[start, end)`: nearest `{` to the left
/// with no intervening `}`, nearest `}` to the right with no intervening `{`.
fn enclosing_object(source: &str, start: usize, end: usize) -> Option<&str> {
    let left = source[..start].rfind(|c| c == '{' || c == '}')?;
    if source.as_bytes()[left] != b'{' {
        return None;
    }
    let right = end + source[end..].find(|c| c == '{' || c == '}')?;
    if source.as_bytes()[right] != b'}' {
        return None;
    }
    Some(&source[left..right + 1])
}

/// The balanced `{ ... }` object starting at the first `{` in `text`.
/// String literals (with escapes) are skipped when counting braces.
pub fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract a `"key": "value"` string field via regex.
pub fn field_value(text: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"(?i)"{}"\s*:\s*"([^"]+)""#,
        regex::escape(key)
    ))
    .ok()?;
    re.captures(text).map(|c| c[1].to_string())
}

/// Decode a candidate object into the two wanted fields. Structured decode
/// first; on failure, direct field regexes over the same candidate text.
pub fn decode_fields(candidate: &str, first_key: &str, second_key: &str) -> Option<(String, String)> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
        let first = value.get(first_key).and_then(|v| v.as_str());
        let second = value.get(second_key).and_then(|v| v.as_str());
        if let (Some(a), Some(b)) = (first, second) {
            return Some((a.to_string(), b.to_string()));
        }
    }
    match (field_value(candidate, first_key), field_value(candidate, second_key)) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    }
}

/// Scan `source` for a marker-keyed object carrying both fields.
/// Candidates whose literal text names both fields are tried first.
pub fn scan_marker_object(
    source: &str,
    marker: &str,
    first_key: &str,
    second_key: &str,
) -> Option<(String, String)> {
    let candidates = candidate_objects(source, marker);
    let first_quoted = format!("\"{first_key}\"");
    let second_quoted = format!("\"{second_key}\"");
    let (confident, rest): (Vec<&str>, Vec<&str>) = candidates
        .into_iter()
        .partition(|c| c.contains(&first_quoted) && c.contains(&second_quoted));

    for candidate in confident.into_iter().chain(rest) {
        if let Some(pair) = decode_fields(candidate, first_key, second_key) {
            return Some(pair);
        }
    }
    None
}

/// Last resort: the closest pair of the two fields anywhere in `source`,
/// within [`PROXIMITY_WINDOW`] characters of each other.
pub fn closest_field_pair(source: &str, first_key: &str, second_key: &str) -> Option<(String, String)> {
    let first_hits = field_occurrences(source, first_key);
    let second_hits = field_occurrences(source, second_key);

    let mut best: Option<(usize, String, String)> = None;
    for (a_pos, a_val) in &first_hits {
        for (b_pos, b_val) in &second_hits {
            let distance = a_pos.abs_diff(*b_pos);
            if distance > PROXIMITY_WINDOW {
                continue;
            }
            if best.as_ref().map_or(true, |(d, _, _)| distance < *d) {
                best = Some((distance, a_val.clone(), b_val.clone()));
            }
        }
    }
    best.map(|(_, a, b)| (a, b))
}

fn field_occurrences(source: &str, key: &str) -> Vec<(usize, String)> {
    let Ok(re) = Regex::new(&format!(
        r#"(?i)"{}"\s*:\s*"([^"]+)""#,
        regex::escape(key)
    )) else {
        return Vec::new();
    };
    re.captures_iter(source)
        .filter_map(|c| {
            let m = c.get(0)?;
            Some((m.start(), c.get(1)?.as_str().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_objects_are_innermost() {
        let source = r#"var s = {"outer": {"marker_key": 1, "a": "b"}};"#;
        let candidates = candidate_objects(source, "marker_key");
        assert_eq!(candidates, vec![r#"{"marker_key": 1, "a": "b"}"#]);
    }

    #[test]
    fn test_candidate_objects_dedupe() {
        let source = r#"{"marker": 1, "marker": 2}"#;
        assert_eq!(candidate_objects(source, "marker").len(), 1);
    }

    #[test]
    fn test_decode_fields_json() {
        let candidate = r#"{"username": "jdoe", "full_name": "Jane Doe", "x": 1}"#;
        assert_eq!(
            decode_fields(candidate, "username", "full_name"),
            Some(("jdoe".to_string(), "Jane Doe".to_string()))
        );
    }

    #[test]
    fn test_decode_fields_falls_back_to_regex_on_malformed_json() {
        // Trailing comma breaks the structured decode.
        let candidate = r#"{"username": "jdoe", "full_name": "Jane Doe",}"#;
        assert_eq!(
            decode_fields(candidate, "username", "full_name"),
            Some(("jdoe".to_string(), "Jane Doe".to_string()))
        );
    }

    #[test]
    fn test_scan_prefers_candidate_with_both_fields() {
        let source = concat!(
            r#"{"marker": true, "username": "wrong"}"#,
            r#" {"marker": true, "username": "jdoe", "full_name": "Jane Doe"}"#,
        );
        assert_eq!(
            scan_marker_object(source, "marker", "username", "full_name"),
            Some(("jdoe".to_string(), "Jane Doe".to_string()))
        );
    }

    #[test]
    fn test_balanced_object_skips_braces_in_strings() {
        let text = r#"window.S = {"a": "}", "b": {"c": 1}}; rest"#;
        assert_eq!(balanced_object(text), Some(r#"{"a": "}", "b": {"c": 1}}"#));
    }

    #[test]
    fn test_closest_field_pair_respects_window() {
        let filler = "x".repeat(PROXIMITY_WINDOW + 10);
        let source = format!(r#""screen_name": "far" {filler} "name": "Jane""#);
        assert_eq!(closest_field_pair(&source, "screen_name", "name"), None);

        let near = r#""screen_name": "jdoe" ... "name": "Jane Doe""#;
        assert_eq!(
            closest_field_pair(near, "screen_name", "name"),
            Some(("jdoe".to_string(), "Jane Doe".to_string()))
        );
    }
}
