//! LinkedIn extraction — display name only.
//!
//! There is no handle concept worth masking separately; whatever name is
//! found fills both identity fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::page::PageContext;

use super::{run_chain, Identity, Strategy};

/// Containers the profile headline renders into.
const TOP_CARD_CLASSES: &[&str] = &["pv-top-card", "scaffold-layout__main"];
const TOP_CARD_ID: &str = "profile-content";

const AVATAR_CLASSES: &[&str] = &[
    "pv-top-card-profile-picture__image",
    "ivm-view-attr__img--centered",
];

/// Alt text comes as "View Full Name's profile".
static ALT_CLEAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)View|'s profile").unwrap());

const CHAIN: &[(&str, Strategy)] = &[
    ("profile_card", from_profile_card),
    ("top_card_heading", from_top_card_heading),
    ("page_title", from_page_title),
    ("profile_meta", from_profile_meta),
    ("avatar_alt", from_avatar_alt),
];

pub fn extract(ctx: &PageContext<'_>) -> Option<Identity> {
    run_chain(ctx, CHAIN)
}

fn from_profile_card(ctx: &PageContext<'_>) -> Option<Identity> {
    ctx.first_text_by_class("profile-card-name")
        .map(Identity::display_name_only)
}

/// First `h1` inside any of the known top-card containers.
fn from_top_card_heading(ctx: &PageContext<'_>) -> Option<Identity> {
    let dom = ctx.dom;
    let mut scopes: Vec<_> = TOP_CARD_CLASSES
        .iter()
        .filter_map(|class| ctx.first_by_class(class))
        .collect();
    if let Some(by_id) = dom
        .find_by_attr(dom.root(), "id", TOP_CARD_ID)
        .into_iter()
        .next()
    {
        scopes.push(by_id);
    }
    scopes
        .into_iter()
        .find_map(|scope| ctx.first_text_by_tag_under(scope, "h1"))
        .map(Identity::display_name_only)
}

/// Titles read "Full Name | LinkedIn".
fn from_page_title(ctx: &PageContext<'_>) -> Option<Identity> {
    let title = ctx.title()?;
    if !title.contains("| LinkedIn") {
        return None;
    }
    let name = title.split('|').next()?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some(Identity::display_name_only(name))
}

fn from_profile_meta(ctx: &PageContext<'_>) -> Option<Identity> {
    let name = ctx.meta_content("profile:name")?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some(Identity::display_name_only(name))
}

fn from_avatar_alt(ctx: &PageContext<'_>) -> Option<Identity> {
    let dom = ctx.dom;
    for class in AVATAR_CLASSES {
        for id in dom.find_by_class(dom.root(), class) {
            let Some(alt) = dom.element(id).and_then(|el| el.attr("alt")) else {
                continue;
            };
            let name = ALT_CLEAN_RE.replace_all(alt, "").trim().to_string();
            if !name.is_empty() {
                return Some(Identity::display_name_only(name));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    fn ctx_for<'a>(source: &'a str, dom: &'a crate::dom::DomTree) -> PageContext<'a> {
        PageContext::new("https://www.linkedin.com/in/jane-doe/", source, dom)
    }

    #[test]
    fn test_profile_card_name_fills_both_fields() {
        let html = r#"<body><span class="profile-card-name"> Jane Doe </span></body>"#;
        let dom = parse_document(html);
        let identity = extract(&ctx_for(html, &dom)).unwrap();
        assert_eq!(identity.username.as_deref(), Some("Jane Doe"));
        assert_eq!(identity.full_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_top_card_heading() {
        let html = r#"<body><div class="pv-top-card"><h1>Jane Doe</h1></div></body>"#;
        let dom = parse_document(html);
        let identity = extract(&ctx_for(html, &dom)).unwrap();
        assert_eq!(identity.full_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_page_title_fallback() {
        let html = "<html><head><title>Jane Doe | LinkedIn</title></head><body></body></html>";
        let dom = parse_document(html);
        let identity = extract(&ctx_for(html, &dom)).unwrap();
        assert_eq!(identity.full_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_avatar_alt_cleanup() {
        let html = r#"<body><img class="pv-top-card-profile-picture__image" alt="View Jane Doe's profile"></body>"#;
        let dom = parse_document(html);
        let identity = extract(&ctx_for(html, &dom)).unwrap();
        assert_eq!(identity.full_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_unrelated_title_yields_none() {
        let html = "<html><head><title>Feed</title></head><body></body></html>";
        let dom = parse_document(html);
        assert!(extract(&ctx_for(html, &dom)).is_none());
    }
}
