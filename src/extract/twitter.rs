//! Twitter/X extraction — five-method fallback chain.
//!
//! Ordered from most structured to least: serialized global state, marker-key
//! script objects, whole-source object regexes, meta tags, and finally the
//! profile-link DOM heuristic.

use std::sync::LazyLock;

use regex::Regex;

use crate::page::PageContext;

use super::state_scan;
use super::{run_chain, Identity, Strategy};

/// Key that only appears in the serialized session-user object.
const VERIFICATION_MARKER: &str = "needs_phone_verification";

const SCREEN_NAME_KEY: &str = "screen_name";
const NAME_KEY: &str = "name";

/// Globals the page serializes its bootstrap state into.
const STATE_GLOBALS: &[&str] = &["__INITIAL_STATE__", "__META_DATA__"];

/// Object carrying both profile fields plus the verification marker.
static PRECISE_USER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{[^{}]*?"screen_name"\s*:\s*"[^"]+"[^{}]*?"name"\s*:\s*"[^"]+"[^{}]*?needs_phone_verification[^{}]*\}"#,
    )
    .unwrap()
});

/// "Full Name (@handle)" as found in og:title.
static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.*)\s\(@(\w+)\)").unwrap());

const CHAIN: &[(&str, Strategy)] = &[
    ("global_state", from_global_state),
    ("script_marker", from_script_marker),
    ("source_objects", from_source_objects),
    ("meta_tags", from_meta_tags),
    ("profile_link", from_profile_link),
];

pub fn extract(ctx: &PageContext<'_>) -> Option<Identity> {
    run_chain(ctx, CHAIN)
}

/// Method 1: read the serialized bootstrap globals through a narrow, typed
/// accessor. Only `window.<global> = { ... }` assignments in inline scripts
/// are considered; nothing is evaluated.
fn from_global_state(ctx: &PageContext<'_>) -> Option<Identity> {
    for script in ctx.inline_scripts() {
        for global in STATE_GLOBALS {
            let needle = format!("window.{global}");
            let Some(at) = script.find(&needle) else {
                continue;
            };
            let after = &script[at + needle.len()..];
            let Some(eq) = after.find('=') else {
                continue;
            };
            let Some(object) = state_scan::balanced_object(&after[eq + 1..]) else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<serde_json::Value>(object) else {
                continue;
            };
            let user = value
                .pointer("/entities/users/current")
                .or_else(|| value.pointer("/profile"))
                .unwrap_or(&value);
            let screen_name = user.get(SCREEN_NAME_KEY).and_then(|v| v.as_str());
            let name = user.get(NAME_KEY).and_then(|v| v.as_str());
            if let (Some(screen_name), Some(name)) = (screen_name, name) {
                return Some(Identity::new(
                    Some(screen_name.to_string()),
                    Some(name.to_string()),
                ));
            }
        }
    }
    None
}

/// Method 2: marker-keyed objects in inline scripts. The precise object
/// pattern is preferred; loose field regexes over the script are the
/// fallback.
fn from_script_marker(ctx: &PageContext<'_>) -> Option<Identity> {
    for script in ctx.inline_scripts() {
        if !script.contains(VERIFICATION_MARKER) {
            continue;
        }
        if let Some(m) = PRECISE_USER_RE.find(&script) {
            let screen_name = state_scan::field_value(m.as_str(), SCREEN_NAME_KEY);
            let name = state_scan::field_value(m.as_str(), NAME_KEY);
            if let (Some(screen_name), Some(name)) = (screen_name, name) {
                return Some(Identity::new(Some(screen_name), Some(name)));
            }
        }
        let screen_name = state_scan::field_value(&script, SCREEN_NAME_KEY);
        let name = state_scan::field_value(&script, NAME_KEY);
        if let (Some(screen_name), Some(name)) = (screen_name, name) {
            return Some(Identity::new(Some(screen_name), Some(name)));
        }
    }
    None
}

/// Method 3: object regexes over the whole page source, proximity pairing as
/// the last resort.
fn from_source_objects(ctx: &PageContext<'_>) -> Option<Identity> {
    let quoted_marker = format!("\"{SCREEN_NAME_KEY}\"");
    state_scan::scan_marker_object(ctx.source, &quoted_marker, SCREEN_NAME_KEY, NAME_KEY)
        .or_else(|| state_scan::closest_field_pair(ctx.source, SCREEN_NAME_KEY, NAME_KEY))
        .map(|(screen_name, name)| Identity::new(Some(screen_name), Some(name)))
}

/// Method 4: meta tags. `og:title` carries "Full Name (@handle)" on profile
/// pages; a bare `twitter:creator` handle without a name is not enough.
fn from_meta_tags(ctx: &PageContext<'_>) -> Option<Identity> {
    for (key, content) in ctx.meta_tags() {
        if !key.contains("og:title") {
            continue;
        }
        if let Some(caps) = OG_TITLE_RE.captures(&content) {
            let name = caps[1].trim().to_string();
            let handle = caps[2].to_string();
            if !name.is_empty() {
                return Some(Identity::new(Some(handle), Some(name)));
            }
        }
    }
    None
}

/// Method 5: the navigation profile link.
fn from_profile_link(ctx: &PageContext<'_>) -> Option<Identity> {
    let dom = ctx.dom;
    let link = dom
        .find_by_attr(dom.root(), "data-testid", "AppTabBar_Profile_Link")
        .into_iter()
        .next()?;
    let href = dom.element(link)?.attr("href")?;
    let username = href.strip_prefix('/').unwrap_or(href).trim();
    if username.is_empty() {
        return None;
    }
    let full_name = dom
        .find_by_tag(link, "span")
        .into_iter()
        .map(|id| dom.text_content(id).trim().to_string())
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| username.to_string());
    Some(Identity::new(Some(username.to_string()), Some(full_name)))
}
