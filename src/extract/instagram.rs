//! Instagram extraction — profile fields from script-embedded state.

use crate::page::PageContext;

use super::state_scan;
use super::{run_chain, Identity, Strategy};

/// Key that only appears in the serialized viewer-profile object.
const STATE_MARKER: &str = "has_phone_number";

const USERNAME_KEY: &str = "username";
const FULL_NAME_KEY: &str = "full_name";

const CHAIN: &[(&str, Strategy)] = &[
    ("script_state", from_script_state),
    ("page_source", from_page_source),
];

pub fn extract(ctx: &PageContext<'_>) -> Option<Identity> {
    run_chain(ctx, CHAIN)
}

/// Scan each inline script carrying the marker key.
fn from_script_state(ctx: &PageContext<'_>) -> Option<Identity> {
    for script in ctx.inline_scripts() {
        if !script.contains(STATE_MARKER) {
            continue;
        }
        if let Some((username, full_name)) =
            state_scan::scan_marker_object(&script, STATE_MARKER, USERNAME_KEY, FULL_NAME_KEY)
        {
            return Some(Identity::new(Some(username), Some(full_name)));
        }
    }
    None
}

/// Fall back to the whole page source, with proximity pairing as the last
/// resort.
fn from_page_source(ctx: &PageContext<'_>) -> Option<Identity> {
    if !ctx.source.contains(STATE_MARKER) {
        return None;
    }
    state_scan::scan_marker_object(ctx.source, STATE_MARKER, USERNAME_KEY, FULL_NAME_KEY)
        .or_else(|| state_scan::closest_field_pair(ctx.source, USERNAME_KEY, FULL_NAME_KEY))
        .map(|(username, full_name)| Identity::new(Some(username), Some(full_name)))
}
