//! Identity extraction — per-platform strategy chains over the current page.
//!
//! Each platform runs an ordered list of heuristics from most structured
//! (serialized state under a known marker key) to least (text-content and
//! page-title parsing). The first strategy to produce an identity wins;
//! results are never merged across strategies. A miss is `None`, not an
//! error.

pub mod instagram;
pub mod linkedin;
pub mod platform;
pub mod state_scan;
pub mod twitter;

use serde::{Deserialize, Serialize};

use crate::page::PageContext;

pub use platform::Platform;

/// The viewed profile's identity, produced wholesale per extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: Option<String>,
    pub full_name: Option<String>,
}

impl Identity {
    pub fn new(username: Option<String>, full_name: Option<String>) -> Self {
        Self { username, full_name }
    }

    /// Both fields set to the same display name, for platforms without a
    /// separate handle concept.
    pub fn display_name_only(name: String) -> Self {
        Self {
            username: Some(name.clone()),
            full_name: Some(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").is_empty();
        blank(&self.username) && blank(&self.full_name)
    }
}

/// One extraction heuristic. Returns a populated identity or nothing;
/// failures inside a strategy stay inside it.
pub type Strategy = fn(&PageContext<'_>) -> Option<Identity>;

/// Run strategies in order; the first non-empty result wins.
pub fn run_chain(ctx: &PageContext<'_>, chain: &[(&'static str, Strategy)]) -> Option<Identity> {
    for (name, strategy) in chain {
        if let Some(identity) = strategy(ctx) {
            if identity.is_empty() {
                continue;
            }
            tracing::debug!(strategy = name, "identity extracted");
            return Some(identity);
        }
    }
    tracing::debug!("no strategy produced an identity");
    None
}

/// Extract the viewed profile's identity for the given platform.
pub fn extract(ctx: &PageContext<'_>, platform: Platform) -> Option<Identity> {
    match platform {
        Platform::Instagram => instagram::extract(ctx),
        Platform::Twitter => twitter::extract(ctx),
        Platform::LinkedIn => linkedin::extract(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;

    fn none_strategy(_ctx: &PageContext<'_>) -> Option<Identity> {
        None
    }

    fn empty_strategy(_ctx: &PageContext<'_>) -> Option<Identity> {
        Some(Identity::new(Some("  ".to_string()), None))
    }

    fn hit_strategy(_ctx: &PageContext<'_>) -> Option<Identity> {
        Some(Identity::new(Some("jdoe".to_string()), None))
    }

    #[test]
    fn test_first_success_wins() {
        let dom = parse_document("<p></p>");
        let ctx = PageContext::new("https://example.com", "", &dom);
        let chain: &[(&'static str, Strategy)] = &[
            ("miss", none_strategy),
            ("blank", empty_strategy),
            ("hit", hit_strategy),
        ];
        let identity = run_chain(&ctx, chain).unwrap();
        assert_eq!(identity.username.as_deref(), Some("jdoe"));
    }

    #[test]
    fn test_all_misses_yield_none() {
        let dom = parse_document("<p></p>");
        let ctx = PageContext::new("https://example.com", "", &dom);
        let chain: &[(&'static str, Strategy)] = &[("miss", none_strategy)];
        assert!(run_chain(&ctx, chain).is_none());
    }
}
