//! Veil runtime — profile privacy for social pages.
//!
//! The runtime extracts the viewed profile's identity from heterogeneous
//! page content via layered per-platform heuristics, then blurs or replaces
//! every occurrence of that identity (plus a user-configured word list)
//! across the page's text, staying consistent while the host document
//! mutates underneath it:
//!
//! - [`extract`] resolves `{username, full_name}` through ordered strategy
//!   chains, most-structured sources first.
//! - [`mask`] builds boundary-matched rules and rewrites text nodes into
//!   reversible masked spans.
//! - [`watch`] collapses mutation bursts into single debounced rescans.
//! - [`session`] owns the per-page state and the async event loop gluing the
//!   three together.
//!
//! Settings live in a small synchronized store ([`settings`]); pages are
//! ingested into a mutable arena tree ([`dom`]) and serialized back out.

pub mod cli;
pub mod dom;
pub mod errors;
pub mod extract;
pub mod mask;
pub mod page;
pub mod session;
pub mod settings;
pub mod watch;

pub use dom::{DomTree, NodeId};
pub use errors::{VeilError, VeilResult};
pub use extract::{Identity, Platform};
pub use mask::{MaskMode, Rule, RuleSet, ScanStats};
pub use page::PageContext;
pub use session::{PageSession, SessionEvent};
pub use settings::{EffectiveSettings, Settings, SettingsStore};
