//! Text masking — rule construction, segmentation, and DOM rewriting.
//!
//! Rules derive from the extracted identity, the custom word list, and the
//! effective settings. A scan pass rewrites matching text nodes into masked
//! spans; revert collapses every span back to the exact original text. The
//! pair is a transaction: callers revert before re-scanning so spans never
//! stack.

pub mod engine;
pub mod rules;
pub mod segment;

pub use engine::{revert, scan, ScanStats, BLUR_CLASS, ORIGINAL_ATTR, REPLACE_CLASS};
pub use rules::{CompiledRules, MaskMode, Rule, RuleSet, RuleSource};
pub use segment::{segment_text, Segment};
