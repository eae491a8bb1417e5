//! Mutable document model for in-page masking.
//!
//! Pages arrive as HTML text, are ingested into an id-indexed arena tree,
//! mutated by the masking engine (and by the embedding host), and serialized
//! back out. Every mutation is journaled with an origin tag so the watcher
//! can tell the engine's own rewrites apart from host-page churn.

pub mod ingest;
pub mod serialize;
pub mod tree;

pub use ingest::{parse_document, parse_fragment};
pub use serialize::to_html;
pub use tree::{DomMutation, DomTree, ElementData, MutationKind, MutationOrigin, NodeData, NodeId};
