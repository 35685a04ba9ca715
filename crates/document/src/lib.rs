//! # Pooled JSON Document Model
//!
//! The in-memory representation of a parsed or programmatically built JSON
//! document (spec §4.D): a doubly-linked value tree backed by a two-tier
//! [`arena::Arena`] for any text that can't stay zero-copy against the
//! original input. **Zero external dependencies beyond `common`, `arena`
//! and `encoding`.**

#![forbid(unsafe_code)]

mod node;
mod tree;

pub use node::{Text, ValueId, ValueKind, ValueNode};
pub use tree::Document;
