//! Tree-sitter syntax engine for rr-next.
//!
//! This crate turns script files into syntax trees and applies text edits to
//! them:
//!
//! - Parse JavaScript, JSX, TypeScript and TSX (two tree-sitter dialects)
//! - Detect parse failures and report the first error position
//! - Render trees back to text
//! - Apply batches of byte-range edits with incremental re-parsing
//! - Extract import statements with their local bindings
//!
//! # Overview
//!
//! The main entry point is [`SyntaxEngine`]:
//!
//! ```
//! use rn_syntax::{Dialect, SyntaxEngine, extract_imports, render};
//!
//! let mut engine = SyntaxEngine::new()?;
//! let source = r#"
//! import { useNavigate } from 'react-router-dom';
//! export const Back = () => <button onClick={() => useNavigate()(-1)}>Back</button>;
//! "#;
//!
//! let tree = engine.parse(source, Dialect::Tsx)?;
//! assert!(tree.has_markup());
//! assert_eq!(render(&tree), source);
//!
//! for import in extract_imports(&tree)? {
//!     assert_eq!(import.path, "react-router-dom");
//! }
//! # Ok::<(), rn_syntax::SyntaxError>(())
//! ```
//!
//! # Dialects
//!
//! | Extension | Dialect |
//! |-----------|---------|
//! | `.js`, `.jsx`, `.mjs`, `.cjs`, `.tsx` | [`Dialect::Tsx`] |
//! | `.ts`, `.mts`, `.cts` | [`Dialect::TypeScript`] |
//!
//! # Edits
//!
//! Edits are [`TextEdit`]s against the text a tree was parsed from.
//! [`SyntaxEngine::apply`] sorts them back to front, rejects overlaps,
//! informs the old tree of each change, and re-parses incrementally. An edit
//! batch that leaves the text unparseable is an error, never a broken tree.
//!
//! # Thread Safety
//!
//! [`SyntaxEngine`] is `Send` but not `Sync`. For parallel processing with
//! rayon, create one engine per worker thread (`map_init`). The compiled
//! import query is shared globally.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod edit;
mod engine;
pub mod error;
mod import;
pub mod jsx;
pub mod queries;
mod tree;

pub use edit::{TextEdit, prepare_edits};
pub use engine::{Dialect, SyntaxEngine, render};
pub use error::SyntaxError;
pub use import::extract_imports;
pub use tree::{Descendants, SyntaxTree, ancestor_of_kind, child_of_kind, has_child_kind};

// Re-export tree-sitter types that appear in our public API
pub use tree_sitter::Node;
