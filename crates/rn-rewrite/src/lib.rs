//! Pattern classification and rewrite passes for rr-next.
//!
//! This crate finds navigation-library constructs in a parsed file and
//! rewrites them into their file-system-routing equivalents:
//!
//! - [`classify`] records what a file uses ([`FileSignals`](rn_core::FileSignals))
//! - [`passes`] turns those signals into edits, one concern per pass
//! - [`rewrite_file`] runs the passes in order on one file
//!
//! # Overview
//!
//! ```
//! use rn_core::{ConversionSettings, SourceFile};
//! use rn_rewrite::rewrite_file;
//! use rn_syntax::SyntaxEngine;
//!
//! let mut engine = SyntaxEngine::new()?;
//! let file = SourceFile::new(
//!     "src/Nav.jsx",
//!     "import { Link } from 'react-router-dom';\nexport const Nav = () => <Link to=\"/about\">About</Link>;\n",
//! );
//! let rewrite = rewrite_file(&mut engine, &file, &ConversionSettings::default())?;
//! assert!(rewrite.text.contains("import Link from 'next/link';"));
//! assert!(rewrite.text.contains("<Link href=\"/about\">"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Pass Order
//!
//! | Pass | Rewrites |
//! |------|----------|
//! | `imports` | navigation-library import statements |
//! | `calls` | hook calls, navigator calls, router factories |
//! | `elements` | links, head elements, routing containers, images |
//! | `assets` | missing target-framework imports, client directive |
//!
//! Each pass sees the tree produced by the one before it. Every rewrite
//! is an edit batch applied through
//! [`SyntaxEngine::apply`](rn_syntax::SyntaxEngine::apply), so a pass can
//! never leave a file unparseable.
//!
//! # Idempotence
//!
//! Converted output classifies as needing no rewrite, and the comment-
//! emitting rewrites check for their own comment first; running the
//! passes again produces no edits.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod classify;
mod error;
pub mod passes;
mod pipeline;
pub mod table;

pub use classify::{Binding, KnownBindings, classify, classify_with};
pub use error::RewriteError;
pub use passes::{Effects, Need, NeedSet, PassOutput};
pub use pipeline::{FileRewrite, rewrite_file, rewrite_tree};
