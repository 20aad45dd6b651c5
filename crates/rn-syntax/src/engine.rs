//! Parser management using tree-sitter.
//!
//! This module provides the [`SyntaxEngine`], which owns one tree-sitter
//! parser per [`Dialect`] and turns text into [`SyntaxTree`]s and edit
//! batches into new trees.

use rn_core::{Language, SourceFile};
use tree_sitter::Parser;

use crate::edit::{TextEdit, apply_one, prepare_edits};
use crate::error::SyntaxError;
use crate::tree::SyntaxTree;

/// The grammar a script is parsed with.
///
/// # Examples
///
/// ```
/// use rn_core::Language;
/// use rn_syntax::Dialect;
///
/// assert_eq!(Dialect::for_language(Language::JavaScript), Some(Dialect::Tsx));
/// assert_eq!(Dialect::for_language(Language::TypeScript), Some(Dialect::TypeScript));
/// assert_eq!(Dialect::for_language(Language::Stylesheet), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Typed script with embedded markup. Also accepts plain JavaScript and
    /// JSX, so it is used for every script extension except `.ts`.
    Tsx,
    /// Typed script without markup (`.ts`). Angle-bracket type assertions
    /// only parse here.
    TypeScript,
}

impl Dialect {
    /// Selects the dialect for a file language, or `None` for non-scripts.
    #[must_use]
    pub const fn for_language(language: Language) -> Option<Self> {
        match language {
            Language::TypeScript => Some(Self::TypeScript),
            Language::JavaScript | Language::Jsx | Language::Tsx => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Returns the tree-sitter grammar for this dialect.
    #[must_use]
    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }

    /// Returns a label for error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tsx => "TSX",
            Self::TypeScript => "TypeScript",
        }
    }
}

/// Parses and re-parses script files.
///
/// The engine is `Send` but not `Sync`: create one per worker thread (for
/// example with rayon's `map_init`) and reuse it for every file that thread
/// processes.
///
/// # Examples
///
/// ```
/// use rn_core::Span;
/// use rn_syntax::{Dialect, SyntaxEngine, TextEdit, render};
///
/// let mut engine = SyntaxEngine::new()?;
/// let tree = engine.parse("const a = <b>hi</b>;", Dialect::Tsx)?;
/// assert_eq!(render(&tree), "const a = <b>hi</b>;");
///
/// let edited = engine.apply(&tree, vec![TextEdit::replace(Span::new(6, 7), "greeting")])?;
/// assert_eq!(render(&edited), "const greeting = <b>hi</b>;");
/// # Ok::<(), rn_syntax::SyntaxError>(())
/// ```
pub struct SyntaxEngine {
    tsx: Parser,
    typescript: Parser,
}

impl SyntaxEngine {
    /// Creates an engine with both dialect parsers initialized.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::LanguageInit`] if a grammar cannot be set.
    pub fn new() -> Result<Self, SyntaxError> {
        Ok(Self {
            tsx: new_parser(Dialect::Tsx)?,
            typescript: new_parser(Dialect::TypeScript)?,
        })
    }

    fn parser(&mut self, dialect: Dialect) -> &mut Parser {
        match dialect {
            Dialect::Tsx => &mut self.tsx,
            Dialect::TypeScript => &mut self.typescript,
        }
    }

    /// Parses `text` with the given dialect.
    ///
    /// # Errors
    ///
    /// - [`SyntaxError::Parse`] if tree-sitter produced no tree
    /// - [`SyntaxError::Invalid`] if the tree contains error or missing
    ///   nodes; the position is that of the first one
    pub fn parse(
        &mut self,
        text: impl Into<String>,
        dialect: Dialect,
    ) -> Result<SyntaxTree, SyntaxError> {
        let text = text.into();
        let tree = self
            .parser(dialect)
            .parse(&text, None)
            .ok_or(SyntaxError::Parse)?;
        let tree = SyntaxTree {
            text,
            tree,
            dialect,
        };
        if let Some(node) = tree.first_error() {
            let location = SyntaxTree::location(node);
            return Err(SyntaxError::invalid(
                location.line,
                location.column,
                if node.is_missing() {
                    format!("missing {}", node.kind())
                } else {
                    node.kind().to_owned()
                },
            ));
        }
        Ok(tree)
    }

    /// Parses a source file with the dialect its language selects.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnsupportedLanguage`] for non-script files and
    /// the errors of [`parse`](Self::parse) otherwise.
    pub fn parse_file(&mut self, file: &SourceFile) -> Result<SyntaxTree, SyntaxError> {
        let dialect = Dialect::for_language(file.language)
            .ok_or(SyntaxError::UnsupportedLanguage(file.language.label()))?;
        self.parse(file.text.as_str(), dialect)
    }

    /// Applies a batch of edits and re-parses incrementally.
    ///
    /// Edits are expressed against `tree`'s text. They are applied back to
    /// front; each one is also reported to a copy of the old tree so that
    /// tree-sitter can reuse unchanged subtrees.
    ///
    /// An empty batch returns a copy of `tree`.
    ///
    /// # Errors
    ///
    /// - [`SyntaxError::OverlappingEdits`] / [`SyntaxError::EditOutOfBounds`]
    ///   for an invalid batch
    /// - [`SyntaxError::EditIntroducedErrors`] if the new text does not parse
    pub fn apply(
        &mut self,
        tree: &SyntaxTree,
        mut edits: Vec<TextEdit>,
    ) -> Result<SyntaxTree, SyntaxError> {
        if edits.is_empty() {
            return Ok(tree.clone());
        }
        prepare_edits(&tree.text, &mut edits)?;

        let mut text = tree.text.clone();
        let mut old_tree = tree.tree.clone();
        for edit in &edits {
            let input_edit = apply_one(&mut text, edit);
            old_tree.edit(&input_edit);
        }

        let dialect = tree.dialect;
        let new_tree = self
            .parser(dialect)
            .parse(&text, Some(&old_tree))
            .ok_or(SyntaxError::Parse)?;
        let result = SyntaxTree {
            text,
            tree: new_tree,
            dialect,
        };
        if let Some(node) = result.first_error() {
            let location = SyntaxTree::location(node);
            tracing::debug!(
                line = location.line,
                column = location.column,
                edits = edits.len(),
                "edit batch produced a syntax error"
            );
            return Err(SyntaxError::EditIntroducedErrors {
                line: location.line,
                column: location.column,
            });
        }
        Ok(result)
    }
}

impl std::fmt::Debug for SyntaxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxEngine")
            .field("dialects", &[Dialect::Tsx.label(), Dialect::TypeScript.label()])
            .finish_non_exhaustive()
    }
}

fn new_parser(dialect: Dialect) -> Result<Parser, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.grammar())
        .map_err(|_| SyntaxError::LanguageInit(dialect.label()))?;
    Ok(parser)
}

/// Renders a tree back to text.
///
/// Trees own their text, so rendering an unmodified tree returns exactly
/// the text it was parsed from.
#[inline]
#[must_use]
pub fn render(tree: &SyntaxTree) -> &str {
    tree.text()
}
