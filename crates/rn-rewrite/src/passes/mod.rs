//! The rewrite passes.
//!
//! Four passes run in a fixed order, each against the tree the previous
//! one produced:
//!
//! 1. [`imports`] removes navigation-library imports
//! 2. [`calls`] rewrites hook calls and navigator calls
//! 3. [`elements`] rewrites links, head elements and routing containers and
//!    flags images
//! 4. [`assets`] adds the imports the earlier passes made necessary
//!
//! A pass only reads; it returns its edits and effects in a [`PassOutput`]
//! and the pipeline applies them.

pub mod assets;
pub mod calls;
pub mod elements;
pub mod imports;

use rn_core::{ConversionSettings, FileSignals, HookKind, Span};
use rn_syntax::{Node, SyntaxTree, TextEdit, jsx};

use crate::classify::KnownBindings;
use crate::error::RewriteError;

/// A target-framework import a rewritten file depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Need {
    /// The router handle hook (`useRouter`).
    RouterHandle,
    /// The route parameters hook of the app-directory convention.
    ParamsHook,
    /// The query-string hook of the app-directory convention.
    SearchParamsHook,
    /// The link component.
    LinkComponent,
    /// The document-head wrapper.
    HeadWrapper,
    /// The optimized image component.
    ImageComponent,
}

impl Need {
    /// All needs, in the order their imports are written.
    pub const ALL: [Self; 6] = [
        Self::RouterHandle,
        Self::ParamsHook,
        Self::SearchParamsHook,
        Self::LinkComponent,
        Self::HeadWrapper,
        Self::ImageComponent,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::RouterHandle => 1,
            Self::LinkComponent => 1 << 1,
            Self::HeadWrapper => 1 << 2,
            Self::ImageComponent => 1 << 3,
            Self::ParamsHook => 1 << 4,
            Self::SearchParamsHook => 1 << 5,
        }
    }

    /// The local name the import binds.
    #[must_use]
    pub const fn binding(self) -> &'static str {
        match self {
            Self::RouterHandle => "useRouter",
            Self::ParamsHook => "useParams",
            Self::SearchParamsHook => "useSearchParams",
            Self::LinkComponent => "Link",
            Self::HeadWrapper => "Head",
            Self::ImageComponent => "Image",
        }
    }

    /// The module the binding is imported from.
    #[must_use]
    pub const fn module(self, settings: &ConversionSettings) -> &'static str {
        match self {
            Self::RouterHandle => settings.router_module(),
            Self::ParamsHook | Self::SearchParamsHook => "next/navigation",
            Self::LinkComponent => "next/link",
            Self::HeadWrapper => "next/head",
            Self::ImageComponent => "next/image",
        }
    }

    /// The need a rewritten call of a `kind` hook depends on.
    ///
    /// The app-directory convention has dedicated parameter hooks; every
    /// other hook goes through the router handle.
    #[must_use]
    pub const fn for_hook(kind: HookKind, settings: &ConversionSettings) -> Self {
        match kind {
            HookKind::Params if settings.use_directory_router => Self::ParamsHook,
            HookKind::SearchParams if settings.use_directory_router => Self::SearchParamsHook,
            _ => Self::RouterHandle,
        }
    }

    /// Returns `true` for hooks, which only run in client components.
    #[must_use]
    pub const fn is_hook(self) -> bool {
        matches!(self, Self::RouterHandle | Self::ParamsHook | Self::SearchParamsHook)
    }

    /// Renders the import statement, newline included.
    #[must_use]
    pub fn import_line(self, settings: &ConversionSettings) -> String {
        let module = self.module(settings);
        match self {
            Self::RouterHandle | Self::ParamsHook | Self::SearchParamsHook => {
                format!("import {{ {} }} from '{module}';\n", self.binding())
            }
            _ => format!("import {} from '{module}';\n", self.binding()),
        }
    }
}

/// A small set of [`Need`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NeedSet(u8);

impl NeedSet {
    /// Adds a need.
    pub const fn insert(&mut self, need: Need) {
        self.0 |= need.bit();
    }

    /// Returns `true` if the set holds `need`.
    #[must_use]
    pub const fn contains(self, need: Need) -> bool {
        self.0 & need.bit() != 0
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the set holds any hook.
    #[must_use]
    pub fn has_hook(self) -> bool {
        self.iter().any(Need::is_hook)
    }

    /// Returns the union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterates the set in [`Need::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Need> {
        Need::ALL.into_iter().filter(move |n| self.contains(*n))
    }
}

impl FromIterator<Need> for NeedSet {
    fn from_iter<I: IntoIterator<Item = Need>>(iter: I) -> Self {
        let mut set = Self::default();
        for need in iter {
            set.insert(need);
        }
        set
    }
}

/// What a pass found besides its edits.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    /// Imports the rewritten code depends on.
    pub needs: NeedSet,
    /// Findings that call for manual review (logged as warnings).
    pub advisories: Vec<String>,
    /// Informational findings.
    pub notes: Vec<String>,
    /// Constructs flagged in the code with a comment or left for review.
    pub flagged: usize,
}

impl Effects {
    /// Records an advisory.
    pub fn advise(&mut self, message: impl Into<String>) {
        self.advisories.push(message.into());
    }

    /// Records an informational note.
    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    /// Folds another pass's effects into these.
    pub fn merge(&mut self, other: Self) {
        self.needs = self.needs.union(other.needs);
        self.advisories.extend(other.advisories);
        self.notes.extend(other.notes);
        self.flagged += other.flagged;
    }
}

/// The result of one pass.
#[derive(Debug, Clone, Default)]
pub struct PassOutput {
    /// Edits against the tree the pass was given.
    pub edits: Vec<TextEdit>,
    /// Everything else the pass found.
    pub effects: Effects,
}

impl PassOutput {
    pub(crate) fn from_parts(edits: EditSet, effects: Effects) -> Self {
        Self {
            edits: edits.into_vec(),
            effects,
        }
    }
}

/// Read-only inputs every pass receives.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// The run's settings.
    pub settings: &'a ConversionSettings,
    /// Library bindings from the file as it was before any pass ran.
    pub bindings: &'a KnownBindings,
    /// Needs recorded by earlier passes.
    pub needs: NeedSet,
}

/// Signature shared by all passes.
pub type PassFn =
    fn(&SyntaxTree, &FileSignals, &PassContext<'_>) -> Result<PassOutput, RewriteError>;

/// The passes in the order they run.
pub const PASSES: [(&str, PassFn); 4] = [
    ("imports", imports::run),
    ("calls", calls::run),
    ("elements", elements::run),
    ("assets", assets::run),
];

/// An edit batch that refuses overlapping edits.
///
/// Passes derive edits from independent signals; when two of them touch
/// the same bytes the later one is dropped rather than failing the file.
#[derive(Debug, Default)]
pub(crate) struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    /// Adds `edit` unless it overlaps one already present.
    pub(crate) fn push(&mut self, edit: TextEdit) -> bool {
        if let Some(existing) = self.edits.iter().find(|e| e.span.overlaps(&edit.span)) {
            tracing::debug!(
                kept = ?existing.span,
                dropped = ?edit.span,
                "dropping overlapping edit"
            );
            return false;
        }
        self.edits.push(edit);
        true
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.edits.len()
    }

    pub(crate) fn into_vec(self) -> Vec<TextEdit> {
        self.edits
    }
}

/// Node kinds that start a new function scope.
pub(crate) const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "arrow_function",
    "method_definition",
    "generator_function_declaration",
];

/// Renders a block comment for the position of `node`.
pub(crate) fn comment_text(text: &str, markup: bool) -> String {
    if markup {
        format!("{{/* {text} */}}")
    } else {
        format!("/* {text} */")
    }
}

/// Builds an insertion placing a comment immediately before `node`.
///
/// A node that starts its line gets the comment on a line of its own.
pub(crate) fn comment_before(tree: &SyntaxTree, node: Node<'_>, text: &str) -> TextEdit {
    let comment = comment_text(text, jsx::is_markup_child(node));
    let start = node.start_byte();
    let leading = tree
        .text()
        .get(tree.line_start(start)..start)
        .unwrap_or_default();
    if leading.trim().is_empty() {
        let indent = tree.indentation_at(start);
        TextEdit::insert(start, format!("{comment}\n{indent}"))
    } else {
        TextEdit::insert(start, format!("{comment} "))
    }
}

/// Returns `true` if the code before `offset` ends with the comment `text`.
pub(crate) fn has_comment_before(tree: &SyntaxTree, offset: usize, text: &str) -> bool {
    let Some(before) = tree.text().get(..offset) else {
        return false;
    };
    let before = before.trim_end();
    before.ends_with(&comment_text(text, false)) || before.ends_with(&comment_text(text, true))
}

/// Widens `span` to its whole line when nothing else shares the line.
pub(crate) fn line_span(tree: &SyntaxTree, span: Span) -> Span {
    let text = tree.text();
    let line_start = tree.line_start(span.start);
    let line_end = text
        .get(span.end..)
        .and_then(|rest| rest.find('\n'))
        .map_or(text.len(), |i| span.end + i + 1);
    let blank = |range: std::ops::Range<usize>| text.get(range).is_some_and(|s| s.trim().is_empty());
    if blank(line_start..span.start) && blank(span.end..line_end) {
        Span::new(line_start, line_end)
    } else {
        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_syntax::{Dialect, SyntaxEngine};

    #[test]
    fn test_need_set() {
        let mut needs = NeedSet::default();
        assert!(needs.is_empty());
        needs.insert(Need::HeadWrapper);
        needs.insert(Need::RouterHandle);
        needs.insert(Need::RouterHandle);
        let listed: Vec<_> = needs.iter().collect();
        assert_eq!(listed, vec![Need::RouterHandle, Need::HeadWrapper]);
        let other: NeedSet = [Need::ImageComponent].into_iter().collect();
        assert!(needs.union(other).contains(Need::ImageComponent));
    }

    #[test]
    fn test_import_lines() {
        let pages = ConversionSettings::default();
        let app = ConversionSettings {
            use_directory_router: true,
            ..ConversionSettings::default()
        };
        assert_eq!(
            Need::RouterHandle.import_line(&pages),
            "import { useRouter } from 'next/router';\n"
        );
        assert_eq!(
            Need::RouterHandle.import_line(&app),
            "import { useRouter } from 'next/navigation';\n"
        );
        assert_eq!(Need::LinkComponent.import_line(&app), "import Link from 'next/link';\n");
        assert_eq!(
            Need::SearchParamsHook.import_line(&app),
            "import { useSearchParams } from 'next/navigation';\n"
        );
    }

    #[test]
    fn test_hook_needs_follow_convention() {
        let pages = ConversionSettings::default();
        let app = ConversionSettings {
            use_directory_router: true,
            ..ConversionSettings::default()
        };
        assert_eq!(Need::for_hook(HookKind::Params, &pages), Need::RouterHandle);
        assert_eq!(Need::for_hook(HookKind::Params, &app), Need::ParamsHook);
        assert_eq!(Need::for_hook(HookKind::SearchParams, &app), Need::SearchParamsHook);
        assert_eq!(Need::for_hook(HookKind::Navigate, &app), Need::RouterHandle);

        let needs: NeedSet = [Need::ParamsHook, Need::LinkComponent].into_iter().collect();
        assert!(needs.has_hook());
        assert!(!NeedSet::from_iter([Need::LinkComponent]).has_hook());
    }

    #[test]
    fn test_edit_set_drops_overlaps() {
        let mut edits = EditSet::default();
        assert!(edits.push(TextEdit::replace(Span::new(0, 5), "a")));
        assert!(!edits.push(TextEdit::replace(Span::new(3, 8), "b")));
        assert!(edits.push(TextEdit::insert(5, "c")));
        assert!(!edits.push(TextEdit::insert(5, "d")));
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn test_line_span_and_comments() {
        let mut engine = SyntaxEngine::new().expect("engine");
        let text = "import a from 'a';\nconst x = /* note */ 1;\n";
        let tree = engine.parse(text, Dialect::Tsx).expect("parse");
        assert_eq!(line_span(&tree, Span::new(0, 18)), Span::new(0, 19));
        assert_eq!(line_span(&tree, Span::new(19, 24)), Span::new(19, 24));
        assert!(has_comment_before(&tree, 40, "note"));
        assert!(!has_comment_before(&tree, 19, "note"));
    }
}
