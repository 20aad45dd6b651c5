//! Import information types for script files.
//!
//! These types describe import statements as the syntax engine extracts
//! them. Unlike a plain list of names, each [`ImportBinding`] keeps both the
//! exported name and the local alias, because rewrite passes match on the
//! exported name (`useNavigate`) but must rewrite uses of the local one.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::location::{SourceLocation, Span};

/// The kind of import statement.
///
/// # Examples
///
/// ```
/// use rn_core::ImportKind;
///
/// assert!(ImportKind::Named.has_bindings());
/// assert!(!ImportKind::SideEffect.has_bindings());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ImportKind {
    /// Named imports: `import { Foo, Bar } from '...'`
    Named,

    /// Default import: `import Foo from '...'` (possibly combined with named)
    Default,

    /// Namespace import: `import * as Foo from '...'`
    Namespace,

    /// Side-effect import: `import '...'`
    SideEffect,

    /// Type-only import: `import type { Foo } from '...'`
    TypeOnly,

    /// Dynamic import: `await import('...')`
    Dynamic,

    /// CommonJS require: `const x = require('...')`
    Require,
}

impl ImportKind {
    /// Returns `true` if this import brings names into scope.
    #[inline]
    #[must_use]
    pub const fn has_bindings(self) -> bool {
        !matches!(self, Self::SideEffect | Self::Dynamic)
    }

    /// Returns `true` if this is a static `import` declaration.
    #[inline]
    #[must_use]
    pub const fn is_static(self) -> bool {
        !matches!(self, Self::Dynamic | Self::Require)
    }
}

/// One name brought into scope by an import.
///
/// For `import { Link as RouterLink } from 'react-router-dom'` the binding is
/// `imported = "Link"`, `local = "RouterLink"`. Default imports use
/// `imported = "default"`; namespace imports use `imported = "*"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportBinding {
    /// The exported name in the source module.
    pub imported: String,
    /// The local identifier the name is bound to.
    pub local: String,
    /// Byte span of the specifier (named imports) or identifier.
    pub span: Span,
}

impl ImportBinding {
    /// Creates a new binding.
    #[must_use]
    pub fn new(imported: impl Into<String>, local: impl Into<String>, span: Span) -> Self {
        Self {
            imported: imported.into(),
            local: local.into(),
            span,
        }
    }

    /// Returns `true` if this binding is the module's default export.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.imported == "default"
    }

    /// Returns `true` if the local name differs from the exported name.
    #[inline]
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        !self.is_default() && self.imported != "*" && self.imported != self.local
    }
}

/// Information about an import statement in a script file.
///
/// # Examples
///
/// ```
/// use rn_core::{ImportBinding, ImportInfo, ImportKind, SourceLocation, Span};
/// use smallvec::smallvec;
///
/// let import = ImportInfo {
///     path: "react-router-dom".to_owned(),
///     kind: ImportKind::Named,
///     bindings: smallvec![ImportBinding::new("Link", "RouterLink", Span::new(9, 27))],
///     location: SourceLocation::new(1, 1, 0),
///     span: Span::new(0, 53),
/// };
///
/// assert!(import.binds_local("RouterLink"));
/// assert!(!import.is_relative());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// The module specifier without quotes, e.g. `"./components/Nav"`.
    pub path: String,

    /// The kind of import statement.
    pub kind: ImportKind,

    /// The names this import binds.
    pub bindings: SmallVec<[ImportBinding; 4]>,

    /// The location of the statement in the source file.
    pub location: SourceLocation,

    /// Byte span of the whole statement (or call, for dynamic imports).
    pub span: Span,
}

impl ImportInfo {
    /// Returns `true` if any binding introduces the given local name.
    #[must_use]
    pub fn binds_local(&self, local: &str) -> bool {
        self.bindings.iter().any(|b| b.local == local)
    }

    /// Returns the binding for an exported name, if present.
    #[must_use]
    pub fn binding_for(&self, imported: &str) -> Option<&ImportBinding> {
        self.bindings.iter().find(|b| b.imported == imported)
    }

    /// Returns `true` if the specifier is relative (`./` or `../`).
    #[inline]
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.path.starts_with("./") || self.path.starts_with("../")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn import(path: &str, bindings: SmallVec<[ImportBinding; 4]>) -> ImportInfo {
        ImportInfo {
            path: path.to_owned(),
            kind: ImportKind::Named,
            bindings,
            location: SourceLocation::default(),
            span: Span::default(),
        }
    }

    #[test]
    fn test_import_kind_predicates() {
        assert!(ImportKind::Default.has_bindings());
        assert!(ImportKind::Require.has_bindings());
        assert!(!ImportKind::Dynamic.has_bindings());
        assert!(ImportKind::TypeOnly.is_static());
        assert!(!ImportKind::Require.is_static());
    }

    #[test]
    fn test_binding_aliases() {
        let plain = ImportBinding::new("Link", "Link", Span::default());
        let aliased = ImportBinding::new("Link", "RouterLink", Span::default());
        let default = ImportBinding::new("default", "React", Span::default());
        assert!(!plain.is_aliased());
        assert!(aliased.is_aliased());
        assert!(default.is_default());
        assert!(!default.is_aliased());
    }

    #[test]
    fn test_import_lookup() {
        let info = import(
            "react-router-dom",
            smallvec![
                ImportBinding::new("useNavigate", "useNavigate", Span::default()),
                ImportBinding::new("Link", "RouterLink", Span::default()),
            ],
        );
        assert!(info.binds_local("RouterLink"));
        assert!(!info.binds_local("Link"));
        assert_eq!(
            info.binding_for("Link").map(|b| b.local.as_str()),
            Some("RouterLink")
        );
    }

    #[test]
    fn test_relative_detection() {
        assert!(import("./Nav", smallvec![]).is_relative());
        assert!(import("../styles/app.css", smallvec![]).is_relative());
        assert!(!import("react", smallvec![]).is_relative());
        assert!(!import("@/components/Nav", smallvec![]).is_relative());
    }
}
