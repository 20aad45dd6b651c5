//! Classification results for a single parsed file.
//!
//! [`FileSignals`] is the read-only record the pattern classifier produces:
//! which navigation-library constructs a file uses and where. Rewrite passes
//! consume it; nothing in it is mutated after classification.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::import::ImportBinding;
use super::location::{SourceLocation, Span};

/// What a navigation-library name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConstructKind {
    /// A routing container component (`BrowserRouter`, `Routes`, `Route`, ...).
    Container,
    /// A navigation hook (`useNavigate`, `useParams`, ...).
    Hook(HookKind),
    /// A cross-page link component (`Link`, `NavLink`).
    Link,
    /// A document-head manager (`Helmet`).
    Head,
    /// A router factory function (`createBrowserRouter`, ...).
    RouterFactory,
    /// A name the classification table does not know.
    Unknown,
}

impl ConstructKind {
    /// Returns a short label for log messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Container => "routing container",
            Self::Hook(_) => "navigation hook",
            Self::Link => "link component",
            Self::Head => "head manager",
            Self::RouterFactory => "router factory",
            Self::Unknown => "unrecognized export",
        }
    }
}

/// The family a navigation hook belongs to.
///
/// The family decides what the hook call is rewritten to and whether the
/// value it returns is an imperative navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// `useNavigate`: returns a navigate function.
    Navigate,
    /// `useHistory`: returns a history object.
    History,
    /// `useLocation`: returns the current location.
    Location,
    /// `useParams`: returns route parameters.
    Params,
    /// `useSearchParams`: returns query parameters.
    SearchParams,
    /// `useMatch` / `useRouteMatch`: returns match information.
    Match,
}

impl HookKind {
    /// Returns `true` if the hook's return value performs navigation.
    #[inline]
    #[must_use]
    pub const fn is_navigator(self) -> bool {
        matches!(self, Self::Navigate | Self::History)
    }
}

/// One binding imported from a recognized library (the navigation library or
/// a document-head manager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavImport {
    /// The module specifier (`react-router-dom`).
    pub source: String,
    /// The imported binding.
    pub binding: ImportBinding,
    /// What the classification table says the binding is.
    pub kind: ConstructKind,
    /// Span of the whole import statement.
    pub statement: Span,
}

/// A call to a name listed as a navigation hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCall {
    /// The callee identifier as written.
    pub callee: String,
    /// The hook family.
    pub hook: HookKind,
    /// Whether the callee is bound by a navigation-library import.
    ///
    /// `false` means the name merely matches the table; such calls are
    /// reported for manual review but not rewritten.
    pub imported: bool,
    /// The declarator the result is assigned to (`const navigate = ...`).
    pub binding: Option<String>,
    /// Span of the call expression.
    pub span: Span,
    /// Location of the call.
    pub location: SourceLocation,
}

/// A markup element of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSignal {
    /// The element name as written (`RouterLink`, `img`).
    pub name: String,
    /// The library export the name is bound to (`NavLink`), for elements
    /// whose name comes from a recognized import.
    pub imported: Option<String>,
    /// Span of the element (opening tag through closing tag).
    pub span: Span,
    /// Location of the element.
    pub location: SourceLocation,
    /// Attributes the target convention cannot express directly.
    pub flagged_attributes: SmallVec<[String; 2]>,
}

/// HTTP method of a backend-bound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Parses a method name case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" | "DEL" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A request to a same-origin backend endpoint (`fetch('/api/users')`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCall {
    /// The endpoint path in route notation (`/api/users/[id]`).
    pub endpoint: String,
    /// The request method, `GET` unless stated otherwise.
    pub method: HttpMethod,
    /// Location of the call.
    pub location: SourceLocation,
}

/// Everything the classifier found in one file.
///
/// # Examples
///
/// ```
/// use rn_core::FileSignals;
///
/// let signals = FileSignals::default();
/// assert!(!signals.uses_navigation_library());
/// assert!(!signals.needs_rewrite());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSignals {
    /// Bindings imported from recognized libraries.
    pub nav_imports: SmallVec<[NavImport; 4]>,
    /// Calls to hook-table names.
    pub hook_calls: Vec<HookCall>,
    /// Local names holding a navigator (`navigate`, `history`).
    pub navigators: SmallVec<[String; 2]>,
    /// Link-like elements (`Link`, `NavLink`, aliases).
    pub links: Vec<ElementSignal>,
    /// Plain anchors pointing at in-app paths (`<a href="/about">`).
    pub internal_anchors: Vec<ElementSignal>,
    /// Head/title-like elements.
    pub head_elements: Vec<ElementSignal>,
    /// Raw `<img>` elements.
    pub images: Vec<ElementSignal>,
    /// `<Image>` usages with no binding for `Image` in scope.
    pub unbound_images: Vec<ElementSignal>,
    /// Routing container elements.
    pub containers: Vec<ElementSignal>,
    /// Calls to router factories (`createBrowserRouter([...])`).
    pub router_factories: Vec<ElementSignal>,
    /// Backend-bound requests.
    pub api_calls: Vec<ApiCall>,
    /// Whether the tree contains any markup.
    pub has_markup: bool,
}

impl FileSignals {
    /// Returns `true` if the file imports from the navigation library.
    #[inline]
    #[must_use]
    pub fn uses_navigation_library(&self) -> bool {
        !self.nav_imports.is_empty()
    }

    /// Returns the local names imported with the given construct kind.
    pub fn locals_of(&self, kind: ConstructKind) -> impl Iterator<Item = &str> {
        self.nav_imports
            .iter()
            .filter(move |i| i.kind == kind)
            .map(|i| i.binding.local.as_str())
    }

    /// Returns `true` if any construct calls for a rewrite.
    ///
    /// Converted output must classify as not needing a rewrite; this is
    /// what makes a second conversion run a no-op.
    #[must_use]
    pub fn needs_rewrite(&self) -> bool {
        self.uses_navigation_library()
            || self.hook_calls.iter().any(|c| c.imported)
            || !self.containers.is_empty()
            || !self.links.is_empty()
            || !self.router_factories.is_empty()
    }

    /// Returns the number of constructs that were flagged for review.
    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.hook_calls.iter().filter(|c| !c.imported).count()
            + self
                .links
                .iter()
                .map(|l| l.flagged_attributes.len())
                .sum::<usize>()
            + self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str) -> ElementSignal {
        ElementSignal {
            name: name.to_owned(),
            imported: None,
            span: Span::default(),
            location: SourceLocation::default(),
            flagged_attributes: SmallVec::new(),
        }
    }

    #[test]
    fn test_hook_kind_navigator() {
        assert!(HookKind::Navigate.is_navigator());
        assert!(HookKind::History.is_navigator());
        assert!(!HookKind::Params.is_navigator());
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("DELETE"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("options"), None);
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }

    #[test]
    fn test_locals_of() {
        let mut signals = FileSignals::default();
        signals.nav_imports.push(NavImport {
            source: "react-router-dom".to_owned(),
            binding: ImportBinding::new("Link", "RouterLink", Span::default()),
            kind: ConstructKind::Link,
            statement: Span::default(),
        });
        let links: Vec<_> = signals.locals_of(ConstructKind::Link).collect();
        assert_eq!(links, vec!["RouterLink"]);
        assert!(signals.uses_navigation_library());
        assert!(signals.needs_rewrite());
    }

    #[test]
    fn test_images_alone_do_not_need_rewrite() {
        let mut signals = FileSignals::default();
        signals.images.push(element("img"));
        assert!(!signals.needs_rewrite());
        assert_eq!(signals.flagged_count(), 1);
    }
}
