//! The classification table.
//!
//! Every construct the rewrite passes recognize is listed here, keyed by the
//! name the source library exports. Passes never match on names directly;
//! they ask this table, so supporting another export is a one-line change.

use rn_core::{ConstructKind, HookKind};

/// Module specifiers of the navigation library.
pub const NAVIGATION_MODULES: &[&str] = &["react-router-dom", "react-router"];

/// Module specifiers of document-head managers.
pub const HEAD_MODULES: &[&str] = &["react-helmet", "react-helmet-async"];

/// Library exports and what they are.
const CONSTRUCTS: &[(&str, ConstructKind)] = &[
    // Containers
    ("BrowserRouter", ConstructKind::Container),
    ("HashRouter", ConstructKind::Container),
    ("MemoryRouter", ConstructKind::Container),
    ("StaticRouter", ConstructKind::Container),
    ("Router", ConstructKind::Container),
    ("RouterProvider", ConstructKind::Container),
    ("Routes", ConstructKind::Container),
    ("Switch", ConstructKind::Container),
    ("Route", ConstructKind::Container),
    ("Outlet", ConstructKind::Container),
    ("HelmetProvider", ConstructKind::Container),
    // Hooks
    ("useNavigate", ConstructKind::Hook(HookKind::Navigate)),
    ("useHistory", ConstructKind::Hook(HookKind::History)),
    ("useLocation", ConstructKind::Hook(HookKind::Location)),
    ("useParams", ConstructKind::Hook(HookKind::Params)),
    ("useSearchParams", ConstructKind::Hook(HookKind::SearchParams)),
    ("useMatch", ConstructKind::Hook(HookKind::Match)),
    ("useRouteMatch", ConstructKind::Hook(HookKind::Match)),
    // Links
    ("Link", ConstructKind::Link),
    ("NavLink", ConstructKind::Link),
    // Head managers
    ("Helmet", ConstructKind::Head),
    // Router factories
    ("createBrowserRouter", ConstructKind::RouterFactory),
    ("createHashRouter", ConstructKind::RouterFactory),
    ("createMemoryRouter", ConstructKind::RouterFactory),
    ("createRoutesFromElements", ConstructKind::RouterFactory),
];

/// How a routing container element is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    /// Drop the tags, keep the children (`BrowserRouter`).
    Unwrap,
    /// Replace the whole element with the layout's children (`Routes`).
    Children,
}

const CHILDREN_CONTAINERS: &[&str] = &["Routes", "Switch", "Route", "Outlet", "RouterProvider"];

/// Hook families and the expression a call is rewritten to.
const HOOK_REPLACEMENTS: &[(HookKind, &str)] = &[
    (HookKind::Navigate, "useRouter()"),
    (HookKind::History, "useRouter()"),
    (HookKind::Location, "useRouter()"),
    (HookKind::Match, "useRouter()"),
    (HookKind::Params, "useRouter().query"),
    (HookKind::SearchParams, "useRouter().query"),
];

/// Replacements that differ in the app-directory convention, whose router
/// handle has no query.
const DIRECTORY_HOOK_REPLACEMENTS: &[(HookKind, &str)] = &[
    (HookKind::Params, "useParams()"),
    (HookKind::SearchParams, "useSearchParams()"),
];

/// History methods and their router-handle equivalents.
const HISTORY_METHODS: &[(&str, &str)] = &[
    ("push", "push"),
    ("replace", "replace"),
    ("goBack", "back"),
    ("back", "back"),
    ("goForward", "forward"),
    ("forward", "forward"),
];

/// Link attributes the target link component has no equivalent for.
pub const ACTIVE_STATE_ATTRIBUTES: &[&str] =
    &["activeClassName", "activeStyle", "isActive", "exact", "end", "strict"];

/// Attributes that are flagged only when their value is a function of the
/// active state (`className={({ isActive }) => ...}`).
pub const ACTIVE_STATE_CALLBACK_ATTRIBUTES: &[&str] = &["className", "style", "children"];

/// Plain (lower-case) element names treated as head content.
pub const TITLE_ELEMENTS: &[&str] = &["title"];

/// Name of the router handle variable navigator calls are rewritten to use.
pub const ROUTER_HANDLE: &str = "router";

/// Returns `true` if `path` is a navigation-library module.
#[must_use]
pub fn is_navigation_module(path: &str) -> bool {
    NAVIGATION_MODULES.contains(&path)
}

/// Returns `true` if `path` is any module the passes recognize.
#[must_use]
pub fn is_recognized_module(path: &str) -> bool {
    is_navigation_module(path) || HEAD_MODULES.contains(&path)
}

/// Looks up a library export.
///
/// # Examples
///
/// ```
/// use rn_core::{ConstructKind, HookKind};
/// use rn_rewrite::table;
///
/// assert_eq!(table::construct("useParams"), ConstructKind::Hook(HookKind::Params));
/// assert_eq!(table::construct("withRouter"), ConstructKind::Unknown);
/// ```
#[must_use]
pub fn construct(name: &str) -> ConstructKind {
    CONSTRUCTS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map_or(ConstructKind::Unknown, |(_, kind)| *kind)
}

/// Returns the hook family of a name, if the table lists it as a hook.
#[must_use]
pub fn hook(name: &str) -> Option<HookKind> {
    match construct(name) {
        ConstructKind::Hook(kind) => Some(kind),
        _ => None,
    }
}

/// Returns the expression a hook call is rewritten to.
#[must_use]
pub fn hook_replacement(kind: HookKind, directory_router: bool) -> &'static str {
    let directory: &[(HookKind, &str)] = if directory_router {
        DIRECTORY_HOOK_REPLACEMENTS
    } else {
        &[]
    };
    directory
        .iter()
        .chain(HOOK_REPLACEMENTS)
        .find(|(candidate, _)| *candidate == kind)
        .map_or("useRouter()", |(_, replacement)| *replacement)
}

/// Returns the router-handle method a history method maps to.
#[must_use]
pub fn history_method(name: &str) -> Option<&'static str> {
    HISTORY_METHODS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, method)| *method)
}

/// Returns how a container export is removed.
#[must_use]
pub fn container_action(exported: &str) -> ContainerAction {
    if CHILDREN_CONTAINERS.contains(&exported) {
        ContainerAction::Children
    } else {
        ContainerAction::Unwrap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules() {
        assert!(is_navigation_module("react-router-dom"));
        assert!(!is_navigation_module("react-helmet"));
        assert!(is_recognized_module("react-helmet-async"));
        assert!(!is_recognized_module("next/router"));
    }

    #[test]
    fn test_constructs() {
        assert_eq!(construct("BrowserRouter"), ConstructKind::Container);
        assert_eq!(construct("NavLink"), ConstructKind::Link);
        assert_eq!(construct("Helmet"), ConstructKind::Head);
        assert_eq!(construct("createBrowserRouter"), ConstructKind::RouterFactory);
        assert_eq!(hook("useHistory"), Some(HookKind::History));
        assert_eq!(hook("Link"), None);
    }

    #[test]
    fn test_replacements() {
        assert_eq!(hook_replacement(HookKind::Navigate, false), "useRouter()");
        assert_eq!(hook_replacement(HookKind::Params, false), "useRouter().query");
        assert_eq!(hook_replacement(HookKind::Params, true), "useParams()");
        assert_eq!(hook_replacement(HookKind::SearchParams, true), "useSearchParams()");
        assert_eq!(hook_replacement(HookKind::Location, true), "useRouter()");
        assert_eq!(history_method("goBack"), Some("back"));
        assert_eq!(history_method("listen"), None);
        assert_eq!(container_action("Routes"), ContainerAction::Children);
        assert_eq!(container_action("BrowserRouter"), ContainerAction::Unwrap);
    }
}
