//! Project-relative path handling.
//!
//! Input paths are normalized once at ingestion; everything downstream works
//! with forward-slash paths relative to the project root. Module specifiers
//! (`./pages/Home`, `../styles/app.css`) are resolved against the set of
//! ingested files the way a bundler would: exact match first, then with a
//! script extension appended, then as a directory index.

use camino::{Utf8Path, Utf8PathBuf};

/// Extensions tried when a specifier omits one, in resolution order.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// How a specifier matched its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The specifier named the file, extension included.
    Exact,
    /// A script extension was appended.
    Extension,
    /// The specifier named a directory with an index file.
    Index,
}

/// Normalizes an input path to project-relative form.
///
/// Backslashes become slashes; `.` segments, empty segments and leading
/// slashes are dropped. Paths with `..` segments or nothing left are
/// rejected.
///
/// # Examples
///
/// ```
/// use rn_convert::paths::normalize_input_path;
///
/// assert_eq!(normalize_input_path(".\\src\\App.js").as_deref(), Some("src/App.js"));
/// assert_eq!(normalize_input_path("/src//pages/./Home.js").as_deref(), Some("src/pages/Home.js"));
/// assert_eq!(normalize_input_path("../secret.js"), None);
/// ```
#[must_use]
pub fn normalize_input_path(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => parts.push(other),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Joins a relative specifier onto the directory of `from`.
///
/// Returns `None` if the specifier climbs above the project root.
#[must_use]
pub fn join_relative(from: &Utf8Path, specifier: &str) -> Option<Utf8PathBuf> {
    let mut parts: Vec<&str> = from
        .parent()
        .map(|dir| dir.as_str().split('/').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    (!parts.is_empty()).then(|| Utf8PathBuf::from(parts.join("/")))
}

/// Resolves a relative module specifier against the files `exists` knows.
#[must_use]
pub fn resolve_module(
    from: &Utf8Path,
    specifier: &str,
    exists: impl Fn(&str) -> bool,
) -> Option<(Utf8PathBuf, Resolution)> {
    if !(specifier.starts_with("./") || specifier.starts_with("../") || specifier == ".") {
        return None;
    }
    let base = join_relative(from, specifier)?;
    if exists(base.as_str()) {
        return Some((base, Resolution::Exact));
    }
    for ext in SCRIPT_EXTENSIONS {
        let candidate = format!("{base}.{ext}");
        if exists(&candidate) {
            return Some((candidate.into(), Resolution::Extension));
        }
    }
    for ext in SCRIPT_EXTENSIONS {
        let candidate = format!("{base}/index.{ext}");
        if exists(&candidate) {
            return Some((candidate.into(), Resolution::Index));
        }
    }
    None
}

/// Returns the relative specifier from the file `from` to the file `to`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use rn_convert::paths::relative_specifier;
///
/// assert_eq!(
///     relative_specifier(Utf8Path::new("pages/about.js"), Utf8Path::new("components/About.js")),
///     "../components/About.js"
/// );
/// assert_eq!(
///     relative_specifier(Utf8Path::new("components/App.js"), Utf8Path::new("components/Nav.js")),
///     "./Nav.js"
/// );
/// ```
#[must_use]
pub fn relative_specifier(from: &Utf8Path, to: &Utf8Path) -> String {
    let from_dir: Vec<&str> = from
        .parent()
        .map(|dir| dir.as_str().split('/').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let target: Vec<&str> = to.as_str().split('/').filter(|s| !s.is_empty()).collect();

    let common = from_dir
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();
    let ups = from_dir.len() - common;
    let rest = target[common..].join("/");

    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

/// Returns the specifier from `from` to `to`, shaped like the original
/// specifier was (extension dropped, or directory index form).
#[must_use]
pub fn shaped_specifier(from: &Utf8Path, to: &Utf8Path, resolution: Resolution) -> String {
    let specifier = relative_specifier(from, to);
    match resolution {
        Resolution::Exact => specifier,
        Resolution::Extension => strip_extension(&specifier).to_owned(),
        Resolution::Index => match specifier.rsplit_once('/') {
            Some((dir, _)) => dir.to_owned(),
            None => specifier,
        },
    }
}

/// Returns `path` without its final extension.
#[must_use]
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Returns `path` relative to `root`, or `path` itself when it lies outside.
#[must_use]
pub fn strip_root<'a>(path: &'a str, root: &str) -> &'a str {
    if root.is_empty() {
        return path;
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_input_path() {
        assert_eq!(normalize_input_path("src/App.js").as_deref(), Some("src/App.js"));
        assert_eq!(normalize_input_path("./src/App.js").as_deref(), Some("src/App.js"));
        assert_eq!(normalize_input_path("src\\pages\\Home.js").as_deref(), Some("src/pages/Home.js"));
        assert_eq!(normalize_input_path("//a//b").as_deref(), Some("a/b"));
        assert_eq!(normalize_input_path("src/../x.js"), None);
        assert_eq!(normalize_input_path("./"), None);
        assert_eq!(normalize_input_path(""), None);
    }

    #[test]
    fn test_join_relative() {
        let from = Utf8Path::new("src/pages/Home.js");
        assert_eq!(join_relative(from, "./About").as_deref(), Some(Utf8Path::new("src/pages/About")));
        assert_eq!(
            join_relative(from, "../styles/app.css").as_deref(),
            Some(Utf8Path::new("src/styles/app.css"))
        );
        assert_eq!(join_relative(Utf8Path::new("App.js"), "../x"), None);
    }

    #[test]
    fn test_resolve_module() {
        let files = ["src/pages/Home.jsx", "src/components/index.js", "src/index.css"];
        let exists = |p: &str| files.contains(&p);
        let from = Utf8Path::new("src/App.js");

        assert_eq!(
            resolve_module(from, "./pages/Home", exists),
            Some(("src/pages/Home.jsx".into(), Resolution::Extension))
        );
        assert_eq!(
            resolve_module(from, "./components", exists),
            Some(("src/components/index.js".into(), Resolution::Index))
        );
        assert_eq!(
            resolve_module(from, "./index.css", exists),
            Some(("src/index.css".into(), Resolution::Exact))
        );
        assert_eq!(resolve_module(from, "./missing", exists), None);
        assert_eq!(resolve_module(from, "react", exists), None);
    }

    #[test]
    fn test_relative_specifier() {
        assert_eq!(
            relative_specifier(Utf8Path::new("pages/users/[id].js"), Utf8Path::new("components/User.js")),
            "../../components/User.js"
        );
        assert_eq!(
            relative_specifier(Utf8Path::new("app/layout.js"), Utf8Path::new("styles/index.css")),
            "../styles/index.css"
        );
        assert_eq!(
            relative_specifier(Utf8Path::new("components/a/B.js"), Utf8Path::new("components/a/c/D.js")),
            "./c/D.js"
        );
    }

    #[test]
    fn test_shaped_specifier() {
        let from = Utf8Path::new("pages/index.js");
        assert_eq!(
            shaped_specifier(from, Utf8Path::new("components/Home.jsx"), Resolution::Extension),
            "../components/Home"
        );
        assert_eq!(
            shaped_specifier(from, Utf8Path::new("components/ui/index.js"), Resolution::Index),
            "../components/ui"
        );
        assert_eq!(
            shaped_specifier(from, Utf8Path::new("styles/a.css"), Resolution::Exact),
            "../styles/a.css"
        );
    }

    #[test]
    fn test_strip_helpers() {
        assert_eq!(strip_extension("components/Nav.module.css"), "components/Nav.module");
        assert_eq!(strip_extension("./x/.env"), "./x/.env");
        assert_eq!(strip_extension("../a/b"), "../a/b");
        assert_eq!(strip_root("src/App.js", "src"), "App.js");
        assert_eq!(strip_root("public/a.png", "src"), "public/a.png");
        assert_eq!(strip_root("App.js", ""), "App.js");
    }
}
