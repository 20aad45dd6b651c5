//! Source file types for the conversion pipeline.
//!
//! A [`SourceFile`] is one entry of the input project. Its identity is the
//! normalized project-relative path; its [`Language`] decides which parse
//! dialect (if any) the pipeline uses for it.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// The language classification of a project file.
///
/// Script languages are further split by whether they carry embedded markup
/// (JSX). A `.js` file starts out as [`Language::JavaScript`] and is promoted
/// to [`Language::Jsx`] once parsing shows it contains markup.
///
/// # Examples
///
/// ```
/// use rn_core::Language;
///
/// assert_eq!(Language::from_path("src/App.tsx"), Language::Tsx);
/// assert_eq!(Language::from_path("src/index.css"), Language::Stylesheet);
/// assert!(Language::from_path("src/api.ts").is_typed());
/// assert!(!Language::from_path("public/logo.png").is_script());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Language {
    /// Plain JavaScript without markup.
    JavaScript,
    /// JavaScript with embedded markup.
    Jsx,
    /// Plain TypeScript.
    TypeScript,
    /// TypeScript with embedded markup.
    Tsx,
    /// CSS and preprocessor stylesheets.
    Stylesheet,
    /// JSON documents (`package.json`, `tsconfig.json`, ...).
    Json,
    /// HTML documents (`public/index.html`).
    Html,
    /// Binary or static assets (images, fonts, ...).
    Asset,
    /// Anything else (markdown, lock files, dotfiles).
    #[default]
    Other,
}

/// Extension table used by [`Language::from_path`].
const EXTENSION_TABLE: &[(&str, Language)] = &[
    ("js", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("jsx", Language::Jsx),
    ("ts", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("cts", Language::TypeScript),
    ("tsx", Language::Tsx),
    ("css", Language::Stylesheet),
    ("scss", Language::Stylesheet),
    ("sass", Language::Stylesheet),
    ("less", Language::Stylesheet),
    ("json", Language::Json),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("png", Language::Asset),
    ("jpg", Language::Asset),
    ("jpeg", Language::Asset),
    ("gif", Language::Asset),
    ("svg", Language::Asset),
    ("webp", Language::Asset),
    ("ico", Language::Asset),
    ("avif", Language::Asset),
    ("woff", Language::Asset),
    ("woff2", Language::Asset),
    ("ttf", Language::Asset),
    ("otf", Language::Asset),
    ("eot", Language::Asset),
    ("mp4", Language::Asset),
    ("webm", Language::Asset),
    ("mp3", Language::Asset),
    ("txt", Language::Asset),
    ("webmanifest", Language::Asset),
];

impl Language {
    /// Classifies a path by its extension.
    ///
    /// Declaration files (`.d.ts`) are TypeScript; unknown extensions are
    /// [`Language::Other`].
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let Some(ext) = Utf8Path::new(path).extension() else {
            return Self::Other;
        };
        let ext = ext.to_ascii_lowercase();
        EXTENSION_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map_or(Self::Other, |(_, language)| *language)
    }

    /// Returns `true` for any script language the syntax engine can parse.
    #[inline]
    #[must_use]
    pub const fn is_script(self) -> bool {
        matches!(
            self,
            Self::JavaScript | Self::Jsx | Self::TypeScript | Self::Tsx
        )
    }

    /// Returns `true` for the typed script dialects.
    #[inline]
    #[must_use]
    pub const fn is_typed(self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx)
    }

    /// Returns `true` if files of this language may contain markup.
    ///
    /// Plain `.js` files are included: markup in `.js` is common in
    /// single-page-application codebases, and the parse dialect for them
    /// accepts it.
    #[inline]
    #[must_use]
    pub const fn allows_markup(self) -> bool {
        !matches!(self, Self::TypeScript) && self.is_script()
    }

    /// Returns the language with markup promotion applied.
    ///
    /// Only [`Language::JavaScript`] changes (to [`Language::Jsx`]); `.ts`
    /// files cannot carry markup and other languages are unaffected.
    #[inline]
    #[must_use]
    pub const fn with_markup(self, has_markup: bool) -> Self {
        match self {
            Self::JavaScript if has_markup => Self::Jsx,
            other => other,
        }
    }

    /// Returns a human-readable label for this language.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Jsx => "JavaScript (JSX)",
            Self::TypeScript => "TypeScript",
            Self::Tsx => "TypeScript (TSX)",
            Self::Stylesheet => "Stylesheet",
            Self::Json => "JSON",
            Self::Html => "HTML",
            Self::Asset => "Asset",
            Self::Other => "Other",
        }
    }
}

/// One input file of the project being converted.
///
/// Source files are immutable once classification begins: rewrite passes
/// produce a new `SourceFile` via [`SourceFile::with_text`], which keeps the
/// before and after versions available for logging.
///
/// # Examples
///
/// ```
/// use rn_core::{Language, SourceFile};
///
/// let file = SourceFile::new("src/App.js", "export default function App() {}");
/// assert_eq!(file.language, Language::JavaScript);
/// assert_eq!(file.size, 32);
///
/// let rewritten = file.with_text("export default function App() { return null; }");
/// assert_eq!(rewritten.path, file.path);
/// assert_ne!(rewritten.text, file.text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Normalized project-relative path (forward slashes).
    pub path: Utf8PathBuf,

    /// Raw text content.
    pub text: String,

    /// Detected language.
    pub language: Language,

    /// Size of the text in bytes.
    pub size: usize,
}

impl SourceFile {
    /// Creates a source file, classifying its language from the path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let language = Language::from_path(path.as_str());
        let size = text.len();
        Self {
            path,
            text,
            language,
            size,
        }
    }

    /// Returns a copy of this file with its language overridden.
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Returns a new file with the same identity and language but new text.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: self.path.clone(),
            size: text.len(),
            text,
            language: self.language,
        }
    }

    /// Returns the file name without directories.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }

    /// Returns the file stem (name without the final extension).
    #[inline]
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.path.file_stem().unwrap_or(self.path.as_str())
    }
}
