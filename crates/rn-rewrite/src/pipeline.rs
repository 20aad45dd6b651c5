//! Runs the rewrite passes over one file.

use rn_core::{ConversionSettings, FileSignals, Language, SourceFile};
use rn_syntax::{SyntaxEngine, SyntaxTree};

use crate::classify::{KnownBindings, classify, classify_with};
use crate::error::RewriteError;
use crate::passes::{Effects, NeedSet, PASSES, PassContext};

/// The outcome of rewriting one file.
#[derive(Debug, Clone)]
pub struct FileRewrite {
    /// The rewritten text.
    pub text: String,
    /// The file's language after markup promotion.
    pub language: Language,
    /// Classification of the file as it was read.
    pub signals: FileSignals,
    /// Number of edits applied across all passes.
    pub actions: usize,
    /// Needs, advisories and notes collected from all passes.
    pub effects: Effects,
}

impl FileRewrite {
    /// Returns `true` if any pass changed the file.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.actions > 0
    }

    /// Returns the needs the rewritten file depends on.
    #[must_use]
    pub const fn needs(&self) -> NeedSet {
        self.effects.needs
    }
}

/// Parses and rewrites a source file.
///
/// # Errors
///
/// - [`RewriteError::Parse`] if the file does not parse; callers keep the
///   original text
/// - [`RewriteError::Classify`] / [`RewriteError::Pass`] if a pass fails
///
/// # Examples
///
/// ```
/// use rn_core::{ConversionSettings, SourceFile};
/// use rn_rewrite::rewrite_file;
/// use rn_syntax::SyntaxEngine;
///
/// let mut engine = SyntaxEngine::new()?;
/// let file = SourceFile::new(
///     "src/Back.js",
///     "import { useNavigate } from 'react-router-dom';\n\
///      export function Back() {\n  const navigate = useNavigate();\n  navigate(-1);\n  return null;\n}\n",
/// );
/// let rewrite = rewrite_file(&mut engine, &file, &ConversionSettings::default())?;
/// assert!(rewrite.text.contains("router.push(-1)"));
/// assert!(!rewrite.text.contains("react-router-dom"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn rewrite_file(
    engine: &mut SyntaxEngine,
    file: &SourceFile,
    settings: &ConversionSettings,
) -> Result<FileRewrite, RewriteError> {
    let tree = engine.parse_file(file).map_err(RewriteError::Parse)?;
    let rewrite = rewrite_tree(engine, tree, file.language, settings)?;
    tracing::debug!(
        path = %file.path,
        actions = rewrite.actions,
        advisories = rewrite.effects.advisories.len(),
        "rewrote file"
    );
    Ok(rewrite)
}

/// Rewrites an already parsed tree of the given language.
///
/// # Errors
///
/// See [`rewrite_file`].
pub fn rewrite_tree(
    engine: &mut SyntaxEngine,
    tree: SyntaxTree,
    language: Language,
    settings: &ConversionSettings,
) -> Result<FileRewrite, RewriteError> {
    let original = classify(&tree)?;
    let bindings = KnownBindings::from_imports(&original.nav_imports);

    let mut tree = tree;
    let mut signals = original.clone();
    let mut effects = Effects::default();
    let mut actions = 0;

    for (index, (name, pass)) in PASSES.iter().enumerate() {
        if index > 0 {
            signals = classify_with(&tree, &bindings)?;
        }
        let ctx = PassContext {
            settings,
            bindings: &bindings,
            needs: effects.needs,
        };
        let output = pass(&tree, &signals, &ctx)?;
        tracing::trace!(pass = name, edits = output.edits.len(), "pass finished");

        if !output.edits.is_empty() {
            actions += output.edits.len();
            tree = engine
                .apply(&tree, output.edits)
                .map_err(|e| RewriteError::pass(name, e))?;
        }
        effects.merge(output.effects);
    }

    Ok(FileRewrite {
        text: tree.text().to_owned(),
        language: language.with_markup(original.has_markup),
        signals: original,
        actions,
        effects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::Need;
    use crate::passes::assets::ADDED_IMPORTS_COMMENT;
    use crate::passes::calls::ROUTER_ADVISORY;
    use crate::passes::elements::IMAGE_ADVISORY;

    fn convert(path: &str, text: &str) -> FileRewrite {
        convert_with(ConversionSettings::default(), path, text)
    }

    fn convert_with(settings: ConversionSettings, path: &str, text: &str) -> FileRewrite {
        let mut engine = SyntaxEngine::new().expect("engine");
        rewrite_file(&mut engine, &SourceFile::new(path, text), &settings).expect("rewrite")
    }

    const HOME: &str = "import React from 'react';
import { useNavigate } from 'react-router-dom';

export default function Home() {
  const navigate = useNavigate();
  const goHome = () => {
    navigate('/home');
  };
  return <button onClick={goHome}>Home</button>;
}
";

    const APP: &str = "import React from 'react';
import { BrowserRouter, Routes, Route, Link } from 'react-router-dom';
import Home from './pages/Home';
import About from './pages/About';

function App() {
  return (
    <BrowserRouter>
      <nav>
        <Link to=\"/\">Home</Link>
        <Link to=\"/about\">About</Link>
      </nav>
      <Routes>
        <Route path=\"/\" element={<Home />} />
        <Route path=\"/about\" element={<About />} />
      </Routes>
    </BrowserRouter>
  );
}

export default App;
";

    #[test]
    fn test_navigate_component() {
        let rewrite = convert("src/pages/Home.js", HOME);
        let text = &rewrite.text;
        assert!(!text.contains("react-router-dom"));
        assert!(text.contains("import { useRouter } from 'next/router';"));
        assert!(text.contains("const navigate = useRouter();"));
        assert!(text.contains("router.push('/home');"));
        assert!(text.contains(ROUTER_ADVISORY));
        assert!(text.contains(ADDED_IMPORTS_COMMENT));
        assert!(rewrite.needs().contains(Need::RouterHandle));
        assert_eq!(rewrite.language, Language::Jsx);
        assert!(rewrite.changed());
    }

    #[test]
    fn test_app_component() {
        let rewrite = convert("src/App.js", APP);
        let text = &rewrite.text;
        assert!(!text.contains("react-router-dom"));
        assert!(!text.contains("BrowserRouter"));
        assert!(!text.contains("<Routes>"));
        assert!(!text.contains("<Route "));
        assert!(text.contains("function App({ children })"));
        assert!(text.contains("{children}"));
        assert!(text.contains("<Link href=\"/\">Home</Link>"));
        assert!(text.contains("<Link href=\"/about\">About</Link>"));
        assert!(text.contains("import Link from 'next/link';"));
        assert!(!text.contains("useRouter"));
    }

    #[test]
    fn test_image_only_file() {
        let rewrite = convert(
            "src/Logo.jsx",
            "export const Logo = () => (\n  <div>\n    <img src=\"/logo.png\" alt=\"logo\" />\n  </div>\n);\n",
        );
        assert_eq!(rewrite.text.matches(IMAGE_ADVISORY).count(), 1);
        assert!(!rewrite.text.contains("import Image"));
        assert_eq!(rewrite.effects.flagged, 1);
    }

    #[test]
    fn test_conversion_is_idempotent() {
        for (path, source) in [("src/pages/Home.js", HOME), ("src/App.js", APP)] {
            for settings in [
                ConversionSettings::default(),
                ConversionSettings {
                    use_directory_router: true,
                    ..ConversionSettings::default()
                },
            ] {
                let first = convert_with(settings, path, source);
                let second = convert_with(settings, path, &first.text);
                assert_eq!(second.text, first.text, "{path}");
                assert_eq!(second.actions, 0, "{path}");
                assert!(!second.signals.needs_rewrite(), "{path}");
            }
        }
    }

    #[test]
    fn test_plain_module_unchanged() {
        let source = "export function add(a: number, b: number): number {\n  return a + b;\n}\n";
        let rewrite = convert("src/math.ts", source);
        assert_eq!(rewrite.text, source);
        assert!(!rewrite.changed());
        assert_eq!(rewrite.language, Language::TypeScript);
    }

    #[test]
    fn test_parse_failure() {
        let mut engine = SyntaxEngine::new().expect("engine");
        let file = SourceFile::new("src/Broken.js", "export function ( {\n");
        let err = rewrite_file(&mut engine, &file, &ConversionSettings::default())
            .expect_err("should fail");
        assert!(err.is_parse_failure());
        assert!(err.parse_position().is_some());
    }
}
