//! Project analysis, route placement and the conversion orchestrator.
//!
//! This crate turns a React-Router single-page application, given as a
//! path-to-text map, into a Next.js project. It analyzes the project once,
//! rewrites every script in parallel with `rn-rewrite`, lays the results
//! out in the target framework's conventions, and validates the output.
//!
//! # Overview
//!
//! The main entry point is [`Converter`], which combines:
//!
//! - [`analyzer`]: typed-dialect detection, router configuration, route
//!   table, bootstrap file and package manifest
//! - [`placement`]: where every input file lands, with import retargeting
//!   and stylesheet hoisting
//! - [`pages`] and [`api`]: generated route pages and API handler stubs
//! - [`skeleton`]: the framework files the SPA never had
//! - [`validator`]: structural checks of the finished tree
//! - [`ConvertStats`]: atomic counters for the run
//!
//! [`ProjectWalker`] reads a project directory into the map the converter
//! accepts.
//!
//! # Example
//!
//! ```
//! use rn_convert::Converter;
//! use rn_core::SettingsInput;
//!
//! let converter = Converter::new(SettingsInput { app_dir: true, ..SettingsInput::default() });
//! let result = converter.convert([
//!     ("src/pages/About.js", "export default function About() { return <p>About</p>; }\n"),
//! ]);
//!
//! assert!(result.output.contains("app/layout.js"));
//! for (category, path, _) in result.output.iter() {
//!     println!("{category:?} {path}");
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Converter (main entry point)
//!     │
//!     ├── ingest (path normalization, ignored directories)
//!     │
//!     ├── analyzer (sequential, one SyntaxEngine)
//!     │       │
//!     │       └── routes (route table from the router configuration)
//!     │
//!     ├── rewrite passes (rayon pool, SyntaxEngine per worker)
//!     │
//!     ├── placement ── pages ── api ── skeleton
//!     │
//!     └── validator (synthesizes missing skeleton pieces)
//! ```
//!
//! # Performance
//!
//! - **CPU**: O(files/threads) for the rewrite passes with rayon work-stealing
//! - **Locking**: the log mutex is the only lock; counters are atomics

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod api;
mod error;
pub mod manifest;
mod orchestrator;
pub mod pages;
pub mod paths;
pub mod placement;
pub mod routes;
pub mod scope;
pub mod skeleton;
mod stats;
pub mod validator;
mod walker;

pub use analyzer::{ProjectAnalysis, analyze};
pub use error::ConvertError;
pub use orchestrator::{AnalysisReport, Converter, convert_project};
pub use stats::{ConvertStats, StatsSnapshot};
pub use walker::{ProjectFiles, ProjectWalker};

#[cfg(test)]
mod tests {
    use super::*;
    use rn_core::{ConversionResult, ConversionState, OutputCategory, SettingsInput, Severity};
    use rn_rewrite::passes::elements::IMAGE_ADVISORY;

    const APP: &str = "import React from 'react';
import { BrowserRouter, Routes, Route, Link } from 'react-router-dom';
import Home from './pages/Home';
import About from './pages/About';
import './App.css';

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

    const INDEX: &str = "import React from 'react';
import ReactDOM from 'react-dom/client';
import './index.css';
import App from './App';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);
";

    const HOME: &str = "import React from 'react';
import { useNavigate } from 'react-router-dom';

export default function Home() {
  const navigate = useNavigate();
  return <button onClick={() => navigate('/home')}>Go</button>;
}
";

    const ABOUT: &str = "export default function About() {\n  return <h1>About</h1>;\n}\n";

    fn spa() -> Vec<(&'static str, &'static str)> {
        vec![
            ("src/App.js", APP),
            ("src/index.js", INDEX),
            ("src/pages/Home.js", HOME),
            ("src/pages/About.js", ABOUT),
            ("src/App.css", "nav { display: flex; }\n"),
            ("src/index.css", "body { margin: 0; }\n"),
            (
                "public/index.html",
                "<!DOCTYPE html><html lang=\"en\"><head><title>My SPA</title></head><body><div id=\"root\"></div></body></html>",
            ),
        ]
    }

    fn convert(files: Vec<(&str, &str)>) -> ConversionResult {
        Converter::new(SettingsInput::default()).convert(files)
    }

    fn errors_mentioning(result: &ConversionResult, path: &str) -> usize {
        result
            .entries
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .filter(|e| e.path.as_deref().is_some_and(|p| p == path) || e.message.contains(path))
            .count()
    }

    #[test]
    fn test_zero_files() {
        let result = convert(Vec::new());
        assert_eq!(result.stats.total_files, 0);
        assert!(!result.output.pages.is_empty());
        assert!(result.output.contains("pages/index.js"));
        assert_eq!(result.state, ConversionState::CompletedWithWarnings);
        assert!(result.validation.valid);
    }

    #[test]
    fn test_zero_files_with_examples() {
        let input = SettingsInput {
            include_examples: true,
            ..SettingsInput::default()
        };
        let result = convert_project(Vec::<(String, String)>::new(), &input);
        assert!(result.output.contains("pages/about.js"));
        assert!(result.output.contains("pages/api/hello.js"));
    }

    #[test]
    fn test_two_route_app() {
        let result = convert(spa());
        assert!(result.is_success());

        assert!(result.output.pages.contains_key("pages/index.js"));
        assert!(result.output.pages.contains_key("pages/about.js"));
        assert_eq!(result.analysis.routes.len(), 2);

        for (_, path, text) in result.output.iter() {
            assert!(!text.contains("BrowserRouter"), "{path}");
            assert!(!text.contains("react-router-dom"), "{path}");
        }

        let app = result.output.get("components/App.js").expect("app component");
        assert!(app.contains("{children}"));
        assert!(!app.contains("App.css"));

        let wrapper = &result.output.pages["pages/_app.js"];
        assert!(wrapper.contains("import App from '../components/App';"));
        assert!(wrapper.contains("import '../styles/index.css';\nimport '../styles/App.css';\n"));
        assert!(wrapper.contains("<title>My SPA</title>"));

        let index = &result.output.pages["pages/index.js"];
        assert!(index.contains("import Home from '../components/pages/Home';"));

        assert!(!result.output.contains("components/index.js"));
        assert!(!result.output.contains("public/index.html"));
        assert!(result.validation.valid, "{:?}", result.validation);
    }

    #[test]
    fn test_navigate_scenario() {
        let result = convert(spa());
        let home = result.output.get("components/pages/Home.js").expect("home");
        assert!(home.contains("useRouter()"));
        assert!(!home.contains("useNavigate"));
        assert!(home.contains("router.push('/home')"));
        let advisories = result
            .entries
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .filter(|e| e.path.as_deref().is_some_and(|p| p == "src/pages/Home.js"))
            .count();
        assert_eq!(advisories, 1);
    }

    #[test]
    fn test_image_scenario() {
        let source = "export default function Logo() {\n  return <img src=\"/logo.png\" alt=\"logo\" />;\n}\n";
        let result = convert(vec![("src/Logo.js", source)]);
        let logo = result.output.get("components/Logo.js").expect("logo");
        assert!(logo.contains("<img src=\"/logo.png\" alt=\"logo\" />"));
        assert_eq!(logo.matches(IMAGE_ADVISORY).count(), 1);
        assert!(logo.contains(&format!("/* {IMAGE_ADVISORY} */ <img")));
        assert!(!logo.contains("from 'next/image'"));
    }

    #[test]
    fn test_link_passed_as_component_is_imported() {
        let nav = "import { Link } from 'react-router-dom';
import Button from './Button';

export default function Nav() {
  return <Button component={Link} to=\"/about\">About</Button>;
}
";
        let mut files = spa();
        files.push(("src/components/Nav.js", nav));
        files.push(("src/components/Button.js", "export default (props) => <button {...props} />;\n"));
        let result = convert(files);

        let nav = result.output.get("components/Nav.js").expect("nav");
        assert!(nav.contains("import Link from 'next/link';"), "{nav}");
        assert!(nav.contains("component={Link}"));
        assert!(!nav.contains("react-router-dom"));
        assert!(
            !result.validation.warnings.iter().any(|w| w.contains("Nav.js")),
            "{:?}",
            result.validation.warnings
        );
    }

    const LAYOUT_APP: &str = "import { BrowserRouter, Routes, Route } from 'react-router-dom';
import Layout from './Layout';
import Home from './pages/Home';
import About from './pages/About';

export default function App() {
  return (
    <BrowserRouter>
      <Routes>
        <Route path=\"/\" element={<Layout />}>
          <Route index element={<Home />} />
          <Route path=\"about\" element={<About />} />
        </Route>
      </Routes>
    </BrowserRouter>
  );
}
";

    const LAYOUT: &str = "import { Link, Outlet } from 'react-router-dom';

export default function Layout() {
  return (
    <div>
      <nav><Link to=\"/about\">About</Link></nav>
      <Outlet />
    </div>
  );
}
";

    fn layout_spa() -> Vec<(&'static str, &'static str)> {
        vec![
            ("src/App.js", LAYOUT_APP),
            ("src/index.js", INDEX),
            ("src/Layout.js", LAYOUT),
            ("src/pages/Home.js", HOME),
            ("src/pages/About.js", ABOUT),
            ("src/index.css", "body { margin: 0; }\n"),
        ]
    }

    #[test]
    fn test_layout_route_wraps_pages() {
        let result = convert(layout_spa());
        assert_eq!(result.analysis.routes.len(), 2);

        let index = &result.output.pages["pages/index.js"];
        assert!(index.contains("import Layout from '../components/Layout';"), "{index}");
        assert!(index.contains("<Layout><Home {...props} /></Layout>"));
        let about = &result.output.pages["pages/about.js"];
        assert!(about.contains("<Layout><About {...props} /></Layout>"), "{about}");

        let layout = result.output.get("components/Layout.js").expect("layout");
        assert!(layout.contains("{children}"));
        assert!(!layout.contains("Outlet"));
        assert!(layout.contains("import Link from 'next/link';"));
        assert!(result.validation.valid, "{:?}", result.validation);
    }

    #[test]
    fn test_layout_route_in_directory_router() {
        let input = SettingsInput {
            app_dir: true,
            ..SettingsInput::default()
        };
        let result = convert_project(layout_spa(), &input);
        let about = &result.output.pages["app/about/page.js"];
        assert!(about.contains("import Layout from '../../components/Layout';"), "{about}");
        assert!(about.contains("<Layout><About /></Layout>"));
    }

    #[test]
    fn test_unparseable_file_passes_through() {
        let broken = "export default function Broken( {\n  return <div>;\n";
        let mut files = spa();
        files.push(("src/components/Broken.js", broken));
        let result = convert(files);

        assert_eq!(result.output.components["components/Broken.js"], broken);
        assert_eq!(
            result.output.category_of("components/Broken.js"),
            Some(OutputCategory::Components)
        );
        assert_eq!(errors_mentioning(&result, "src/components/Broken.js"), 1);
        assert_eq!(result.stats.failed_files, 1);
        assert_eq!(result.state, ConversionState::CompletedWithWarnings);
    }

    #[test]
    fn test_duplicate_route_is_reported() {
        let app = "import { BrowserRouter, Routes, Route } from 'react-router-dom';
import Home from './Home';
import Other from './Other';

export default function App() {
  return (
    <BrowserRouter>
      <Routes>
        <Route path=\"/users/:id\" element={<Home />} />
        <Route path=\"/users/:userId\" element={<Other />} />
      </Routes>
    </BrowserRouter>
  );
}
";
        let result = convert(vec![
            ("src/App.js", app),
            ("src/Home.js", "export default () => <p>home</p>;\n"),
            ("src/Other.js", "export default () => <p>other</p>;\n"),
        ]);
        assert!(result.analysis.routes.is_empty());
        assert!(
            result
                .logs
                .errors
                .iter()
                .any(|e| e.contains("route extraction failed") && e.contains("/users")),
            "{:?}",
            result.logs.errors
        );
        assert!(result.output.contains("pages/index.js"));
        assert!(result.is_success());
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let first = convert(spa());
        let converted: Vec<(String, String)> = first
            .output
            .iter()
            .filter(|(category, _, _)| *category != OutputCategory::Config)
            .map(|(_, path, text)| (path.to_owned(), text.to_owned()))
            .collect();
        let second = Converter::new(SettingsInput::default()).convert(converted);
        assert_eq!(second.stats.rewrite_actions, 0, "{:?}", second.logs);
        assert_eq!(second.stats.converted_files, 0);
    }

    #[test]
    fn test_directory_router_output() {
        let input = SettingsInput {
            app_dir: true,
            typescript: true,
            ..SettingsInput::default()
        };
        let result = convert_project(spa(), &input);
        assert!(result.output.contains("app/page.tsx"));
        assert!(result.output.contains("app/about/page.tsx"));
        assert!(result.output.contains("app/layout.tsx"));
        assert!(result.output.contains("tsconfig.json"));
        let home = result.output.get("components/pages/Home.js").expect("home");
        assert!(home.starts_with("'use client';"));
        assert!(home.contains("from 'next/navigation'"));
    }

    #[test]
    fn test_api_calls_become_stubs() {
        let source = "export async function load(id) {\n  const res = await fetch(`/api/users/${id}`);\n  return res.json();\n}\n";
        let result = convert(vec![("src/api.js", source)]);
        assert!(result.output.api.contains_key("pages/api/users/[id].js"));
    }

    #[test]
    fn test_result_json_shape() {
        let result = convert(spa());
        let json = serde_json::to_value(&result).expect("serialize");
        assert!(json["pages"]["pages/index.js"].is_string());
        assert!(json["fileStructure"]["children"].is_array());
        assert_eq!(json["stats"]["totalFiles"], 7);
        assert!(json["logs"]["info"].is_array());
    }
}
