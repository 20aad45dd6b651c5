//! Framework files of the converted project.
//!
//! The skeleton is everything the target framework expects that the SPA
//! never had: the root wrapper (`pages/_app` + `pages/_document`, or
//! `app/layout`), the tool configuration, and a default page when the
//! project would otherwise have none. Global stylesheets hoisted out of
//! the sources are imported once, from the root wrapper.

use camino::{Utf8Path, Utf8PathBuf};
use rn_core::{ConversionLog, ConversionSettings, OutputCategory, OutputTree};

use crate::analyzer::{DocumentInfo, ProjectAnalysis, StylesheetRef};
use crate::pages::page_stem;
use crate::paths::{Resolution, relative_specifier, shaped_specifier};
use crate::scope::DEFAULT_EXPORT;

/// Stylesheet written when the project has no global one.
pub const DEFAULT_STYLESHEET: &str = "styles/globals.css";

const DEFAULT_STYLESHEET_TEXT: &str = "*,\n*::before,\n*::after {\n  box-sizing: border-box;\n}\n\nbody {\n  margin: 0;\n  font-family: system-ui, -apple-system, 'Segoe UI', Roboto, sans-serif;\n}\n";

const NEXT_CONFIG: &str = "/** @type {import('next').NextConfig} */\nconst nextConfig = {\n  reactStrictMode: true,\n};\n\nmodule.exports = nextConfig;\n";

const ESLINT_CONFIG: &str = "{\n  \"extends\": \"next/core-web-vitals\"\n}\n";

const NEXT_ENV: &str = "/// <reference types=\"next\" />\n/// <reference types=\"next/image-types/global\" />\n\n// NOTE: This file should not be edited\n// see https://nextjs.org/docs/basic-features/typescript for more information.\n";

const DEFAULT_TITLE: &str = "Next.js App";

/// The component the root wrapper renders around every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutComponent {
    /// Local name in the wrapper.
    pub local: String,
    /// `default` or the export name.
    pub export: String,
    /// Output path of the module defining it.
    pub module: Utf8PathBuf,
}

/// Inputs of [`write_skeleton`].
#[derive(Debug, Clone, Copy)]
pub struct Skeleton<'a> {
    /// Run settings.
    pub settings: &'a ConversionSettings,
    /// The project analysis.
    pub analysis: &'a ProjectAnalysis,
    /// Global stylesheets, in import order.
    pub hoisted: &'a [StylesheetRef],
    /// The component wrapping every page, if any.
    pub layout: Option<&'a LayoutComponent>,
}

/// Writes the framework files into `output`.
///
/// Files already in the tree are kept, except the tool configuration,
/// which always reflects the converted project.
pub fn write_skeleton(skeleton: &Skeleton<'_>, output: &mut OutputTree, log: &ConversionLog) {
    let settings = skeleton.settings;
    write_config(skeleton, output);

    let mut stylesheets = skeleton.hoisted.to_vec();
    if !stylesheets
        .iter()
        .any(|s| matches!(s, StylesheetRef::Project(_)))
    {
        output.insert_if_absent(OutputCategory::Styles, DEFAULT_STYLESHEET, DEFAULT_STYLESHEET_TEXT);
        stylesheets.push(StylesheetRef::Project(DEFAULT_STYLESHEET.into()));
    }

    let document = &skeleton.analysis.document;
    let ext = settings.page_extension();
    if settings.use_directory_router {
        let path = format!("app/layout.{ext}");
        let text = root_layout(Utf8Path::new(&path), &stylesheets, skeleton.layout, document, settings);
        output.insert_if_absent(OutputCategory::Pages, path, text);
    } else {
        let app = format!("pages/_app.{ext}");
        let text = app_wrapper(Utf8Path::new(&app), &stylesheets, skeleton.layout, document, settings);
        output.insert_if_absent(OutputCategory::Pages, app, text);
        output.insert_if_absent(
            OutputCategory::Pages,
            format!("pages/_document.{ext}"),
            document_shell(document),
        );
    }

    let index = format!("{}.{ext}", page_stem("/", settings.use_directory_router));
    if !output.contains(&index) {
        log.info(format!("no page serves '/'; wrote a default {index}"));
        output.insert(OutputCategory::Pages, index, default_index(document, settings));
    }

    if settings.include_examples {
        write_examples(settings, output);
    }
}

fn write_config(skeleton: &Skeleton<'_>, output: &mut OutputTree) {
    let settings = skeleton.settings;
    let manifest = skeleton
        .analysis
        .manifest
        .clone()
        .unwrap_or_default()
        .converted(settings);
    output.insert(OutputCategory::Config, "package.json", manifest.render());
    output.insert(OutputCategory::Config, "next.config.js", NEXT_CONFIG);
    output.insert(OutputCategory::Config, ".eslintrc.json", ESLINT_CONFIG);
    if settings.emit_typed_output {
        output.insert(OutputCategory::Config, "tsconfig.json", tsconfig());
        output.insert(OutputCategory::Config, "next-env.d.ts", NEXT_ENV);
    }
}

fn tsconfig() -> String {
    let config = serde_json::json!({
        "compilerOptions": {
            "target": "es2017",
            "lib": ["dom", "dom.iterable", "esnext"],
            "allowJs": true,
            "skipLibCheck": true,
            "strict": true,
            "noEmit": true,
            "esModuleInterop": true,
            "module": "esnext",
            "moduleResolution": "bundler",
            "resolveJsonModule": true,
            "isolatedModules": true,
            "jsx": "preserve",
            "incremental": true,
            "plugins": [{ "name": "next" }],
            "paths": { "@/*": ["./*"] }
        },
        "include": ["next-env.d.ts", "**/*.ts", "**/*.tsx", ".next/types/**/*.ts"],
        "exclude": ["node_modules"]
    });
    let mut text = serde_json::to_string_pretty(&config).unwrap_or_default();
    text.push('\n');
    text
}

fn stylesheet_imports(from: &Utf8Path, stylesheets: &[StylesheetRef]) -> String {
    stylesheets
        .iter()
        .map(|stylesheet| match stylesheet {
            StylesheetRef::Package(spec) => format!("import '{spec}';\n"),
            StylesheetRef::Project(path) => {
                format!("import '{}';\n", relative_specifier(from, path))
            }
        })
        .collect()
}

fn layout_import(from: &Utf8Path, layout: &LayoutComponent) -> String {
    let spec = shaped_specifier(from, &layout.module, Resolution::Extension);
    if layout.export == DEFAULT_EXPORT {
        format!("import {} from '{spec}';\n", layout.local)
    } else if layout.export == layout.local {
        format!("import {{ {} }} from '{spec}';\n", layout.local)
    } else {
        format!("import {{ {} as {} }} from '{spec}';\n", layout.export, layout.local)
    }
}

/// Wraps `inner` (one line of markup) in the layout component, if any.
fn wrapped(inner: &str, layout: Option<&LayoutComponent>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    match layout {
        Some(layout) => format!(
            "{pad}<{name}>\n{pad}  {inner}\n{pad}</{name}>",
            name = layout.local
        ),
        None => format!("{pad}{inner}"),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('{', "&#123;")
        .replace('}', "&#125;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

fn app_wrapper(
    path: &Utf8Path,
    stylesheets: &[StylesheetRef],
    layout: Option<&LayoutComponent>,
    document: &DocumentInfo,
    settings: &ConversionSettings,
) -> String {
    let mut text = String::new();
    if settings.emit_typed_output {
        text.push_str("import type { AppProps } from 'next/app';\n");
    }
    text.push_str("import Head from 'next/head';\n");
    if let Some(layout) = layout {
        text.push_str(&layout_import(path, layout));
    }
    text.push_str(&stylesheet_imports(path, stylesheets));

    let title = document.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let mut head = format!("        <title>{}</title>\n", escape_text(title));
    if let Some(description) = &document.description {
        head.push_str(&format!(
            "        <meta name=\"description\" content=\"{}\" />\n",
            description.replace('"', "&quot;")
        ));
    }
    head.push_str("        <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");

    let props = if settings.emit_typed_output {
        "{ Component, pageProps }: AppProps"
    } else {
        "{ Component, pageProps }"
    };
    text.push_str(&format!(
        "\nexport default function MyApp({props}) {{\n  return (\n    <>\n      <Head>\n{head}      </Head>\n{body}\n    </>\n  );\n}}\n",
        body = wrapped("<Component {...pageProps} />", layout, 6),
    ));
    text
}

fn document_shell(document: &DocumentInfo) -> String {
    let lang = document.lang.as_deref().unwrap_or("en");
    format!(
        "import {{ Html, Head, Main, NextScript }} from 'next/document';\n\n\
         export default function Document() {{\n  \
         return (\n    \
         <Html lang=\"{}\">\n      \
         <Head />\n      \
         <body>\n        \
         <Main />\n        \
         <NextScript />\n      \
         </body>\n    \
         </Html>\n  \
         );\n\
         }}\n",
        lang.replace('"', "")
    )
}

fn root_layout(
    path: &Utf8Path,
    stylesheets: &[StylesheetRef],
    layout: Option<&LayoutComponent>,
    document: &DocumentInfo,
    settings: &ConversionSettings,
) -> String {
    let typed = settings.emit_typed_output;
    let mut text = String::new();
    if typed {
        text.push_str("import type { Metadata } from 'next';\nimport type { ReactNode } from 'react';\n");
    }
    if let Some(layout) = layout {
        text.push_str(&layout_import(path, layout));
    }
    text.push_str(&stylesheet_imports(path, stylesheets));

    let title = document.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let mut metadata = format!("  title: '{}',\n", escape_literal(title));
    if let Some(description) = &document.description {
        metadata.push_str(&format!("  description: '{}',\n", escape_literal(description)));
    }
    let annotation = if typed { ": Metadata" } else { "" };
    text.push_str(&format!("\nexport const metadata{annotation} = {{\n{metadata}}};\n"));

    let props = if typed {
        "{ children }: { children: ReactNode }"
    } else {
        "{ children }"
    };
    let lang = document.lang.as_deref().unwrap_or("en").replace('"', "");
    text.push_str(&format!(
        "\nexport default function RootLayout({props}) {{\n  return (\n    <html lang=\"{lang}\">\n      <body>\n{body}\n      </body>\n    </html>\n  );\n}}\n",
        body = wrapped("{children}", layout, 8),
    ));
    text
}

fn default_index(document: &DocumentInfo, settings: &ConversionSettings) -> String {
    let title = escape_text(document.title.as_deref().unwrap_or(DEFAULT_TITLE));
    let name = if settings.use_directory_router { "Page" } else { "HomePage" };
    format!(
        "export default function {name}() {{\n  return (\n    <main>\n      <h1>{title}</h1>\n      <p>This page was generated by rr-next.</p>\n    </main>\n  );\n}}\n"
    )
}

fn write_examples(settings: &ConversionSettings, output: &mut OutputTree) {
    let page_ext = settings.page_extension();
    let script_ext = settings.script_extension();
    let (about, hello) = if settings.use_directory_router {
        (
            format!("app/about/page.{page_ext}"),
            format!("app/api/hello/route.{script_ext}"),
        )
    } else {
        (
            format!("pages/about.{page_ext}"),
            format!("pages/api/hello.{script_ext}"),
        )
    };
    output.insert_if_absent(
        OutputCategory::Pages,
        about,
        "export default function AboutPage() {\n  return (\n    <main>\n      <h1>About</h1>\n      <p>An example page.</p>\n    </main>\n  );\n}\n",
    );

    let handler = match (settings.use_directory_router, settings.emit_typed_output) {
        (true, _) => "export async function GET() {\n  return Response.json({ name: 'John Doe' });\n}\n".to_owned(),
        (false, true) => "import type { NextApiRequest, NextApiResponse } from 'next';\n\nexport default function handler(_req: NextApiRequest, res: NextApiResponse) {\n  res.status(200).json({ name: 'John Doe' });\n}\n".to_owned(),
        (false, false) => "export default function handler(req, res) {\n  res.status(200).json({ name: 'John Doe' });\n}\n".to_owned(),
    };
    output.insert_if_absent(OutputCategory::Api, hello, handler);
}
