//! Route pages.
//!
//! Every [`RouteEntry`] becomes one page file under the routes directory.
//! A page is a thin wrapper that imports the route's component from its
//! new home under `components/` and renders it:
//!
//! ```text
//! /                 pages/index.js          app/page.js
//! /about            pages/about.js          app/about/page.js
//! /users/[id]       pages/users/[id].js     app/users/[id]/page.js
//! /docs/[...slug]   pages/docs/[...slug].js app/docs/[...slug]/page.js
//! *                 pages/404.js            app/not-found.js
//! ```
//!
//! Data-driven routes get request-time rendering: `getServerSideProps` in
//! `pages/`, `dynamic = 'force-dynamic'` in `app/`.
//!
//! A route below layout routes renders its component inside theirs,
//! outermost first, in both conventions:
//!
//! ```text
//! import Layout from '../components/Layout';
//! import About from '../components/About';
//!
//! export default function AboutPage(props) {
//!   return <Layout><About {...props} /></Layout>;
//! }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use rn_core::{
    ConversionLog, ConversionSettings, OutputCategory, OutputTree, RenderMode, RouteEntry,
    RouteLayout, RouteTable,
};

use crate::paths::{Resolution, shaped_specifier};
use crate::placement::Placement;
use crate::scope::ComponentRef;

/// A page written for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedPage {
    /// The normalized route pattern.
    pub route: String,
    /// The page file.
    pub path: String,
}

/// Returns the page file of a route pattern, without extension.
///
/// # Examples
///
/// ```
/// use rn_convert::pages::page_stem;
///
/// assert_eq!(page_stem("/", false), "pages/index");
/// assert_eq!(page_stem("/users/[id]", false), "pages/users/[id]");
/// assert_eq!(page_stem("*", false), "pages/404");
/// assert_eq!(page_stem("/", true), "app/page");
/// assert_eq!(page_stem("/about", true), "app/about/page");
/// assert_eq!(page_stem("*", true), "app/not-found");
/// ```
#[must_use]
pub fn page_stem(route: &str, directory_router: bool) -> String {
    let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
    let not_found = route == rn_core::NOT_FOUND_PATTERN;
    match (directory_router, not_found) {
        (false, true) => "pages/404".to_owned(),
        (true, true) => "app/not-found".to_owned(),
        (false, false) if segments.is_empty() => "pages/index".to_owned(),
        (false, false) => format!("pages/{}", segments.join("/")),
        (true, false) if segments.is_empty() => "app/page".to_owned(),
        (true, false) => format!("app/{}/page", segments.join("/")),
    }
}

/// Returns the name of the generated page component.
///
/// # Examples
///
/// ```
/// use rn_convert::pages::page_component_name;
///
/// assert_eq!(page_component_name("/"), "HomePage");
/// assert_eq!(page_component_name("/user-settings/[id]"), "UserSettingsIdPage");
/// assert_eq!(page_component_name("*"), "NotFoundPage");
/// ```
#[must_use]
pub fn page_component_name(route: &str) -> String {
    if route == rn_core::NOT_FOUND_PATTERN {
        return "NotFoundPage".to_owned();
    }
    let pascal = pascal_case(route);
    if pascal.is_empty() {
        "HomePage".to_owned()
    } else if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Page{pascal}")
    } else {
        format!("{pascal}Page")
    }
}

fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

/// Writes one page per route.
pub fn place_routes(
    routes: &RouteTable,
    placement: &Placement,
    settings: &ConversionSettings,
    output: &mut OutputTree,
    log: &ConversionLog,
) -> Vec<PlacedPage> {
    let mut placed = Vec::with_capacity(routes.len());
    for entry in routes.iter() {
        let path = format!(
            "{}.{}",
            page_stem(&entry.path, settings.use_directory_router),
            settings.page_extension()
        );
        let component = backing_component(entry, placement);
        if component.is_none() {
            log.warning(format!(
                "route '{}': component {} could not be resolved; a placeholder page was written",
                entry.raw_path,
                entry.component.as_deref().unwrap_or("(none)")
            ));
        }
        let layouts: Vec<Backing> = entry
            .layouts
            .iter()
            .filter_map(|layout| {
                let backing = layout_component(layout, placement);
                if backing.is_none() {
                    log.warning(format!(
                        "route '{}': layout {} could not be resolved; the page renders without it",
                        entry.raw_path, layout.component
                    ));
                }
                backing
            })
            .collect();
        let text = render_page(
            entry,
            component.as_ref(),
            &layouts,
            Utf8Path::new(&path),
            settings,
        );
        if output.insert_if_absent(OutputCategory::Pages, path.as_str(), text) {
            tracing::debug!(route = %entry.path, page = %path, "placed route");
        }
        placed.push(PlacedPage {
            route: entry.path.clone(),
            path,
        });
    }
    placed
}

/// Writes the index page of a project without routes.
///
/// The page renders the app component when there is one; otherwise
/// nothing is written and the skeleton's default page applies.
pub fn place_routeless_index(
    app: Option<&ComponentRef>,
    placement: &Placement,
    settings: &ConversionSettings,
    output: &mut OutputTree,
) -> Option<PlacedPage> {
    let app = app?;
    let module = placement.destination(&app.path)?.to_path_buf();
    let path = format!(
        "{}.{}",
        page_stem("/", settings.use_directory_router),
        settings.page_extension()
    );
    let mut entry = RouteEntry::new("/", Some(app.name.clone()));
    entry.component_export = Some(app.export.clone());
    let backing = Backing {
        local: app.name.clone(),
        export: app.export.clone(),
        module,
    };
    let text = render_page(&entry, Some(&backing), &[], Utf8Path::new(&path), settings);
    output
        .insert_if_absent(OutputCategory::Pages, path.as_str(), text)
        .then(|| PlacedPage {
            route: entry.path,
            path,
        })
}

/// The component a page renders, at its output location.
#[derive(Debug, Clone)]
struct Backing {
    local: String,
    export: String,
    module: Utf8PathBuf,
}

fn backing_component(entry: &RouteEntry, placement: &Placement) -> Option<Backing> {
    let local = entry.component.clone()?;
    let module = placement.destination(entry.component_path.as_deref()?)?;
    Some(Backing {
        export: entry
            .component_export
            .clone()
            .unwrap_or_else(|| crate::scope::DEFAULT_EXPORT.to_owned()),
        local,
        module: module.to_path_buf(),
    })
}

fn layout_component(layout: &RouteLayout, placement: &Placement) -> Option<Backing> {
    let module = placement.destination(layout.component_path.as_deref()?)?;
    Some(Backing {
        local: layout.component.clone(),
        export: layout
            .component_export
            .clone()
            .unwrap_or_else(|| crate::scope::DEFAULT_EXPORT.to_owned()),
        module: module.to_path_buf(),
    })
}

fn render_page(
    entry: &RouteEntry,
    backing: Option<&Backing>,
    layouts: &[Backing],
    page_path: &Utf8Path,
    settings: &ConversionSettings,
) -> String {
    let mut name = page_component_name(&entry.path);
    let data_driven = entry.mode == RenderMode::DataDriven;
    let typed = settings.emit_typed_output;
    let mut text = String::new();

    let mut imported: Vec<&str> = Vec::new();
    for component in layouts.iter().chain(backing) {
        if component.local == name {
            name = format!("{name}Route");
        }
        if imported.contains(&component.local.as_str()) {
            continue;
        }
        imported.push(&component.local);
        let specifier = shaped_specifier(page_path, &component.module, Resolution::Extension);
        text.push_str(&import_line(component, &specifier));
    }

    let body = if let Some(backing) = backing {
        if settings.use_directory_router {
            if data_driven {
                format!("<{} params={{params}} />", backing.local)
            } else {
                format!("<{} />", backing.local)
            }
        } else {
            format!("<{} {{...props}} />", backing.local)
        }
    } else {
        format!(
            "<main>\n      <h1>{}</h1>\n      {{/* rr-next: the component for this route could not be resolved */}}\n    </main>",
            entry.raw_path
        )
    };
    let body = layouts.iter().rev().fold(body, |inner, layout| {
        format!("<{0}>{inner}</{0}>", layout.local)
    });

    if settings.use_directory_router {
        if data_driven {
            text.push_str("\nexport const dynamic = 'force-dynamic';\n");
        }
        let parameters = match (data_driven, typed) {
            (true, true) => "{ params }: { params: Record<string, string | string[]> }",
            (true, false) => "{ params }",
            (false, _) => "",
        };
        text.push_str(&format!(
            "\nexport default function {name}({parameters}) {{\n  return {body};\n}}\n"
        ));
    } else {
        if data_driven && typed {
            text.push_str("import type { GetServerSideProps } from 'next';\n");
        }
        let parameters = match (backing.is_some(), typed) {
            (false, _) => "",
            (true, true) => "props: Record<string, unknown>",
            (true, false) => "props",
        };
        text.push_str(&format!(
            "\nexport default function {name}({parameters}) {{\n  return {body};\n}}\n"
        ));
        if data_driven {
            if typed {
                text.push_str(
                    "\nexport const getServerSideProps: GetServerSideProps = async ({ params }) => ({\n  props: { params: params ?? {} },\n});\n",
                );
            } else {
                text.push_str(
                    "\nexport async function getServerSideProps({ params }) {\n  return { props: { params: params ?? {} } };\n}\n",
                );
            }
        }
    }
    text.trim_start_matches('\n').to_owned()
}

fn import_line(backing: &Backing, specifier: &str) -> String {
    if backing.export == crate::scope::DEFAULT_EXPORT {
        format!("import {} from '{specifier}';\n", backing.local)
    } else if backing.export == backing.local {
        format!("import {{ {} }} from '{specifier}';\n", backing.local)
    } else {
        format!(
            "import {{ {} as {} }} from '{specifier}';\n",
            backing.export, backing.local
        )
    }
}
