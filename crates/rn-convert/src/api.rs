//! API route stubs.
//!
//! Same-origin requests the classifier found (`fetch('/api/users/' + id)`)
//! each get a handler stub, so the converted project answers those paths
//! with an explicit "not implemented" instead of a 404. Endpoints that
//! differ only in parameter names share one stub; the first name seen wins.

use std::collections::{BTreeMap, BTreeSet};

use rn_core::{ApiCall, ConversionSettings, HttpMethod, OutputCategory, OutputTree};

/// One endpoint and the methods called on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Endpoint path in route notation.
    pub path: String,
    /// Methods used against the endpoint, sorted.
    pub methods: BTreeSet<HttpMethod>,
}

/// Groups calls by endpoint shape, in shape order.
#[must_use]
pub fn collect_endpoints<'a>(calls: impl IntoIterator<Item = &'a ApiCall>) -> Vec<Endpoint> {
    let mut by_shape: BTreeMap<String, Endpoint> = BTreeMap::new();
    for call in calls {
        let endpoint = by_shape
            .entry(endpoint_shape(&call.endpoint))
            .or_insert_with(|| Endpoint {
                path: call.endpoint.clone(),
                methods: BTreeSet::new(),
            });
        endpoint.methods.insert(call.method);
    }
    by_shape.into_values().collect()
}

/// Writes one stub per endpoint and returns the stub paths.
pub fn place_api_stubs(
    endpoints: &[Endpoint],
    settings: &ConversionSettings,
    output: &mut OutputTree,
) -> Vec<String> {
    let mut written = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let path = stub_path(&endpoint.path, settings);
        let text = if settings.use_directory_router {
            route_handler(endpoint, settings)
        } else {
            api_handler(endpoint, settings)
        };
        if output.insert_if_absent(OutputCategory::Api, path.as_str(), text) {
            tracing::debug!(endpoint = %endpoint.path, stub = %path, "wrote api stub");
            written.push(path);
        }
    }
    written
}

/// Returns the stub file of an endpoint.
///
/// # Examples
///
/// ```
/// use rn_convert::api::stub_path;
/// use rn_core::ConversionSettings;
///
/// let pages = ConversionSettings::default();
/// assert_eq!(stub_path("/api/users/[id]", &pages), "pages/api/users/[id].js");
/// assert_eq!(stub_path("/api", &pages), "pages/api/index.js");
///
/// let app = ConversionSettings { use_directory_router: true, ..pages };
/// assert_eq!(stub_path("/api/users", &app), "app/api/users/route.js");
/// ```
#[must_use]
pub fn stub_path(endpoint: &str, settings: &ConversionSettings) -> String {
    let rest = endpoint
        .trim_start_matches('/')
        .strip_prefix("api")
        .unwrap_or(endpoint)
        .trim_matches('/');
    let ext = settings.script_extension();
    match (settings.use_directory_router, rest.is_empty()) {
        (true, true) => format!("app/api/route.{ext}"),
        (true, false) => format!("app/api/{rest}/route.{ext}"),
        (false, true) => format!("pages/api/index.{ext}"),
        (false, false) => format!("pages/api/{rest}.{ext}"),
    }
}

/// `/api/users/[id]` and `/api/users/[userId]` share a shape.
fn endpoint_shape(endpoint: &str) -> String {
    endpoint
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if segment.starts_with("[...") {
                "[...]"
            } else if segment.starts_with('[') {
                "[]"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn method_list(endpoint: &Endpoint) -> String {
    endpoint
        .methods
        .iter()
        .map(|m| format!("'{}'", m.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn api_handler(endpoint: &Endpoint, settings: &ConversionSettings) -> String {
    let (header, signature) = if settings.emit_typed_output {
        (
            "import type { NextApiRequest, NextApiResponse } from 'next';\n\n",
            "req: NextApiRequest, res: NextApiResponse",
        )
    } else {
        ("", "req, res")
    };
    format!(
        "{header}const ALLOWED = [{methods}];\n\n\
         export default function handler({signature}) {{\n  \
         if (!ALLOWED.includes(req.method ?? '')) {{\n    \
         res.setHeader('Allow', ALLOWED);\n    \
         res.status(405).json({{ error: `Method ${{req.method}} not allowed` }});\n    \
         return;\n  \
         }}\n  \
         res.status(501).json({{ error: 'Not implemented', endpoint: '{path}' }});\n\
         }}\n",
        methods = method_list(endpoint),
        path = endpoint.path,
    )
}

fn route_handler(endpoint: &Endpoint, settings: &ConversionSettings) -> String {
    let parameter = if settings.emit_typed_output {
        "_request: Request"
    } else {
        "_request"
    };
    endpoint
        .methods
        .iter()
        .map(|method| {
            format!(
                "export async function {}({parameter}) {{\n  \
                 return Response.json({{ error: 'Not implemented', endpoint: '{}' }}, {{ status: 501 }});\n\
                 }}\n",
                method.as_str(),
                endpoint.path,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rn_core::SourceLocation;

    fn call(endpoint: &str, method: HttpMethod) -> ApiCall {
        ApiCall {
            endpoint: endpoint.to_owned(),
            method,
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn test_endpoints_grouped_by_shape() {
        let calls = vec![
            call("/api/users/[id]", HttpMethod::Get),
            call("/api/users", HttpMethod::Post),
            call("/api/users/[userId]", HttpMethod::Delete),
            call("/api/users", HttpMethod::Get),
        ];
        let endpoints = collect_endpoints(&calls);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].path, "/api/users");
        assert_eq!(
            endpoints[0].methods.iter().copied().collect::<Vec<_>>(),
            vec![HttpMethod::Get, HttpMethod::Post]
        );
        assert_eq!(endpoints[1].path, "/api/users/[id]");
        assert!(endpoints[1].methods.contains(&HttpMethod::Delete));
    }

    #[test]
    fn test_pages_stub() {
        let endpoints = collect_endpoints(&[call("/api/orders/[id]", HttpMethod::Put)]);
        let mut output = OutputTree::default();
        let written = place_api_stubs(&endpoints, &ConversionSettings::default(), &mut output);
        assert_eq!(written, vec!["pages/api/orders/[id].js"]);

        let stub = &output.api["pages/api/orders/[id].js"];
        assert!(stub.starts_with("const ALLOWED = ['PUT'];"));
        assert!(stub.contains("export default function handler(req, res) {"));
        assert!(stub.contains("res.status(405)"));
        assert!(stub.contains("endpoint: '/api/orders/[id]'"));
    }

    #[test]
    fn test_route_handler_stub_typed() {
        let settings = ConversionSettings {
            use_directory_router: true,
            emit_typed_output: true,
            ..ConversionSettings::default()
        };
        let endpoints = collect_endpoints(&[
            call("/api/session", HttpMethod::Delete),
            call("/api/session", HttpMethod::Post),
        ]);
        let mut output = OutputTree::default();
        place_api_stubs(&endpoints, &settings, &mut output);

        let stub = &output.api["app/api/session/route.ts"];
        assert!(stub.contains("export async function POST(_request: Request) {"));
        assert!(stub.contains("export async function DELETE(_request: Request) {"));
        assert!(stub.find("POST").unwrap_or(0) < stub.find("DELETE").unwrap_or(0));
    }

    #[test]
    fn test_existing_file_is_kept() {
        let mut output = OutputTree::default();
        output.insert(OutputCategory::Api, "pages/api/ping.js", "handwritten");
        let endpoints = collect_endpoints(&[call("/api/ping", HttpMethod::Get)]);
        let written = place_api_stubs(&endpoints, &ConversionSettings::default(), &mut output);
        assert!(written.is_empty());
        assert_eq!(output.api["pages/api/ping.js"], "handwritten");
    }
}
