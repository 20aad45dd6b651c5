//! The project's `package.json`.
//!
//! [`PackageManifest`] reads the parts of a manifest the converter cares
//! about; [`PackageManifest::converted`] produces the manifest of the
//! converted project: packages that have no role under the target framework
//! removed, the framework added, and its scripts installed.

use std::collections::BTreeMap;

use rn_core::ConversionSettings;
use serde::{Deserialize, Serialize};

/// Packages with no role in the converted project.
pub const INCOMPATIBLE_PACKAGES: &[&str] = &[
    "react-scripts",
    "react-router-dom",
    "react-router",
    "react-helmet",
    "react-helmet-async",
    "@reach/router",
    "connected-react-router",
    "react-app-rewired",
    "@craco/craco",
    "vite",
    "@vitejs/plugin-react",
    "react-snap",
];

/// Version requirements of the packages the converted project adds.
const FRAMEWORK_DEPENDENCIES: &[(&str, &str)] = &[
    ("next", "^14.2.0"),
    ("react", "^18.2.0"),
    ("react-dom", "^18.2.0"),
];

const LINT_DEV_DEPENDENCIES: &[(&str, &str)] =
    &[("eslint", "^8.57.0"), ("eslint-config-next", "^14.2.0")];

const TYPED_DEV_DEPENDENCIES: &[(&str, &str)] = &[
    ("typescript", "^5.4.0"),
    ("@types/node", "^20.12.0"),
    ("@types/react", "^18.2.0"),
    ("@types/react-dom", "^18.2.0"),
];

const SCRIPTS: &[(&str, &str)] = &[
    ("dev", "next dev"),
    ("build", "next build"),
    ("start", "next start"),
    ("lint", "next lint"),
];

const DEFAULT_NAME: &str = "next-app";

/// A `package.json` file.
///
/// Unknown fields are dropped: the converted manifest only carries what
/// the target framework uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Package version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether the package is private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    /// npm scripts.
    pub scripts: BTreeMap<String, String>,
    /// Runtime dependencies.
    pub dependencies: BTreeMap<String, String>,
    /// Development dependencies.
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Parses a manifest.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed manifests.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns the declared packages [`INCOMPATIBLE_PACKAGES`] lists, sorted.
    #[must_use]
    pub fn incompatible(&self) -> Vec<String> {
        let mut found: Vec<String> = self
            .dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .filter(|name| is_incompatible(name))
            .cloned()
            .collect();
        found.sort();
        found.dedup();
        found
    }

    /// Returns the manifest of the converted project.
    ///
    /// # Examples
    ///
    /// ```
    /// use rn_convert::manifest::PackageManifest;
    /// use rn_core::ConversionSettings;
    ///
    /// let original = PackageManifest::parse(
    ///     r#"{"name": "shop", "dependencies": {"react": "^18.2.0", "react-router-dom": "^6.22.0"}}"#,
    /// )?;
    /// let converted = original.converted(&ConversionSettings::default());
    /// assert!(converted.dependencies.contains_key("next"));
    /// assert!(!converted.dependencies.contains_key("react-router-dom"));
    /// assert_eq!(converted.scripts["dev"], "next dev");
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    #[must_use]
    pub fn converted(&self, settings: &ConversionSettings) -> Self {
        let mut manifest = Self {
            name: Some(self.name.clone().unwrap_or_else(|| DEFAULT_NAME.to_owned())),
            version: Some(self.version.clone().unwrap_or_else(|| "0.1.0".to_owned())),
            private: Some(self.private.unwrap_or(true)),
            scripts: self
                .scripts
                .iter()
                .filter(|(_, command)| !mentions_incompatible_tool(command))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            dependencies: retain_compatible(&self.dependencies),
            dev_dependencies: retain_compatible(&self.dev_dependencies),
        };

        for (name, command) in SCRIPTS {
            manifest
                .scripts
                .insert((*name).to_owned(), (*command).to_owned());
        }
        for (name, version) in FRAMEWORK_DEPENDENCIES {
            if *name == "next" || !manifest.dependencies.contains_key(*name) {
                manifest
                    .dependencies
                    .insert((*name).to_owned(), (*version).to_owned());
            }
        }
        let mut dev: Vec<(&str, &str)> = LINT_DEV_DEPENDENCIES.to_vec();
        if settings.emit_typed_output {
            dev.extend_from_slice(TYPED_DEV_DEPENDENCIES);
        }
        for (name, version) in dev {
            if !manifest.dependencies.contains_key(name) {
                manifest
                    .dev_dependencies
                    .entry(name.to_owned())
                    .or_insert_with(|| version.to_owned());
            }
        }
        manifest
    }

    /// Renders the manifest as pretty-printed JSON with a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_owned());
        text.push('\n');
        text
    }
}

/// Returns `true` if `name` is listed in [`INCOMPATIBLE_PACKAGES`].
#[must_use]
pub fn is_incompatible(name: &str) -> bool {
    INCOMPATIBLE_PACKAGES.contains(&name)
}

fn retain_compatible(packages: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    packages
        .iter()
        .filter(|(name, _)| !is_incompatible(name))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Scripts that invoke the replaced toolchain are dropped.
fn mentions_incompatible_tool(command: &str) -> bool {
    ["react-scripts", "react-app-rewired", "craco", "vite", "react-snap"]
        .iter()
        .any(|tool| command.contains(tool))
}
