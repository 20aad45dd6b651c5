//! The output file tree of a conversion run.
//!
//! [`OutputTree`] keeps one ordered map per [`OutputCategory`]. Keys are the
//! full project-relative output paths (`pages/about.js`,
//! `components/Nav.jsx`, `next.config.js`), so a tree can be written to disk
//! without consulting the category.
//!
//! [`FileNode`] is the nested directory view the result exposes as
//! `fileStructure`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The category an output file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCategory {
    /// Route pages and layouts (`pages/`, `app/`).
    Pages,
    /// Relocated source modules (`components/`).
    Components,
    /// Generated API handler stubs.
    Api,
    /// Stylesheets (`styles/`).
    Styles,
    /// Project configuration (`package.json`, `next.config.js`, ...).
    Config,
    /// Static assets (`public/`).
    Public,
}

impl OutputCategory {
    /// All categories in display order.
    pub const ALL: [Self; 6] = [
        Self::Pages,
        Self::Components,
        Self::Api,
        Self::Styles,
        Self::Config,
        Self::Public,
    ];

    /// Returns a lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Components => "components",
            Self::Api => "api",
            Self::Styles => "styles",
            Self::Config => "config",
            Self::Public => "public",
        }
    }
}

/// Output files grouped by category.
///
/// # Examples
///
/// ```
/// use rn_core::{OutputCategory, OutputTree};
///
/// let mut tree = OutputTree::default();
/// tree.insert(OutputCategory::Pages, "pages/index.js", "export default function Home() {}");
/// tree.insert(OutputCategory::Config, "next.config.js", "module.exports = {};");
///
/// assert_eq!(tree.len(), 2);
/// assert!(tree.contains("pages/index.js"));
/// assert_eq!(tree.category_of("next.config.js"), Some(OutputCategory::Config));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputTree {
    /// Route pages and layouts.
    pub pages: BTreeMap<String, String>,
    /// Relocated source modules.
    pub components: BTreeMap<String, String>,
    /// API handler stubs.
    pub api: BTreeMap<String, String>,
    /// Stylesheets.
    pub styles: BTreeMap<String, String>,
    /// Configuration files.
    pub config: BTreeMap<String, String>,
    /// Static assets.
    pub public: BTreeMap<String, String>,
}

impl OutputTree {
    /// Returns the map for a category.
    #[must_use]
    pub const fn category(&self, category: OutputCategory) -> &BTreeMap<String, String> {
        match category {
            OutputCategory::Pages => &self.pages,
            OutputCategory::Components => &self.components,
            OutputCategory::Api => &self.api,
            OutputCategory::Styles => &self.styles,
            OutputCategory::Config => &self.config,
            OutputCategory::Public => &self.public,
        }
    }

    /// Returns the mutable map for a category.
    pub fn category_mut(&mut self, category: OutputCategory) -> &mut BTreeMap<String, String> {
        match category {
            OutputCategory::Pages => &mut self.pages,
            OutputCategory::Components => &mut self.components,
            OutputCategory::Api => &mut self.api,
            OutputCategory::Styles => &mut self.styles,
            OutputCategory::Config => &mut self.config,
            OutputCategory::Public => &mut self.public,
        }
    }

    /// Inserts a file, returning the previous text at that path in the same
    /// category.
    pub fn insert(
        &mut self,
        category: OutputCategory,
        path: impl Into<String>,
        text: impl Into<String>,
    ) -> Option<String> {
        self.category_mut(category).insert(path.into(), text.into())
    }

    /// Inserts a file only if no category holds the path yet.
    ///
    /// Returns `true` if the file was inserted.
    pub fn insert_if_absent(
        &mut self,
        category: OutputCategory,
        path: impl Into<String>,
        text: impl Into<String>,
    ) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.category_mut(category).insert(path, text.into());
        true
    }

    /// Returns the category holding a path, if any.
    #[must_use]
    pub fn category_of(&self, path: &str) -> Option<OutputCategory> {
        OutputCategory::ALL
            .into_iter()
            .find(|c| self.category(*c).contains_key(path))
    }

    /// Returns `true` if any category holds the path.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.category_of(path).is_some()
    }

    /// Returns the text at a path, searching every category.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        OutputCategory::ALL
            .into_iter()
            .find_map(|c| self.category(c).get(path).map(String::as_str))
    }

    /// Iterates `(category, path, text)` in category then path order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputCategory, &str, &str)> {
        OutputCategory::ALL.into_iter().flat_map(move |c| {
            self.category(c)
                .iter()
                .map(move |(path, text)| (c, path.as_str(), text.as_str()))
        })
    }

    /// Returns the total number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        OutputCategory::ALL
            .into_iter()
            .map(|c| self.category(c).len())
            .sum()
    }

    /// Returns `true` if the tree holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the nested directory view of every path in the tree.
    #[must_use]
    pub fn file_structure(&self) -> FileNode {
        let mut root = FileNode::directory("");
        for (_, path, _) in self.iter() {
            root.insert_path(path);
        }
        root.sort();
        root
    }
}

/// Kind of a [`FileNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A file leaf.
    File,
    /// A directory with children.
    Directory,
}

/// A node of the display tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// File or directory name (empty for the root).
    pub name: String,
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Project-relative path of the node.
    pub path: String,
    /// Children, directories first, then by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
}

impl Default for FileNode {
    fn default() -> Self {
        Self::directory("")
    }
}

impl FileNode {
    fn directory(path: &str) -> Self {
        Self {
            name: path.rsplit('/').next().unwrap_or(path).to_owned(),
            kind: NodeKind::Directory,
            path: path.to_owned(),
            children: Vec::new(),
        }
    }

    fn file(path: &str) -> Self {
        Self {
            kind: NodeKind::File,
            ..Self::directory(path)
        }
    }

    fn insert_path(&mut self, path: &str) {
        let mut node = self;
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        for (i, part) in parts.iter().enumerate() {
            let sub_path = parts[..=i].join("/");
            let sub_path = sub_path.as_str();
            let is_leaf = i + 1 == parts.len();
            let position = node.children.iter().position(|c| c.name == *part);
            let index = if let Some(index) = position {
                index
            } else {
                node.children.push(if is_leaf {
                    Self::file(sub_path)
                } else {
                    Self::directory(sub_path)
                });
                node.children.len() - 1
            };
            node = &mut node.children[index];
        }
    }

    fn sort(&mut self) {
        self.children.sort_by(|a, b| {
            let rank = |n: &Self| u8::from(n.kind == NodeKind::File);
            rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
        });
        for child in &mut self.children {
            child.sort();
        }
    }

    /// Returns the number of file leaves below this node.
    #[must_use]
    pub fn file_count(&self) -> usize {
        match self.kind {
            NodeKind::File => 1,
            NodeKind::Directory => self.children.iter().map(Self::file_count).sum(),
        }
    }

    /// Finds a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OutputTree {
        let mut tree = OutputTree::default();
        tree.insert(OutputCategory::Pages, "pages/index.js", "a");
        tree.insert(OutputCategory::Pages, "pages/users/[id].js", "b");
        tree.insert(OutputCategory::Components, "components/Nav.jsx", "c");
        tree.insert(OutputCategory::Config, "package.json", "{}");
        tree
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = sample();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get("components/Nav.jsx"), Some("c"));
        assert_eq!(tree.category_of("pages/index.js"), Some(OutputCategory::Pages));
        assert!(!tree.insert_if_absent(OutputCategory::Components, "pages/index.js", "x"));
        assert!(tree.insert_if_absent(OutputCategory::Styles, "styles/globals.css", "x"));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_iteration_order() {
        let tree = sample();
        let paths: Vec<_> = tree.iter().map(|(_, p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                "pages/index.js",
                "pages/users/[id].js",
                "components/Nav.jsx",
                "package.json"
            ]
        );
    }

    #[test]
    fn test_file_structure() {
        let structure = sample().file_structure();
        assert_eq!(structure.file_count(), 4);
        // Directories sort before files.
        let names: Vec<_> = structure.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["components", "pages", "package.json"]);

        let users = structure
            .child("pages")
            .and_then(|p| p.child("users"))
            .expect("users directory");
        assert_eq!(users.kind, NodeKind::Directory);
        assert_eq!(users.path, "pages/users");
        let page = users.child("[id].js").expect("page");
        assert_eq!(page.kind, NodeKind::File);
        assert_eq!(page.path, "pages/users/[id].js");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert!(json["pages"]["pages/index.js"].is_string());
        assert!(json["api"].as_object().is_some_and(serde_json::Map::is_empty));
    }
}
