//! Filters are IDE only virtual folders. The tree is an arena of nodes
//! addressed by their full path from the root so missing ancestors are
//! created once and looked up by path later.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path;

const SEPARATOR: char = '/';

/// Which level comes first in a composed filter path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterLayout {
    /// `category/folder`
    #[default]
    CategoryFirst,
    /// `folder/category`
    FolderFirst,
}

/// Index of a node inside [`FilterTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Child of a filter node in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Filter(NodeId),
    /// Index into [`FilterTree::files`]
    File(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    path: String,
    name: String,
    parent: Option<NodeId>,
    entries: Vec<Entry>,
}

/// File of a project with the filter it's shown under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAssignment {
    pub category: String,
    /// Path relative to the project's source root, as supplied
    pub path: String,
    /// Full filter path, empty for files shown directly under the root
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTree {
    nodes: Vec<FilterNode>,
    index: HashMap<String, NodeId>,
    files: Vec<FileAssignment>,
}

impl FilterNode {
    /// Full path from the root like `src/sub`
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path component
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Path with Windows separators as msbuild filter documents want
    #[must_use]
    pub fn windows_path(&self) -> String {
        path::to_windows(&self.path)
    }
}

impl FilterTree {
    /// Builds filters tree from category to files mapping.
    ///
    /// Nodes and files are enumerated in the order they were supplied.
    /// When `strip_prefix` is set every file's folder must start with it.
    pub fn build(
        files: &IndexMap<String, Vec<String>>,
        strip_prefix: Option<&str>,
        layout: FilterLayout,
    ) -> Result<Self> {
        let mut tree = FilterTree::new();
        let prefix = strip_prefix
            .map(|p| p.replace('\\', "/").trim_matches(SEPARATOR).to_owned())
            .filter(|p| !p.is_empty());

        for (category, paths) in files {
            for file in paths {
                let (folder, _) = path::split(file);
                let folder = match &prefix {
                    Some(prefix) => strip_folder(&folder, prefix)?,
                    None => folder,
                };
                let filter = compose(category, &folder, layout);
                let node = tree.ensure(&filter);

                let file_ix = tree.files.len();
                tree.files.push(FileAssignment {
                    category: category.clone(),
                    path: file.clone(),
                    filter,
                });
                tree.nodes[node.0].entries.push(Entry::File(file_ix));
            }
        }

        tracing::debug!(
            filters = tree.nodes.len() - 1,
            files = tree.files.len(),
            "filter tree built"
        );
        Ok(tree)
    }

    fn new() -> Self {
        let root = FilterNode {
            path: String::new(),
            name: String::new(),
            parent: None,
            entries: Vec::new(),
        };
        Self {
            nodes: vec![root],
            index: HashMap::from([(String::new(), NodeId(0))]),
            files: Vec::new(),
        }
    }

    /// Ensures node and all its ancestors exist. Ancestors are created root to leaf.
    fn ensure(&mut self, filter: &str) -> NodeId {
        if let Some(id) = self.index.get(filter) {
            return *id;
        }

        let mut current = self.root_id();
        let mut full = String::new();
        for component in filter.split(SEPARATOR) {
            if !full.is_empty() {
                full.push(SEPARATOR);
            }
            full.push_str(component);

            current = match self.index.get(&full) {
                Some(id) => *id,
                None => {
                    let id = NodeId(self.nodes.len());
                    self.nodes.push(FilterNode {
                        path: full.clone(),
                        name: component.to_owned(),
                        parent: Some(current),
                        entries: Vec::new(),
                    });
                    self.nodes[current.0].entries.push(Entry::Filter(id));
                    self.index.insert(full.clone(), id);
                    id
                }
            };
        }
        current
    }

    #[must_use]
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn root(&self) -> &FilterNode {
        &self.nodes[0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &FilterNode {
        &self.nodes[id.0]
    }

    /// Looks node up by its full path. Empty path is the root.
    #[must_use]
    pub fn node(&self, filter: &str) -> Option<&FilterNode> {
        self.index.get(filter).map(|id| self.get(*id))
    }

    /// Child filters of the node in insertion order
    pub fn children<'a>(&'a self, node: &'a FilterNode) -> impl Iterator<Item = &'a FilterNode> {
        node.entries.iter().filter_map(|e| match e {
            Entry::Filter(id) => Some(self.get(*id)),
            Entry::File(_) => None,
        })
    }

    /// Files attached directly to the node in insertion order
    pub fn files_of<'a>(&'a self, node: &'a FilterNode) -> impl Iterator<Item = &'a FileAssignment> {
        node.entries.iter().filter_map(|e| match e {
            Entry::File(ix) => Some(&self.files[*ix]),
            Entry::Filter(_) => None,
        })
    }

    #[must_use]
    pub fn file(&self, ix: usize) -> &FileAssignment {
        &self.files[ix]
    }

    /// All files in the order they were supplied
    #[must_use]
    pub fn files(&self) -> &[FileAssignment] {
        &self.files
    }

    /// Every filter but the root in creation order
    pub fn filters(&self) -> impl Iterator<Item = &FilterNode> {
        self.nodes.iter().skip(1)
    }

    /// Filter path of the file. The last assignment wins when
    /// the same file is listed under several categories.
    #[must_use]
    pub fn filter_of(&self, file: &str) -> Option<&str> {
        self.files
            .iter()
            .rev()
            .find(|f| f.path == file)
            .map(|f| f.filter.as_str())
    }

    /// Whether the tree has no filters and no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.files.is_empty()
    }
}

fn strip_folder(folder: &str, prefix: &str) -> Result<String> {
    let rest = folder
        .strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with(SEPARATOR));
    match rest {
        Some(rest) => Ok(rest.trim_start_matches(SEPARATOR).to_owned()),
        None => Err(Error::StripPrefixMismatch {
            folder: folder.to_owned(),
            prefix: prefix.to_owned(),
        }),
    }
}

fn compose(category: &str, folder: &str, layout: FilterLayout) -> String {
    let (outer, inner) = match layout {
        FilterLayout::CategoryFirst => (category, folder),
        FilterLayout::FolderFirst => (folder, category),
    };
    outer
        .split(['/', '\\'])
        .chain(inner.split(['/', '\\']))
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}
