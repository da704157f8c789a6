use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ProjectDescription;
use crate::error::Result;
use crate::filter::{FilterLayout, FilterTree};
use crate::guid::{self, Guid};
use crate::msbuild::{ConfigurationKind, VsVersion};
use crate::path;
use crate::props::{self, PropertyMap, PropertyTable};

// cc, hh and inl extend the classic Visual Studio sets
static COMPILE_EXTENSIONS: phf::Set<&'static str> = phf::phf_set! {
    "c", "cc", "cpp", "cxx",
};

static INCLUDE_EXTENSIONS: phf::Set<&'static str> = phf::phf_set! {
    "h", "hh", "hpp", "hxx", "txx", "inl",
};

/// One buildable unit. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    path: String,
    name: String,
    id: Guid,
    kind: ConfigurationKind,
    architectures: Vec<String>,
    variants: Vec<String>,
    files: IndexMap<String, Vec<String>>,
    tool_properties: PropertyTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strip_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    toolset_version: Option<VsVersion>,
    filter_layout: FilterLayout,
}

/// Canonical file groups a project's files are partitioned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileGroup {
    /// Compilable sources
    Compile,
    /// Headers
    Include,
    /// Any other text
    Other,
}

/// Project files partitioned by [`FileGroup`], each group keeps supplied order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileGroups<'a> {
    pub sources: Vec<&'a str>,
    pub headers: Vec<&'a str>,
    pub other: Vec<&'a str>,
}

impl FileGroup {
    /// Classifies file by its extension ignoring case
    #[must_use]
    pub fn classify(file: &str) -> Self {
        let (_, leaf) = path::split(file);
        let extension = leaf
            .rsplit_once('.')
            .map(|(stem, ext)| if stem.is_empty() { "" } else { ext })
            .unwrap_or_default()
            .to_ascii_lowercase();

        if COMPILE_EXTENSIONS.contains(extension.as_str()) {
            FileGroup::Compile
        } else if INCLUDE_EXTENSIONS.contains(extension.as_str()) {
            FileGroup::Include
        } else {
            FileGroup::Other
        }
    }

    /// Item element name of the msbuild schema
    #[must_use]
    pub fn item_tag(self) -> &'static str {
        match self {
            FileGroup::Compile => "ClCompile",
            FileGroup::Include => "ClInclude",
            FileGroup::Other => "None",
        }
    }
}

impl<'a> FileGroups<'a> {
    #[must_use]
    pub fn get(&self, group: FileGroup) -> &[&'a str] {
        match group {
            FileGroup::Compile => &self.sources,
            FileGroup::Include => &self.headers,
            FileGroup::Other => &self.other,
        }
    }

    /// Groups in the order they are written into documents
    pub fn iter(&self) -> impl Iterator<Item = (FileGroup, &[&'a str])> {
        [FileGroup::Compile, FileGroup::Include, FileGroup::Other]
            .into_iter()
            .map(move |g| (g, self.get(g)))
    }
}

impl Project {
    /// Creates project from its description. Fails if configuration kind is unknown.
    pub fn new(description: ProjectDescription) -> Result<Self> {
        let kind = description.configuration_kind.parse::<ConfigurationKind>()?;
        let name = description
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| file_stem(&description.path));
        let id = guid::generate(&description.path, &name);

        if description.files.values().all(Vec::is_empty) {
            tracing::warn!(project = %name, "project has no files");
        }

        Ok(Self {
            path: description.path,
            name,
            id,
            kind,
            architectures: description.architectures,
            variants: description.variants,
            files: description.files,
            tool_properties: description.tool_properties,
            source_root: description.source_root,
            strip_prefix: description.strip_prefix,
            toolset_version: description.toolset_version,
            filter_layout: description.filter_layout,
        })
    }

    /// Output file location
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn id(&self) -> &Guid {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> ConfigurationKind {
        self.kind
    }

    #[must_use]
    pub fn architectures(&self) -> &[String] {
        &self.architectures
    }

    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    #[must_use]
    pub fn files(&self) -> &IndexMap<String, Vec<String>> {
        &self.files
    }

    #[must_use]
    pub fn toolset_version(&self) -> Option<VsVersion> {
        self.toolset_version
    }

    /// Every (variant, architecture) pair, architecture major
    pub fn configurations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.architectures.iter().flat_map(move |arch| {
            self.variants
                .iter()
                .map(move |variant| (variant.as_str(), arch.as_str()))
        })
    }

    /// Resolves tool settings of the configuration specified, see [`props::resolve`]
    #[must_use]
    pub fn resolve_tool_properties(&self, tool: &str, variant: &str, arch: &str) -> &PropertyMap {
        props::resolve(&self.tool_properties, tool, variant, arch)
    }

    /// Partitions all files into sources, headers and other text
    #[must_use]
    pub fn categorize_files(&self) -> FileGroups<'_> {
        let mut groups = FileGroups::default();
        for file in self.files.values().flatten() {
            match FileGroup::classify(file) {
                FileGroup::Compile => groups.sources.push(file),
                FileGroup::Include => groups.headers.push(file),
                FileGroup::Other => groups.other.push(file),
            }
        }
        groups
    }

    pub fn filter_tree(&self) -> Result<FilterTree> {
        FilterTree::build(&self.files, self.strip_prefix.as_deref(), self.filter_layout)
    }

    /// File reference as written into documents: joined with the source root
    /// and relative to the project file's directory
    #[must_use]
    pub fn file_reference(&self, file: &str) -> String {
        let full = match &self.source_root {
            Some(root) => path::join(root, file),
            None => file.to_owned(),
        };
        path::relative_to(&full, &path::parent(&self.path))
    }
}

fn file_stem(file: &str) -> String {
    let (_, leaf) = path::split(file);
    if let Some((stem, _)) = leaf.rsplit_once('.').filter(|(stem, _)| !stem.is_empty()) {
        return stem.to_owned();
    }
    leaf
}
