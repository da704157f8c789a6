use crate::emit::{configuration_name, Emit, ProjectDocuments};
use crate::error::{Error, Result};
use crate::filter::{Entry, FilterNode, FilterTree};
use crate::model::Project;
use crate::msbuild::{self, VsVersion};
use crate::xml::Element;

const PROJECT_TYPE: &str = "Visual C++";
const TARGET_FRAMEWORK_VERSION: &str = "131072";

/// Emits single monolithic `.vcproj` document (Visual Studio 2005/2008)
pub struct LegacyEmitter {
    version: VsVersion,
}

impl LegacyEmitter {
    /// Fails if the version is unknown or uses msbuild schema
    pub fn new(version: VsVersion) -> Result<Self> {
        let version = version.ensure_supported()?;
        if !version.is_legacy() {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(Self { version })
    }

    fn configurations(project: &Project) -> Element {
        let mut configurations = Element::new("Configurations");
        let kind = project.kind();
        for (variant, arch) in project.configurations() {
            let configuration = configurations.push(
                Element::new("Configuration")
                    .attr("Name", configuration_name(variant, arch))
                    .attr("ConfigurationType", kind.code().to_string())
                    .attr("UseOfMFC", "0")
                    .attr("ATLMinimizesCRunTimeLibraryUsage", "false"),
            );
            for tool in kind.tools() {
                let properties =
                    project.resolve_tool_properties(msbuild::tool_entry(tool), variant, arch);
                let element = properties
                    .iter()
                    .fold(Element::new("Tool").attr("Name", *tool), |e, (k, v)| {
                        e.attr(msbuild::legacy_attribute(k), v.as_str())
                    });
                configuration.push(element);
            }
        }
        configurations
    }
}

impl Emit for LegacyEmitter {
    fn emit(&self, project: &Project) -> Result<ProjectDocuments> {
        let tree = project.filter_tree()?;

        let mut root = Element::new("VisualStudioProject")
            .attr("ProjectType", PROJECT_TYPE)
            .attr("Version", self.version.legacy_format())
            .attr("Name", project.name())
            .attr("ProjectGUID", project.id().as_str())
            .attr("TargetFrameworkVersion", TARGET_FRAMEWORK_VERSION);

        let platforms = root.push(Element::new("Platforms"));
        for arch in project.architectures() {
            platforms.push(Element::new("Platform").attr("Name", arch.as_str()));
        }
        root.push(Element::new("ToolFiles"));
        root.push(Self::configurations(project));
        root.push(Element::new("References"));
        let files = root.push(Element::new("Files"));
        add_file_nodes(files, &tree, tree.root(), project);
        root.push(Element::new("Globals"));

        tracing::debug!(project = project.name(), "legacy project emitted");
        Ok(ProjectDocuments {
            project: root,
            filters: None,
            user: None,
        })
    }

    fn extension(&self) -> &'static str {
        "vcproj"
    }
}

/// Filters are embedded as nested elements keeping the order they were created in
fn add_file_nodes(parent: &mut Element, tree: &FilterTree, node: &FilterNode, project: &Project) {
    for entry in node.entries() {
        match entry {
            Entry::Filter(id) => {
                let child = tree.get(*id);
                let element = parent.push(Element::new("Filter").attr("Name", child.name()));
                add_file_nodes(element, tree, child, project);
            }
            Entry::File(ix) => {
                let file = tree.file(*ix);
                parent.push(
                    Element::new("File").attr("RelativePath", project.file_reference(&file.path)),
                );
            }
        }
    }
}
