use std::collections::BTreeSet;

use crate::emit::{configuration_name, Emit, ProjectDocuments};
use crate::error::{Error, Result};
use crate::filter::{FilterNode, FilterTree};
use crate::model::{FileGroups, Project};
use crate::msbuild::{
    ConfigurationKind, VsVersion, MAKE_PROPERTIES, MAKE_PROPERTY_ELEMENTS, MSBUILD_NAMESPACE,
    USER_PROPERTIES, USER_PROPERTY_ELEMENTS,
};
use crate::xml::Element;
use crate::{guid, path};

const FILTERS_TOOLS_VERSION: &str = "4.0";
const KEYWORD: &str = "MakeFileProj";
const DEFAULT_PROPS: &str = r"$(VCTargetsPath)\Microsoft.Cpp.Default.props";
const CPP_PROPS: &str = r"$(VCTargetsPath)\Microsoft.Cpp.props";
const CPP_TARGETS: &str = r"$(VCTargetsPath)\Microsoft.Cpp.targets";
const USER_PROPS: &str = r"$(UserRootDir)\Microsoft.Cpp.$(Platform).user.props";

/// Emits msbuild `.vcxproj` documents (Visual Studio 2010 and newer):
/// project, filters overlay and optional user settings.
pub struct ModernEmitter {
    version: VsVersion,
}

impl ModernEmitter {
    /// Fails if the version is unknown or uses legacy schema
    pub fn new(version: VsVersion) -> Result<Self> {
        let version = version.ensure_supported()?;
        if version.is_legacy() {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(Self { version })
    }

    fn root(tools_version: &str) -> Element {
        Element::new("Project")
            .attr("ToolsVersion", tools_version)
            .attr("xmlns", MSBUILD_NAMESPACE)
    }

    fn project_document(&self, project: &Project, groups: &FileGroups) -> Result<Element> {
        let mut root = Element::new("Project")
            .attr("DefaultTargets", "Build")
            .attr("ToolsVersion", self.version.tools_version())
            .attr("xmlns", MSBUILD_NAMESPACE);

        let configurations =
            root.push(Element::new("ItemGroup").attr("Label", "ProjectConfigurations"));
        for (variant, arch) in project.configurations() {
            configurations.push(
                Element::new("ProjectConfiguration")
                    .attr("Include", configuration_name(variant, arch))
                    .child(Element::with_text("Configuration", variant))
                    .child(Element::with_text("Platform", arch)),
            );
        }

        root.push(
            Element::new("PropertyGroup")
                .attr("Label", "Globals")
                .child(Element::with_text("ProjectGuid", project.id().as_str()))
                .child(Element::with_text("Keyword", KEYWORD)),
        );
        root.push(Element::new("Import").attr("Project", DEFAULT_PROPS));

        let toolset = project.toolset_version().unwrap_or(self.version).toolset();
        for (variant, arch) in project.configurations() {
            root.push(
                Element::new("PropertyGroup")
                    .attr("Condition", condition(variant, arch))
                    .attr("Label", "Configuration")
                    .child(Element::with_text("ConfigurationType", project.kind().name()))
                    .child(Element::with_text("UseDebugLibraries", "false"))
                    .child(Element::with_text("PlatformToolset", toolset.as_str())),
            );
        }

        root.push(Element::new("Import").attr("Project", CPP_PROPS));
        root.push(Element::new("ImportGroup").attr("Label", "ExtensionSettings"));

        for (variant, arch) in project.configurations() {
            root.push(
                Element::new("ImportGroup")
                    .attr("Label", "PropertySheets")
                    .attr("Condition", condition(variant, arch))
                    .child(
                        Element::new("Import")
                            .attr("Project", USER_PROPS)
                            .attr("Condition", format!("exists('{USER_PROPS}')"))
                            .attr("Label", "LocalAppDataPlatform"),
                    ),
            );
        }

        root.push(Element::new("PropertyGroup").attr("Label", "UserMacros"));

        for (variant, arch) in project.configurations() {
            root.push(make_properties(project, variant, arch)?);
        }

        root.push(Element::new("ItemDefinitionGroup"));

        for (group, files) in groups.iter() {
            let items = root.push(Element::new("ItemGroup"));
            for file in files {
                items.push(Element::new(group.item_tag()).attr("Include", project.file_reference(file)));
            }
        }

        root.push(Element::new("Import").attr("Project", CPP_TARGETS));
        root.push(Element::new("ImportGroup").attr("Label", "ExtensionTargets"));
        Ok(root)
    }

    fn filters_document(project: &Project, tree: &FilterTree, groups: &FileGroups) -> Element {
        let mut root = Self::root(FILTERS_TOOLS_VERSION);

        let filters = tree
            .filters()
            .map(FilterNode::windows_path)
            .collect::<BTreeSet<String>>();

        let declarations = root.push(Element::new("ItemGroup"));
        for filter in &filters {
            declarations.push(
                Element::new("Filter").attr("Include", filter.as_str()).child(Element::with_text(
                    "UniqueIdentifier",
                    guid::generate(project.path(), filter).as_str(),
                )),
            );
        }

        for (group, files) in groups.iter() {
            let items = root.push(Element::new("ItemGroup"));
            for file in files {
                let item = items
                    .push(Element::new(group.item_tag()).attr("Include", project.file_reference(file)));
                let filter = tree.filter_of(file).unwrap_or_default();
                if !filter.is_empty() {
                    item.push(Element::with_text("Filter", path::to_windows(filter)));
                }
            }
        }
        root
    }

    fn user_document(&self, project: &Project) -> Option<Element> {
        let mut root = Self::root(self.version.tools_version());

        for (variant, arch) in project.configurations() {
            let settings = project.resolve_tool_properties(USER_PROPERTIES, variant, arch);
            let elements = USER_PROPERTY_ELEMENTS
                .entries()
                .filter_map(|(key, element)| {
                    settings
                        .get(*key)
                        .filter(|v| !v.is_empty())
                        .map(|v| Element::with_text(*element, v.as_str()))
                })
                .collect::<Vec<Element>>();

            if elements.is_empty() {
                continue;
            }
            let group = elements.into_iter().fold(
                Element::new("PropertyGroup").attr("Condition", condition(variant, arch)),
                Element::child,
            );
            root.push(group);
        }

        if root.children().is_empty() {
            None
        } else {
            Some(root)
        }
    }
}

impl Emit for ModernEmitter {
    fn emit(&self, project: &Project) -> Result<ProjectDocuments> {
        let tree = project.filter_tree()?;
        let groups = project.categorize_files();

        let document = self.project_document(project, &groups)?;
        let filters = Self::filters_document(project, &tree, &groups);
        let user = self.user_document(project);

        tracing::debug!(
            project = project.name(),
            filters = tree.filters().count(),
            user = user.is_some(),
            "msbuild project emitted"
        );
        Ok(ProjectDocuments {
            project: document,
            filters: Some(filters),
            user,
        })
    }

    fn extension(&self) -> &'static str {
        "vcxproj"
    }
}

/// Property group of the make tool. Makefile projects must define every property.
fn make_properties(project: &Project, variant: &str, arch: &str) -> Result<Element> {
    let properties = project.resolve_tool_properties(MAKE_PROPERTIES, variant, arch);
    let required = project.kind() == ConfigurationKind::Makefile;

    let mut group = Element::new("PropertyGroup").attr("Condition", condition(variant, arch));
    for (key, element) in MAKE_PROPERTY_ELEMENTS.entries() {
        match properties.get(*key) {
            Some(value) => {
                group.push(Element::with_text(*element, value.as_str()));
            }
            None if required => {
                return Err(Error::MissingProperty {
                    property: (*key).to_owned(),
                    tool: MAKE_PROPERTIES.to_owned(),
                    configuration: configuration_name(variant, arch),
                });
            }
            None => {}
        }
    }
    Ok(group)
}

fn condition(variant: &str, arch: &str) -> String {
    format!("'$(Configuration)|$(Platform)'=='{variant}|{arch}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectDescription;
    use crate::props::PropertyMap;
    use rstest::rstest;

    fn make_properties_map() -> PropertyMap {
        [
            ("build_command_line", "scons.bat"),
            ("clean_command_line", "scons.bat -c"),
            ("rebuild_command_line", "scons.bat -c && scons.bat"),
            ("output", "foo.exe"),
            ("preprocessor_definitions", "FOO;BAR"),
            ("include_search_path", "C:/foo"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    fn description() -> ProjectDescription {
        let mut d = ProjectDescription {
            path: "test.vcxproj".to_owned(),
            configuration_kind: "Makefile".to_owned(),
            variants: vec!["Debug".to_owned(), "Release".to_owned()],
            architectures: vec!["Win32".to_owned(), "x64".to_owned()],
            ..Default::default()
        };
        d.files.insert(
            "src".to_owned(),
            vec!["testfolder/main.cpp".to_owned(), "testfolder/main.h".to_owned()],
        );
        d.files.insert(
            "misc".to_owned(),
            vec!["testfolder/SConscript".to_owned(), "SConstruct".to_owned()],
        );
        d.files.insert(String::new(), vec!["README.txt".to_owned()]);
        d.tool_properties
            .insert("make_properties|Win32".to_owned(), make_properties_map());
        d.tool_properties
            .insert("make_properties|x64".to_owned(), make_properties_map());
        d
    }

    fn emit(d: ProjectDescription) -> Result<ProjectDocuments> {
        let project = Project::new(d).unwrap();
        ModernEmitter::new(VsVersion::new(15, 0))?.emit(&project)
    }

    fn texts<'a>(parent: &'a Element, name: &'a str) -> Vec<&'a str> {
        parent
            .descendants()
            .filter(|e| e.name() == name)
            .filter_map(Element::inner_text)
            .collect()
    }

    #[test]
    fn emit_project_document_structure() {
        // Arrange

        // Act
        let docs = emit(description()).unwrap();

        // Assert
        let root = &docs.project;
        assert_eq!(root.attribute("ToolsVersion"), Some("14.0"));
        assert_eq!(root.attribute("DefaultTargets"), Some("Build"));
        let includes: Vec<&str> = root
            .find("ItemGroup")
            .unwrap()
            .children()
            .iter()
            .filter_map(|c| c.attribute("Include"))
            .collect();
        assert_eq!(includes, vec!["Debug|Win32", "Release|Win32", "Debug|x64", "Release|x64"]);
        assert_eq!(texts(root, "Keyword"), vec!["MakeFileProj"]);
        assert_eq!(texts(root, "PlatformToolset"), vec!["v150"; 4]);
        assert_eq!(texts(root, "ConfigurationType"), vec!["Makefile"; 4]);
        assert_eq!(texts(root, "NMakeBuildCommandLine").len(), 4);
        assert_eq!(texts(root, "NMakeReBuildCommandLine")[0], "scons.bat -c && scons.bat");
    }

    #[test]
    fn emit_project_file_groups() {
        // Arrange

        // Act
        let docs = emit(description()).unwrap();

        // Assert
        let root = &docs.project;
        let tagged = |tag: &str| -> Vec<String> {
            root.descendants()
                .filter(|e| e.name() == tag)
                .filter_map(|e| e.attribute("Include").map(str::to_owned))
                .collect()
        };
        assert_eq!(tagged("ClCompile"), vec![r"testfolder\main.cpp"]);
        assert_eq!(tagged("ClInclude"), vec![r"testfolder\main.h"]);
        assert_eq!(
            tagged("None"),
            vec![r"testfolder\SConscript", "SConstruct", "README.txt"]
        );
    }

    #[test]
    fn emit_uses_toolset_version_when_given() {
        // Arrange
        let mut d = description();
        d.toolset_version = Some(VsVersion::new(14, 2));

        // Act
        let docs = emit(d).unwrap();

        // Assert
        assert_eq!(texts(&docs.project, "PlatformToolset"), vec!["v142"; 4]);
    }

    #[rstest]
    #[case(VsVersion::new(10, 0), "4.0")]
    #[case(VsVersion::new(12, 0), "4.0")]
    #[case(VsVersion::new(14, 0), "14.0")]
    #[trace]
    fn emit_tools_version_tests(#[case] version: VsVersion, #[case] expected: &str) {
        // Arrange
        let project = Project::new(description()).unwrap();

        // Act
        let docs = ModernEmitter::new(version).unwrap().emit(&project).unwrap();

        // Assert
        assert_eq!(docs.project.attribute("ToolsVersion"), Some(expected));
        assert_eq!(
            docs.filters.unwrap().attribute("ToolsVersion"),
            Some(FILTERS_TOOLS_VERSION)
        );
    }

    #[test]
    fn emit_missing_make_property_fails() {
        // Arrange
        let mut d = description();
        let mut partial = make_properties_map();
        partial.remove("output");
        d.tool_properties
            .insert("make_properties|Release|x64".to_owned(), partial);

        // Act
        let actual = emit(d);

        // Assert
        assert!(matches!(
            actual,
            Err(Error::MissingProperty { property, configuration, .. })
                if property == "output" && configuration == "Release|x64"
        ));
    }

    #[test]
    fn emit_non_makefile_make_properties_optional() {
        // Arrange
        let mut d = description();
        d.configuration_kind = "Utility".to_owned();
        d.tool_properties.clear();

        // Act
        let docs = emit(d).unwrap();

        // Assert
        assert_eq!(texts(&docs.project, "ConfigurationType"), vec!["Utility"; 4]);
        assert!(texts(&docs.project, "NMakeOutput").is_empty());
    }

    #[test]
    fn emit_filters_sorted_with_ancestors() {
        // Arrange
        let mut d = description();
        d.files
            .insert("inc".to_owned(), vec!["deep/er/x.h".to_owned()]);

        // Act
        let docs = emit(d).unwrap();

        // Assert
        let filters = docs.filters.unwrap();
        let declared: Vec<&str> = filters
            .find("ItemGroup")
            .unwrap()
            .children()
            .iter()
            .filter_map(|f| f.attribute("Include"))
            .collect();
        assert_eq!(
            declared,
            vec![
                "inc",
                r"inc\deep",
                r"inc\deep\er",
                "misc",
                r"misc\testfolder",
                "src",
                r"src\testfolder"
            ]
        );
        let ids = texts(&filters, "UniqueIdentifier");
        assert_eq!(ids.len(), declared.len());
        assert_eq!(ids[5], guid::generate("test.vcxproj", "src").as_str());
    }

    #[test]
    fn emit_filters_file_associations() {
        // Arrange

        // Act
        let docs = emit(description()).unwrap();

        // Assert
        let filters = docs.filters.unwrap();
        let groups: Vec<&Element> = filters.find_all("ItemGroup").skip(1).collect();
        assert_eq!(groups.len(), 3);
        let main = &groups[0].children()[0];
        assert_eq!(main.name(), "ClCompile");
        assert_eq!(main.find("Filter").and_then(Element::inner_text), Some(r"src\testfolder"));
        let other: Vec<(Option<&str>, Option<&str>)> = groups[2]
            .children()
            .iter()
            .map(|e| (e.attribute("Include"), e.find("Filter").and_then(Element::inner_text)))
            .collect();
        assert_eq!(
            other,
            vec![
                (Some(r"testfolder\SConscript"), Some(r"misc\testfolder")),
                (Some("SConstruct"), Some("misc")),
                (Some("README.txt"), None)
            ]
        );
    }

    #[test]
    fn emit_without_user_settings_has_no_user_document() {
        // Arrange
        let mut d = description();
        d.tool_properties.insert(
            "user_properties|Debug|Win32".to_owned(),
            PropertyMap::from([("unrelated".to_owned(), "x".to_owned())]),
        );

        // Act
        let docs = emit(d).unwrap();

        // Assert
        assert!(docs.user.is_none());
    }

    #[test]
    fn emit_user_document_only_for_defined_pairs() {
        // Arrange
        let mut d = description();
        d.tool_properties.insert(
            "user_properties|Debug".to_owned(),
            PropertyMap::from([
                ("debugger_command".to_owned(), "foo.exe".to_owned()),
                ("working_directory".to_owned(), "C:/work".to_owned()),
                ("debugger_arguments".to_owned(), String::new()),
            ]),
        );

        // Act
        let docs = emit(d).unwrap();

        // Assert
        let user = docs.user.unwrap();
        let conditions: Vec<&str> = user
            .find_all("PropertyGroup")
            .filter_map(|g| g.attribute("Condition"))
            .collect();
        assert_eq!(
            conditions,
            vec![
                "'$(Configuration)|$(Platform)'=='Debug|Win32'",
                "'$(Configuration)|$(Platform)'=='Debug|x64'"
            ]
        );
        let names: Vec<&str> = user.children()[0]
            .children()
            .iter()
            .map(Element::name)
            .collect();
        assert_eq!(names, vec!["LocalDebuggerWorkingDirectory", "LocalDebuggerCommand"]);
    }

    #[rstest]
    #[case(VsVersion::new(9, 0))]
    #[case(VsVersion::new(13, 0))]
    #[case(VsVersion::new(14, 2))]
    #[trace]
    fn new_rejects_versions_tests(#[case] version: VsVersion) {
        // Arrange

        // Act
        let actual = ModernEmitter::new(version);

        // Assert
        assert!(matches!(actual, Err(Error::UnsupportedVersion(v)) if v == version));
    }
}
