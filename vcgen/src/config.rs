//! JSON description of a workspace: projects to generate and the solution
//! that references them.

use std::io::Read;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterLayout;
use crate::model::Project;
use crate::msbuild::VsVersion;
use crate::props::PropertyTable;
use crate::solution::{Dependencies, Solution};

const DEFAULT_VERSION: VsVersion = VsVersion::new(15, 0);
const DEFAULT_KIND: &str = "Makefile";

/// Project as it's described by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDescription {
    /// Output project file path. Its extension is kept as is.
    pub path: String,
    /// Display name. File stem of the path when missing.
    pub name: Option<String>,
    pub configuration_kind: String,
    /// Empty list means the workspace's one
    pub variants: Vec<String>,
    /// Empty list means the workspace's one
    pub architectures: Vec<String>,
    /// Category to files mapping
    pub files: IndexMap<String, Vec<String>>,
    pub tool_properties: PropertyTable,
    pub source_root: Option<String>,
    pub strip_prefix: Option<String>,
    pub toolset_version: Option<VsVersion>,
    pub filter_layout: FilterLayout,
}

impl Default for ProjectDescription {
    fn default() -> Self {
        Self {
            path: String::new(),
            name: None,
            configuration_kind: DEFAULT_KIND.to_owned(),
            variants: Vec::new(),
            architectures: Vec::new(),
            files: IndexMap::new(),
            tool_properties: PropertyTable::new(),
            source_root: None,
            strip_prefix: None,
            toolset_version: None,
            filter_layout: FilterLayout::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceDescription {
    pub version: VsVersion,
    /// Platform toolset projects use unless they define their own
    pub toolset_version: Option<VsVersion>,
    /// Solution file path. No solution is generated when missing.
    pub solution: Option<String>,
    pub variants: Vec<String>,
    pub architectures: Vec<String>,
    pub solution_items: Vec<String>,
    pub projects: Vec<ProjectDescription>,
    pub dependencies: Dependencies,
}

impl Default for WorkspaceDescription {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            toolset_version: None,
            solution: None,
            variants: Vec::new(),
            architectures: Vec::new(),
            solution_items: Vec::new(),
            projects: Vec::new(),
            dependencies: Dependencies::new(),
        }
    }
}

/// Validated workspace ready for generation
#[derive(Debug)]
pub struct Workspace {
    pub version: VsVersion,
    pub solution: Option<String>,
    pub variants: Vec<String>,
    pub architectures: Vec<String>,
    pub solution_items: Vec<String>,
    pub projects: Vec<Project>,
    pub dependencies: Dependencies,
}

impl WorkspaceDescription {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Builds projects applying workspace wide defaults and validates
    /// the version and dependencies
    pub fn into_workspace(self) -> Result<Workspace> {
        self.version.solution_header()?;

        let projects = self
            .projects
            .into_iter()
            .map(|mut project| {
                if project.variants.is_empty() {
                    project.variants.clone_from(&self.variants);
                }
                if project.architectures.is_empty() {
                    project.architectures.clone_from(&self.architectures);
                }
                project.toolset_version = project.toolset_version.or(self.toolset_version);
                Project::new(project)
            })
            .collect::<Result<Vec<Project>>>()?;

        self.dependencies.validate(&projects)?;

        tracing::info!(
            version = %self.version,
            projects = projects.len(),
            "workspace loaded"
        );
        Ok(Workspace {
            version: self.version,
            solution: self.solution,
            variants: self.variants,
            architectures: self.architectures,
            solution_items: self.solution_items,
            projects,
            dependencies: self.dependencies,
        })
    }
}

impl FromStr for WorkspaceDescription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Workspace {
    /// Solution of all the workspace's projects
    #[must_use]
    pub fn solution(&self) -> Solution<'_> {
        Solution::new(self.version, &self.projects)
            .configurations(&self.variants, &self.architectures)
            .dependencies(&self.dependencies)
            .items(&self.solution_items)
    }

    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WORKSPACE: &str = r#"
{
  "version": "15.0",
  "toolset_version": 14.2,
  "solution": "testsolution.sln",
  "variants": ["Debug", "Release"],
  "architectures": ["Win32", "x64"],
  "solution_items": ["README.txt"],
  "projects": [
    {
      "path": "test.vcxproj",
      "files": { "src": ["testfolder/main.cpp"], "": ["README.txt"] },
      "tool_properties": { "make_properties|Win32": { "build_command_line": "scons.bat" } }
    },
    {
      "path": "testfolder/test2.vcxproj",
      "configuration_kind": "Utility",
      "architectures": ["x64"],
      "toolset_version": "15.0",
      "filter_layout": "folder_first"
    }
  ],
  "dependencies": { "test2": ["test"] }
}
"#;

    #[test]
    fn from_str_full_description() {
        // Arrange

        // Act
        let actual = WorkspaceDescription::from_str(WORKSPACE).unwrap();

        // Assert
        assert_eq!(actual.version, VsVersion::new(15, 0));
        assert_eq!(actual.toolset_version, Some(VsVersion::new(14, 2)));
        assert_eq!(actual.projects.len(), 2);
        let first = &actual.projects[0];
        assert_eq!(first.configuration_kind, "Makefile");
        assert_eq!(first.name, None);
        assert_eq!(first.files.keys().collect::<Vec<_>>(), vec!["src", ""]);
        assert_eq!(actual.projects[1].filter_layout, FilterLayout::FolderFirst);
        assert_eq!(actual.dependencies.of("test2").collect::<Vec<_>>(), vec!["test"]);
    }

    #[test]
    fn into_workspace_inherits_defaults() {
        // Arrange
        let description = WorkspaceDescription::from_str(WORKSPACE).unwrap();

        // Act
        let workspace = description.into_workspace().unwrap();

        // Assert
        let test = workspace.project("test").unwrap();
        assert_eq!(test.variants(), ["Debug", "Release"]);
        assert_eq!(test.architectures(), ["Win32", "x64"]);
        assert_eq!(test.toolset_version(), Some(VsVersion::new(14, 2)));
        let test2 = workspace.project("test2").unwrap();
        assert_eq!(test2.architectures(), ["x64"]);
        assert_eq!(test2.toolset_version(), Some(VsVersion::new(15, 0)));
        assert_eq!(workspace.solution.as_deref(), Some("testsolution.sln"));
    }

    #[test]
    fn into_workspace_solution_renders() {
        // Arrange
        let workspace = WorkspaceDescription::from_str(WORKSPACE)
            .unwrap()
            .into_workspace()
            .unwrap();

        // Act
        let actual = workspace.solution().render().unwrap();

        // Assert
        assert!(actual.contains("ProjectSection(ProjectDependencies)"));
        assert!(actual.contains("ProjectSection(SolutionItems)"));
        assert_eq!(actual.matches(".Build.0 = ").count(), 8);
    }

    #[rstest]
    #[case(r#"{ "version": "13.0" }"#)]
    #[case(r#"{ "projects": [ { "path": "a.vcxproj", "configuration_kind": "Driver" } ] }"#)]
    #[case(r#"{ "projects": [ { "path": "a.vcxproj" } ], "dependencies": { "a": ["b"] } }"#)]
    #[trace]
    fn into_workspace_invalid_tests(#[case] json: &str) {
        // Arrange
        let description = WorkspaceDescription::from_str(json).unwrap();

        // Act
        let actual = description.into_workspace();

        // Assert
        assert!(actual.is_err());
    }

    #[rstest]
    #[case(r#"{ "c": ["test"], "test": ["c"] }"#)]
    #[case("{}")]
    #[trace]
    fn into_workspace_duplicate_names_tests(#[case] dependencies: &str) {
        // Arrange
        let json = format!(
            r#"{{ "projects": [ {{ "path": "a/test.vcxproj" }}, {{ "path": "b/test.vcxproj" }}, {{ "path": "c.vcxproj" }} ], "dependencies": {dependencies} }}"#
        );
        let description = WorkspaceDescription::from_str(&json).unwrap();

        // Act
        let actual = description.into_workspace();

        // Assert
        assert!(matches!(
            actual,
            Err(Error::DuplicateProjectName { name, .. }) if name == "test"
        ));
    }

    #[rstest]
    #[case(r#"{ "version": "14.25" }"#)]
    #[case(r#"{ "projects": {} }"#)]
    #[case("{")]
    #[trace]
    fn from_str_malformed_tests(#[case] json: &str) {
        // Arrange

        // Act
        let actual = WorkspaceDescription::from_str(json);

        // Assert
        assert!(matches!(actual, Err(Error::Json(_))));
    }

    #[test]
    fn from_str_defaults() {
        // Arrange

        // Act
        let actual = WorkspaceDescription::from_str("{}").unwrap();

        // Assert
        assert_eq!(actual, WorkspaceDescription::default());
        assert_eq!(actual.version, DEFAULT_VERSION);
    }
}
