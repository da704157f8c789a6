use std::fmt::{self, Display};
use std::path::PathBuf;

use itertools::Itertools;
use vcgen::Workspace;

use crate::ux;

/// What has been (or would be) generated from a workspace
pub struct Summary<'a> {
    workspace: &'a Workspace,
    written: Vec<PathBuf>,
}

impl<'a> Summary<'a> {
    #[must_use]
    pub fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            written: vec![],
        }
    }

    pub fn add_written(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.written.extend(paths);
    }

    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Projects as JSON array
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        let converter = if pretty {
            serde_json::to_string_pretty
        } else {
            serde_json::to_string
        };
        converter(&self.workspace.projects)
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = ux::new_table(["Project", "Kind", "Configurations", "Files", "Id"]);
        for project in &self.workspace.projects {
            let configurations = project
                .configurations()
                .map(|(variant, arch)| format!("{variant}|{arch}"))
                .join(", ");
            let files = project.files().values().map(Vec::len).sum::<usize>();
            table.add_row(vec![
                project.name().to_owned(),
                project.kind().to_string(),
                configurations,
                files.to_string(),
                project.id().to_string(),
            ]);
        }
        writeln!(f, "{table}")?;
        writeln!(f)?;

        if let Some(solution) = &self.workspace.solution {
            writeln!(f, " {:>9} {solution} ({})", "solution:", self.workspace.version)?;
        }
        if !self.written.is_empty() {
            let mut table = ux::new_table(["Written"]);
            for path in &self.written {
                table.add_row(vec![path.display().to_string()]);
            }
            writeln!(f, "{table}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WORKSPACE: &str = r#"
{
  "version": 14,
  "solution": "testsolution.sln",
  "variants": ["Debug"],
  "architectures": ["Win32", "x64"],
  "projects": [
    { "path": "test.vcxproj", "configuration_kind": "Utility", "files": { "src": ["a.c", "b.h"] } },
    { "path": "lib/other.vcxproj", "configuration_kind": "Utility" }
  ]
}
"#;

    #[test]
    fn display_lists_projects() {
        // Arrange
        let workspace = vcgen::parse_str(WORKSPACE).unwrap();
        let summary = Summary::new(&workspace);

        // Act
        let actual = summary.to_string();

        // Assert
        assert!(actual.contains("Debug|Win32, Debug|x64"));
        assert!(actual.contains("{53BF76E3-BA6C-3672-1B60-28EA5DA1EAFA}"));
        assert!(actual.contains("other"));
        assert!(actual.contains("testsolution.sln (14.0)"));
        assert!(!actual.contains("Written"));
    }

    #[test]
    fn display_written_files() {
        // Arrange
        let workspace = vcgen::parse_str(WORKSPACE).unwrap();
        let mut summary = Summary::new(&workspace);

        // Act
        summary.add_written([PathBuf::from("out").join("test.vcxproj")]);

        // Assert
        assert_eq!(summary.written().len(), 1);
        assert!(summary.to_string().contains("test.vcxproj"));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[trace]
    fn to_json_tests(#[case] pretty: bool) {
        // Arrange
        let workspace = vcgen::parse_str(WORKSPACE).unwrap();
        let summary = Summary::new(&workspace);

        // Act
        let actual = summary.to_json(pretty).unwrap();

        // Assert
        let value: serde_json::Value = serde_json::from_str(&actual).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[1]["name"], "other");
    }
}
