/*!
A library for generating Microsoft Visual Studio C/C++ projects and solutions
that delegate the build to an external make tool.

Legacy `.vcproj` documents are generated for Visual Studio 2005 and 2008,
msbuild `.vcxproj` documents with `.filters` and `.user` companions for
newer versions.

## Example: generating solution from a description

```
use vcgen::parse_str;

const WORKSPACE: &str = r#"
{
  "version": "15.0",
  "solution": "testsolution.sln",
  "variants": ["Debug", "Release"],
  "architectures": ["Win32", "x64"],
  "projects": [
    {
      "path": "test.vcxproj",
      "configuration_kind": "Utility",
      "files": { "src": ["testfolder/main.cpp"], "": ["README.txt"] }
    }
  ]
}
"#;

let workspace = parse_str(WORKSPACE).unwrap();
assert_eq!(workspace.projects.len(), 1);

let documents = vcgen::generate_project(&workspace.projects[0], workspace.version).unwrap();
assert!(documents.filters.is_some());

let solution = workspace.solution().render().unwrap();
assert!(solution.starts_with("Microsoft Visual Studio Solution File, Format Version 12.00"));
```
*/

#![warn(unused_extern_crates)]
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use emit::ProjectDocuments;

pub mod config;
pub mod emit;
pub mod error;
pub mod filter;
pub mod guid;
pub mod model;
pub mod msbuild;
pub mod path;
pub mod props;
pub mod solution;
pub mod xml;

#[cfg(test)] // <-- not needed in integration tests
extern crate rstest;

pub use config::{ProjectDescription, Workspace, WorkspaceDescription};
pub use error::{Error, Result};
pub use model::Project;
pub use msbuild::{ConfigurationKind, VsVersion};
pub use solution::{Dependencies, Solution};

const FILTERS_SUFFIX: &str = ".filters";
const USER_SUFFIX: &str = ".user";

/// `parse_file` reads workspace description from the file specified and validates it
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Workspace> {
    let file = fs::File::open(path)?;
    WorkspaceDescription::from_reader(file)?.into_workspace()
}

/// `parse_str` parses workspace description from `&str` and validates it
pub fn parse_str(contents: &str) -> Result<Workspace> {
    WorkspaceDescription::from_str(contents)?.into_workspace()
}

/// Generates documents of the project using the schema the version specified requires
pub fn generate_project(project: &Project, version: VsVersion) -> Result<ProjectDocuments> {
    emit::new_box(version)?.emit(project)
}

/// Generates project documents and writes them under the directory specified.
/// Returns paths of all written files, project document first.
pub fn write_project(project: &Project, version: VsVersion, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let documents = generate_project(project, version)?;
    let target = out_dir.join(project.path());

    let mut written = vec![write_document(&documents.project, target.clone())?];
    let companions = [
        (documents.filters.as_ref(), FILTERS_SUFFIX),
        (documents.user.as_ref(), USER_SUFFIX),
    ];
    for (document, suffix) in companions {
        if let Some(document) = document {
            written.push(write_document(document, with_suffix(&target, suffix))?);
        }
    }

    tracing::info!(project = project.name(), files = written.len(), "project written");
    Ok(written)
}

/// Renders solution and writes it into the path specified relative to the output directory
pub fn write_solution(solution: &Solution, path: &str, out_dir: &Path) -> Result<PathBuf> {
    let text = solution.render()?;
    let target = out_dir.join(path);
    create_parent(&target)?;
    fs::write(&target, text)?;
    tracing::info!(path = %target.display(), "solution written");
    Ok(target)
}

/// Writes every project of the workspace and its solution if one is defined
pub fn write_workspace(workspace: &Workspace, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for project in &workspace.projects {
        written.extend(write_project(project, workspace.version, out_dir)?);
    }
    if let Some(path) = &workspace.solution {
        written.push(write_solution(&workspace.solution(), path, out_dir)?);
    }
    Ok(written)
}

fn write_document(document: &xml::Element, target: PathBuf) -> Result<PathBuf> {
    create_parent(&target)?;
    let mut out = BufWriter::new(fs::File::create(&target)?);
    xml::write(document, &mut out)?;
    out.flush()?;
    Ok(target)
}

fn create_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
