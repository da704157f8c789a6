//! `.sln` container text. The format is line oriented, not XML, so it's
//! rendered directly into a string.

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use petgraph::algo::DfsSpace;
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};

use crate::emit::configuration_name;
use crate::error::{Error, Result};
use crate::guid::{self, Guid};
use crate::model::Project;
use crate::msbuild::{VsVersion, ID_EXTERNAL_MAKEFILE, ID_SOLUTION_FOLDER};
use crate::path;

const SOLUTION_ITEMS: &str = "Solution Items";
const ITEMS_SEPARATOR: &str = ";";

/// Project dependencies by project name. Each dependency is kept once
/// in the order it was added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Vec<String>>", into = "IndexMap<String, Vec<String>>")]
pub struct Dependencies {
    edges: IndexMap<String, IndexSet<String>>,
}

impl Dependencies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds dependency of the project on another one
    pub fn add(&mut self, project: impl Into<String>, dependency: impl Into<String>) {
        self.edges
            .entry(project.into())
            .or_default()
            .insert(dependency.into());
    }

    /// Names of the projects the project depends on
    pub fn of<'a>(&'a self, project: &str) -> impl Iterator<Item = &'a str> {
        self.edges
            .get(project)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.values().all(IndexSet::is_empty)
    }

    /// Checks project names are unique and every dependency refers to one
    /// of the projects. Cycles are allowed by the IDE so they are only reported.
    pub fn validate(&self, projects: &[Project]) -> Result<()> {
        ensure_unique_names(projects)?;

        let mut graph = DiGraphMap::<&str, ()>::new();
        for project in projects {
            graph.add_node(project.name());
        }

        for (project, deps) in &self.edges {
            for dependency in deps {
                for name in [project, dependency] {
                    if !graph.contains_node(name) {
                        return Err(Error::UnknownDependency {
                            project: project.clone(),
                            dependency: name.clone(),
                        });
                    }
                }
                graph.add_edge(project, dependency, ());
            }
        }

        let mut space = DfsSpace::new(&graph);
        if let Err(cycle) = petgraph::algo::toposort(&graph, Some(&mut space)) {
            tracing::warn!(project = cycle.node_id(), "project dependencies contain a cycle");
        }
        Ok(())
    }
}

impl From<IndexMap<String, Vec<String>>> for Dependencies {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        let mut result = Self::new();
        for (project, deps) in map {
            result.edges.entry(project.clone()).or_default();
            for dependency in deps {
                result.add(project.clone(), dependency);
            }
        }
        result
    }
}

impl From<Dependencies> for IndexMap<String, Vec<String>> {
    fn from(dependencies: Dependencies) -> Self {
        dependencies
            .edges
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().collect()))
            .collect()
    }
}

/// Solution that references projects built by an external make tool
pub struct Solution<'a> {
    version: VsVersion,
    projects: &'a [Project],
    variants: &'a [String],
    architectures: &'a [String],
    dependencies: Option<&'a Dependencies>,
    items: &'a [String],
}

impl<'a> Solution<'a> {
    #[must_use]
    pub fn new(version: VsVersion, projects: &'a [Project]) -> Self {
        Self {
            version,
            projects,
            variants: &[],
            architectures: &[],
            dependencies: None,
            items: &[],
        }
    }

    #[must_use]
    pub fn configurations(mut self, variants: &'a [String], architectures: &'a [String]) -> Self {
        self.variants = variants;
        self.architectures = architectures;
        self
    }

    #[must_use]
    pub fn dependencies(mut self, dependencies: &'a Dependencies) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Auxiliary files shown in the `Solution Items` folder
    #[must_use]
    pub fn items(mut self, items: &'a [String]) -> Self {
        self.items = items;
        self
    }

    /// Renders solution text. Fails on unsupported version, duplicate project
    /// name or unknown dependency.
    pub fn render(&self) -> Result<String> {
        self.version.solution_header()?;
        match self.dependencies {
            Some(dependencies) => dependencies.validate(self.projects)?,
            None => ensure_unique_names(self.projects)?,
        }

        let out = self.to_string();
        tracing::debug!(
            projects = self.projects.len(),
            configurations = self.variants.len() * self.architectures.len(),
            "solution rendered"
        );
        Ok(out)
    }

    fn fmt_project(&self, f: &mut fmt::Formatter<'_>, project: &Project, ids: &HashMap<&str, &Guid>) -> fmt::Result {
        writeln!(
            f,
            "Project(\"{ID_EXTERNAL_MAKEFILE}\") = \"{}\", \"{}\", \"{}\"",
            project.name(),
            path::to_windows(project.path()),
            project.id()
        )?;

        let deps = self
            .dependencies
            .into_iter()
            .flat_map(|d| d.of(project.name()))
            .filter_map(|name| ids.get(name))
            .collect::<IndexSet<_>>();
        if !deps.is_empty() {
            writeln!(f, "\tProjectSection(ProjectDependencies) = postProject")?;
            for id in deps {
                writeln!(f, "\t\t{id} = {id}")?;
            }
            writeln!(f, "\tEndProjectSection")?;
        }
        writeln!(f, "EndProject")
    }

    fn fmt_items(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.version.supports_solution_items() || self.items.is_empty() {
            return Ok(());
        }
        let id = items_id(self.items);
        writeln!(
            f,
            "Project(\"{ID_SOLUTION_FOLDER}\") = \"{SOLUTION_ITEMS}\", \"{SOLUTION_ITEMS}\", \"{id}\""
        )?;
        writeln!(f, "\tProjectSection(SolutionItems) = preProject")?;
        for item in self.items {
            let item = path::to_windows(item);
            writeln!(f, "\t\t{item} = {item}")?;
        }
        writeln!(f, "\tEndProjectSection")?;
        writeln!(f, "EndProject")
    }

    fn fmt_global(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Global")?;

        writeln!(f, "\tGlobalSection(SolutionConfigurationPlatforms) = preSolution")?;
        for (variant, arch) in self.pairs() {
            let name = configuration_name(variant, arch);
            writeln!(f, "\t\t{name} = {name}")?;
        }
        writeln!(f, "\tEndGlobalSection")?;

        writeln!(f, "\tGlobalSection(ProjectConfigurationPlatforms) = postSolution")?;
        for (variant, arch) in self.pairs() {
            let name = configuration_name(variant, arch);
            for project in self.projects {
                let id = project.id();
                writeln!(f, "\t\t{id}.{name}.ActiveCfg = {name}")?;
                writeln!(f, "\t\t{id}.{name}.Build.0 = {name}")?;
            }
        }
        writeln!(f, "\tEndGlobalSection")?;

        writeln!(f, "\tGlobalSection(SolutionProperties) = preSolution")?;
        writeln!(f, "\t\tHideSolutionNode = FALSE")?;
        writeln!(f, "\tEndGlobalSection")?;

        writeln!(f, "EndGlobal")
    }

    /// Variant major pairs as the solution lists them
    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variants
            .iter()
            .cartesian_product(self.architectures)
            .map(|(variant, arch)| (variant.as_str(), arch.as_str()))
    }
}

/// Writes solution text without validation. Unsupported versions produce
/// no header, so use [`Solution::render`] to get checked output.
impl fmt::Display for Solution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(header) = self.version.solution_header() {
            f.write_str(header)?;
        }

        let ids = self
            .projects
            .iter()
            .map(|p| (p.name(), p.id()))
            .collect::<HashMap<&str, &Guid>>();
        for project in self.projects {
            self.fmt_project(f, project, &ids)?;
        }
        self.fmt_items(f)?;
        self.fmt_global(f)
    }
}

/// Renders solution text for the projects and configurations specified
pub fn emit(
    version: VsVersion,
    projects: &[Project],
    variants: &[String],
    architectures: &[String],
    dependencies: &Dependencies,
) -> Result<String> {
    Solution::new(version, projects)
        .configurations(variants, architectures)
        .dependencies(dependencies)
        .render()
}

fn ensure_unique_names(projects: &[Project]) -> Result<()> {
    let mut paths = HashMap::<&str, &str>::new();
    for project in projects {
        if let Some(first) = paths.insert(project.name(), project.path()) {
            return Err(Error::DuplicateProjectName {
                name: project.name().to_owned(),
                first: first.to_owned(),
                second: project.path().to_owned(),
            });
        }
    }
    Ok(())
}

/// Identifier of the `Solution Items` folder
#[must_use]
pub fn items_id(items: &[String]) -> Guid {
    guid::generate(SOLUTION_ITEMS, &items.join(ITEMS_SEPARATOR))
}
