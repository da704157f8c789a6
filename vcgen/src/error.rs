use miette::Diagnostic;
use thiserror::Error;

use crate::msbuild::VsVersion;

/// Errors raised while building a project model or emitting documents.
/// Any of them aborts generation of the current artifact.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Unknown configuration kind '{0}'")]
    #[diagnostic(
        code(vcgen::model::configuration_kind),
        help("Use one of: Makefile, Application, DynamicLibrary, StaticLibrary, Utility")
    )]
    UnknownConfigurationKind(String),

    #[error("Visual Studio version {0} is not supported")]
    #[diagnostic(
        code(vcgen::msbuild::unsupported_version),
        help("Supported versions are 8.0, 9.0, 10.0, 11.0, 12.0, 14.0, 15.0, 16.0 and 17.0")
    )]
    UnsupportedVersion(VsVersion),

    #[error("Invalid Visual Studio version '{0}'")]
    #[diagnostic(
        code(vcgen::msbuild::invalid_version),
        help("Version must look like 15 or 14.2")
    )]
    InvalidVersion(String),

    /// Only `Makefile` projects must define every make tool property. Other
    /// kinds build with the IDE compiler, so absent properties are left out.
    #[error("Required property '{property}' of '{tool}' is missing for configuration '{configuration}'")]
    #[diagnostic(code(vcgen::emit::missing_property))]
    MissingProperty {
        property: String,
        tool: String,
        configuration: String,
    },

    #[error("Folder '{folder}' does not start with strip prefix '{prefix}'")]
    #[diagnostic(code(vcgen::filter::strip_prefix))]
    StripPrefixMismatch { folder: String, prefix: String },

    #[error("Project '{project}' depends on unknown project '{dependency}'")]
    #[diagnostic(code(vcgen::solution::unknown_dependency))]
    UnknownDependency { project: String, dependency: String },

    #[error("Projects '{first}' and '{second}' have the same name '{name}'")]
    #[diagnostic(
        code(vcgen::solution::duplicate_name),
        help("Solutions and dependencies refer to projects by name. Set distinct names")
    )]
    DuplicateProjectName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid workspace description")]
    #[diagnostic(code(vcgen::config::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(vcgen::io))]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
