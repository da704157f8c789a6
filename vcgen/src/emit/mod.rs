//! Schema emitters. Both walk the same [`Project`] and produce document
//! trees, the schema is selected once by the Visual Studio version.

use crate::error::Result;
use crate::model::Project;
use crate::msbuild::VsVersion;
use crate::xml::Element;

pub mod legacy;
pub mod modern;

pub use legacy::LegacyEmitter;
pub use modern::ModernEmitter;

/// Documents generated for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocuments {
    /// Project document itself
    pub project: Element,
    /// Filters overlay. msbuild schema only
    pub filters: Option<Element>,
    /// Debugger settings. msbuild schema only and only if any setting defined
    pub user: Option<Element>,
}

/// Schema strategy
pub trait Emit {
    /// Generates all documents of the project
    fn emit(&self, project: &Project) -> Result<ProjectDocuments>;

    /// Project file extension of the schema without leading dot
    fn extension(&self) -> &'static str;
}

/// Creates emitter of the schema the version specified uses.
/// Fails if the version has no known project format.
pub fn new_box(version: VsVersion) -> Result<Box<dyn Emit>> {
    if version.is_legacy() {
        Ok(Box::new(LegacyEmitter::new(version)?))
    } else {
        Ok(Box::new(ModernEmitter::new(version)?))
    }
}

/// `variant|arch` configuration name
#[must_use]
pub fn configuration_name(variant: &str, arch: &str) -> String {
    format!("{variant}|{arch}")
}
