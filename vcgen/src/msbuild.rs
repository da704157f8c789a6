use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Project type id of makefile (external build) projects
pub const ID_EXTERNAL_MAKEFILE: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";
/// Project type id of solution folders
pub const ID_SOLUTION_FOLDER: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Property table entry used by the make-like tool
pub const MAKE_PROPERTIES: &str = "make_properties";
/// Property table entry used by the debugger (user) settings
pub const USER_PROPERTIES: &str = "user_properties";

/// Last version that uses the legacy `.vcproj` schema
const LAST_LEGACY_VERSION: VsVersion = VsVersion::new(9, 0);
/// Last version whose msbuild documents declare tools version 4.0
const LAST_TOOLS_V4_VERSION: VsVersion = VsVersion::new(12, 0);
/// Solution items folder appears in solutions newer than this one
const LAST_VERSION_WITHOUT_ITEMS: VsVersion = VsVersion::new(10, 0);

/// Visual Studio version with tenths precision, i.e. 9.0, 14.2 or 15.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVersion", into = "String")]
pub struct VsVersion {
    tenths: u16,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Number(f64),
}

impl VsVersion {
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self {
            tenths: major * 10 + minor,
        }
    }

    #[must_use]
    pub fn major(self) -> u16 {
        self.tenths / 10
    }

    #[must_use]
    pub fn minor(self) -> u16 {
        self.tenths % 10
    }

    /// Whether projects of this version use the legacy `.vcproj` schema
    #[must_use]
    pub fn is_legacy(self) -> bool {
        self <= LAST_LEGACY_VERSION
    }

    /// `ToolsVersion` attribute of modern project and user documents
    #[must_use]
    pub fn tools_version(self) -> &'static str {
        if self <= LAST_TOOLS_V4_VERSION {
            "4.0"
        } else {
            "14.0"
        }
    }

    /// Whether solutions of this version may contain a solution items folder
    #[must_use]
    pub fn supports_solution_items(self) -> bool {
        self > LAST_VERSION_WITHOUT_ITEMS
    }

    /// Platform toolset name like v142
    #[must_use]
    pub fn toolset(self) -> String {
        format!("v{}", self.tenths)
    }

    /// Legacy schema version attribute with two decimals i.e. 9.00
    #[must_use]
    pub fn legacy_format(self) -> String {
        format!("{}.{}0", self.major(), self.minor())
    }

    /// Returns the version back if it's one of the versions with known
    /// solution and project formats
    pub fn ensure_supported(self) -> Result<Self> {
        self.solution_header().map(|_| self)
    }

    /// Solution file header (format line and product comment)
    pub fn solution_header(self) -> Result<&'static str> {
        let header = match (self.major(), self.minor()) {
            (8, 0) => "Microsoft Visual Studio Solution File, Format Version 9.00\n# Visual Studio 2005\n",
            (9, 0) => "Microsoft Visual Studio Solution File, Format Version 10.00\n# Visual Studio 2008\n",
            (10, 0) => "Microsoft Visual Studio Solution File, Format Version 11.00\n# Visual Studio 2010\n",
            (11, 0) => "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio 2012\n",
            (12, 0) => "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio 2013\n",
            (14, 0) => "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio 2015\n",
            (15, 0) => "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio 2017\n",
            (16, 0) => "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 16\n",
            (17, 0) => "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n",
            _ => return Err(Error::UnsupportedVersion(self)),
        };
        Ok(header)
    }
}

impl FromStr for VsVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(s.to_owned());
        let trimmed = s.trim();
        let (major, minor) = trimmed.split_once('.').unwrap_or((trimmed, "0"));
        let major = major.parse::<u16>().map_err(|_| invalid())?;

        let mut digits = minor.chars();
        let tenth = match digits.next() {
            Some(c) => c.to_digit(10).ok_or_else(invalid)?,
            None => 0,
        };
        // 9.00 is fine, 14.25 is not
        if !digits.all(|c| c == '0') || major > 999 {
            return Err(invalid());
        }

        // tenth is a single decimal digit here
        Ok(VsVersion::new(major, u16::try_from(tenth).map_err(|_| invalid())?))
    }
}

impl TryFrom<RawVersion> for VsVersion {
    type Error = Error;

    fn try_from(raw: RawVersion) -> Result<Self> {
        match raw {
            RawVersion::Text(s) => s.parse(),
            RawVersion::Number(n) => format!("{n:.1}").parse(),
        }
    }
}

impl From<VsVersion> for String {
    fn from(v: VsVersion) -> Self {
        v.to_string()
    }
}

impl Display for VsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Kind of artifact a project produces. Selects the tool set written for
/// every configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConfigurationKind {
    Makefile,
    Application,
    DynamicLibrary,
    StaticLibrary,
    Utility,
}

impl ConfigurationKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ConfigurationKind::Makefile => "Makefile",
            ConfigurationKind::Application => "Application",
            ConfigurationKind::DynamicLibrary => "DynamicLibrary",
            ConfigurationKind::StaticLibrary => "StaticLibrary",
            ConfigurationKind::Utility => "Utility",
        }
    }

    /// Numeric `ConfigurationType` of the legacy schema
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            ConfigurationKind::Makefile => 0,
            ConfigurationKind::Application => 1,
            ConfigurationKind::DynamicLibrary => 2,
            ConfigurationKind::StaticLibrary => 4,
            ConfigurationKind::Utility => 10,
        }
    }

    /// Legacy schema tools written for each configuration of this kind
    #[must_use]
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            ConfigurationKind::Makefile => &MAKEFILE_TOOLS,
            ConfigurationKind::Application | ConfigurationKind::DynamicLibrary => &LINKED_TOOLS,
            ConfigurationKind::StaticLibrary => &LIBRARY_TOOLS,
            ConfigurationKind::Utility => &UTILITY_TOOLS,
        }
    }
}

impl FromStr for ConfigurationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Makefile" => Ok(ConfigurationKind::Makefile),
            "Application" => Ok(ConfigurationKind::Application),
            "DynamicLibrary" => Ok(ConfigurationKind::DynamicLibrary),
            "StaticLibrary" => Ok(ConfigurationKind::StaticLibrary),
            "Utility" => Ok(ConfigurationKind::Utility),
            _ => Err(Error::UnknownConfigurationKind(s.to_owned())),
        }
    }
}

impl Display for ConfigurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Property table entry that holds settings of a legacy tool.
/// Tools without an alias use their schema name.
#[must_use]
pub fn tool_entry(tool: &str) -> &str {
    TOOL_ENTRIES.get(tool).copied().unwrap_or(tool)
}

/// Legacy schema attribute of a semantic property name.
/// Unknown names are already attributes.
#[must_use]
pub fn legacy_attribute(property: &str) -> &str {
    LEGACY_PROPERTIES.get(property).copied().unwrap_or(property)
}

static TOOL_ENTRIES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "VCNMakeTool" => MAKE_PROPERTIES,
};

static LEGACY_PROPERTIES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "build_command_line" => "BuildCommandLine",
    "clean_command_line" => "CleanCommandLine",
    "rebuild_command_line" => "RebuildCommandLine",
    "output" => "Output",
    "preprocessor_definitions" => "PreprocessorDefinitions",
    "include_search_path" => "IncludeSearchPath",
};

/// Make tool properties of the msbuild schema in the order they are written
pub static MAKE_PROPERTY_ELEMENTS: phf::OrderedMap<&'static str, &'static str> = phf::phf_ordered_map! {
    "build_command_line" => "NMakeBuildCommandLine",
    "clean_command_line" => "NMakeCleanCommandLine",
    "rebuild_command_line" => "NMakeReBuildCommandLine",
    "output" => "NMakeOutput",
    "preprocessor_definitions" => "NMakePreprocessorDefinitions",
    "include_search_path" => "NMakeIncludeSearchPath",
};

/// Debugger settings of the msbuild user document in the order they are written
pub static USER_PROPERTY_ELEMENTS: phf::OrderedMap<&'static str, &'static str> = phf::phf_ordered_map! {
    "working_directory" => "LocalDebuggerWorkingDirectory",
    "debugger_flavor" => "DebuggerFlavor",
    "debugger_command" => "LocalDebuggerCommand",
    "debugger_environment" => "LocalDebuggerEnvironment",
    "debugger_arguments" => "LocalDebuggerCommandArguments",
};

const MAKEFILE_TOOLS: [&str; 1] = ["VCNMakeTool"];

const LINKED_TOOLS: [&str; 17] = [
    "VCPreBuildEventTool",
    "VCCustomBuildTool",
    "VCXMLDataGeneratorTool",
    "VCWebServiceProxyGeneratorTool",
    "VCMIDLTool",
    "VCCLCompilerTool",
    "VCManagedResourceCompilerTool",
    "VCResourceCompilerTool",
    "VCPreLinkEventTool",
    "VCLinkerTool",
    "VCALinkTool",
    "VCManifestTool",
    "VCXDCMakeTool",
    "VCBscMakeTool",
    "VCFxCopTool",
    "VCAppVerifierTool",
    "VCPostBuildEventTool",
];

const LIBRARY_TOOLS: [&str; 15] = [
    "VCPreBuildEventTool",
    "VCCustomBuildTool",
    "VCXMLDataGeneratorTool",
    "VCWebServiceProxyGeneratorTool",
    "VCMIDLTool",
    "VCCLCompilerTool",
    "VCManagedResourceCompilerTool",
    "VCResourceCompilerTool",
    "VCPreLinkEventTool",
    "VCLibrarianTool",
    "VCALinkTool",
    "VCXDCMakeTool",
    "VCBscMakeTool",
    "VCFxCopTool",
    "VCPostBuildEventTool",
];

const UTILITY_TOOLS: [&str; 4] = [
    "VCPreBuildEventTool",
    "VCCustomBuildTool",
    "VCMIDLTool",
    "VCPostBuildEventTool",
];
