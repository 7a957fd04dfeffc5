//! Technology choices and the validated project request handed to the orchestrator

use crate::error::{Result, ScaffoldError};
use std::fmt;
use std::str::FromStr;

/// Default manifest version when the user leaves it blank
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Supported starter technologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Technology {
    #[value(name = "typescript")]
    Typescript,
    #[value(name = "react")]
    React,
    #[value(name = "react_ts", alias = "react-ts")]
    ReactTs,
    #[value(name = "vue")]
    Vue,
    #[value(name = "vue_ts", alias = "vue-ts")]
    VueTs,
    #[value(name = "angular")]
    Angular,
    #[value(name = "angular_ts", alias = "angular-ts")]
    AngularTs,
}

impl Technology {
    /// All technologies in menu order
    pub const ALL: [Technology; 7] = [
        Technology::Typescript,
        Technology::React,
        Technology::ReactTs,
        Technology::Vue,
        Technology::VueTs,
        Technology::Angular,
        Technology::AngularTs,
    ];

    /// Stable key shown to users (`React_ts`, `Vue`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            Technology::Typescript => "Typescript",
            Technology::React => "React",
            Technology::ReactTs => "React_ts",
            Technology::Vue => "Vue",
            Technology::VueTs => "Vue_ts",
            Technology::Angular => "Angular",
            Technology::AngularTs => "Angular_ts",
        }
    }

    /// Short description used as a prompt hint
    pub fn hint(&self) -> &'static str {
        match self {
            Technology::Typescript => "bare TypeScript project with tsc",
            Technology::React => "Vite + React",
            Technology::ReactTs => "Vite + React with TypeScript",
            Technology::Vue => "Vite + Vue",
            Technology::VueTs => "Vite + Vue with TypeScript",
            Technology::Angular => "Angular CLI workspace",
            Technology::AngularTs => "Angular CLI workspace with TypeScript toolchain",
        }
    }

    /// True for the technology that is assembled locally instead of by a scaffolder
    pub fn is_bare(&self) -> bool {
        matches!(self, Technology::Typescript)
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Technology {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Technology::ALL
            .into_iter()
            .find(|tech| tech.key().to_lowercase() == normalized)
            .ok_or_else(|| {
                let available: Vec<&str> = Technology::ALL.iter().map(|t| t.key()).collect();
                ScaffoldError::InvalidRequest(format!(
                    "unknown technology '{}'. Available: {}",
                    s,
                    available.join(", ")
                ))
            })
    }
}

/// Validated answers for one orchestration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    name: String,
    tech: Technology,
    author: String,
    version: String,
}

impl ProjectRequest {
    /// Build a request, rejecting names that are empty or not a single path component
    pub fn new(
        name: impl Into<String>,
        tech: Technology,
        author: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        validate_name(&name).map_err(|reason| ScaffoldError::InvalidRequest(reason.to_string()))?;

        Ok(Self {
            name,
            tech,
            author: author.into().trim().to_string(),
            version: version.into().trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tech(&self) -> Technology {
        self.tech
    }

    /// Author as written into the manifest (empty when not given)
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Version written into the manifest, falling back to [`DEFAULT_VERSION`]
    pub fn effective_version(&self) -> &str {
        if self.version.is_empty() {
            DEFAULT_VERSION
        } else {
            &self.version
        }
    }
}

/// Check that a project name can be used as a directory name.
///
/// Shared with the interactive prompt so both reject the same input.
pub fn validate_name(name: &str) -> std::result::Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Project name is required");
    }
    if name == "." || name == ".." {
        return Err("Project name cannot be '.' or '..'");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("Project name cannot contain path separators");
    }
    Ok(())
}

/// Warn-only check for versions that are not semver (a leading `v` is tolerated)
pub fn version_warning(version: &str) -> Option<String> {
    let version = version.trim();
    if version.is_empty() {
        return None;
    }
    let cleaned = version.strip_prefix('v').unwrap_or(version);
    match semver::Version::parse(cleaned) {
        Ok(_) => None,
        Err(e) => Some(format!(
            "'{}' is not a semantic version ({}); it will be written as-is",
            version, e
        )),
    }
}
