//! Detection of the external tools the scaffolders rely on

use crate::error::{Result, ScaffoldError};
use crate::request::Technology;
use std::process::Command;

/// A tool that must be resolvable on PATH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredTool {
    /// Binary name
    pub name: &'static str,
    /// Hint shown when the tool is missing
    pub install_hint: &'static str,
}

const NODE: RequiredTool = RequiredTool {
    name: "node",
    install_hint: "install Node.js from https://nodejs.org",
};

const NPM: RequiredTool = RequiredTool {
    name: "npm",
    install_hint: "ships with Node.js (https://nodejs.org)",
};

const NPX: RequiredTool = RequiredTool {
    name: "npx",
    install_hint: "ships with npm 7 or newer",
};

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Tools needed to materialize a project for `tech`.
///
/// Every technology goes through npm; the TypeScript init step and the Angular
/// CLI go through npx.
pub fn required_tools(_tech: Technology) -> &'static [RequiredTool] {
    &[NODE, NPM, NPX]
}

/// Check whether a tool answers `--version`
pub fn check_tool(name: &'static str) -> ToolInfo {
    let output = Command::new(name).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check every tool `tech` needs; fails listing all missing tools at once
pub fn check_requirements(tech: Technology) -> Result<Vec<ToolInfo>> {
    check_with(required_tools(tech), check_tool)
}

fn check_with(
    tools: &[RequiredTool],
    probe: impl Fn(&'static str) -> ToolInfo,
) -> Result<Vec<ToolInfo>> {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for tool in tools {
        let info = probe(tool.name);
        if info.available {
            found.push(info);
        } else {
            missing.push(format!("{} ({})", tool.name, tool.install_hint));
        }
    }

    if !missing.is_empty() {
        return Err(ScaffoldError::MissingTools(missing));
    }

    Ok(found)
}
