//! External tool execution and detection
//!
//! This module provides:
//! - The command runner every scaffolder call goes through
//! - PATH checks for the tools those commands need

pub mod check;
pub mod runner;

pub use check::{check_requirements, check_tool, required_tools, RequiredTool, ToolInfo};
pub use runner::{CommandRunner, ShellRunner};
