//! Timesaver Core - starter-project materialization
//!
//! Drives third-party scaffolders (Vite, the Angular CLI, the TypeScript
//! compiler) to produce a starter project, then renames the generated folder
//! and patches its `package.json`.
//!
//! # Architecture
//!
//! - **Layer 1: Core Operations** - command runner, directory management,
//!   manifest patching, the static technology policy table
//! - **Layer 2: Workflow Orchestration** - [`Orchestrator`] sequences the
//!   operations against an explicit working root and reports each [`Stage`]
//! - **Layer 3: CLI/TUI Interface** - optional cliclack prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use timesaver_core::{Orchestrator, ProjectRequest, Settings, ShellRunner, Technology};
//! use timesaver_core::orchestrator::NoProgress;
//!
//! let settings = Settings::load(None)?;
//! let request = ProjectRequest::new("shop", Technology::ReactTs, "Al", "2.0.0")?;
//! let orchestrator = Orchestrator::new(ShellRunner::default(), &settings);
//! let outcome = orchestrator.run(&request, &NoProgress).await?;
//! println!("created {}", outcome.project_dir.display());
//! ```

pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod policy;
pub mod request;
pub mod runtime;
pub mod workspace;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::Settings;
pub use error::{Result, ScaffoldError};
pub use orchestrator::{Orchestrator, ProjectOutcome, Progress, Stage};
pub use policy::{policy_for, PolicyRow};
pub use request::{ProjectRequest, Technology};
pub use runtime::{CommandRunner, ShellRunner};

#[cfg(feature = "tui")]
pub use tui::run;
