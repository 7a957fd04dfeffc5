//! Project materialization workflow
//!
//! Framework technologies:
//! `DirectoryReset -> ScaffoldInvoked -> OutputDirectoryAwaited ->
//! [TypescriptInstalled] -> Renamed -> ManifestPatched -> Done`
//!
//! Bare TypeScript:
//! `DirectoryReset -> ToolchainInstalled -> MinimalSourceWritten -> Done`
//!
//! Stages run strictly one after another. The first failure aborts the run and
//! leaves whatever was already created in place.

use crate::config::Settings;
use crate::error::{Result, ScaffoldError};
use crate::manifest::patch_manifest;
use crate::policy::{policy_for, PolicyRow, MANIFEST_FILE, TYPESCRIPT_INIT, TYPESCRIPT_INSTALL};
use crate::request::{ProjectRequest, Technology};
use crate::runtime::runner::CommandRunner;
use crate::workspace::{self, WaitPolicy};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Entry file written for bare TypeScript projects
pub const HELLO_WORLD_FILE: &str = "index.ts";
/// Contents of [`HELLO_WORLD_FILE`]
pub const HELLO_WORLD_SOURCE: &str = "console.log(\"Hello, world!\");";

/// One step of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DirectoryReset,
    ScaffoldInvoked,
    OutputDirectoryAwaited,
    TypescriptInstalled,
    Renamed,
    ManifestPatched,
    ToolchainInstalled,
    MinimalSourceWritten,
}

impl Stage {
    /// Present-tense description shown while the stage runs
    pub fn describe(&self) -> &'static str {
        match self {
            Stage::DirectoryReset => "Preparing working directory",
            Stage::ScaffoldInvoked => "Running scaffolder",
            Stage::OutputDirectoryAwaited => "Waiting for generated project",
            Stage::TypescriptInstalled => "Installing TypeScript",
            Stage::Renamed => "Renaming project directory",
            Stage::ManifestPatched => "Updating package.json",
            Stage::ToolchainInstalled => "Installing TypeScript toolchain",
            Stage::MinimalSourceWritten => "Writing index.ts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Observer notified as stages start and complete
pub trait Progress {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage) {}
    fn stage_failed(&self, _stage: Stage, _error: &ScaffoldError) {}
}

/// Progress observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub tech: Technology,
    /// Final project directory
    pub project_dir: PathBuf,
    pub doc_url: &'static str,
    /// Stages completed, in order
    pub stages: Vec<Stage>,
    /// Files in the project, excluding `node_modules` and `.git`
    pub file_count: usize,
}

/// Drives one orchestration run at a time against an explicit working root
pub struct Orchestrator<R> {
    runner: R,
    working_root: PathBuf,
    wait: WaitPolicy,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, settings: &Settings) -> Self {
        Self {
            runner,
            working_root: settings.working_root.clone(),
            wait: settings.wait_policy(),
        }
    }

    /// Directory wiped and recreated at the start of every run
    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Materialize the project described by `request`
    pub async fn run<P: Progress>(
        &self,
        request: &ProjectRequest,
        progress: &P,
    ) -> Result<ProjectOutcome> {
        let row = policy_for(request.tech());
        info!(
            "Creating {} project '{}' in {}",
            request.tech(),
            request.name(),
            self.working_root.display()
        );

        let mut run = Run {
            progress,
            stages: Vec::new(),
        };

        let project_dir = if request.tech().is_bare() {
            self.run_bare(request, &mut run).await?
        } else {
            self.run_framework(request, row, &mut run).await?
        };

        let file_count = workspace::count_files(&project_dir);
        info!("Project ready at {}", project_dir.display());

        Ok(ProjectOutcome {
            tech: request.tech(),
            project_dir,
            doc_url: row.doc_url,
            stages: run.stages,
            file_count,
        })
    }

    async fn run_bare<P: Progress>(
        &self,
        request: &ProjectRequest,
        run: &mut Run<'_, P>,
    ) -> Result<PathBuf> {
        let root = &self.working_root;
        let project_dir = root.join(request.name());

        run.stage(Stage::DirectoryReset, workspace::reset_directory(root))
            .await?;

        run.stage(Stage::ToolchainInstalled, self.install_typescript(root))
            .await?;

        run.stage(Stage::MinimalSourceWritten, async {
            // Must not land in anything the toolchain install created
            fs::create_dir(&project_dir)
                .await
                .map_err(|e| ScaffoldError::fs(&project_dir, e))?;
            let entry = project_dir.join(HELLO_WORLD_FILE);
            fs::write(&entry, HELLO_WORLD_SOURCE)
                .await
                .map_err(|e| ScaffoldError::fs(&entry, e))
        })
        .await?;

        Ok(project_dir)
    }

    async fn run_framework<P: Progress>(
        &self,
        request: &ProjectRequest,
        row: &PolicyRow,
        run: &mut Run<'_, P>,
    ) -> Result<PathBuf> {
        let root = &self.working_root;
        let (Some(scaffold), Some(folder)) = (row.scaffold_command, row.generated_folder) else {
            return Err(ScaffoldError::InvalidRequest(format!(
                "{} has no scaffolder configured",
                row.tech
            )));
        };
        let generated_dir = root.join(folder);
        let project_dir = root.join(request.name());

        run.stage(Stage::DirectoryReset, workspace::reset_directory(root))
            .await?;

        run.stage(Stage::ScaffoldInvoked, async {
            self.runner.run(scaffold, root).await.map(|_| ())
        })
        .await?;

        run.stage(Stage::OutputDirectoryAwaited, async {
            workspace::await_directory(&generated_dir, &self.wait).await?;
            workspace::await_path(&generated_dir.join(MANIFEST_FILE), &self.wait).await
        })
        .await?;

        if row.needs_typescript_install {
            run.stage(
                Stage::TypescriptInstalled,
                self.install_typescript(&generated_dir),
            )
            .await?;
        }

        run.stage(Stage::Renamed, async {
            if generated_dir == project_dir {
                debug!("Generated folder already has the requested name");
                return Ok(());
            }
            workspace::rename_directory(&generated_dir, &project_dir).await
        })
        .await?;

        run.stage(
            Stage::ManifestPatched,
            patch_manifest(&project_dir.join(MANIFEST_FILE), request, row),
        )
        .await?;

        Ok(project_dir)
    }

    /// Install the compiler into `dir`, generating a tsconfig only if none exists
    async fn install_typescript(&self, dir: &Path) -> Result<()> {
        self.runner.run(TYPESCRIPT_INSTALL, dir).await?;

        if fs::try_exists(dir.join("tsconfig.json")).await.unwrap_or(false) {
            debug!("{} already has a tsconfig.json", dir.display());
            return Ok(());
        }
        self.runner.run(TYPESCRIPT_INIT, dir).await?;
        Ok(())
    }
}

/// Per-run bookkeeping: reports each stage and records the ones that completed
struct Run<'a, P> {
    progress: &'a P,
    stages: Vec<Stage>,
}

impl<P: Progress> Run<'_, P> {
    async fn stage<F>(&mut self, stage: Stage, work: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        debug!("Stage started: {:?}", stage);
        self.progress.stage_started(stage);

        match work.await {
            Ok(()) => {
                self.progress.stage_finished(stage);
                self.stages.push(stage);
                Ok(())
            }
            Err(e) => {
                self.progress.stage_failed(stage, &e);
                Err(e)
            }
        }
    }
}
