//! Charm-style CLI prompts using cliclack

use crate::config::Settings;
use crate::error::ScaffoldError;
use crate::orchestrator::{Orchestrator, ProjectOutcome, Progress, Stage};
use crate::policy::policy_for;
use crate::request::{validate_name, version_warning, ProjectRequest, Technology, DEFAULT_VERSION};
use crate::runtime::{check, ShellRunner};
use anyhow::Result;
use std::path::Path;
use std::sync::Mutex;

/// Answers that may be supplied up front instead of prompted for
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub name: Option<String>,
    pub tech: Option<Technology>,
    pub author: Option<String>,
    pub version: Option<String>,

    /// Skip the node/npm/npx availability check
    pub skip_checks: bool,

    /// Open the technology's documentation once the project is ready
    pub open_docs: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the create flow with interactive prompts
pub async fn run(settings: &Settings, args: CreateArgs) -> Result<ProjectOutcome> {
    cliclack::intro("timesaver")?;
    cliclack::log::remark("Answer a few questions and your starter project will be ready")?;

    let request = collect_request(&args)?;

    if args.skip_checks {
        cliclack::log::info("Skipping tool check")?;
    } else {
        check_tools(request.tech())?;
    }

    let orchestrator = Orchestrator::new(ShellRunner::new(settings.strict_stderr), settings);
    confirm_working_root(orchestrator.working_root(), &args)?;

    let progress = SpinnerProgress::default();
    let outcome = match orchestrator.run(&request, &progress).await {
        Ok(outcome) => outcome,
        Err(e) => {
            cliclack::outro_cancel("Project setup failed")?;
            return Err(e.into());
        }
    };

    print_next_steps(&outcome)?;
    offer_docs(&outcome, &args)?;
    cliclack::outro("Happy coding!")?;

    Ok(outcome)
}

fn collect_request(args: &CreateArgs) -> Result<ProjectRequest> {
    let name = match &args.name {
        Some(name) => {
            cliclack::log::info(format!("Project name: {}", name))?;
            name.clone()
        }
        None => cliclack::input("Project name")
            .placeholder("my-app")
            .validate(|input: &String| validate_name(input))
            .interact()?,
    };

    let tech = match args.tech {
        Some(tech) => {
            cliclack::log::info(format!("Technology: {}", tech))?;
            tech
        }
        None => select_technology()?,
    };

    let author = match &args.author {
        Some(author) => author.clone(),
        None if args.yes => String::new(),
        None => cliclack::input("Author name")
            .placeholder("optional")
            .required(false)
            .interact()?,
    };

    let version = match &args.version {
        Some(version) => version.clone(),
        None if args.yes => String::new(),
        None => cliclack::input("Version")
            .placeholder(DEFAULT_VERSION)
            .required(false)
            .interact()?,
    };

    if let Some(warning) = version_warning(&version) {
        cliclack::log::warning(warning)?;
    }

    Ok(ProjectRequest::new(name, tech, author, version)?)
}

fn select_technology() -> Result<Technology> {
    let mut select = cliclack::select("Select a technology");
    for tech in Technology::ALL {
        select = select.item(tech, tech.key(), tech.hint());
    }
    Ok(select.interact()?)
}

fn check_tools(tech: Technology) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match check::check_requirements(tech) {
        Ok(tools) => {
            let found: Vec<String> = tools
                .iter()
                .map(|t| format!("{} ({})", t.name, t.version.as_deref().unwrap_or("unknown")))
                .collect();
            spinner.stop(format!("Detected tools: {}", found.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing tools");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

fn confirm_working_root(root: &Path, args: &CreateArgs) -> Result<()> {
    let count = match std::fs::read_dir(root) {
        Ok(entries) => entries.count(),
        Err(_) => return Ok(()),
    };
    if count == 0 {
        return Ok(());
    }

    cliclack::log::warning(format!(
        "{} has {} existing items that will be deleted",
        root.display(),
        count
    ))?;

    let confirm = if args.yes {
        true
    } else {
        cliclack::confirm("Continue anyway?")
            .initial_value(false)
            .interact()?
    };

    if !confirm {
        anyhow::bail!("Setup cancelled.");
    }
    Ok(())
}

fn print_next_steps(outcome: &ProjectOutcome) -> Result<()> {
    let row = policy_for(outcome.tech);
    let mut steps = vec![format!("cd {}", outcome.project_dir.display())];
    if !outcome.tech.is_bare() {
        steps.push("npm install".to_string());
    }
    steps.push(row.run_script.to_string());

    cliclack::log::success(format!(
        "Your {} project is ready ({} files)",
        outcome.tech, outcome.file_count
    ))?;

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }
    println!();

    cliclack::log::info(format!(
        "{} documentation: {}",
        outcome.tech, outcome.doc_url
    ))?;
    Ok(())
}

fn offer_docs(outcome: &ProjectOutcome, args: &CreateArgs) -> Result<()> {
    let open = if args.open_docs {
        true
    } else if args.yes {
        false
    } else {
        cliclack::confirm("Open the documentation in your browser?")
            .initial_value(false)
            .interact()?
    };

    if open {
        if let Err(e) = open::that(outcome.doc_url) {
            cliclack::log::warning(format!("Could not open browser: {}", e))?;
        }
    }
    Ok(())
}

/// Shows one spinner per stage, started and stopped by the orchestrator itself
#[derive(Default)]
struct SpinnerProgress {
    current: Mutex<Option<cliclack::ProgressBar>>,
}

impl Progress for SpinnerProgress {
    fn stage_started(&self, stage: Stage) {
        let spinner = cliclack::spinner();
        spinner.start(stage.describe());
        if let Ok(mut current) = self.current.lock() {
            *current = Some(spinner);
        }
    }

    fn stage_finished(&self, stage: Stage) {
        if let Some(spinner) = self.current.lock().ok().and_then(|mut c| c.take()) {
            spinner.stop(stage.describe());
        }
    }

    // The error itself is reported once, by the caller that receives it
    fn stage_failed(&self, stage: Stage, _error: &ScaffoldError) {
        if let Some(spinner) = self.current.lock().ok().and_then(|mut c| c.take()) {
            spinner.error(format!("{} failed", stage.describe()));
        }
    }
}
