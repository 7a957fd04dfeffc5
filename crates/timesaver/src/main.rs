//! timesaver - scaffold React, Vue, Angular and TypeScript starter projects

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timesaver_core::tui::CreateArgs;
use timesaver_core::{workspace, Settings, Technology};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "timesaver")]
#[command(about = "Time saving terminal: create new projects from official scaffolders")]
#[command(version)]
pub struct Args {
    /// YAML settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory recreated for each run (default: ./Project)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    #[command(alias = "c")]
    Create(CliCreateArgs),
    /// List all technologies and their documentation
    #[command(alias = "l")]
    List,
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Technology to scaffold
    #[arg(short, long, value_enum, ignore_case = true)]
    pub tech: Option<Technology>,

    /// Author written into package.json
    #[arg(short, long)]
    pub author: Option<String>,

    /// Version written into package.json
    #[arg(long = "project-version")]
    pub project_version: Option<String>,

    /// Skip the node/npm/npx check
    #[arg(long = "skip-checks")]
    pub skip_checks: bool,

    /// Open the documentation in a browser when done
    #[arg(long = "open-docs")]
    pub open_docs: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            name: args.name,
            tech: args.tech,
            author: args.author,
            version: args.project_version,
            skip_checks: args.skip_checks,
            open_docs: args.open_docs,
            yes: args.yes,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(root) = &args.root {
        settings.working_root = root.clone();
    }

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    settings.working_root = workspace::absolutize(&settings.working_root, &cwd);
    tracing::debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

async fn create(settings: &Settings, create_args: CreateArgs) -> Result<()> {
    let result = timesaver_core::run(settings, create_args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result.map(|_| ())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let mut args = Args::parse();
    init_tracing(args.verbose);

    match args.command.take() {
        Some(Command::List) => {
            print!("{}", timesaver_core::policy::render_technology_table());
            Ok(())
        }
        Some(Command::Create(create_args)) => {
            let settings = load_settings(&args)?;
            create(&settings, create_args.into()).await
        }
        None => {
            // No subcommand provided, default to create behavior (interactive mode)
            let settings = load_settings(&args)?;
            create(&settings, CreateArgs::default()).await
        }
    }
}
