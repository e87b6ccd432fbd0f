//! Main CLI application

use crate::cli::logging::init_tracing;
use crate::config::{parse_config_auto, parse_config_file, validate_config, SiteConfig};
use crate::error::SiteError;
use crate::runner::{BuildContext, CommandToolchain, Reporter, Verbosity, DEFAULT_ENV};
use crate::tasks::{build_registry, Site, TaskId};
use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub task: TaskId,
    pub env: String,
    pub file: Option<PathBuf>,
    pub verbosity: Verbosity,
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("sitepipe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lint, template, minify and deploy a static site")
        .arg(
            Arg::new("task")
                .value_name("TASK")
                .help("Task to run")
                .default_value(TaskId::Default.name())
                .value_parser(PossibleValuesParser::new(
                    TaskId::ALL.iter().map(|id| id.name()),
                )),
        )
        .arg(
            Arg::new("env")
                .long("env")
                .value_name("NAME")
                .help("Environment name exposed to templates")
                .default_value(DEFAULT_ENV),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the project descriptor (site.yml or package.json)"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List all tasks and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print a shell completion script and exit"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print tool output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Extract the run request from parsed arguments
pub fn invocation(matches: &ArgMatches) -> Result<Invocation, SiteError> {
    let task = matches
        .get_one::<String>("task")
        .map(String::as_str)
        .unwrap_or(TaskId::Default.name())
        .parse::<TaskId>()?;

    Ok(Invocation {
        task,
        env: matches
            .get_one::<String>("env")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ENV.to_string()),
        file: matches.get_one::<PathBuf>("file").cloned(),
        verbosity: get_verbosity(matches),
    })
}

/// Load and validate the descriptor, returning it with the project root
pub fn load_config(file: Option<&Path>) -> Result<(SiteConfig, PathBuf), SiteError> {
    let (config, path) = match file {
        Some(path) => (parse_config_file(path)?, path.to_path_buf()),
        None => parse_config_auto()?,
    };
    validate_config(&config)?;

    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    Ok((config, root))
}

/// Run one task with a fully assembled site
pub fn execute(invocation: &Invocation) -> Result<(), SiteError> {
    let (config, root) = load_config(invocation.file.as_deref())?;
    debug!(root = %root.display(), env = %invocation.env, "loaded project");

    let toolchain = CommandToolchain::new(&root)
        .with_interpreter(config.interpreter.clone().unwrap_or_default())
        .with_overrides(&config.tools)
        .with_verbosity(invocation.verbosity);
    let context = BuildContext::new(config, root).with_env(invocation.env.clone());
    let site = Site::new(context, Box::new(toolchain));

    let registry = build_registry()?;
    let reporter = Reporter::new(invocation.verbosity);
    registry.run(invocation.task.name(), &site, &reporter)?;

    reporter.print_info(&format!("{} {}", "Finished".green().bold(), invocation.task));
    Ok(())
}

/// Print every task with its description
fn print_task_list() {
    let width = TaskId::ALL.iter().map(|id| id.name().len()).max().unwrap_or(0);
    for id in TaskId::ALL {
        let mut line = format!(
            "  {}  {}",
            format!("{:width$}", id.name()).bold(),
            id.description()
        );
        if let Some(children) = id.children() {
            let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
            line.push_str(&format!(" [{}]", names.join(" -> ")).dimmed().to_string());
        }
        println!("{}", line);
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), SiteError> {
    run_from(std::env::args_os())
}

/// Run the CLI application with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<(), SiteError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);

    if let Some(shell) = matches.get_one::<Shell>("completions") {
        clap_complete::generate(*shell, &mut build_command(), "sitepipe", &mut io::stdout());
        return Ok(());
    }

    if matches.get_flag("list") {
        print_task_list();
        return Ok(());
    }

    let invocation = invocation(&matches)?;
    init_tracing(invocation.verbosity);

    // A missing .env is normal
    let _ = dotenvy::dotenv();

    execute(&invocation)
}
