//! Main CLI application

use crate::cli::init_logging;
use crate::config::{load_config, validate_config, Overrides};
use crate::pipeline::{is_complete, resolve, Context, Executor, NodeState, Plan, RunReport, Task, TaskOutcome, Verbosity};
use crate::tasks::{build_pipeline, HttpRemote, MirrorRemote, PipelineParams, Remote};
use anyhow::{bail, Context as _};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info_span;

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("geopipe")
        .version(crate::VERSION)
        .about("Fetch, extract and reshape a GEO dataset, resuming from persisted artifacts")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to geopipe.yml config file")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory all artifacts are written under")
                .global(true),
        )
        .arg(
            Arg::new("series")
                .long("series")
                .value_name("SERIES")
                .help("Dataset series, e.g. GSE68nnn")
                .global(true),
        )
        .arg(
            Arg::new("dataset")
                .long("dataset")
                .value_name("NAME")
                .help("Dataset name, e.g. GSE68849")
                .global(true),
        )
        .arg(
            Arg::new("mirror")
                .long("mirror")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Serve the listing and archive from a local directory")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print warnings and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("run").about("Run the pipeline (default)"))
        .subcommand(
            Command::new("status").about("Show which tasks are complete without running anything"),
        )
        .subcommand(
            Command::new("completions")
                .about("Print a shell completion script")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
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

/// Command-line values that override config file and environment
fn get_overrides(matches: &ArgMatches) -> Overrides {
    Overrides {
        data_dir: matches.get_one::<PathBuf>("data-dir").cloned(),
        series: matches.get_one::<String>("series").cloned(),
        dataset: matches.get_one::<String>("dataset").cloned(),
    }
}

/// Load configuration and wire the pipeline's terminal task
fn prepare(matches: &ArgMatches, verbosity: Verbosity) -> anyhow::Result<(Context, Arc<dyn Task>)> {
    let file = matches.get_one::<PathBuf>("file");
    let (config, config_path) = load_config(file.map(PathBuf::as_path), &get_overrides(matches))?;
    validate_config(&config)?;

    let span = info_span!("pipeline", dataset = %config.dataset.name);
    let mut ctx = Context::new()
        .with_verbosity(verbosity)
        .with_policy(config.completion)
        .with_span(span);
    if let Some(path) = config_path {
        ctx = ctx.with_config_path(path);
    }

    let mirror = matches
        .get_one::<PathBuf>("mirror")
        .cloned()
        .or_else(|| config.source.mirror.clone());
    let remote: Arc<dyn Remote> = match mirror {
        Some(dir) => Arc::new(MirrorRemote::new(ctx.resolve_path(&dir))),
        None => Arc::new(HttpRemote::new().context("failed to build HTTP client")?),
    };

    let data_dir = ctx.resolve_path(&config.data_dir);
    let params = PipelineParams::from_config(&config, data_dir, remote)?;
    Ok((ctx, build_pipeline(Arc::new(params))))
}

/// Resolve and execute; fails unless the terminal artifact exists afterwards.
///
/// The outcomes recorded before a failure are printed before it surfaces.
fn run_pipeline(ctx: &Context, target: Arc<dyn Task>) -> anyhow::Result<()> {
    let plan = resolve(target)?;
    let show = ctx.verbosity >= Verbosity::Normal;

    let report = match Executor::new(ctx).execute(&plan) {
        Ok(report) => report,
        Err(err) => {
            if show {
                print_report(err.report());
            }
            return Err(err.into());
        }
    };
    if show {
        print_report(&report);
    }

    if let Some(last) = plan.target() {
        if !is_complete(&last.task.outputs(), ctx.policy) {
            bail!("{} finished without producing its outputs", last.id);
        }
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for (id, outcome) in report.outcomes() {
        let label = match outcome {
            TaskOutcome::Skipped => "skipped ".yellow(),
            TaskOutcome::Executed => "executed".green(),
            TaskOutcome::Failed => "failed  ".red(),
        };
        println!("{} {}", label, id);
    }
    if report.is_noop() {
        println!("{}", "Nothing to do: all outputs already exist".bold());
    }
}

fn print_status(ctx: &Context, plan: &Plan) {
    if let Some(path) = &ctx.config_path {
        println!("{} {}", "config".bold(), path.display());
    }

    let states = Executor::new(ctx).inspect(plan);
    for (node, state) in plan.nodes().iter().zip(states) {
        let label = match state {
            NodeState::Complete => "complete  ".green(),
            NodeState::Pending => "pending   ".yellow(),
            NodeState::NotNeeded => "not needed".dimmed(),
        };
        println!("{} {}", label, node.id);
        for artifact in node.task.outputs() {
            let mark = if artifact.satisfies(ctx.policy) { "+" } else { "-" };
            println!("    {} {}", mark, artifact);
        }
    }
}

/// Run the CLI application with the process arguments
pub fn run() -> anyhow::Result<()> {
    run_from(std::env::args_os())
}

/// Run the CLI application with provided arguments
pub fn run_from<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let verbosity = get_verbosity(&matches);

    if let Some(("completions", sub)) = matches.subcommand() {
        if let Some(shell) = sub.get_one::<Shell>("shell").copied() {
            clap_complete::generate(shell, &mut build_command(), "geopipe", &mut io::stdout());
        }
        return Ok(());
    }

    init_logging(verbosity);
    let (ctx, target) = prepare(&matches, verbosity)?;

    match matches.subcommand() {
        Some(("status", _)) => {
            let plan = resolve(target)?;
            print_status(&ctx, &plan);
        }
        _ => run_pipeline(&ctx, target)?,
    }

    Ok(())
}
