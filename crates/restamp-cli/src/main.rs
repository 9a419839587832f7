use std::path::PathBuf;

use atty::Stream;
use clap::{value_parser, ArgAction, Args, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use restamp_core::{
    build_project, publish_project, BuildRequest, CommandContext, CommandGroup, CommandInfo,
    CommandStatus, ExecutionOutcome, GlobalOptions, PublishRequest,
};
use serde_json::Value;

mod style;

use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = RestampCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };
    let ctx = CommandContext::new(&global);

    let (info, outcome) = run_command(&ctx, &cli.command).map_err(|err| eyre!("{err:?}"))?;
    let code = emit_output(&cli, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn run_command(
    ctx: &CommandContext,
    command: &Command,
) -> anyhow::Result<(CommandInfo, ExecutionOutcome)> {
    match command {
        Command::Build(args) => {
            let request = BuildRequest {
                override_name: args.overrides.override_name.clone(),
                override_version: args.overrides.override_version.clone(),
                out: args.out.clone(),
                dry_run: args.dry_run,
            };
            let info = CommandInfo::new(CommandGroup::Build, "build");
            Ok((info, build_project(ctx, &request)?))
        }
        Command::Publish(args) => {
            let request = PublishRequest {
                override_name: args.overrides.override_name.clone(),
                override_version: args.overrides.override_version.clone(),
            };
            let info = CommandInfo::new(CommandGroup::Publish, "publish");
            Ok((info, publish_project(ctx, &request)?))
        }
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("restamp_core={level},restamp_domain={level},restamp_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &RestampCli, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    };

    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = restamp_core::to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        let message = restamp_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        if let Some(hint) = hint_from_details(&outcome.details) {
            let hint_line = format!("Hint: {hint}");
            println!("{}", style.info(&hint_line));
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build Python sdists with per-invocation name/version overrides",
    long_about = "Builds a source distribution while overriding the project's declared \
name and version for one invocation, without editing pyproject.toml.",
    after_help = "Examples:\n  restamp build\n  restamp build --override-version 1.2.3.dev1\n  PROJECT_OVERRIDE_NAME=pkg-nightly restamp build\n"
)]
struct RestampCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)"
    )]
    quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q")]
    trace: bool,
    #[arg(long, help = "Emit {status,message,details} JSON envelopes")]
    json: bool,
    #[arg(long, help = "Disable colored human output")]
    no_color: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(
        about = "Build an sdist into dist/, applying any name/version overrides.",
        override_usage = "restamp build [--override-name NAME] [--override-version VERSION] [--out DIR]",
        after_help = "Examples:\n  restamp build\n  restamp build --override-version 9.9.9 --out out/\n  PROJECT_OVERRIDE_VERSION=9.9.9 restamp build\n"
    )]
    Build(BuildArgs),
    #[command(
        about = "Preview publishing previously built artifacts (never uploads).",
        override_usage = "restamp publish [--override-name NAME] [--override-version VERSION]",
        after_help = "Examples:\n  restamp publish\n  restamp publish --override-version 9.9.9\n"
    )]
    Publish(PublishArgs),
}

#[derive(Args, Debug)]
struct OverrideFlags {
    #[arg(
        long,
        value_name = "NAME",
        help = "Override the project name declared in pyproject.toml (falls back to PROJECT_OVERRIDE_NAME)"
    )]
    override_name: Option<String>,
    #[arg(
        long,
        value_name = "VERSION",
        help = "Override the project version declared in pyproject.toml (falls back to PROJECT_OVERRIDE_VERSION)"
    )]
    override_version: Option<String>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[command(flatten)]
    overrides: OverrideFlags,
    #[arg(long, value_parser = value_parser!(PathBuf), help = "Output directory (defaults to dist/)")]
    out: Option<PathBuf>,
    #[arg(long, help = "Report the build plan without writing the archive")]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct PublishArgs {
    #[command(flatten)]
    overrides: OverrideFlags,
}
