//! mdv2ex - Convert Markdown to the V2EX Default posting format.
//!
//! # Usage
//!
//! ```bash
//! mdv2ex post.md
//! mdv2ex post.md -o post.txt --links=url
//! cat post.md | mdv2ex --table=keep
//! mdv2ex --watch post.md -o post.txt
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};

use mdv2ex::app::App;
use mdv2ex::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use mdv2ex::convert::{HeadingSeparator, LinkMode, TableMode};

/// Convert Markdown to V2EX Default syntax
#[derive(Parser, Debug)]
#[command(name = "mdv2ex", version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Markdown file to convert (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Drop bold markers instead of emitting [b]...[/b]
    #[arg(long)]
    no_bold: bool,

    /// How to render links
    #[arg(long, value_enum, value_name = "MODE")]
    links: Option<LinkMode>,

    /// How to render tables
    #[arg(long, value_enum, value_name = "MODE")]
    table: Option<TableMode>,

    /// Underline used for headings
    #[arg(long, value_enum, value_name = "STYLE")]
    heading_separator: Option<HeadingSeparator>,

    /// Pass the input through unchanged
    #[arg(long)]
    raw: bool,

    /// Print warnings about unsupported Markdown to stderr
    #[arg(long)]
    warnings: bool,

    /// Print a JSON object with the output and the warnings
    #[arg(long)]
    json: bool,

    /// Watch the input file and convert again on every change
    #[arg(short, long)]
    watch: bool,

    /// Log per-stage timings to stderr
    #[arg(long)]
    perf: bool,

    /// Save the current conversion flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn command() -> clap::Command {
    Cli::command().arg(
        Arg::new("version")
            .short('v')
            .long("version")
            .action(ArgAction::Version)
            .help("Print version"),
    )
}

fn parse_cli() -> Result<Cli, ExitCode> {
    let matches = command().try_get_matches().map_err(|err| {
        // Usage errors go to stderr; help and version go to stdout.
        let _ = err.print();
        if err.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })?;
    Cli::from_arg_matches(&matches).map_err(|err| {
        let _ = err.print();
        ExitCode::FAILURE
    })
}

fn init_logging(perf: bool) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if perf {
        if let Ok(directive) = "mdv2ex::perf=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, raw_args: &[String]) -> Result<()> {
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
        eprintln!("Saved defaults to {}", global_path.display());
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "resolved flags");

    // Nothing to read: show usage instead of blocking on the terminal.
    if cli.input.is_none() && std::io::stdin().is_terminal() {
        if cli.save || cli.clear {
            return Ok(());
        }
        command().print_help().context("Failed to print help")?;
        return Ok(());
    }

    let app = App::new(cli.input)
        .with_output(cli.output)
        .with_options(effective.to_options())
        .with_raw(cli.raw)
        .with_json(cli.json)
        .with_warnings(effective.warnings)
        .with_watch(cli.watch);

    app.run()
}

fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    init_logging(cli.perf);

    let raw_args = std::env::args().collect::<Vec<_>>();
    match run(cli, &raw_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
