//! `sfca` - derive, check and inspect incident artifacts

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

const DEFAULT_FILTER: &str = "sfca=info,sfca_pipeline=info,sfca_store=info";

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file")
}

fn out_arg() -> Arg {
    Arg::new("out")
        .long("out")
        .short('o')
        .value_parser(value_parser!(PathBuf))
        .help("Artifact directory (overrides [paths].artifacts_dir)")
}

fn cli() -> Command {
    Command::new("sfca")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Derive and validate pre-aggregated incident artifacts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("derive")
                .about("Derive every configured view from the raw table and publish it")
                .arg(config_arg())
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .value_parser(value_parser!(PathBuf))
                        .help("Raw incident CSV (overrides [paths].raw)"),
                )
                .arg(
                    Arg::new("forecast")
                        .long("forecast")
                        .value_parser(value_parser!(PathBuf))
                        .help("Forecast CSV (overrides [paths].forecast)"),
                )
                .arg(out_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the derivation report as JSON"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate the published artifacts and their consistency")
                .arg(config_arg())
                .arg(out_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show schema, hash and leading rows of a published artifact")
                .arg(Arg::new("name").required(true).help("Artifact name"))
                .arg(config_arg())
                .arg(out_arg())
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .short('n')
                        .default_value("10")
                        .value_parser(value_parser!(usize))
                        .help("Rows to print"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn dispatch(matches: &ArgMatches) -> anyhow::Result<bool> {
    match matches.subcommand() {
        Some(("derive", args)) => commands::derive(args),
        Some(("check", args)) => commands::check(args),
        Some(("inspect", args)) => commands::inspect(args),
        _ => Ok(false),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match dispatch(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
