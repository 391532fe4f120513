#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

mod engine;
mod reporting;
mod subcommand;

use std::{io, path, process};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directives
const LOG_ENV_VAR: &str = "SKEIN_LOG";

pub struct DriverConfig {
    /// Indicates if diagnostics and REPL output should be coloured
    colour: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    use clap::{crate_version, App, AppSettings, Arg, SubCommand};

    let matches = App::new("skein")
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .about("Interpreter and REPL for a minimal Scheme")
        .arg(
            Arg::with_name("NOCOLOUR")
                .long("no-colour")
                .takes_value(false)
                .global(true)
                .help("Disable coloured output"),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Evaluates Scheme source files in order")
                .arg(
                    Arg::with_name("INPUT")
                        .help("Input source files")
                        .required(true)
                        .multiple(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("repl")
                .about("Starts an interactive REPL")
                .arg(
                    Arg::with_name("INCLUDE")
                        .short("i")
                        .long("include")
                        .value_name("FILE")
                        .multiple(true)
                        .number_of_values(1)
                        .help("file to preload before starting REPL"),
                ),
        )
        .get_matches();

    init_logging();

    // Global flags may follow the subcommand name
    let no_colour = matches.is_present("NOCOLOUR")
        || matches
            .subcommand()
            .1
            .map_or(false, |sub_matches| sub_matches.is_present("NOCOLOUR"));

    let cfg = DriverConfig {
        colour: !no_colour,
    };

    if let Some(run_matches) = matches.subcommand_matches("run") {
        let input_paths: Vec<path::PathBuf> = run_matches
            .values_of("INPUT")
            .into_iter()
            .flatten()
            .map(path::PathBuf::from)
            .collect();

        if !subcommand::run::run_input_files(&cfg, input_paths) {
            process::exit(2);
        }
    } else if let Some(repl_matches) = matches.subcommand_matches("repl") {
        let include_paths = repl_matches
            .values_of("INCLUDE")
            .into_iter()
            .flatten()
            .map(path::PathBuf::from)
            .collect();

        subcommand::repl::interactive_loop(&cfg, include_paths);
    } else {
        eprintln!("Sub-command not specified");
        process::exit(1);
    }
}
