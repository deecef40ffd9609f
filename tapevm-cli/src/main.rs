use std::error::Error;
use std::ffi::OsString;
use std::process::exit;
use std::time::Duration;

use clap::{crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use tapevm::{CompileConfig, Dialect, EofPolicy, RunConfig, TapeMode, DEFAULT_DEBUG_WINDOW};
use tracing_subscriber::EnvFilter;

mod compile;
mod errors;
mod run;
mod utils;

use crate::compile::{compile_file, CompileOptions};
use crate::errors::CliError;
use crate::run::{run_file, RunOptions};
use crate::utils::{get_cell_width_from_args, get_dialect_from_args, get_eof_from_args, get_tape_length_from_args, is_verbose};

fn main() {
    let matches = create_clap_app().get_matches();

    let result = match matches.subcommand() {
        Some(("run", arg_matches)) => run(arg_matches),
        Some(("compile", arg_matches)) => compile(arg_matches),
        _ => {
            eprintln!("{}", create_clap_app().render_usage());
            Ok(())
        }
    };

    if let Err(error) = result {
        if !matches!(error.downcast_ref::<CliError>(), Some(CliError::Diagnosed)) {
            eprintln!("{}", error);
        }

        exit(1)
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_clap_app() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .subcommand(
            Command::new("run")
                .about("Run application")
                .arg(get_source_file())
                .args(get_dialect_args())
                .arg(get_tape_length_arg())
                .arg(
                    Arg::new("GROWABLE")
                        .long("growable")
                        .action(ArgAction::SetTrue)
                        .help("Double the tape when the pointer moves past its end"),
                )
                .arg(
                    Arg::new("MAX_TAPE_LENGTH")
                        .long("max-tape-length")
                        .value_name("cells")
                        .value_parser(value_parser!(u64).range(1..))
                        .help("Upper limit for a growable tape"),
                )
                .arg(get_cell_bits_arg())
                .arg(get_eof_arg())
                .arg(
                    Arg::new("NO_FOLD")
                        .long("no-fold")
                        .action(ArgAction::SetTrue)
                        .help("Execute every instruction on its own"),
                )
                .arg(
                    Arg::new("MAX_CYCLES")
                        .long("max-cycles")
                        .value_name("cycles")
                        .value_parser(value_parser!(u64))
                        .help("Abort after executing this many instructions"),
                )
                .arg(
                    Arg::new("MAX_TIME")
                        .long("max-time")
                        .value_name("ms")
                        .value_parser(value_parser!(u64))
                        .help("Abort after running for this many milliseconds"),
                )
                .arg(
                    Arg::new("DATA_AFTER_HALT")
                        .long("data-after-halt")
                        .action(ArgAction::SetTrue)
                        .help("End the program at the first ! and use the rest as input before reading stdin"),
                )
                .arg(get_verbose_arg()),
        )
        .subcommand(
            Command::new("compile")
                .about("Compile application")
                .arg(get_source_file())
                .args(get_dialect_args())
                .arg(get_tape_length_arg())
                .arg(get_cell_bits_arg())
                .arg(get_eof_arg())
                .arg(
                    Arg::new("FORMAT")
                        .short('f')
                        .long("format")
                        .value_parser(["c", "rust", "python", "asm", "dump"])
                        .value_name("format")
                        .default_value("dump")
                        .help("Format of compiled code"),
                )
                .arg(
                    Arg::new("MAX_NESTING")
                        .long("max-nesting")
                        .value_name("depth")
                        .value_parser(value_parser!(usize))
                        .help("Maximum loop depth of the generated code"),
                )
                .arg(
                    Arg::new("OUTPUT")
                        .short('o')
                        .long("output")
                        .value_name("file")
                        .value_parser(value_parser!(OsString))
                        .help("Write code into file instead of stdout"),
                )
                .arg(get_verbose_arg()),
        )
}

fn get_source_file() -> Arg {
    Arg::new("FILE")
        .required(true)
        .value_parser(value_parser!(OsString))
        .help("Brainfuck source file. Use - to read from stdin")
}

fn get_dialect_args() -> [Arg; 3] {
    [
        Arg::new("EXTENDED")
            .long("extended")
            .action(ArgAction::SetTrue)
            .help("Enable quantifiers and the _ zero operator"),
        Arg::new("DEBUG_HOOKS")
            .long("debug-hooks")
            .action(ArgAction::SetTrue)
            .help("Enable the # ^ @ debug instructions"),
        Arg::new("NO_HALT")
            .long("no-halt")
            .action(ArgAction::SetTrue)
            .help("Treat ! as a comment"),
    ]
}

fn get_tape_length_arg() -> Arg {
    Arg::new("TAPE_LENGTH")
        .long("tape-length")
        .value_name("cells")
        .value_parser(value_parser!(u64).range(1..))
        .help("Number of cells on the tape")
}

fn get_cell_bits_arg() -> Arg {
    Arg::new("CELL_BITS")
        .long("cell-bits")
        .value_parser(["8", "16", "32"])
        .value_name("bits")
        .default_value("8")
        .help("Width of a single cell")
}

fn get_eof_arg() -> Arg {
    Arg::new("EOF")
        .long("eof")
        .value_name("policy")
        .value_parser(str::parse::<EofPolicy>)
        .help("Cell value on end of input: unchanged or a value in 0..=255")
}

fn get_verbose_arg() -> Arg {
    Arg::new("VERBOSE")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Log compiler and interpreter statistics")
}

fn get_path(matches: &ArgMatches) -> OsString {
    matches.get_one::<OsString>("FILE").cloned().unwrap_or_else(|| "-".into())
}

fn get_run_dialect(matches: &ArgMatches) -> Dialect {
    Dialect {
        data_after_halt: matches.get_flag("DATA_AFTER_HALT"),
        ..get_dialect_from_args(matches)
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    init_logging(is_verbose(matches));

    let config = RunConfig {
        tape_length: get_tape_length_from_args(matches),
        tape_mode: if matches.get_flag("GROWABLE") {
            TapeMode::Growable
        } else {
            TapeMode::Fixed
        },
        max_tape_length: matches.get_one::<u64>("MAX_TAPE_LENGTH").map(|length| *length as usize),
        cell_width: get_cell_width_from_args(matches),
        eof: get_eof_from_args(matches),
        debug_window: DEFAULT_DEBUG_WINDOW,
    };

    let options = RunOptions {
        dialect: get_run_dialect(matches),
        config,
        fold: !matches.get_flag("NO_FOLD"),
        max_cycles: matches.get_one::<u64>("MAX_CYCLES").copied(),
        max_time: matches.get_one::<u64>("MAX_TIME").map(|ms| Duration::from_millis(*ms)),
    };

    run_file(options, &get_path(matches))
}

fn compile(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    init_logging(is_verbose(matches));

    let config = CompileConfig {
        tape_length: get_tape_length_from_args(matches),
        cell_width: get_cell_width_from_args(matches),
        eof: get_eof_from_args(matches),
        max_nesting: matches.get_one::<usize>("MAX_NESTING").copied(),
    };

    let options = CompileOptions {
        dialect: get_dialect_from_args(matches),
        config,
        format: matches.get_one::<String>("FORMAT").cloned().unwrap_or_else(|| "dump".to_owned()),
        output: matches.get_one::<OsString>("OUTPUT").cloned(),
    };

    compile_file(options, &get_path(matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap_app() {
        create_clap_app().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let matches = create_clap_app()
            .try_get_matches_from(["tapevm", "run", "--extended", "--eof", "0", "--cell-bits", "16", "prog.bf"])
            .unwrap();

        let (_, matches) = matches.subcommand().unwrap();

        assert!(get_dialect_from_args(matches).extended);
        assert_eq!(get_eof_from_args(matches), EofPolicy::Overwrite(0));
        assert_eq!(get_cell_width_from_args(matches), tapevm::CellWidth::U16);
        assert_eq!(get_path(matches), OsString::from("prog.bf"));
    }

    #[test]
    fn test_stream_mode_args() {
        let matches = create_clap_app()
            .try_get_matches_from(["tapevm", "run", "--data-after-halt", "--max-time", "250", "prog.bf"])
            .unwrap();

        let (_, matches) = matches.subcommand().unwrap();

        let dialect = get_run_dialect(matches);
        assert!(dialect.halt_marker);
        assert!(dialect.data_after_halt);
        assert_eq!(matches.get_one::<u64>("MAX_TIME"), Some(&250));
    }

    #[test]
    fn test_compile_keeps_halt_in_program() {
        let matches = create_clap_app()
            .try_get_matches_from(["tapevm", "compile", "prog.bf"])
            .unwrap();

        let (_, matches) = matches.subcommand().unwrap();

        assert!(!get_dialect_from_args(matches).data_after_halt);
    }

    #[test]
    fn test_invalid_eof() {
        let result = create_clap_app().try_get_matches_from(["tapevm", "run", "--eof", "256", "prog.bf"]);

        assert!(result.is_err());
    }
}
