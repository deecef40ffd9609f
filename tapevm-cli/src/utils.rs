use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{stdin, ErrorKind, Read};

use clap::ArgMatches;
use tapevm::{CellWidth, Dialect, EofPolicy, TapeVmError, DEFAULT_TAPE_LENGTH};

use crate::errors::CliError;

pub fn read_input(path: &OsStr) -> Result<String, CliError> {
    let mut source = "".to_owned();

    if path == "-" {
        stdin()
            .read_to_string(&mut source)
            .map_err(|error| CliError::SourceReadError(path.to_owned(), error))?;
    } else {
        let mut file = File::open(path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => CliError::SourceFileNotFound(path.to_owned()),
            ErrorKind::PermissionDenied => CliError::SourceFilePermissionDenied(path.to_owned()),
            _ => CliError::SourceReadError(path.to_owned(), error),
        })?;

        file.read_to_string(&mut source)
            .map_err(|error| CliError::SourceReadError(path.to_owned(), error))?;
    }

    Ok(source)
}

/// Print `error` as diagnostic and return the error that ends the subcommand
pub fn report(error: &impl TapeVmError, source: &str, path: &OsStr) -> Box<dyn Error> {
    match error.pretty_print(source, Some(&path.to_string_lossy())) {
        Ok(()) => CliError::Diagnosed.into(),
        Err(render_error) => render_error,
    }
}

pub fn get_dialect_from_args(matches: &ArgMatches) -> Dialect {
    Dialect {
        extended: matches.get_flag("EXTENDED"),
        debug_hooks: matches.get_flag("DEBUG_HOOKS"),
        halt_marker: !matches.get_flag("NO_HALT"),
        data_after_halt: false,
    }
}

pub fn get_tape_length_from_args(matches: &ArgMatches) -> usize {
    matches
        .get_one::<u64>("TAPE_LENGTH")
        .map(|length| *length as usize)
        .unwrap_or(DEFAULT_TAPE_LENGTH)
}

pub fn get_cell_width_from_args(matches: &ArgMatches) -> CellWidth {
    matches
        .get_one::<String>("CELL_BITS")
        .and_then(|bits| bits.parse().ok())
        .and_then(CellWidth::from_bits)
        .unwrap_or_default()
}

pub fn get_eof_from_args(matches: &ArgMatches) -> EofPolicy {
    matches.get_one::<EofPolicy>("EOF").copied().unwrap_or_default()
}

pub fn is_verbose(matches: &ArgMatches) -> bool {
    matches.get_flag("VERBOSE")
}
