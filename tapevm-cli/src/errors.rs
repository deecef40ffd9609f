use std::ffi::OsString;

use thiserror::Error;

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum CliError {
    #[error("Source file not found: {}", .0.to_string_lossy())]
    SourceFileNotFound(OsString),

    #[error("Permission denied: {}", .0.to_string_lossy())]
    SourceFilePermissionDenied(OsString),

    #[error("Error reading source file {}: {}", .0.to_string_lossy(), .1)]
    SourceReadError(OsString, #[source] std::io::Error),

    #[error("Error writing output file {}: {}", .0.to_string_lossy(), .1)]
    OutputWriteError(OsString, #[source] std::io::Error),

    /// The error was already printed as diagnostic
    #[error("Aborted")]
    Diagnosed,
}
