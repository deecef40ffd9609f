use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{stdout, Write};

use tapevm::{analyze, compile, fold, parse_with_dialect, Backend, CompileConfig, Dialect, Warning};
use tracing::debug;

use crate::errors::CliError;
use crate::utils::{read_input, report};

pub struct CompileOptions {
    pub dialect: Dialect,
    pub config: CompileConfig,
    pub format: String,
    pub output: Option<OsString>,
}

pub fn compile_file(options: CompileOptions, path: &OsStr) -> Result<(), Box<dyn Error>> {
    let source = read_input(path)?;

    let mut program = match parse_with_dialect(&source, &options.dialect) {
        Ok(program) => program,
        Err(error) => return Err(report(&error, &source, path)),
    };

    fold(&mut program);

    let warnings = analyze(&program);
    if !warnings.is_empty() {
        Warning::pretty_print(&warnings, &source, Some(&path.to_string_lossy()))?;
    }

    let code = match Backend::from_name(&options.format) {
        Some(backend) => match compile(&program, backend, &options.config) {
            Ok(code) => code.into_bytes(),
            Err(error) => return Err(report(&error, &source, path)),
        },
        None => {
            let mut code = vec![];
            program.dump(&mut code)?;
            code
        }
    };

    debug!(format = %options.format, bytes = code.len(), "compiled program");

    match &options.output {
        Some(output_path) => {
            let mut file = File::create(output_path).map_err(|error| CliError::OutputWriteError(output_path.clone(), error))?;

            file.write_all(&code)
                .map_err(|error| CliError::OutputWriteError(output_path.clone(), error))?;
        }
        None => {
            let mut out = stdout().lock();
            out.write_all(&code)?;
            out.flush()?;
        }
    }

    Ok(())
}
