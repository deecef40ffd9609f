use std::error::Error;
use std::ffi::OsStr;
use std::io::{stderr, stdin, stdout, BufWriter, Cursor, Read};
use std::time::{Duration, Instant};

use tapevm::limiters::{CycleLimiter, TimeLimiter};
use tapevm::{analyze, fold, lower, match_brackets, normalize, Dialect, Interpreter, Program, RunConfig, Warning};
use tracing::debug;

use crate::utils::{read_input, report};

pub struct RunOptions {
    pub dialect: Dialect,
    pub config: RunConfig,
    pub fold: bool,
    pub max_cycles: Option<u64>,
    pub max_time: Option<Duration>,
}

/// Input of the program: the text after the halt marker followed by `rest`
fn program_input<R: Read>(program: &Program, rest: R) -> impl Read {
    let data = program.trailing_data().unwrap_or_default().as_bytes().to_vec();

    Cursor::new(data).chain(rest)
}

pub fn run_file(options: RunOptions, path: &OsStr) -> Result<(), Box<dyn Error>> {
    let source = read_input(path)?;

    let ts = Instant::now();

    let program = normalize(&source, &options.dialect);

    let mut ops = match match_brackets(&program).and_then(|jumps| lower(&program, &jumps)) {
        Ok(ops) => ops,
        Err(error) => return Err(report(&error, &source, path)),
    };

    let statistics = ops.get_statistics();

    debug!(
        ops = statistics.op_count,
        loops = statistics.loop_count,
        max_depth = statistics.max_depth,
        elapsed_ms = ts.elapsed().as_secs_f32() * 1000.0,
        "parsed program"
    );

    if options.fold {
        let removed = fold(&mut ops);

        debug!(removed, ops = ops.len(), "folded program");
    }

    let warnings = analyze(&ops);
    if !warnings.is_empty() {
        Warning::pretty_print(&warnings, &source, Some(&path.to_string_lossy()))?;
    }

    let input = program_input(&program, stdin());
    let output = BufWriter::new(stdout().lock());

    let mut interpreter = Interpreter::with_config(input, output, options.config);

    if options.dialect.debug_hooks {
        interpreter = interpreter.with_debug_output(stderr());
    }

    interpreter = match (options.max_cycles, options.max_time) {
        (Some(max_cycles), Some(max_time)) => {
            interpreter.with_limiter((CycleLimiter::new(max_cycles), TimeLimiter::new(max_time)))
        }
        (Some(max_cycles), None) => interpreter.with_limiter(CycleLimiter::new(max_cycles)),
        (None, Some(max_time)) => interpreter.with_limiter(TimeLimiter::new(max_time)),
        (None, None) => interpreter,
    };

    let ts = Instant::now();

    let state = match interpreter.execute(&ops) {
        Ok(state) => state,
        Err(error) => return Err(report(&error, &source, path)),
    };

    debug!(
        cycles = state.cycles,
        tape_length = state.tape.len(),
        elapsed_ms = ts.elapsed().as_secs_f32() * 1000.0,
        "executed program"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_dialect() -> Dialect {
        Dialect {
            data_after_halt: true,
            ..Dialect::standard()
        }
    }

    #[test]
    fn test_trailing_data_before_stdin() {
        let program = normalize(",.,.!a[", &stream_dialect());

        let mut input = String::new();
        program_input(&program, Cursor::new(b"bc")).read_to_string(&mut input).unwrap();

        assert_eq!(input, "a[bc");
    }

    #[test]
    fn test_no_trailing_data() {
        let program = normalize(",.,.!a[", &Dialect::standard());

        let mut input = String::new();
        program_input(&program, Cursor::new(b"bc")).read_to_string(&mut input).unwrap();

        assert_eq!(input, "bc");
    }

    #[test]
    fn test_program_reads_trailing_data() {
        let source = ",.,.,.!ab";
        let program = normalize(source, &stream_dialect());
        let ops = tapevm::parse_with_dialect(source, &stream_dialect()).unwrap();

        let mut output = Vec::new();
        Interpreter::new(program_input(&program, Cursor::new(b"c")), &mut output)
            .execute(&ops)
            .unwrap();

        assert_eq!(output, b"abc");
    }
}
