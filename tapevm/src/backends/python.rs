use crate::backends::emitter::{CodeStyle, Listing};
use crate::config::{CompileConfig, EofPolicy};

/// CPython refuses more than 20 statically nested blocks
pub const MAX_NESTING: usize = 20;

/// Python 3 script, loops are expressed by indentation only
pub struct PythonStyle;

impl CodeStyle for PythonStyle {
    fn move_pointer(&self, out: &mut Listing, delta: isize) {
        if delta > 0 {
            out.line(&format!("p += {}", delta));
        } else {
            out.line(&format!("p -= {}", delta.unsigned_abs()));
        }
    }

    fn adjust_cell(&self, out: &mut Listing, delta: i64) {
        if delta > 0 {
            out.line(&format!("tape[p] = (tape[p] + {}) & MASK", delta));
        } else {
            out.line(&format!("tape[p] = (tape[p] - {}) & MASK", delta.unsigned_abs()));
        }
    }

    fn output(&self, out: &mut Listing, repeat: usize) {
        if repeat == 1 {
            out.line("sys.stdout.buffer.write(bytes([tape[p] & 0xFF]))");
        } else {
            out.line(&format!("sys.stdout.buffer.write(bytes([tape[p] & 0xFF]) * {})", repeat));
        }
    }

    fn input(&self, out: &mut Listing, repeat: usize) {
        if repeat == 1 {
            out.line("tape[p] = get_cell(tape[p])");
        } else {
            out.line(&format!("tape[p] = get_cell(tape[p], {})", repeat));
        }
    }

    fn zero_cell(&self, out: &mut Listing) {
        out.line("tape[p] = 0");
    }

    fn halt(&self, out: &mut Listing) {
        out.line("sys.stdout.buffer.flush()");
        out.line("sys.exit(0)");
    }

    fn loop_start(&self, out: &mut Listing, _label: usize) {
        out.line("while tape[p]:");
    }

    // Dedenting closes the block
    fn loop_end(&self, _out: &mut Listing, _label: usize) {}

    fn empty_body(&self, out: &mut Listing) {
        out.line("pass");
    }

    fn finish(&self, code: &str, config: &CompileConfig) -> String {
        let eof = match config.eof {
            EofPolicy::Unchanged => "current".to_owned(),
            EofPolicy::Overwrite(value) => value.to_string(),
        };

        include_str!("python.tpl")
            .replace("{{MASK}}", &format!("0x{:X}", config.cell_width.max_value()))
            .replace("{{TAPE_LENGTH}}", &config.tape_length.to_string())
            .replace("{{EOF}}", &eof)
            .replace("{{CODE}}", code.trim_end_matches('\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::MAX_NESTING;
    use crate::backends::{compile, Backend};
    use crate::config::{CompileConfig, Dialect, EofPolicy};
    use crate::errors::CompilerError;
    use crate::parser::{parse, parse_with_dialect};

    fn indentation(code: &str, prefix: &str) -> Option<usize> {
        code.lines()
            .find(|line| line.trim_start().starts_with(prefix))
            .map(|line| line.len() - line.trim_start().len())
    }

    #[test]
    fn test_indentation() {
        let code = compile(&parse("+[>[-]<]>.").unwrap(), Backend::Python, &CompileConfig::default()).unwrap();

        assert!(code.contains(concat!(
            "tape[p] = (tape[p] + 1) & MASK\n",
            "while tape[p]:\n",
            "    p += 1\n",
            "    while tape[p]:\n",
            "        tape[p] = (tape[p] - 1) & MASK\n",
            "    p -= 1\n",
            "p += 1\n",
            "sys.stdout.buffer.write(bytes([tape[p] & 0xFF]))\n",
        )));
    }

    #[test]
    fn test_empty_bodies() {
        let code = compile(&parse("+[[]]").unwrap(), Backend::Python, &CompileConfig::default()).unwrap();

        assert!(code.contains("while tape[p]:\n    while tape[p]:\n        pass\n"));
        assert_eq!(indentation(&code, "pass"), Some(8));
    }

    #[test]
    fn test_default_nesting_limit() {
        let ok = "[".repeat(MAX_NESTING) + &"]".repeat(MAX_NESTING);
        assert!(compile(&parse(&ok).unwrap(), Backend::Python, &CompileConfig::default()).is_ok());

        let deep = "[".repeat(MAX_NESTING + 1) + &"]".repeat(MAX_NESTING + 1);
        let error = compile(&parse(&deep).unwrap(), Backend::Python, &CompileConfig::default()).unwrap_err();

        assert!(matches!(
            error,
            CompilerError::NestingLimit {
                offset: 20,
                max_depth: 20,
                ..
            }
        ));
    }

    #[test]
    fn test_configured_nesting_limit() {
        let config = CompileConfig {
            max_nesting: Some(40),
            ..CompileConfig::default()
        };
        let deep = "[".repeat(30) + &"]".repeat(30);

        assert!(compile(&parse(&deep).unwrap(), Backend::Python, &config).is_ok());
    }

    #[test]
    fn test_io_and_eof() {
        let config = CompileConfig {
            eof: EofPolicy::Overwrite(0),
            ..CompileConfig::default()
        };
        let program = parse_with_dialect("2,_4.", &Dialect::extended()).unwrap();
        let code = compile(&program, Backend::Python, &config).unwrap();

        assert!(code.contains("tape[p] = get_cell(tape[p], 2)\ntape[p] = 0\n"));
        assert!(code.contains("sys.stdout.buffer.write(bytes([tape[p] & 0xFF]) * 4)\n"));
        assert!(code.contains("current = data[0] if data else 0\n"));
        assert!(code.contains("MASK = 0xFF\n"));
    }

    #[test]
    fn test_halt_in_loop() {
        let code = compile(&parse("+[!]").unwrap(), Backend::Python, &CompileConfig::default()).unwrap();

        assert!(code.contains("while tape[p]:\n    sys.stdout.buffer.flush()\n    sys.exit(0)\n"));
        assert!(!code.contains("pass"));
    }
}
