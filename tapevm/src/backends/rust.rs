use crate::backends::emitter::{CodeStyle, Listing};
use crate::config::{CellWidth, CompileConfig, EofPolicy};

/// Self-contained rust program that can be compiled with rustc
pub struct RustStyle;

fn cell_type(width: CellWidth) -> &'static str {
    match width {
        CellWidth::U8 => "u8",
        CellWidth::U16 => "u16",
        CellWidth::U32 => "u32",
    }
}

fn repeated(out: &mut Listing, statement: &str, repeat: usize) {
    if repeat == 1 {
        out.line(statement);
    } else {
        out.line(&format!("for _ in 0..{} {{ {} }}", repeat, statement));
    }
}

impl CodeStyle for RustStyle {
    const BASE_DEPTH: usize = 1;

    fn move_pointer(&self, out: &mut Listing, delta: isize) {
        if delta > 0 {
            out.line(&format!("p += {};", delta));
        } else {
            out.line(&format!("p -= {};", delta.unsigned_abs()));
        }
    }

    fn adjust_cell(&self, out: &mut Listing, delta: i64) {
        if delta > 0 {
            out.line(&format!("tape[p] = tape[p].wrapping_add({});", delta));
        } else {
            out.line(&format!("tape[p] = tape[p].wrapping_sub({});", delta.unsigned_abs()));
        }
    }

    fn output(&self, out: &mut Listing, repeat: usize) {
        repeated(out, "output.write_all(&[tape[p] as u8]).unwrap();", repeat);
    }

    fn input(&self, out: &mut Listing, repeat: usize) {
        repeated(out, "get_cell(&mut input, &mut output, &mut tape[p]);", repeat);
    }

    fn zero_cell(&self, out: &mut Listing) {
        out.line("tape[p] = 0;");
    }

    fn halt(&self, out: &mut Listing) {
        out.line("output.flush().unwrap();");
        out.line("return;");
    }

    fn loop_start(&self, out: &mut Listing, _label: usize) {
        out.line("while tape[p] != 0 {");
    }

    fn loop_end(&self, out: &mut Listing, _label: usize) {
        out.line("}");
    }

    fn finish(&self, code: &str, config: &CompileConfig) -> String {
        let eof = match config.eof {
            EofPolicy::Unchanged => String::new(),
            EofPolicy::Overwrite(value) => format!("*cell = {};", value),
        };

        include_str!("rust.tpl")
            .replace("{{CELL}}", cell_type(config.cell_width))
            .replace("{{TAPE_LENGTH}}", &config.tape_length.to_string())
            .replace("{{EOF}}", &eof)
            .replace("{{CODE}}", code.trim_end_matches('\n'))
    }
}

#[cfg(test)]
mod tests {
    use crate::backends::{compile, Backend};
    use crate::config::{CellWidth, CompileConfig, EofPolicy};
    use crate::parser::parse;

    #[test]
    fn test_hello_world() {
        let program = parse(include_str!("../../../test_programs/hello_world.bf")).unwrap();
        let code = compile(&program, Backend::Rust, &CompileConfig::default()).unwrap();

        assert!(code.starts_with("#![allow(unreachable_code, unused_mut, unused_variables)]"));
        assert!(code.contains("    tape[p] = tape[p].wrapping_add(8);\n    while tape[p] != 0 {\n        p += 1;\n"));
        assert!(code.contains("let mut tape: Vec<u8> = vec![0; 65535];"));
        assert!(!code.contains("{{"));
    }

    #[test]
    fn test_zero_and_io() {
        let config = CompileConfig {
            cell_width: CellWidth::U32,
            eof: EofPolicy::Overwrite(255),
            ..CompileConfig::default()
        };
        let code = compile(&parse(",[-].").unwrap(), Backend::Rust, &config).unwrap();

        assert!(code.contains("    get_cell(&mut input, &mut output, &mut tape[p]);\n"));
        assert!(code.contains("        tape[p] = tape[p].wrapping_sub(1);\n"));
        assert!(code.contains("    output.write_all(&[tape[p] as u8]).unwrap();\n"));
        assert!(code.contains("Err(_) => { *cell = 255; }"));
        assert!(code.contains("Vec<u32>"));
    }

    #[test]
    fn test_halt() {
        let code = compile(&parse("+!+").unwrap(), Backend::Rust, &CompileConfig::default()).unwrap();

        assert!(code.contains("    output.flush().unwrap();\n    return;\n    tape[p] = tape[p].wrapping_add(1);\n"));
    }
}
