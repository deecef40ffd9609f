use crate::backends::emitter::{CodeStyle, Listing};
use crate::config::{CellWidth, CompileConfig, EofPolicy};

/// Structured C99 code with a pointer into a static tape
pub struct CStyle;

fn cell_type(width: CellWidth) -> &'static str {
    match width {
        CellWidth::U8 => "unsigned char",
        CellWidth::U16 => "uint16_t",
        CellWidth::U32 => "uint32_t",
    }
}

fn repeated(out: &mut Listing, statement: &str, repeat: usize) {
    if repeat == 1 {
        out.line(statement);
    } else {
        out.line(&format!("for (int i = 0; i < {}; i++) {}", repeat, statement));
    }
}

impl CodeStyle for CStyle {
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
            out.line(&format!("*p += {};", delta));
        } else {
            out.line(&format!("*p -= {};", delta.unsigned_abs()));
        }
    }

    fn output(&self, out: &mut Listing, repeat: usize) {
        repeated(out, "putchar((unsigned char) *p);", repeat);
    }

    fn input(&self, out: &mut Listing, repeat: usize) {
        repeated(out, "get_cell(p);", repeat);
    }

    fn zero_cell(&self, out: &mut Listing) {
        out.line("*p = 0;");
    }

    // Returning from main flushes stdout
    fn halt(&self, out: &mut Listing) {
        out.line("return 0;");
    }

    fn loop_start(&self, out: &mut Listing, _label: usize) {
        out.line("while (*p) {");
    }

    fn loop_end(&self, out: &mut Listing, _label: usize) {
        out.line("}");
    }

    fn finish(&self, code: &str, config: &CompileConfig) -> String {
        let eof = match config.eof {
            EofPolicy::Unchanged => String::new(),
            EofPolicy::Overwrite(value) => format!(" else {{\n        *p = {};\n    }}", value),
        };

        include_str!("c.tpl")
            .replace("{{CELL}}", cell_type(config.cell_width))
            .replace("{{TAPE_LENGTH}}", &config.tape_length.to_string())
            .replace("{{EOF}}", &eof)
            .replace("{{CODE}}", code.trim_end_matches('\n'))
    }
}
