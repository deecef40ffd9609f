use crate::backends::emitter::{CodeStyle, Listing};
use crate::config::{CellWidth, CompileConfig, EofPolicy};

/// NASM listing for x86-64 Linux using raw syscalls
///
/// Loops are compare and branch pairs around `loop_N_start` and `loop_N_end` labels.
pub struct AsmStyle {
    width: CellWidth,
}

impl AsmStyle {
    pub fn new(width: CellWidth) -> AsmStyle {
        AsmStyle { width }
    }

    fn size(&self) -> &'static str {
        size(self.width)
    }
}

fn size(width: CellWidth) -> &'static str {
    match width {
        CellWidth::U8 => "byte",
        CellWidth::U16 => "word",
        CellWidth::U32 => "dword",
    }
}

fn register(width: CellWidth) -> &'static str {
    match width {
        CellWidth::U8 => "al",
        CellWidth::U16 => "ax",
        CellWidth::U32 => "eax",
    }
}

fn repeated(out: &mut Listing, routine: &str, repeat: usize) {
    if repeat == 1 {
        out.line(&format!("call {}", routine));
    } else {
        out.line(&format!("mov r12, {}", repeat));
        out.line(&format!("call {}s", routine));
    }
}

impl CodeStyle for AsmStyle {
    const BASE_DEPTH: usize = 1;

    fn move_pointer(&self, out: &mut Listing, delta: isize) {
        let bytes = delta.unsigned_abs() * self.width.bytes();

        if delta > 0 {
            out.line(&format!("add rbx, {}", bytes));
        } else {
            out.line(&format!("sub rbx, {}", bytes));
        }
    }

    fn adjust_cell(&self, out: &mut Listing, delta: i64) {
        if delta > 0 {
            out.line(&format!("add {} [rbx], {}", self.size(), delta));
        } else {
            out.line(&format!("sub {} [rbx], {}", self.size(), delta.unsigned_abs()));
        }
    }

    fn output(&self, out: &mut Listing, repeat: usize) {
        repeated(out, "put_cell", repeat);
    }

    fn input(&self, out: &mut Listing, repeat: usize) {
        repeated(out, "get_cell", repeat);
    }

    fn zero_cell(&self, out: &mut Listing) {
        out.line(&format!("mov {} [rbx], 0", self.size()));
    }

    fn halt(&self, out: &mut Listing) {
        out.line("jmp halt");
    }

    fn loop_start(&self, out: &mut Listing, label: usize) {
        out.line(&format!("cmp {} [rbx], 0", self.size()));
        out.line(&format!("je loop_{}_end", label));
        out.raw(&format!("loop_{}_start:", label));
    }

    fn loop_end(&self, out: &mut Listing, label: usize) {
        out.line(&format!("cmp {} [rbx], 0", self.size()));
        out.line(&format!("jne loop_{}_start", label));
        out.raw(&format!("loop_{}_end:", label));
    }

    fn finish(&self, code: &str, config: &CompileConfig) -> String {
        let eof = match config.eof {
            EofPolicy::Unchanged => String::new(),
            EofPolicy::Overwrite(value) => format!("    mov {} [rbx], {}", size(config.cell_width), value),
        };

        let tape_bytes = config.tape_length.saturating_mul(config.cell_width.bytes());

        include_str!("asm.tpl")
            .replace("{{TAPE_BYTES}}", &tape_bytes.to_string())
            .replace("{{SIZE}}", size(config.cell_width))
            .replace("{{REGISTER}}", register(config.cell_width))
            .replace("{{EOF}}", &eof)
            .replace("{{CODE}}", code.trim_end_matches('\n'))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::backends::{compile, Backend};
    use crate::config::{CellWidth, CompileConfig, Dialect, EofPolicy};
    use crate::parser::{parse, parse_with_dialect};

    #[test]
    fn test_loop_labels_unique() {
        let program = parse(include_str!("../../../test_programs/hello_world.bf")).unwrap();
        let code = compile(&program, Backend::Asm, &CompileConfig::default()).unwrap();

        let labels: Vec<&str> = code.lines().filter(|line| line.starts_with("loop_")).collect();
        let unique: HashSet<&str> = labels.iter().copied().collect();

        assert_eq!(labels.len(), 6);
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_branch_pairs() {
        let code = compile(&parse("[-]").unwrap(), Backend::Asm, &CompileConfig::default()).unwrap();

        assert!(code.contains(concat!(
            "    cmp byte [rbx], 0\n",
            "    je loop_0_end\n",
            "loop_0_start:\n",
            "        sub byte [rbx], 1\n",
            "    cmp byte [rbx], 0\n",
            "    jne loop_0_start\n",
            "loop_0_end:\n",
        )));
    }

    #[test]
    fn test_wide_cells() {
        let config = CompileConfig {
            tape_length: 10,
            cell_width: CellWidth::U16,
            eof: EofPolicy::Overwrite(0),
            ..CompileConfig::default()
        };
        let program = parse_with_dialect("3>3.,", &Dialect::extended()).unwrap();
        let code = compile(&program, Backend::Asm, &config).unwrap();

        assert!(code.contains("tape: resb 20\n"));
        assert!(code.contains("    add rbx, 6\n"));
        assert!(code.contains("    mov r12, 3\n    call put_cells\n"));
        assert!(code.contains("    call get_cell\n"));
        assert!(code.contains("    mov word [rbx], ax\n"));
        assert!(code.contains(".eof:\n    mov word [rbx], 0\n"));
    }

    #[test]
    fn test_halt() {
        let code = compile(&parse("+!-").unwrap(), Backend::Asm, &CompileConfig::default()).unwrap();

        assert!(code.contains("    add byte [rbx], 1\n    jmp halt\n    sub byte [rbx], 1\nhalt:\n    mov rax, 60\n"));
    }
}
