use tracing::{debug, trace};

use crate::config::CompileConfig;
use crate::errors::CompilerError;
use crate::ir::ops::{Instructions, OpType};

/// Text of a generated program with indentation bookkeeping
pub struct Listing {
    out: String,
    indent: usize,
    unit: &'static str,
    lines: usize,
}

impl Listing {
    pub fn new(unit: &'static str) -> Listing {
        Listing {
            out: String::new(),
            indent: 0,
            unit,
            lines: 0,
        }
    }

    /// Append one line at the current indentation
    pub fn line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.out.push_str(self.unit);
        }

        self.raw(line);
    }

    /// Append one line without indentation
    pub fn raw(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
        self.lines += 1;
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.indent
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Token to text mapping of a single target language
///
/// [`emit`] drives the style and does all the loop bookkeeping. Ops that have no
/// effect never reach the style.
pub trait CodeStyle {
    /// Indentation of one loop level
    const INDENT: &'static str = "    ";

    /// Loop level of the first statement inside the template
    const BASE_DEPTH: usize = 0;

    fn move_pointer(&self, out: &mut Listing, delta: isize);

    /// `delta` is already reduced to the cell width and never zero
    fn adjust_cell(&self, out: &mut Listing, delta: i64);

    fn output(&self, out: &mut Listing, repeat: usize);

    fn input(&self, out: &mut Listing, repeat: usize);

    fn zero_cell(&self, out: &mut Listing);

    /// End the program including flushing the output
    fn halt(&self, out: &mut Listing);

    fn loop_start(&self, out: &mut Listing, label: usize);

    fn loop_end(&self, out: &mut Listing, label: usize);

    /// Called for a loop without any statement in its body
    fn empty_body(&self, _out: &mut Listing) {}

    /// Wrap the generated statements into a complete program
    fn finish(&self, code: &str, config: &CompileConfig) -> String;
}

struct OpenLoop {
    label: usize,
    start: usize,
    empty: bool,
}

fn mark_used(open: &mut [OpenLoop]) {
    if let Some(current) = open.last_mut() {
        current.empty = false;
    }
}

/// Translate `program` with `style`
///
/// Fails if loops are nested deeper than `max_nesting`.
pub fn emit<S: CodeStyle>(style: &S, program: &Instructions, config: &CompileConfig, max_nesting: Option<usize>) -> Result<String, CompilerError> {
    let mut out = Listing::new(S::INDENT);
    for _ in 0..S::BASE_DEPTH {
        out.indent();
    }

    let mut open: Vec<OpenLoop> = Vec::new();
    let mut next_label = 0;

    for (index, op) in program.ops.iter().enumerate() {
        match op.op_type {
            OpType::MovePointer { delta, .. } => {
                if delta != 0 {
                    mark_used(&mut open);
                    style.move_pointer(&mut out, delta);
                }
            }
            OpType::AdjustCell(delta) => {
                let delta = config.cell_width.signed_residue(delta);

                if delta != 0 {
                    mark_used(&mut open);
                    style.adjust_cell(&mut out, delta);
                }
            }
            OpType::Output(repeat) => {
                if repeat > 0 {
                    mark_used(&mut open);
                    style.output(&mut out, repeat);
                }
            }
            OpType::Input(repeat) => {
                if repeat > 0 {
                    mark_used(&mut open);
                    style.input(&mut out, repeat);
                }
            }
            OpType::ZeroCell => {
                mark_used(&mut open);
                style.zero_cell(&mut out);
            }
            OpType::Halt => {
                mark_used(&mut open);
                style.halt(&mut out);
            }
            OpType::LoopStart(_) => {
                if let Some(max_depth) = max_nesting {
                    if open.len() >= max_depth {
                        return Err(CompilerError::NestingLimit {
                            span: op.span.clone(),
                            offset: op.span.start,
                            max_depth,
                        });
                    }
                }

                mark_used(&mut open);

                let label = next_label;
                next_label += 1;

                style.loop_start(&mut out, label);
                out.indent();

                open.push(OpenLoop {
                    label,
                    start: index,
                    empty: true,
                });

                trace!(label, depth = open.len(), "opened loop");
            }
            OpType::LoopEnd(start) => {
                let current = open.pop().ok_or_else(|| CompilerError::InternalCompilerError {
                    message: format!("Loop end at op {} without open loop", index),
                })?;

                if current.start != start {
                    return Err(CompilerError::InternalCompilerError {
                        message: format!("Loop end at op {} closes op {} but op {} is open", index, start, current.start),
                    });
                }

                if current.empty {
                    style.empty_body(&mut out);
                }

                out.dedent();
                style.loop_end(&mut out, current.label);

                trace!(label = current.label, depth = open.len(), "closed loop");
            }
            OpType::DumpTape | OpType::DumpPointer | OpType::DumpCycles => {}
        }
    }

    if let Some(current) = open.last() {
        return Err(CompilerError::InternalCompilerError {
            message: format!("Loop at op {} is never closed", current.start),
        });
    }

    debug!(lines = out.lines(), loops = next_label, "emitted listing");

    Ok(style.finish(&out.into_string(), config))
}
