use std::error::Error;
use std::io::Write;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Op {
    pub op_type: OpType,
    pub span: Range<usize>,
}

impl Op {
    pub fn move_pointer(span: Range<usize>, delta: isize) -> Op {
        Op {
            op_type: OpType::MovePointer {
                delta,
                low: delta.min(0),
                high: delta.max(0),
            },
            span,
        }
    }

    pub fn adjust(span: Range<usize>, delta: isize) -> Op {
        Op {
            op_type: OpType::AdjustCell(delta),
            span,
        }
    }

    pub fn output(span: Range<usize>, repeat: usize) -> Op {
        Op {
            op_type: OpType::Output(repeat),
            span,
        }
    }

    pub fn input(span: Range<usize>, repeat: usize) -> Op {
        Op {
            op_type: OpType::Input(repeat),
            span,
        }
    }

    pub fn loop_start(span: Range<usize>, end: usize) -> Op {
        Op {
            op_type: OpType::LoopStart(end),
            span,
        }
    }

    pub fn loop_end(span: Range<usize>, start: usize) -> Op {
        Op {
            op_type: OpType::LoopEnd(start),
            span,
        }
    }

    pub fn zero(span: Range<usize>) -> Op {
        Op {
            op_type: OpType::ZeroCell,
            span,
        }
    }

    pub fn halt(span: Range<usize>) -> Op {
        Op {
            op_type: OpType::Halt,
            span,
        }
    }

    pub fn hook(span: Range<usize>, op_type: OpType) -> Op {
        debug_assert!(op_type.is_debug_hook(), "Not a debug hook: {:?}", op_type);

        Op { op_type, span }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpType {
    /// Move the pointer by `delta` cells
    ///
    /// `low` and `high` are the smallest and largest offsets the pointer passes on the way.
    /// Both include zero, the starting point.
    MovePointer { delta: isize, low: isize, high: isize },

    /// Add delta to the current cell, wrapping at the cell width
    AdjustCell(isize),

    /// Write the current cell n times
    Output(usize),

    /// Read n bytes into the current cell
    Input(usize),

    /// Jump to the op after the matching end if the current cell is zero
    LoopStart(usize),

    /// Jump to the op after the matching start if the current cell isn't zero
    LoopEnd(usize),

    /// Set current cell to zero
    ZeroCell,

    /// Stop the program
    Halt,

    /// Debug: print the beginning of the tape
    DumpTape,

    /// Debug: print the pointer
    DumpPointer,

    /// Debug: print the number of executed cycles
    DumpCycles,
}

impl OpType {
    pub fn is_debug_hook(&self) -> bool {
        matches!(self, OpType::DumpTape | OpType::DumpPointer | OpType::DumpCycles)
    }
}

/// Summary of an op list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub op_count: usize,
    pub loop_count: usize,
    pub max_depth: usize,
}

/// An executable program
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Instructions {
    pub ops: Vec<Op>,

    /// Span of a quantifier at the end of the program that has no instruction to apply to
    pub dangling_quantifier: Option<Range<usize>>,
}

impl Instructions {
    pub fn new(ops: Vec<Op>) -> Instructions {
        Instructions {
            ops,
            dangling_quantifier: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get_statistics(&self) -> Statistics {
        let mut statistics = Statistics::default();
        let mut depth = 0;

        for op in &self.ops {
            statistics.op_count += 1;

            match op.op_type {
                OpType::LoopStart(_) => {
                    statistics.loop_count += 1;
                    depth += 1;
                    statistics.max_depth = statistics.max_depth.max(depth);
                }
                OpType::LoopEnd(_) => depth -= 1,
                _ => {}
            }
        }

        statistics
    }

    /// Dump program into a assembly like structure
    pub fn dump<W: Write>(&self, mut output: W) -> Result<(), Box<dyn Error>> {
        let mut indent = 0;

        for (index, op) in self.ops.iter().enumerate() {
            let mut pos = format!("0x{:x}..0x{:x}", op.span.start, op.span.end.saturating_sub(1));

            while pos.len() < 16 {
                pos.push(' ');
            }

            if let OpType::LoopEnd(_) = op.op_type {
                indent -= 1;
            }

            write!(output, "{}{:<6}", pos, index)?;

            for _ in 0..indent {
                write!(output, "  ")?;
            }

            match &op.op_type {
                OpType::MovePointer { delta, .. } => writeln!(output, "MOVE {}", delta)?,
                OpType::AdjustCell(delta) => writeln!(output, "ADJUST {}", delta)?,
                OpType::Output(repeat) => writeln!(output, "PUT {}", repeat)?,
                OpType::Input(repeat) => writeln!(output, "GET {}", repeat)?,
                OpType::LoopStart(end) => {
                    writeln!(output, "LOOP_START end: {}", end)?;
                    indent += 1;
                }
                OpType::LoopEnd(start) => writeln!(output, "LOOP_END start: {}", start)?,
                OpType::ZeroCell => writeln!(output, "ZERO")?,
                OpType::Halt => writeln!(output, "HALT")?,
                OpType::DumpTape => writeln!(output, "DEBUG_TAPE")?,
                OpType::DumpPointer => writeln!(output, "DEBUG_POINTER")?,
                OpType::DumpCycles => writeln!(output, "DEBUG_CYCLES")?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_pointer_extent() {
        assert_eq!(Op::move_pointer(0..1, 3).op_type, OpType::MovePointer {
            delta: 3,
            low: 0,
            high: 3,
        });
        assert_eq!(Op::move_pointer(0..1, -2).op_type, OpType::MovePointer {
            delta: -2,
            low: -2,
            high: 0,
        });
    }

    #[test]
    fn test_statistics() {
        let program = Instructions::new(vec![
            Op::adjust(0..1, 1),
            Op::loop_start(1..2, 5),
            Op::loop_start(2..3, 4),
            Op::adjust(3..4, -1),
            Op::loop_end(4..5, 2),
            Op::loop_end(5..6, 1),
        ]);

        assert_eq!(program.get_statistics(), Statistics {
            op_count: 6,
            loop_count: 2,
            max_depth: 2,
        });
    }

    #[test]
    fn test_dump() {
        let program = Instructions::new(vec![
            Op::adjust(0..3, 3),
            Op::loop_start(3..4, 3),
            Op::move_pointer(4..5, 1),
            Op::loop_end(5..6, 1),
            Op::output(6..7, 1),
            Op::halt(7..8),
        ]);

        let mut output = Vec::new();
        program.dump(&mut output).unwrap();

        let expected = "\
0x0..0x2        0     ADJUST 3
0x3..0x3        1     LOOP_START end: 3
0x4..0x4        2       MOVE 1
0x5..0x5        3     LOOP_END start: 1
0x6..0x6        4     PUT 1
0x7..0x7        5     HALT
";

        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }
}
