use std::ops::Range;

use tracing::debug;

use crate::errors::ParserError;
use crate::ir::ops::{Instructions, Op, OpType};
use crate::jumps::JumpTable;
use crate::source::{Program, SourceChar};

/// Numeric prefix waiting for the instruction it applies to
struct Quantifier {
    count: isize,
    span: Range<usize>,
    /// Source position of the last digit
    last_position: usize,
}

impl Quantifier {
    fn new(ch: &SourceChar, digit: u32) -> Quantifier {
        Quantifier {
            count: digit as isize,
            span: ch.span(),
            last_position: ch.position,
        }
    }

    fn continues_with(&self, ch: &SourceChar) -> bool {
        self.last_position + 1 == ch.position
    }

    fn push(&mut self, ch: &SourceChar, digit: u32) -> Result<(), ParserError> {
        self.count = self
            .count
            .checked_mul(10)
            .and_then(|count| count.checked_add(digit as isize))
            .ok_or_else(|| ParserError::QuantifierOverflow {
                position: ch.position,
                span: self.span.start..ch.span().end,
            })?;
        self.span.end = ch.span().end;
        self.last_position = ch.position;

        Ok(())
    }
}

/// Lower a validated program into ops, attaching quantifiers to their instruction
///
/// Loop ops are resolved against the index space of the returned op list.
pub fn lower(program: &Program, jumps: &JumpTable) -> Result<Instructions, ParserError> {
    let mut ops = Vec::with_capacity(program.len());

    // Op index of every bracket, by program index
    let mut bracket_ops = vec![usize::MAX; program.len()];

    let mut pending: Option<Quantifier> = None;

    for (index, ch) in program.iter().enumerate() {
        if let Some(digit) = ch.ch.to_digit(10) {
            match &mut pending {
                Some(quantifier) if quantifier.continues_with(ch) => quantifier.push(ch, digit)?,
                _ => pending = Some(Quantifier::new(ch, digit)),
            }
            continue;
        }

        let unquantified = match ch.ch {
            '#' => Some(Op::hook(ch.span(), OpType::DumpTape)),
            '^' => Some(Op::hook(ch.span(), OpType::DumpPointer)),
            '@' => Some(Op::hook(ch.span(), OpType::DumpCycles)),
            '_' => Some(Op::zero(ch.span())),
            '!' => Some(Op::halt(ch.span())),
            _ => None,
        };

        // A pending quantifier stays for the next primitive
        if let Some(op) = unquantified {
            ops.push(op);
            continue;
        }

        if matches!(ch.ch, '[' | ']') {
            if pending.is_some() {
                return Err(ParserError::QuantifierBeforeLoop {
                    position: ch.position,
                    span: ch.span(),
                });
            }

            bracket_ops[index] = ops.len();

            // Targets are patched below when both ends are known
            ops.push(match ch.ch {
                '[' => Op::loop_start(ch.span(), usize::MAX),
                _ => Op::loop_end(ch.span(), usize::MAX),
            });
            continue;
        }

        let (repeat, span) = match pending.take() {
            Some(quantifier) => (quantifier.count, quantifier.span.start..ch.span().end),
            None => (1, ch.span()),
        };

        match ch.ch {
            '>' => ops.push(Op::move_pointer(span, repeat)),
            '<' => ops.push(Op::move_pointer(span, -repeat)),
            '+' => ops.push(Op::adjust(span, repeat)),
            '-' => ops.push(Op::adjust(span, -repeat)),
            '.' => ops.push(Op::output(span, repeat as usize)),
            ',' => ops.push(Op::input(span, repeat as usize)),
            other => unreachable!("Character {:?} isn't part of any dialect", other),
        }
    }

    for (start, end) in jumps.pairs() {
        let start_op = bracket_ops[start];
        let end_op = bracket_ops[end];

        ops[start_op].op_type = OpType::LoopStart(end_op);
        ops[end_op].op_type = OpType::LoopEnd(start_op);
    }

    debug!(ops = ops.len(), "lowered program");

    Ok(Instructions {
        ops,
        dangling_quantifier: pending.map(|quantifier| quantifier.span),
    })
}
