use tracing::debug;

use crate::ir::ops::{Instructions, Op, OpType};

/// Merge the second op into the first if both belong to the same run
fn merge(first: &OpType, second: &OpType) -> Option<OpType> {
    match (first, second) {
        (
            OpType::MovePointer { delta: d1, low: l1, high: h1 },
            OpType::MovePointer { delta: d2, low: l2, high: h2 },
        ) => {
            let delta = d1.checked_add(*d2)?;
            let low = d1.checked_add(*l2)?.min(*l1);
            let high = d1.checked_add(*h2)?.max(*h1);

            Some(OpType::MovePointer { delta, low, high })
        }
        // Wrapping at the machine word keeps the value modulo every cell width
        (OpType::AdjustCell(d1), OpType::AdjustCell(d2)) => Some(OpType::AdjustCell(d1.wrapping_add(*d2))),
        _ => None,
    }
}

/// Collapse runs of pointer moves and runs of cell adjustments into single ops
///
/// Loop targets are re-resolved against the folded list. Returns the number of removed ops.
pub fn fold(program: &mut Instructions) -> usize {
    let before = program.ops.len();

    let mut folded: Vec<Op> = Vec::with_capacity(before);

    // New index of every op, by old index
    let mut new_index = Vec::with_capacity(before);

    for op in program.ops.drain(..) {
        if let Some(last) = folded.last_mut() {
            if let Some(op_type) = merge(&last.op_type, &op.op_type) {
                last.op_type = op_type;
                last.span = last.span.start..op.span.end;
                new_index.push(folded.len() - 1);
                continue;
            }
        }

        new_index.push(folded.len());
        folded.push(op);
    }

    for op in &mut folded {
        op.op_type = match op.op_type {
            OpType::LoopStart(end) => OpType::LoopStart(new_index[end]),
            OpType::LoopEnd(start) => OpType::LoopEnd(new_index[start]),
            other => other,
        };
    }

    program.ops = folded;

    let removed = before - program.ops.len();

    debug!(before, after = program.ops.len(), "folded runs");

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use crate::parser::{parse, parse_with_dialect};

    fn folded(source: &str) -> Vec<OpType> {
        let mut program = parse(source).unwrap();
        fold(&mut program);

        program.ops.into_iter().map(|op| op.op_type).collect()
    }

    #[test]
    fn test_fold_runs() {
        assert_eq!(folded("+++>>><"), vec![
            OpType::AdjustCell(3),
            OpType::MovePointer {
                delta: 2,
                low: 0,
                high: 3,
            },
        ]);
    }

    #[test]
    fn test_fold_spans() {
        let mut program = parse("+++>>><").unwrap();
        let removed = fold(&mut program);

        assert_eq!(removed, 5);
        assert_eq!(program.ops[0].span, 0..3);
        assert_eq!(program.ops[1].span, 3..7);
    }

    #[test]
    fn test_fold_to_zero() {
        assert_eq!(folded("+-<>"), vec![
            OpType::AdjustCell(0),
            OpType::MovePointer {
                delta: 0,
                low: -1,
                high: 0,
            },
        ]);
    }

    #[test]
    fn test_fold_excursion() {
        assert_eq!(folded(">>><<<<<>"), vec![OpType::MovePointer {
            delta: -1,
            low: -2,
            high: 3,
        }]);
    }

    #[test]
    fn test_runs_stop_at_other_ops() {
        assert_eq!(folded("++.++,--[-]"), vec![
            OpType::AdjustCell(2),
            OpType::Output(1),
            OpType::AdjustCell(2),
            OpType::Input(1),
            OpType::AdjustCell(-2),
            OpType::LoopStart(7),
            OpType::AdjustCell(-1),
            OpType::LoopEnd(5),
        ]);
    }

    #[test]
    fn test_loop_targets_reresolved() {
        assert_eq!(folded(">>[->>+<<]<<"), vec![
            OpType::MovePointer {
                delta: 2,
                low: 0,
                high: 2,
            },
            OpType::LoopStart(6),
            OpType::AdjustCell(-1),
            OpType::MovePointer {
                delta: 2,
                low: 0,
                high: 2,
            },
            OpType::AdjustCell(1),
            OpType::MovePointer {
                delta: -2,
                low: -2,
                high: 0,
            },
            OpType::LoopEnd(1),
            OpType::MovePointer {
                delta: -2,
                low: -2,
                high: 0,
            },
        ]);
    }

    #[test]
    fn test_no_fold_across_brackets() {
        assert_eq!(folded("+[+]+"), vec![
            OpType::AdjustCell(1),
            OpType::LoopStart(3),
            OpType::AdjustCell(1),
            OpType::LoopEnd(1),
            OpType::AdjustCell(1),
        ]);
    }

    #[test]
    fn test_fold_quantified() {
        let mut program = parse_with_dialect("3+2-+5>", &Dialect::extended()).unwrap();
        fold(&mut program);

        assert_eq!(program.ops, vec![
            Op::adjust(0..5, 2),
            Op::move_pointer(5..7, 5),
        ]);
    }

    #[test]
    fn test_zero_cell_stops_run() {
        let mut program = parse_with_dialect("+_+", &Dialect::extended()).unwrap();

        assert_eq!(fold(&mut program), 0);
    }

    #[test]
    fn test_fold_is_idempotent() {
        let mut program = parse("++[>+<-]>>.<<").unwrap();
        fold(&mut program);

        let once = program.clone();
        assert_eq!(fold(&mut program), 0);
        assert_eq!(program, once);
    }
}
