use std::error::Error;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::ir::ops::{Instructions, Op, OpType};

/// WarningType found in a call to [analyze]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningType {
    /// A loop that can't change anything and never exits once entered
    InfiniteLoop,

    /// A quantifier at the end of the program without instruction to repeat
    DanglingQuantifier,
}

/// Warning found in a call to [analyze]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Code position the warning was found
    pub span: Range<usize>,

    /// Type of the warning
    pub warning_type: WarningType,
}

impl Warning {
    pub fn infinite_loop(span: Range<usize>) -> Warning {
        Warning {
            span,
            warning_type: WarningType::InfiniteLoop,
        }
    }

    pub fn dangling_quantifier(span: Range<usize>) -> Warning {
        Warning {
            span,
            warning_type: WarningType::DanglingQuantifier,
        }
    }

    pub fn render(warnings: &[Warning], writer: &mut dyn WriteColor, source: &str, filename: Option<&str>) -> Result<(), Box<dyn Error>> {
        let mut files = SimpleFiles::new();

        let file_id = files.add(filename.unwrap_or(""), source);

        let config = codespan_reporting::term::Config::default();

        for warning in warnings {
            let span = warning.span.clone();

            let diagnostic = match &warning.warning_type {
                WarningType::InfiniteLoop => Diagnostic::warning()
                    .with_message("Possible infinite loop")
                    .with_labels(vec![Label::primary(file_id, span)]),
                WarningType::DanglingQuantifier => Diagnostic::warning()
                    .with_message("Quantifier without instruction is ignored")
                    .with_labels(vec![Label::primary(file_id, span)]),
            };

            codespan_reporting::term::emit(writer, &config, &files, &diagnostic)?;
        }

        Ok(())
    }

    pub fn pretty_print(warnings: &[Warning], source: &str, filename: Option<&str>) -> Result<(), Box<dyn Error>> {
        let writer = StandardStream::stderr(ColorChoice::Auto);

        Warning::render(warnings, &mut writer.lock(), source, filename)?;

        Ok(())
    }
}

/// Analyze program for possible errors
///
/// Loops are judged op by op, so folded programs give the best results.
pub fn analyze(program: &Instructions) -> Vec<Warning> {
    let mut warnings = vec![];

    for (index, op) in program.ops.iter().enumerate() {
        if let OpType::LoopStart(end) = op.op_type {
            check_infinite_loop(&mut warnings, &program.ops, index, end);
        }
    }

    if let Some(span) = &program.dangling_quantifier {
        warnings.push(Warning::dangling_quantifier(span.clone()));
    }

    warnings
}

fn has_effect(op: &Op) -> bool {
    match op.op_type {
        OpType::MovePointer { delta, .. } => delta != 0,
        OpType::AdjustCell(delta) => delta != 0,
        OpType::Input(repeat) => repeat > 0,
        OpType::ZeroCell | OpType::Halt => true,
        _ => false,
    }
}

fn check_infinite_loop(warnings: &mut Vec<Warning>, ops: &[Op], start: usize, end: usize) {
    let Some(body) = ops.get(start + 1..end) else {
        return;
    };

    if !body.iter().any(has_effect) {
        warnings.push(Warning::infinite_loop(ops[start].span.start..ops[end].span.end));
    }
}

#[cfg(test)]
mod test {
    use codespan_reporting::term::termcolor::NoColor;

    use crate::analyzer::{analyze, Warning};
    use crate::config::Dialect;
    use crate::folding::fold;
    use crate::parser::{parse, parse_with_dialect};

    #[test]
    fn test_infinite_loop_check() {
        let program = parse("+[.]").unwrap();

        let warnings = analyze(&program);

        assert_eq!(warnings, vec![Warning::infinite_loop(1..4)])
    }

    #[test]
    fn test_folded_loop_check() {
        let mut program = parse("+[<>]>[[]]").unwrap();
        fold(&mut program);

        let warnings = analyze(&program);

        assert_eq!(warnings, vec![
            Warning::infinite_loop(1..5),
            Warning::infinite_loop(6..10),
            Warning::infinite_loop(7..9),
        ])
    }

    #[test]
    fn test_working_loops() {
        let program = parse("+[->+<]>[,]").unwrap();

        assert!(analyze(&program).is_empty());
    }

    #[test]
    fn test_halting_loop() {
        let program = parse("+[!]").unwrap();

        assert!(analyze(&program).is_empty());
    }

    #[test]
    fn test_pretty_print() {
        Warning::pretty_print(&[Warning::infinite_loop(1..3)], "+[]", Some("loop.bf")).unwrap();
    }

    #[test]
    fn test_dangling_quantifier() {
        let program = parse_with_dialect("+++12", &Dialect::extended()).unwrap();

        let warnings = analyze(&program);

        assert_eq!(warnings, vec![Warning::dangling_quantifier(3..5)]);
    }

    #[test]
    fn test_render() {
        let mut writer = NoColor::new(Vec::new());

        Warning::render(&[Warning::infinite_loop(1..3)], &mut writer, "+[]", Some("loop.bf")).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();

        assert!(text.contains("warning: Possible infinite loop"));
        assert!(text.contains("loop.bf"));
    }
}
