use crate::config::Dialect;
use crate::errors::ParserError;
use crate::ir::ops::Instructions;
use crate::jumps::match_brackets;
use crate::lexer::lower;
use crate::source::normalize;

/// Parse the input source file into an executable op list using the standard dialect
pub fn parse(source: &str) -> Result<Instructions, ParserError> {
    parse_with_dialect(source, &Dialect::standard())
}

/// Parse the input source file into an executable op list
///
/// Runs the normalizer, the bracket matcher and the lexer in order. The program is
/// fully validated before anything is returned.
pub fn parse_with_dialect(source: &str, dialect: &Dialect) -> Result<Instructions, ParserError> {
    let program = normalize(source, dialect);
    let jumps = match_brackets(&program)?;

    lower(&program, &jumps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ops::OpType;

    #[test]
    fn test_parse_validates_after_halt() {
        assert!(matches!(parse("+.!]]]"), Err(ParserError::UnmatchedBrackets(_))));
        assert_eq!(parse("+[.!]").unwrap().len(), 5);
    }

    #[test]
    fn test_parse_ignores_trailing_data() {
        let dialect = Dialect {
            data_after_halt: true,
            ..Dialect::standard()
        };
        let program = parse_with_dialect("+.!]]]", &dialect).unwrap();

        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_parse_reports_structure_first() {
        // The bracket error wins over the misplaced quantifier
        let error = parse_with_dialect("3[", &Dialect::extended()).unwrap_err();

        assert!(matches!(error, ParserError::UnmatchedBrackets(_)));
    }

    #[test]
    fn test_parse_debug_hooks() {
        let dialect = Dialect {
            debug_hooks: true,
            ..Dialect::standard()
        };
        let program = parse_with_dialect("#^@", &dialect).unwrap();

        assert_eq!(
            program.ops.iter().map(|op| op.op_type).collect::<Vec<_>>(),
            vec![OpType::DumpTape, OpType::DumpPointer, OpType::DumpCycles]
        );
        assert!(parse("#^@").unwrap().is_empty());
    }
}
