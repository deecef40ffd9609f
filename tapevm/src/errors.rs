use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::source::SourceChar;

/// Trait all internal errors must implement
pub trait TapeVmError: Error {
    /// Return error message with all source positions and their optional labels
    fn get_message(&self) -> (String, Vec<(Range<usize>, Option<String>)>);

    /// Render error as diagnostic into `writer`
    fn render(&self, writer: &mut dyn WriteColor, source: &str, filename: Option<&str>) -> Result<(), Box<dyn Error>> {
        let mut files = SimpleFiles::new();

        let file_id = files.add(filename.unwrap_or(""), source);

        let (message, labels) = self.get_message();

        let labels = labels
            .into_iter()
            .map(|(range, label_message)| match label_message {
                Some(message) => Label::primary(file_id, range).with_message(message),
                None => Label::primary(file_id, range),
            })
            .collect();

        let diagnostic = Diagnostic::error().with_message(message).with_labels(labels);

        let config = codespan_reporting::term::Config::default();

        codespan_reporting::term::emit(writer, &config, &files, &diagnostic)?;

        Ok(())
    }

    /// Print error to stderr with colors and other fancy stuff
    fn pretty_print(&self, source: &str, filename: Option<&str>) -> Result<(), Box<dyn Error>> {
        let writer = StandardStream::stderr(ColorChoice::Auto);

        self.render(&mut writer.lock(), source, filename)?;

        Ok(())
    }
}

/// Kind of a bracket without partner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BracketKind {
    LoopStart,
    LoopEnd,
}

/// A `[` or `]` without matching partner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnmatchedBracket {
    pub kind: BracketKind,

    /// Character index in the source
    pub position: usize,

    pub line: usize,

    pub column: usize,

    /// Byte range in the source
    pub span: Range<usize>,
}

impl UnmatchedBracket {
    pub fn new(kind: BracketKind, ch: &SourceChar) -> UnmatchedBracket {
        UnmatchedBracket {
            kind,
            position: ch.position,
            line: ch.line,
            column: ch.column,
            span: ch.span(),
        }
    }
}

impl Display for UnmatchedBracket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let bracket = match self.kind {
            BracketKind::LoopStart => '[',
            BracketKind::LoopEnd => ']',
        };

        write!(f, "unmatched {} at pos {} (line {}, column {})", bracket, self.position, self.line, self.column)
    }
}

fn describe_unmatched(brackets: &[UnmatchedBracket]) -> String {
    let list = brackets.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");

    match brackets.len() {
        1 => format!("Badly nested loop: {}", list),
        count => format!("Badly nested loops ({} brackets): {}", count, list),
    }
}

/// Error type for parser related errors
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// Some brackets have no partner. Contains every unmatched bracket ordered by position
    #[error("{}", describe_unmatched(.0))]
    UnmatchedBrackets(Vec<UnmatchedBracket>),

    /// A quantifier directly precedes `[` or `]`
    #[error("Quantifier before loop bracket at pos {position}")]
    QuantifierBeforeLoop { position: usize, span: Range<usize> },

    /// A quantifier doesn't fit into a signed machine word
    #[error("Quantifier too large at pos {position}")]
    QuantifierOverflow { position: usize, span: Range<usize> },
}

impl ParserError {
    /// Unmatched brackets of this error, empty for other errors
    pub fn unmatched(&self) -> &[UnmatchedBracket] {
        match self {
            ParserError::UnmatchedBrackets(brackets) => brackets,
            _ => &[],
        }
    }
}

impl TapeVmError for ParserError {
    fn get_message(&self) -> (String, Vec<(Range<usize>, Option<String>)>) {
        match self {
            ParserError::UnmatchedBrackets(brackets) => (
                self.to_string(),
                brackets
                    .iter()
                    .map(|bracket| {
                        let label = match bracket.kind {
                            BracketKind::LoopStart => "Expected ] found end of file",
                            BracketKind::LoopEnd => "Expected matching [",
                        };

                        (bracket.span.clone(), Some(label.to_owned()))
                    })
                    .collect(),
            ),
            ParserError::QuantifierBeforeLoop { span, .. } => (
                self.to_string(),
                vec![(span.clone(), Some("Quantifiers only apply to > < + - . ,".to_owned()))],
            ),
            ParserError::QuantifierOverflow { span, .. } => (self.to_string(), vec![(span.clone(), None)]),
        }
    }
}

/// Runtime errors for interpreter invocations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The interpreter's configured [`Limiter`][crate::limiters::Limiter] triggered
    #[error("Execution limit reached after {cycles} cycles")]
    LimiterTriggered { span: Range<usize>, cycles: u64 },

    /// The pointer left the tape
    #[error("Instruction {instruction} moved the pointer outside of the tape to cell {address}")]
    BoundaryError {
        span: Range<usize>,
        instruction: usize,
        address: isize,
    },

    /// A growable tape would exceed its configured maximum length
    #[error("Required tape length of 0x{required:x} exceeds limit of 0x{max_tape_length:x}")]
    MaxTapeSizeReached {
        span: Range<usize>,
        max_tape_length: usize,
        required: usize,
    },

    /// Memory for a growing tape couldn't be allocated
    #[error("Failed to allocate a tape of 0x{required:x} cells")]
    TapeAllocationFailed { span: Range<usize>, required: usize },

    /// Reading or writing with ops , or . failed
    #[error("{error}")]
    IoError {
        span: Option<Range<usize>>,
        #[source]
        error: std::io::Error,
    },
}

impl TapeVmError for RuntimeError {
    fn get_message(&self) -> (String, Vec<(Range<usize>, Option<String>)>) {
        match self {
            RuntimeError::LimiterTriggered { span, .. } => (self.to_string(), vec![(span.clone(), None)]),
            RuntimeError::BoundaryError { span, address, .. } => (
                self.to_string(),
                vec![(span.clone(), Some(format!("Moves pointer to cell {}", address)))],
            ),
            RuntimeError::MaxTapeSizeReached { span, .. } | RuntimeError::TapeAllocationFailed { span, .. } => {
                (self.to_string(), vec![(span.clone(), None)])
            }
            RuntimeError::IoError { span, .. } => (
                self.to_string(),
                span.iter().map(|span| (span.clone(), None)).collect(),
            ),
        }
    }
}

/// Errors while generating code for one of the backends
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    /// The backend can't express loops nested this deep. `offset` is the byte offset of the `[`
    #[error("Maximum loop depth of {max_depth} exceeded at byte offset {offset}")]
    NestingLimit {
        span: Range<usize>,
        offset: usize,
        max_depth: usize,
    },

    /// Some unknown and unexpected shit happened during compilation
    #[error("Internal compiler Error: {message}")]
    InternalCompilerError { message: String },
}

impl TapeVmError for CompilerError {
    fn get_message(&self) -> (String, Vec<(Range<usize>, Option<String>)>) {
        match self {
            CompilerError::NestingLimit { span, .. } => (
                self.to_string(),
                vec![(span.clone(), Some("Loop opened here".to_owned()))],
            ),
            CompilerError::InternalCompilerError { .. } => (self.to_string(), vec![]),
        }
    }
}
