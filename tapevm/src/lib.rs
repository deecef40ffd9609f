pub use backends::interpreter::Interpreter;
pub use backends::{compile, Backend};
pub use config::{CellWidth, CompileConfig, Dialect, EofPolicy, RunConfig, TapeMode, DEFAULT_DEBUG_WINDOW, DEFAULT_TAPE_LENGTH};
pub use errors::{BracketKind, CompilerError, ParserError, RuntimeError, TapeVmError, UnmatchedBracket};
pub use ir::ops::{Instructions, Op, OpType, Statistics};
pub use machine::{MachineState, Tape};

pub use crate::analyzer::{analyze, Warning, WarningType};
pub use crate::folding::fold;
pub use crate::jumps::{match_brackets, JumpTable};
pub use crate::lexer::lower;
pub use crate::parser::{parse, parse_with_dialect};
pub use crate::source::{normalize, Program, SourceChar};

mod analyzer;
pub mod backends;
mod config;
mod errors;
mod folding;
mod ir;
mod jumps;
mod lexer;
pub mod limiters;
mod machine;
mod parser;
mod source;
