use std::ops::{Index, Range};

use tracing::debug;

use crate::config::Dialect;

/// Halt instruction, also separates the program from trailing input data
const HALT_MARKER: char = '!';

/// Instruction character kept by [`normalize`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceChar {
    pub ch: char,

    /// Index of the character in the original source
    pub position: usize,

    /// Byte offset of the character in the original source
    pub offset: usize,

    /// 1-based line number
    pub line: usize,

    /// 1-based column number
    pub column: usize,
}

impl SourceChar {
    /// Byte range of the character in the original source
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.ch.len_utf8()
    }
}

/// Program text with all comment characters removed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    chars: Vec<SourceChar>,
    trailing_data: Option<String>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SourceChar> {
        self.chars.get(index)
    }

    pub fn chars(&self) -> &[SourceChar] {
        &self.chars
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceChar> {
        self.chars.iter()
    }

    /// Text following the first halt marker if the source was cut there
    ///
    /// Only set with [`Dialect::data_after_halt`].
    pub fn trailing_data(&self) -> Option<&str> {
        self.trailing_data.as_deref()
    }

    /// The normalized program as a string
    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.ch).collect()
    }
}

impl Index<usize> for Program {
    type Output = SourceChar;

    fn index(&self, index: usize) -> &Self::Output {
        &self.chars[index]
    }
}

/// Strip everything that isn't an instruction of `dialect` from `source`
pub fn normalize(source: &str, dialect: &Dialect) -> Program {
    let mut chars = Vec::new();
    let mut trailing_data = None;

    let mut line = 1;
    let mut column = 1;

    for (position, (offset, ch)) in source.char_indices().enumerate() {
        if ch == HALT_MARKER && dialect.halt_marker && dialect.data_after_halt {
            trailing_data = Some(source[offset + ch.len_utf8()..].to_owned());
            break;
        }

        if dialect.accepts(ch) {
            chars.push(SourceChar {
                ch,
                position,
                offset,
                line,
                column,
            });
        }

        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    debug!(
        source_chars = source.chars().count(),
        instructions = chars.len(),
        halted = trailing_data.is_some(),
        "normalized source"
    );

    Program {
        chars,
        trailing_data,
    }
}
