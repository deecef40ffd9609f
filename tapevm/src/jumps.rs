use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::{BracketKind, ParserError, UnmatchedBracket};
use crate::source::Program;

/// Matching loop brackets of a [`Program`], indexed by position within the program
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpTable {
    starts: BTreeMap<usize, usize>,
    ends: BTreeMap<usize, usize>,
}

impl JumpTable {
    fn insert(&mut self, start: usize, end: usize) {
        self.starts.insert(start, end);
        self.ends.insert(end, start);
    }

    /// Index of the `]` matching the `[` at `start`
    pub fn loop_end(&self, start: usize) -> Option<usize> {
        self.starts.get(&start).copied()
    }

    /// Index of the `[` matching the `]` at `end`
    pub fn loop_start(&self, end: usize) -> Option<usize> {
        self.ends.get(&end).copied()
    }

    /// Index of the partner of either bracket
    pub fn partner(&self, index: usize) -> Option<usize> {
        self.loop_end(index).or_else(|| self.loop_start(index))
    }

    /// All `(start, end)` pairs ordered by start
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.starts.iter().map(|(start, end)| (*start, *end))
    }

    /// Number of matched pairs
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Match all loop brackets of `program` in a single scan
///
/// Fails with every bracket that has no partner, ordered by position.
pub fn match_brackets(program: &Program) -> Result<JumpTable, ParserError> {
    let mut table = JumpTable::default();
    let mut stack = Vec::new();
    let mut unmatched = Vec::new();

    for (index, ch) in program.iter().enumerate() {
        match ch.ch {
            '[' => stack.push(index),
            ']' => match stack.pop() {
                Some(start) => table.insert(start, index),
                None => unmatched.push(UnmatchedBracket::new(BracketKind::LoopEnd, ch)),
            },
            _ => {
                // Not a bracket
            }
        }
    }

    unmatched.extend(
        stack
            .into_iter()
            .map(|index| UnmatchedBracket::new(BracketKind::LoopStart, &program[index])),
    );

    if !unmatched.is_empty() {
        unmatched.sort_by_key(|bracket| bracket.position);
        return Err(ParserError::UnmatchedBrackets(unmatched));
    }

    debug!(loops = table.len(), "matched brackets");

    Ok(table)
}
