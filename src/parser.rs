use std::collections::HashMap;

use thiserror::Error;

use crate::program::{Instruction, Program};

pub struct Parser<'a> {
    source: &'a [u8],
    index: usize,
}

impl<'a> Parser<'a> {
    pub fn new<S: AsRef<[u8]> + ?Sized>(source: &'a S) -> Self {
        Self {
            source: source.as_ref(),
            index: 0,
        }
    }

    /// Single pass over the source. Pending `[` are kept on a stack as
    /// (instruction index, byte offset) so both ends of a pair are known
    /// when the `]` arrives.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut instructions = Vec::new();
        let mut loop_scopes = HashMap::new();
        let mut pending = Vec::new();

        while !self.is_at_end() {
            // anything that isn't a command is a comment
            if let Ok(instruction) = Instruction::try_from(self.current()) {
                let position = instructions.len();
                instructions.push(instruction);

                match instruction {
                    Instruction::LoopEntry => pending.push((position, self.index)),
                    Instruction::LoopExit => {
                        let Some((entry, _)) = pending.pop() else {
                            let line = self.line_number(self.index);
                            return Err(ParseError::UnmatchedLoopExit { line });
                        };
                        loop_scopes.insert(entry, position);
                        loop_scopes.insert(position, entry);
                    }
                    _ => {}
                }
            }
            self.index += 1;
        }

        if let Some(&(_, offset)) = pending.last() {
            let line = self.line_number(offset);
            return Err(ParseError::UnclosedLoopEntry { line });
        }

        Ok(Program::new(instructions, loop_scopes))
    }

    fn current(&self) -> u8 {
        self.source[self.index]
    }

    fn is_at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    fn line_number(&self, index: usize) -> usize {
        self.source[..index].iter().filter(|&&c| c == b'\n').count() + 1
    }
}

/// The program text has unbalanced brackets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unmatched `]` in line {line}")]
    UnmatchedLoopExit { line: usize },
    #[error("unclosed `[` in line {line}")]
    UnclosedLoopEntry { line: usize },
}
