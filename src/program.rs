use std::collections::HashMap;

use thiserror::Error;

/// A parsed program: the flat instruction sequence plus the bracket pairs,
/// stored in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    loop_scopes: HashMap<usize, usize>,
}

impl Program {
    /// Only the parser builds programs, so every loop instruction is
    /// guaranteed to have an entry in `loop_scopes`.
    pub(crate) fn new(instructions: Vec<Instruction>, loop_scopes: HashMap<usize, usize>) -> Self {
        Self {
            instructions,
            loop_scopes,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn loop_scopes(&self) -> &HashMap<usize, usize> {
        &self.loop_scopes
    }

    /// Index of the bracket matching the one at `index`.
    pub fn matching(&self, index: usize) -> Option<usize> {
        self.loop_scopes.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    MoveRight,
    MoveLeft,
    Increment,
    Decrement,
    Output,
    Input,
    LoopEntry,
    LoopExit,
}

impl Instruction {
    pub fn symbol(self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::LoopEntry => '[',
            Instruction::LoopExit => ']',
        }
    }
}

impl TryFrom<u8> for Instruction {
    type Error = UnknownInstruction;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'>' => Ok(Instruction::MoveRight),
            b'<' => Ok(Instruction::MoveLeft),
            b'+' => Ok(Instruction::Increment),
            b'-' => Ok(Instruction::Decrement),
            b'.' => Ok(Instruction::Output),
            b',' => Ok(Instruction::Input),
            b'[' => Ok(Instruction::LoopEntry),
            b']' => Ok(Instruction::LoopExit),
            other => Err(UnknownInstruction(other)),
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown instruction byte {0:#04x}")]
pub struct UnknownInstruction(pub u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_command_character() {
        for c in "><+-.,[]".bytes() {
            let instruction = Instruction::try_from(c).unwrap();
            assert_eq!(instruction.symbol() as u8, c);
        }
    }

    #[test]
    fn rejects_other_bytes() {
        assert_eq!(Instruction::try_from(b'a'), Err(UnknownInstruction(b'a')));
        assert_eq!(Instruction::try_from(b'\n'), Err(UnknownInstruction(b'\n')));
        assert_eq!(Instruction::try_from(b'#'), Err(UnknownInstruction(b'#')));
    }

    #[test]
    fn unknown_instruction_message() {
        assert_eq!(
            UnknownInstruction(b'x').to_string(),
            "unknown instruction byte 0x78"
        );
    }
}
