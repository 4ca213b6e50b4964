use std::io::{self, Read, Write};

use log::{debug, trace};
use thiserror::Error;

use crate::{
    cli::EofBehaviour,
    program::{Instruction::*, Program},
};

pub const TAPE_SIZE: usize = 4096;

/// Runs a [`Program`] against a fixed tape of [`TAPE_SIZE`] cells, reading
/// from `input` and writing to `output` one byte at a time.
pub struct Interpreter<R, W> {
    input: R,
    output: W,
    eof_behaviour: EofBehaviour,
    state: State,
}

#[derive(Debug)]
struct State {
    tape: Vec<u8>,
    pointer: usize,
}

impl State {
    fn new() -> Self {
        Self {
            tape: vec![0; TAPE_SIZE],
            pointer: 0,
        }
    }

    fn reset(&mut self) {
        self.tape.fill(0);
        self.pointer = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("instruction {instruction} moved the data pointer {direction} off the tape")]
    TapeBounds {
        instruction: usize,
        direction: Direction,
    },
    #[error("instruction pointer {0} is outside the program")]
    InstructionPointer(usize),
    #[error("loop instruction {0} has no matching bracket")]
    MissingLoopScope(usize),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl<R: Read, W: Write> Interpreter<R, W> {
    pub fn new(input: R, output: W, eof_behaviour: EofBehaviour) -> Self {
        Self {
            input,
            output,
            eof_behaviour,
            state: State::new(),
        }
    }

    /// Executes until the instruction pointer runs off the end of the
    /// program. Every run starts on a zeroed tape at cell 0; the state left
    /// behind stays readable through [`Self::tape`] until the next run.
    /// Returns the exit status, which is always 0 on success.
    pub fn run(&mut self, program: &Program) -> Result<i32, RuntimeError> {
        self.state.reset();

        let mut ip = 0;
        while ip < program.len() {
            ip = self.step(program, ip)?;
        }
        self.output.flush()?;

        debug!(
            "finished with data pointer at {} holding {}",
            self.data_pointer(),
            self.tape()[self.data_pointer()]
        );
        Ok(0)
    }

    /// Executes the instruction at `ip` and returns the next value of the
    /// instruction pointer.
    fn step(&mut self, program: &Program, ip: usize) -> Result<usize, RuntimeError> {
        let Some(&instruction) = program.instructions().get(ip) else {
            return Err(RuntimeError::InstructionPointer(ip));
        };
        debug_assert!(self.state.pointer < TAPE_SIZE);
        trace!("{ip}: {instruction}");

        match instruction {
            MoveRight => self.right(ip)?,
            MoveLeft => self.left(ip)?,
            Increment => self.increment(),
            Decrement => self.decrement(),
            Output => self.output()?,
            Input => self.input()?,
            LoopEntry => {
                if *self.current() == 0 {
                    return Ok(Self::scope(program, ip)? + 1);
                }
            }
            LoopExit => return Self::scope(program, ip),
        }

        Ok(ip + 1)
    }

    fn scope(program: &Program, ip: usize) -> Result<usize, RuntimeError> {
        program
            .matching(ip)
            .ok_or(RuntimeError::MissingLoopScope(ip))
    }

    fn increment(&mut self) {
        *self.current() = self.current().wrapping_add(1)
    }

    fn decrement(&mut self) {
        *self.current() = self.current().wrapping_sub(1)
    }

    fn right(&mut self, ip: usize) -> Result<(), RuntimeError> {
        if self.state.pointer + 1 >= TAPE_SIZE {
            return Err(RuntimeError::TapeBounds {
                instruction: ip,
                direction: Direction::Right,
            });
        }

        self.state.pointer += 1;
        Ok(())
    }

    fn left(&mut self, ip: usize) -> Result<(), RuntimeError> {
        if self.state.pointer == 0 {
            return Err(RuntimeError::TapeBounds {
                instruction: ip,
                direction: Direction::Left,
            });
        }

        self.state.pointer -= 1;
        Ok(())
    }

    fn output(&mut self) -> Result<(), RuntimeError> {
        let value = *self.current();
        trace!("output {value:#04x}");
        self.output.write_all(&[value])?;
        Ok(())
    }

    fn input(&mut self) -> Result<(), RuntimeError> {
        // a prompt written before the read has to be visible to the user
        self.output.flush()?;

        let input = (&mut self.input).bytes().next().transpose()?;

        if let Some(input) = input {
            trace!("input {input:#04x}");
            *self.current() = input;
        } else {
            trace!("input at end of stream");
            match self.eof_behaviour {
                EofBehaviour::Ignore => {}
                EofBehaviour::Zero => *self.current() = 0,
            }
        }
        Ok(())
    }

    fn current(&mut self) -> &mut u8 {
        &mut self.state.tape[self.state.pointer]
    }

    pub fn tape(&self) -> &[u8] {
        &self.state.tape
    }

    pub fn data_pointer(&self) -> usize {
        self.state.pointer
    }
}
