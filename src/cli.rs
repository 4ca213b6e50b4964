use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Runs a program for the eight-instruction tape machine
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Program source file
    pub input: PathBuf,

    /// What `,` does to the current cell once the input is exhausted
    #[arg(long, value_enum, default_value_t = EofBehaviour::Ignore)]
    pub eof_behaviour: EofBehaviour,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofBehaviour {
    /// Leave the cell unchanged
    #[default]
    Ignore,
    /// Store 0 in the cell
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["tapevm", "hello.b"]).unwrap();
        assert_eq!(args.input, PathBuf::from("hello.b"));
        assert_eq!(args.eof_behaviour, EofBehaviour::Ignore);
    }

    #[test]
    fn eof_behaviour_flag() {
        let args = Args::try_parse_from(["tapevm", "--eof-behaviour", "zero", "hello.b"]).unwrap();
        assert_eq!(args.eof_behaviour, EofBehaviour::Zero);
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["tapevm"]).is_err());
        assert!(Args::try_parse_from(["tapevm", "--eof-behaviour", "maybe", "x"]).is_err());
    }
}
