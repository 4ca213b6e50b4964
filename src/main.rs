use std::{
    fs,
    io::{self, BufWriter, Read, Write},
    path::Path,
    process::ExitCode,
};

pub mod cli;
pub mod interpreter;
pub mod parser;
pub mod program;

use clap::Parser as _;
use log::{debug, error};
use parser::Parser;
use thiserror::Error;

use crate::{
    cli::EofBehaviour,
    interpreter::{Interpreter, RuntimeError},
    parser::ParseError,
};

const EXIT_UNREADABLE_SOURCE: u8 = 255;
const EXIT_MALFORMED_PROGRAM: u8 = 1;
const EXIT_RUNTIME_FAILURE: u8 = 134;

#[derive(Debug, Error)]
enum Failure {
    #[error("failed to read {path}: {source}")]
    Unreadable { path: String, source: io::Error },
    #[error("malformed program {path}: {source}")]
    Malformed { path: String, source: ParseError },
    #[error("execution aborted: {0}")]
    Runtime(#[from] RuntimeError),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Unreadable { .. } => EXIT_UNREADABLE_SOURCE,
            Failure::Malformed { .. } => EXIT_MALFORMED_PROGRAM,
            Failure::Runtime(_) => EXIT_RUNTIME_FAILURE,
        }
    }
}

/// Reads, parses and runs the program at `path`, returning its exit status.
fn run_file<R: Read, W: Write>(
    path: &Path,
    input: R,
    output: W,
    eof_behaviour: EofBehaviour,
) -> Result<u8, Failure> {
    let content = fs::read(path).map_err(|source| Failure::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let program = Parser::new(&content)
        .parse()
        .map_err(|source| Failure::Malformed {
            path: path.display().to_string(),
            source,
        })?;

    debug!(
        "parsed {} instructions with {} loops",
        program.len(),
        program.loop_scopes().len() / 2
    );

    let mut interpreter = Interpreter::new(input, output, eof_behaviour);
    let status = interpreter.run(&program)?;

    // anything outside 0..=255 is not a status the process can report
    Ok(u8::try_from(status).unwrap_or(EXIT_RUNTIME_FAILURE))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::Args::parse();

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    match run_file(&args.input, stdin, stdout, args.eof_behaviour) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, path::PathBuf, process};

    use super::*;

    /// Writes `source` to a file unique to this test process.
    fn source_file(name: &str, source: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("tapevm-{}-{name}.b", process::id()));
        fs::write(&path, source).unwrap();
        path
    }

    fn run(path: &Path, input: &[u8]) -> (Result<u8, Failure>, Vec<u8>) {
        let mut output = Vec::new();
        let result = run_file(path, input, &mut output, EofBehaviour::Ignore);
        (result, output)
    }

    #[test]
    fn successful_run_exits_with_zero() {
        let path = source_file("echo", "echo: ,.");
        let (result, output) = run(&path, b"A");
        fs::remove_file(&path).unwrap();

        assert_eq!(result.unwrap(), 0);
        assert_eq!(output, b"A");
    }

    #[test]
    fn unreadable_source() {
        let path = env::temp_dir().join(format!("tapevm-{}-missing.b", process::id()));
        let (result, _) = run(&path, b"");

        let err = result.unwrap_err();
        assert!(matches!(err, Failure::Unreadable { .. }));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    fn malformed_program() {
        let path = source_file("malformed", "+\n]");
        let (result, output) = run(&path, b"");
        fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            Failure::Malformed {
                source: ParseError::UnmatchedLoopExit { line: 2 },
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
        assert!(output.is_empty());
    }

    #[test]
    fn runtime_failure() {
        let path = source_file("bounds", "+.<");
        let (result, output) = run(&path, b"");
        fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, Failure::Runtime(RuntimeError::TapeBounds { .. })));
        assert_eq!(err.exit_code(), 134);
        assert_eq!(output, vec![1]);
    }
}
