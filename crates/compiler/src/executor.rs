//! Execution of Python source
//!
//! The encoder never runs anything itself. Checking that an encoding
//! behaves like its input needs an interpreter, which is injected through
//! the [`Executor`] trait so tests can substitute their own.

use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Interpreter used when none is configured.
pub const DEFAULT_PYTHON: &str = "python3";

/// Longest program passed with `-c`; Linux caps a single argument at
/// 128 KiB. Longer programs are piped to the interpreter's stdin.
pub const MAX_INLINE_PROGRAM: usize = 128 * 1024 - 1;

/// What running a program produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    /// Whether the process exited successfully (false if it raised)
    pub success: bool,
}

/// Runs program text and captures its output.
pub trait Executor {
    /// Run `program` to completion.
    ///
    /// `Err` means the program could not be run at all, not that it
    /// raised; a raising program is an `Ok` outcome with `success == false`.
    fn run(&self, program: &str) -> Result<ExecutionOutcome, String>;
}

/// Runs programs with `python -c`, or `python -` for long programs.
#[derive(Debug, Clone)]
pub struct PythonExecutor {
    interpreter: String,
}

impl Default for PythonExecutor {
    fn default() -> Self {
        PythonExecutor::new(DEFAULT_PYTHON)
    }
}

impl PythonExecutor {
    pub fn new(interpreter: impl Into<String>) -> Self {
        PythonExecutor {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Whether the interpreter can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    /// The interpreter reads the whole script before running any of it,
    /// so stdin can be written in full before collecting output.
    fn run_piped(&self, program: &str) -> Result<std::process::Output, String> {
        let mut child = Command::new(&self.interpreter)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("Failed to run {}: {}", self.interpreter, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(program.as_bytes())
                .map_err(|e| format!("Failed to write program to {}: {}", self.interpreter, e))?;
        }

        child
            .wait_with_output()
            .map_err(|e| format!("Failed to wait for {}: {}", self.interpreter, e))
    }
}

impl Executor for PythonExecutor {
    fn run(&self, program: &str) -> Result<ExecutionOutcome, String> {
        let output = if program.len() <= MAX_INLINE_PROGRAM {
            Command::new(&self.interpreter)
                .arg("-c")
                .arg(program)
                .output()
                .map_err(|e| format!("Failed to run {}: {}", self.interpreter, e))?
        } else {
            self.run_piped(program)?
        };

        let outcome = ExecutionOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        };
        debug!(
            interpreter = %self.interpreter,
            program_len = program.len(),
            success = outcome.success,
            "ran program"
        );
        Ok(outcome)
    }
}
