//! Test utilities and mocks for unit tests.
//!
//! This module provides a mock [`CommandRunner`] so pipeline tests never
//! spawn yarn, a resolver returning canned packages, and fixtures that lay
//! out yarn projects on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use yarn_prefetch::test_support::{MockExecutor, YarnProjectFixture};
//!
//! #[test]
//! fn test_example() {
//!     let exec = MockExecutor::new();
//!     exec.expect("yarn --version", ProcessOutput::success("1.22.19\n"));
//!
//!     // Run the pipeline against `exec`...
//!     assert_eq!(exec.calls().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::core::package::Package;
use crate::core::project::Project;
use crate::resolver::{ResolveError, Resolver};
use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

pub use fixtures::*;

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    /// Full command line to match, program by file name.
    pub command: String,
    /// Output to return when matched.
    pub output: ProcessOutput,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    /// Number of times this expectation has been used.
    pub used: usize,
}

impl CommandExpectation {
    /// Create a new expectation.
    pub fn new(command: impl Into<String>, output: ProcessOutput) -> Self {
        CommandExpectation {
            command: command.into(),
            output,
            times: None,
            used: 0,
        }
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    /// Check if this expectation can still be used.
    pub fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct ExecutorState {
    expectations: Vec<CommandExpectation>,
    calls: Vec<ProcessBuilder>,
}

/// Mock process executor for testing command execution.
///
/// Records every command it is asked to run and answers from the
/// registered expectations. The command line is matched with the program's
/// file name, so `/usr/bin/yarn install` matches `yarn install`.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<ExecutorState>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Expect an exact command, any number of times.
    pub fn expect(&self, cmd: &str, output: ProcessOutput) -> &Self {
        self.expect_with(CommandExpectation::new(cmd, output))
    }

    /// Add an expectation built by the caller.
    pub fn expect_with(&self, expectation: CommandExpectation) -> &Self {
        self.state
            .lock()
            .expect("mock executor lock")
            .expectations
            .push(expectation);
        self
    }

    /// Commands run so far, as display strings.
    pub fn calls(&self) -> Vec<String> {
        self.recorded().iter().map(command_line).collect()
    }

    /// Commands run so far, with their environment and working directory.
    pub fn recorded(&self) -> Vec<ProcessBuilder> {
        self.state.lock().expect("mock executor lock").calls.clone()
    }

    /// Verify that all expectations with a specific count were satisfied.
    pub fn verify(&self) -> Result<()> {
        let state = self.state.lock().expect("mock executor lock");
        for (i, exp) in state.expectations.iter().enumerate() {
            if let Some(expected) = exp.times {
                if exp.used != expected {
                    bail!(
                        "expectation {} was used {} times, expected {}",
                        i,
                        exp.used,
                        expected
                    );
                }
            }
        }
        Ok(())
    }
}

fn command_line(cmd: &ProcessBuilder) -> String {
    let program = cmd
        .get_program()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut parts = vec![program];
    parts.extend(cmd.get_args().iter().cloned());
    parts.join(" ")
}

impl CommandRunner for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = command_line(cmd);
        let mut state = self.state.lock().expect("mock executor lock");
        state.calls.push(cmd.clone());

        for exp in &mut state.expectations {
            if exp.command == full_cmd && exp.available() {
                exp.used += 1;
                return Ok(exp.output.clone());
            }
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

/// Resolver returning a fixed package list.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    pub packages: Vec<Package>,
}

impl StaticResolver {
    pub fn new(packages: Vec<Package>) -> Self {
        StaticResolver { packages }
    }
}

impl Resolver for StaticResolver {
    fn resolve(&self, _project: &Project, _mirror_dir: &Path) -> Result<Vec<Package>, ResolveError> {
        Ok(self.packages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_matches_and_records() {
        let exec = MockExecutor::new();
        exec.expect("yarn --version", ProcessOutput::success("1.22.19\n"));

        let output = exec
            .run(&ProcessBuilder::new("/usr/local/bin/yarn").arg("--version"))
            .unwrap();

        assert_eq!(output.stdout, "1.22.19\n");
        assert_eq!(exec.calls(), vec!["yarn --version".to_string()]);
    }

    #[test]
    fn test_mock_executor_rejects_unexpected() {
        let exec = MockExecutor::new();
        assert!(exec.run(&ProcessBuilder::new("yarn").arg("install")).is_err());
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_mock_executor_times() {
        let exec = MockExecutor::new();
        exec.expect_with(CommandExpectation::new("yarn install", ProcessOutput::success("")).times(1));

        assert!(exec.verify().is_err());
        exec.run(&ProcessBuilder::new("yarn").arg("install")).unwrap();
        assert!(exec.verify().is_ok());
        assert!(exec.run(&ProcessBuilder::new("yarn").arg("install")).is_err());
    }
}
