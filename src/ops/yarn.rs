//! Running yarn in the prefetch environment.

use std::path::{Path, PathBuf};

use crate::ops::env::EnvMap;
use crate::ops::errors::PrefetchError;
use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};

/// The yarn executable together with the runner that spawns it.
pub struct Yarn<'a> {
    program: PathBuf,
    runner: &'a dyn CommandRunner,
}

impl<'a> Yarn<'a> {
    pub fn new(program: impl Into<PathBuf>, runner: &'a dyn CommandRunner) -> Self {
        Yarn {
            program: program.into(),
            runner,
        }
    }

    /// Build a yarn invocation.
    ///
    /// The parent environment is dropped except for `PATH`, so nothing but
    /// `env` influences yarn.
    pub fn command(&self, args: &[&str], cwd: &Path, env: &EnvMap) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .args(args)
            .env_clear()
            .cwd(cwd);

        if let Ok(path) = std::env::var("PATH") {
            cmd = cmd.env("PATH", path);
        }

        cmd.envs(env)
    }

    /// Run yarn and capture its output. A non-zero exit is not an error here.
    pub fn run(&self, args: &[&str], cwd: &Path, env: &EnvMap) -> Result<ProcessOutput, PrefetchError> {
        let cmd = self.command(args, cwd, env);
        self.runner
            .run(&cmd)
            .map_err(|err| PrefetchError::Command {
                command: cmd.display_command(),
                message: format!("{:#}", err),
            })
    }
}
