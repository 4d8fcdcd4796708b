use std::path::Path;
use std::process::Command;

use crate::error::{Result, ScaffoldError};

/// Runs external programs to completion. Split out so the scaffolder can be
/// driven without git or a C toolchain.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()>;

    /// Checked before anything is written to disk.
    fn require(&self, program: &str) -> Result<()> {
        require_tool(program)
    }
}

/// Spawns the program directly with inherited stdio and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        let command = command_line(program, args);
        tracing::info!("Running `{}`", command);

        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .map_err(|source| ScaffoldError::CommandLaunch {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ScaffoldError::CommandFailed { command, status });
        }
        Ok(())
    }
}

pub fn command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Fails early when `program` cannot be found on `PATH`.
pub fn require_tool(program: &str) -> Result<()> {
    which::which(program)
        .map(|path| tracing::debug!("Found {} at {}", program, path.display()))
        .map_err(|source| ScaffoldError::ToolNotFound {
            program: program.to_string(),
            source,
        })
}
