use std::{
    env,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::Arc,
};

use crate::core::error::{PywfError, Result};
use crate::core::tooling::scope;

/// One external command, assembled per call and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub executable: PathBuf,
    pub arguments: Vec<String>,
    pub working_directory: PathBuf,
    pub suppress_output: bool,
    /// Piped to the child; keeps secrets off the logged command line.
    pub stdin: Option<String>,
}

impl CommandInvocation {
    pub fn new(executable: impl Into<PathBuf>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
            working_directory: working_directory.into(),
            suppress_output: false,
            stdin: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn arg_path(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    #[must_use]
    pub fn suppress_output(mut self) -> Self {
        self.suppress_output = true;
        self
    }

    #[must_use]
    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Shell-like rendering used for logging and error messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.arguments.iter().cloned())
            .map(|part| quote(&part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(part: &str) -> String {
    if part.is_empty() || part.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", part.replace('\'', r"'\''"))
    } else {
        part.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Dry run: the command line was logged, nothing was spawned.
    Simulated,
    Completed(RunOutput),
}

impl RunStatus {
    #[must_use]
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated)
    }
}

/// Executes external commands for every workflow operation.
pub trait CommandRunner: Send + Sync {
    /// Spawns the process and waits for it. Only called on real runs.
    ///
    /// # Errors
    /// Returns an error when the process cannot be started.
    fn execute(&self, invocation: &CommandInvocation) -> Result<RunOutput>;

    /// Logs the command line, then spawns it only when `real_run` is set.
    ///
    /// # Errors
    /// Returns [`PywfError::CommandFailed`] on a non-zero exit status.
    fn run(&self, invocation: &CommandInvocation, real_run: bool) -> Result<RunStatus> {
        let command_line = invocation.command_line();
        scope::log(format_args!("run command: {command_line}"));
        if !real_run {
            return Ok(RunStatus::Simulated);
        }
        let output = self.execute(invocation)?;
        if output.code != 0 {
            return Err(PywfError::CommandFailed {
                code: output.code,
                command_line,
            });
        }
        Ok(RunStatus::Completed(output))
    }
}

pub type SharedRunner = Arc<dyn CommandRunner>;

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn execute(&self, invocation: &CommandInvocation) -> Result<RunOutput> {
        let _cwd = WorkingDirGuard::enter(&invocation.working_directory)?;
        let spawn_failed = |source| PywfError::SpawnFailed {
            command_line: invocation.command_line(),
            source,
        };

        let mut command = Command::new(&invocation.executable);
        command.args(&invocation.arguments);
        if invocation.stdin.is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::inherit());
        }
        if invocation.suppress_output {
            command.stdout(Stdio::piped());
            command.stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());
        }

        let mut child = command.spawn().map_err(spawn_failed)?;
        if let (Some(input), Some(mut pipe)) = (&invocation.stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).map_err(spawn_failed)?;
        }
        let output = child.wait_with_output().map_err(spawn_failed)?;
        tracing::debug!(
            program = %invocation.executable.display(),
            status = ?output.status,
            "process exited"
        );
        Ok(RunOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Changes the process working directory and restores it on drop, so the
/// previous directory comes back on success, error and unwinding alike.
#[must_use = "the previous directory is restored when this guard is dropped"]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir()
            .map_err(|source| PywfError::io("failed to read current directory", ".", source))?;
        env::set_current_dir(dir)
            .map_err(|source| PywfError::io("failed to enter", dir, source))?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.previous) {
            tracing::warn!(
                dir = %self.previous.display(),
                error = %err,
                "failed to restore working directory"
            );
        }
    }
}

/// Opens a local file with the platform's default handler.
#[must_use]
pub fn open_in_browser(path: &Path, working_directory: &Path) -> CommandInvocation {
    if cfg!(target_os = "macos") {
        CommandInvocation::new("open", working_directory).arg_path(path)
    } else if cfg!(windows) {
        CommandInvocation::new("cmd", working_directory)
            .args(["/C", "start", ""])
            .arg_path(path)
    } else {
        CommandInvocation::new("xdg-open", working_directory).arg_path(path)
    }
}
