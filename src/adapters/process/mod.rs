//! Blocking child-process execution for the external media tools

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::{ArchiverError, ArchiverResult};

/// Captured result of a finished tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Builder for one external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Short tool name for error messages
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Space-joined command line, as logged before every spawn
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion, capturing output; a non-zero exit is a failure
    pub fn run(&self) -> ArchiverResult<ToolOutput> {
        debug!("{}", self.command_line());
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        let result = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        if !result.status.success() {
            return Err(ArchiverError::tool_failed(
                self.tool_name(),
                format!("exited with {}: {}", result.status, last_line(&result.stderr)),
            ));
        }
        Ok(result)
    }

    /// Run to completion and require `output` to exist afterwards
    pub fn run_producing(&self, output: &Path) -> ArchiverResult<ToolOutput> {
        let result = self.run()?;
        if !output.exists() {
            return Err(ArchiverError::tool_failed(
                self.tool_name(),
                format!("expected output {} was not written", output.display()),
            ));
        }
        Ok(result)
    }

    /// Spawn and stream standard output line by line
    pub fn lines(&self) -> ArchiverResult<ChildLines> {
        debug!("{}", self.command_line());
        let mut child = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ArchiverError::tool_failed(self.tool_name(), "standard output was not captured")
        })?;

        Ok(ChildLines {
            tool: self.tool_name(),
            reader: BufReader::new(stdout),
            child: Some(child),
        })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    fn spawn_error(&self, error: std::io::Error) -> ArchiverError {
        if error.kind() == std::io::ErrorKind::NotFound {
            ArchiverError::ToolNotFound {
                tool: self.program.to_string_lossy().to_string(),
            }
        } else {
            ArchiverError::tool_failed(self.tool_name(), format!("failed to spawn: {}", error))
        }
    }
}

/// Finite, non-restartable sequence of a running child's stdout lines.
///
/// Invalid UTF-8 is replaced rather than failing the stream. End of stream
/// waits for the child; a non-zero exit is yielded as the final item.
/// Dropping the iterator early kills the child.
pub struct ChildLines {
    tool: String,
    reader: BufReader<ChildStdout>,
    child: Option<Child>,
}

impl Iterator for ChildLines {
    type Item = ArchiverResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut child = self.child.take()?;
        match read_line_lossy(&mut self.reader) {
            Ok(Some(line)) => {
                self.child = Some(child);
                Some(Ok(line))
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Some(Err(e.into()))
            }
            Ok(None) => match child.wait() {
                Ok(status) if status.success() => None,
                Ok(status) => Some(Err(ArchiverError::tool_failed(
                    self.tool.clone(),
                    format!("exited with {}", status),
                ))),
                Err(e) => Some(Err(e.into())),
            },
        }
    }
}

impl Drop for ChildLines {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// One line without its terminator, or `None` at end of input
fn read_line_lossy<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
}
