//! # Command Execution Module / 命令执行模块
//!
//! Parses configured command lines and runs child processes, echoing their
//! output to the console while capturing it for reports.
//!
//! 解析配置的命令行并运行子进程，将其输出回显到控制台，同时捕获以用于报告。

use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// A program and its arguments, ready to be spawned.
/// 程序及其参数，准备好被派生。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Expands `~` and environment variables, then splits with shell quoting rules.
    ///
    /// 展开 `~` 和环境变量，然后按 shell 引号规则拆分。
    pub fn parse(command: &str) -> Result<Self> {
        let expanded = shellexpand::full(command)
            .with_context(|| format!("Failed to expand command: {command}"))?
            .to_string();

        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| anyhow!("Failed to parse command: {}", expanded))?;

        if parts.is_empty() {
            return Err(anyhow!("Empty command after parsing: '{}'", command));
        }

        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }

    /// Returns a copy with `arg` appended.
    pub fn with_arg(&self, arg: impl Into<String>) -> Self {
        let mut line = self.clone();
        line.args.push(arg.into());
        line
    }

    /// Returns `wrapper` followed by this whole command line.
    ///
    /// `nvprof -o out.prof --` wrapping `python -m pytest` gives
    /// `nvprof -o out.prof -- python -m pytest`.
    pub fn wrapped_by(&self, wrapper: &CommandLine) -> Self {
        let mut args = wrapper.args.clone();
        args.push(self.program.clone());
        args.extend(self.args.iter().cloned());
        Self {
            program: wrapper.program.clone(),
            args,
        }
    }

    /// Builds a `tokio` command running in `cwd` with the extra `env`.
    pub fn to_command(&self, cwd: &Path, env: &BTreeMap<String, String>) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(env)
            .current_dir(cwd)
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(joined) => f.write_str(&joined),
            // Only fails on NUL bytes; show the raw words instead.
            Err(_) => write!(f, "{} {}", self.program, self.args.join(" ")),
        }
    }
}

/// Spawns a command, echoes its stdout and stderr line by line as they arrive,
/// and captures both into a single string.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，逐行回显其 stdout 和 stderr，并将两者捕获到一个字符串中。
pub async fn spawn_and_stream(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other("Failed to capture child output")),
            String::new(),
        );
    };

    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_handle = tokio::spawn(echo_lines(stdout, Arc::clone(&output), false));
    let stderr_handle = tokio::spawn(echo_lines(stderr, Arc::clone(&output), true));

    let status = child.wait().await;

    // Wait for the readers so no trailing output is lost.
    if let Err(e) = stdout_handle.await {
        eprintln!("Failed to join stdout task: {}", e);
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("Failed to join stderr task: {}", e);
    }

    let captured = output.lock().await.clone();
    (status, captured)
}

/// Echoes and captures `stream` line by line until EOF.
///
/// Lines are read as raw bytes and converted lossily, so invalid UTF-8 never
/// stops the reader. The pipe must stay drained until the child closes it,
/// otherwise the child's next write fails with `SIGPIPE`.
async fn echo_lines<R>(stream: R, output: Arc<tokio::sync::Mutex<String>>, to_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if to_stderr {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
                let mut output = output.lock().await;
                output.push_str(line);
                output.push('\n');
            }
            Err(e) => {
                eprintln!("Failed to read child output: {}", e);
                // Nothing more can be captured; keep the pipe open until EOF.
                let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                break;
            }
        }
    }
}
