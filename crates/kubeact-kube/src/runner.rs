//! Process execution
//!
//! Actions never spawn processes themselves; they go through a
//! [`CommandRunner`] so tests can script the tool's behaviour.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, RwLock};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::{ActionError, Result};

/// Captured result of one process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `-1` when the process was killed by a signal
    pub code: i32,
    /// Trimmed stdout lines
    pub stdout: Vec<String>,
    /// Trimmed stderr lines
    pub stderr: Vec<String>,
}

impl ExecOutput {
    /// Successful run with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: split_chunks(&stdout.into()),
            stderr: Vec::new(),
        }
    }

    /// Failed run with the given code and stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: Vec::new(),
            stderr: split_chunks(&stderr.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Stdout chunks joined with `separator`
    pub fn stdout_joined(&self, separator: &str) -> String {
        self.stdout.join(separator)
    }

    /// Stderr chunks joined with `separator`
    pub fn stderr_joined(&self, separator: &str) -> String {
        self.stderr.join(separator)
    }
}

fn split_chunks(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim().to_string()).collect()
}

/// Runs an external program
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program args...` in `cwd` and wait for it to exit
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ExecOutput>;
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ExecOutput> {
        let spawn_error = |source| ActionError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = tokio::join!(read_lines(stdout), read_lines(stderr));
        let status = child.wait().await.map_err(spawn_error)?;

        Ok(ExecOutput {
            code: status.code().unwrap_or(-1),
            stdout: stdout?,
            stderr: stderr?,
        })
    }
}

async fn read_lines<R>(reader: Option<R>) -> Result<Vec<String>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut chunks = Vec::new();
    let Some(reader) = reader else {
        return Ok(chunks);
    };

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        chunks.push(line.trim().to_string());
    }
    Ok(chunks)
}

/// A recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// In-memory runner for tests
///
/// Returns scripted outputs in order (a successful empty run once the
/// script is exhausted) and records every invocation.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    outputs: Arc<RwLock<VecDeque<ExecOutput>>>,
    invocations: Arc<RwLock<Vec<Invocation>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with scripted outputs
    pub fn with_outputs(outputs: impl IntoIterator<Item = ExecOutput>) -> Self {
        let runner = Self::new();
        for output in outputs {
            runner.push_output(output);
        }
        runner
    }

    /// Queue the next output
    pub fn push_output(&self, output: ExecOutput) {
        self.outputs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(output);
    }

    /// Every invocation so far
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Arguments of the most recent invocation
    pub fn last_args(&self) -> Option<Vec<String>> {
        self.invocations().last().map(|i| i.args.clone())
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ExecOutput> {
        self.invocations
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Invocation {
                program: program.to_string(),
                args: args.to_vec(),
                cwd: cwd.to_path_buf(),
            });

        Ok(self
            .outputs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_default())
    }
}
