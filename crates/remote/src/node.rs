//! Remote node client
//!
//! Commands run through the system `ssh` binary in batch mode; the `Local`
//! transport runs through `sh -c` and exists for the server container and for
//! tests. Output is always captured, even for failing exit codes; whether a
//! non-accepted exit code is an error is the caller's choice via
//! [`RunOpts::check_errors`].

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use mgrts_common::error::{Error, Result};
use mgrts_common::retry::{repeat_until_timeout, Poll, RetryOpts};

use crate::os::OsFamily;

/// How to reach a node for command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Spawn `ssh` against `user@hostname`.
    Ssh { user: String, port: u16 },
    /// Spawn `sh -c` on the harness host itself.
    Local,
}

/// Captured result of one command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Options for a single command execution.
#[derive(Debug, Clone)]
pub struct RunOpts {
    /// Raise [`Error::CommandFailed`] when the exit code is not accepted.
    pub check_errors: bool,
    /// Exit codes treated as success.
    pub success_codes: Vec<i32>,
    /// Wall-clock budget for the command; the child is killed on expiry.
    pub timeout: Duration,
    /// Log the command and its output at info level.
    pub verbose: bool,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            check_errors: true,
            success_codes: vec![0],
            timeout: Duration::from_secs(300),
            verbose: false,
        }
    }
}

impl RunOpts {
    /// Capture output without treating any exit code as an error.
    pub fn unchecked() -> Self {
        Self {
            check_errors: false,
            ..Self::default()
        }
    }

    pub fn with_success_codes(mut self, codes: &[i32]) -> Self {
        self.success_codes = codes.to_vec();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

/// A named machine in the test topology.
#[derive(Debug, Clone)]
pub struct Node {
    /// Registry name ("server", "proxy", "sle_minion", ...).
    pub name: String,
    pub hostname: String,
    pub os_family: OsFamily,
    pub transport: Transport,
    /// Some environments (e.g. salt-ssh only targets) cannot receive files.
    pub can_transfer_files: bool,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        os_family: OsFamily,
        transport: Transport,
    ) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            os_family,
            transport,
            can_transfer_files: true,
        }
    }

    /// A node executing on the harness host, used for the server container
    /// entry point and in tests.
    pub fn local(name: impl Into<String>, os_family: OsFamily) -> Self {
        Self::new(name, "localhost", os_family, Transport::Local)
    }

    pub fn without_file_transfer(mut self) -> Self {
        self.can_transfer_files = false;
        self
    }

    /// Run a shell command on this node.
    ///
    /// Output and exit code are always captured. With
    /// [`RunOpts::check_errors`] set, an exit code outside
    /// [`RunOpts::success_codes`] becomes [`Error::CommandFailed`] carrying
    /// the captured output.
    pub async fn run(&self, command: &str, opts: &RunOpts) -> Result<CommandOutput> {
        if opts.verbose {
            info!(host = %self.name, %command, "running command");
        } else {
            debug!(host = %self.name, %command, "running command");
        }

        let mut child = self.command_for(command).spawn()?;
        let output = match tokio::time::timeout(opts.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                // wait_with_output consumed the child; kill_on_drop reaps it.
                return Err(Error::TimeoutExceeded {
                    message: format!("command `{command}` on {}", self.name),
                    timeout: opts.timeout,
                    elapsed: opts.timeout,
                });
            }
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        if opts.verbose {
            info!(host = %self.name, code = result.exit_code, stdout = %result.stdout, "command finished");
        }

        if opts.check_errors && !opts.success_codes.contains(&result.exit_code) {
            return Err(Error::CommandFailed {
                host: self.name.clone(),
                command: command.to_string(),
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    /// Run a command with this node's package-manager success codes accepted.
    pub async fn run_pkg(&self, command: &str) -> Result<CommandOutput> {
        let opts = RunOpts::default().with_success_codes(self.os_family.package_success_codes());
        self.run(command, &opts).await
    }

    /// Re-run `command` until `accept` approves its output or the budget is
    /// exhausted. The command itself is never treated as an error here; only
    /// spawn failures abort the wait.
    pub async fn run_until<F>(
        &self,
        command: &str,
        retry: RetryOpts,
        accept: F,
    ) -> Result<CommandOutput>
    where
        F: Fn(&CommandOutput) -> bool,
    {
        let unchecked = RunOpts::unchecked();
        let unchecked = &unchecked;
        let accept = &accept;
        repeat_until_timeout(retry, move || {
            let run = self.run(command, unchecked);
            async move {
                let output = run.await?;
                Ok(if accept(&output) {
                    Poll::Ready(output)
                } else {
                    Poll::Pending
                })
            }
        })
        .await
    }

    /// Wait until the command exits zero, e.g. a service reporting active.
    pub async fn run_until_ok(&self, command: &str, retry: RetryOpts) -> Result<CommandOutput> {
        let retry = retry.with_message(format!("`{command}` on {} to succeed", self.name));
        self.run_until(command, retry, |output| output.success()).await
    }

    /// Wait until the command stops exiting zero, e.g. a service becoming
    /// inactive.
    pub async fn run_until_fails(&self, command: &str, retry: RetryOpts) -> Result<CommandOutput> {
        let retry = retry.with_message(format!("`{command}` on {} to fail", self.name));
        self.run_until(command, retry, |output| !output.success()).await
    }

    /// Check whether a file exists on the node.
    pub async fn file_exists(&self, path: &str) -> Result<bool> {
        let output = self
            .run(&format!("test -f {path}"), &RunOpts::unchecked())
            .await?;
        Ok(output.success())
    }

    /// Copy a local file onto the node.
    pub async fn inject(&self, local: &Path, remote: &str) -> Result<()> {
        if !self.can_transfer_files {
            return Err(Error::FileInjectionUnsupported(self.name.clone()));
        }
        match &self.transport {
            Transport::Local => {
                tokio::fs::copy(local, remote).await?;
            }
            Transport::Ssh { user, port } => {
                self.scp(
                    &local.to_string_lossy(),
                    &format!("{user}@{}:{remote}", self.hostname),
                    *port,
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Copy a file from the node to a local path.
    pub async fn extract(&self, remote: &str, local: &Path) -> Result<()> {
        if !self.can_transfer_files {
            return Err(Error::FileInjectionUnsupported(self.name.clone()));
        }
        match &self.transport {
            Transport::Local => {
                tokio::fs::copy(remote, local).await?;
            }
            Transport::Ssh { user, port } => {
                self.scp(
                    &format!("{user}@{}:{remote}", self.hostname),
                    &local.to_string_lossy(),
                    *port,
                )
                .await?;
            }
        }
        Ok(())
    }

    fn command_for(&self, command: &str) -> Command {
        let mut cmd = match &self.transport {
            Transport::Ssh { user, port } => {
                let mut cmd = Command::new("ssh");
                cmd.args([
                    "-o",
                    "BatchMode=yes",
                    "-o",
                    "StrictHostKeyChecking=no",
                    "-o",
                    "ConnectTimeout=10",
                    "-p",
                ])
                .arg(port.to_string())
                .arg(format!("{user}@{}", self.hostname))
                .arg(command);
                cmd
            }
            Transport::Local => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(command);
                cmd
            }
        };
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn scp(&self, from: &str, to: &str, port: u16) -> Result<()> {
        let output = Command::new("scp")
            .args(["-o", "BatchMode=yes", "-o", "StrictHostKeyChecking=no", "-P"])
            .arg(port.to_string())
            .arg(from)
            .arg(to)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                host: self.name.clone(),
                command: format!("scp {from} {to}"),
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_node() -> Node {
        Node::local("test_host", OsFamily::Suse)
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let output = local_node()
            .run("echo hello", &RunOpts::default())
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn unchecked_run_returns_failing_exit_code() {
        let output = local_node()
            .run("exit 3", &RunOpts::unchecked())
            .await
            .unwrap();
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn checked_run_raises_command_failed_outside_success_codes() {
        let err = local_node()
            .run("echo oops >&2; exit 1", &RunOpts::default())
            .await
            .unwrap_err();
        match err {
            Error::CommandFailed {
                host,
                exit_code,
                stderr,
                ..
            } => {
                assert_eq!(host, "test_host");
                assert_eq!(exit_code, 1);
                assert!(stderr.contains("oops"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn custom_success_codes_accept_nonzero_exit() {
        let opts = RunOpts::default().with_success_codes(&[0, 100]);
        let output = local_node().run("exit 100", &opts).await.unwrap();
        assert_eq!(output.exit_code, 100);
    }

    #[tokio::test]
    async fn command_timeout_is_timeout_exceeded() {
        let opts = RunOpts::default().with_timeout(Duration::from_millis(100));
        let err = local_node().run("sleep 10", &opts).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn run_until_fails_waits_for_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("stopme");
        std::fs::write(&marker, b"x").unwrap();
        let marker_str = marker.to_string_lossy().to_string();

        let node = local_node();
        let remove_cmd = format!("sleep 0.2 && rm {marker_str}");
        let remove_opts = RunOpts::default();
        let remover = node.run(&remove_cmd, &remove_opts);
        let wait_cmd = format!("test -f {marker_str}");
        let waiter = node.run_until_fails(
            &wait_cmd,
            RetryOpts::timeout_secs(5).with_interval(Duration::from_millis(20)),
        );

        let (removed, waited) = tokio::join!(remover, waiter);
        removed.unwrap();
        assert_ne!(waited.unwrap().exit_code, 0);
    }

    #[tokio::test]
    async fn file_transfer_refused_without_capability() {
        let node = local_node().without_file_transfer();
        let err = node
            .inject(Path::new("/tmp/whatever"), "/tmp/target")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileInjectionUnsupported(_)));
    }

    #[tokio::test]
    async fn local_inject_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        std::fs::write(&src, b"payload").unwrap();

        local_node()
            .inject(&src, &dst.to_string_lossy())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn file_exists_reflects_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe");
        let node = local_node();

        assert!(!node.file_exists(&path.to_string_lossy()).await.unwrap());
        std::fs::write(&path, b"x").unwrap();
        assert!(node.file_exists(&path.to_string_lossy()).await.unwrap());
    }
}
