//! Uniform `kubectl`/`helm`/`kind` subprocess invocation (`spec.md` §4.4).

use std::time::Duration;

use dashmap::DashMap;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::RunnerError;

/// Default timeouts from `spec.md` §4.4.
pub mod timeouts {
    pub const READ_SECS: u64 = 30;
    pub const MUTATE_SECS: u64 = 300;
    pub const LOG_READ_SECS: u64 = 60;
    pub const KIND_CREATE_SECS: u64 = 600;
    pub const KIND_BUILD_NODE_IMAGE_SECS: u64 = 1800;
}

/// Outcome of one subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Clone)]
struct CachedProbe {
    available: bool,
    version: Option<String>,
}

/// Runs `kubectl`/`helm`/`kind` as argv vectors — never through a shell —
/// and caches binary availability/version lookups for the process lifetime.
pub struct SubprocessRunner {
    probes: DashMap<String, CachedProbe>,
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SubprocessRunner {
    pub fn new() -> Self {
        Self { probes: DashMap::new() }
    }

    /// `available(binary) → bool` (cached).
    pub async fn available(&self, binary: &str) -> bool {
        self.probe(binary).await.available
    }

    /// `version(binary) → string|nil` (cached).
    pub async fn version(&self, binary: &str) -> Option<String> {
        self.probe(binary).await.version
    }

    async fn probe(&self, binary: &str) -> CachedProbe {
        if let Some(cached) = self.probes.get(binary) {
            return cached.clone();
        }
        let probe = match self.run_uncached(binary, &["version", "--client"], 5).await {
            Ok(out) if out.success => CachedProbe { available: true, version: first_line(&out.stdout) },
            // Some binaries (e.g. `kind`) don't accept `--client`; a non-zero
            // exit with any stdout still proves the binary runs.
            Ok(out) if !out.stdout.is_empty() => CachedProbe { available: true, version: first_line(&out.stdout) },
            _ => CachedProbe { available: false, version: None },
        };
        self.probes.insert(binary.to_string(), probe.clone());
        probe
    }

    /// `run(binary, args, timeout_seconds, capture_output=true) → {success, output|error, exit_code}`.
    pub async fn run(
        &self,
        binary: &str,
        args: &[String],
        timeout_seconds: u64,
    ) -> Result<CommandOutput, RunnerError> {
        if !self.available(binary).await {
            return Err(RunnerError::Unavailable(binary.to_string()));
        }
        self.run_uncached(binary, args, timeout_seconds).await
    }

    async fn run_uncached(
        &self,
        binary: &str,
        args: &[impl AsRef<str>],
        timeout_seconds: u64,
    ) -> Result<CommandOutput, RunnerError> {
        let arg_strs: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        debug!(binary, args = ?arg_strs, "spawning subprocess");

        let mut cmd = Command::new(binary);
        cmd.args(&arg_strs);
        cmd.kill_on_drop(true);

        let child = cmd
            .output();

        match timeout(Duration::from_secs(timeout_seconds), child).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                success: output.status.success(),
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Ok(Err(source)) => Err(RunnerError::Spawn { binary: binary.to_string(), source }),
            Err(_) => {
                warn!(binary, timeout_seconds, "subprocess timed out");
                Err(RunnerError::Timeout(timeout_seconds))
            }
        }
    }
}

fn first_line(s: &str) -> Option<String> {
    s.lines().next().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_binary_short_circuits_run() {
        let runner = SubprocessRunner::new();
        let err = runner
            .run("definitely-not-a-real-binary-xyz", &[], 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn true_binary_reports_success() {
        let runner = SubprocessRunner::new();
        // `true` exists on every POSIX system this server targets and is a
        // convenient stand-in for a well-behaved read-only tool.
        let out = runner.run_uncached("true", &["x"], 5).await.unwrap();
        assert!(out.success);
    }
}
