//! Notebook execution against a live Jupyter kernel.
//!
//! Runs the notebook top to bottom through `jupyter nbconvert --execute` in
//! a child process. Driving nbconvert keeps the exact execution semantics
//! the course pipeline was built around (fresh kernel, abort on the first
//! raising cell), and process isolation means a hung kernel can simply be
//! killed when the deadline expires.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::process::Command;

use nbprep_core::Notebook;

/// Environment variable overriding the kernel name stored in the notebook.
pub const KERNEL_ENV_VAR: &str = "NB_KERNEL";

/// Executes notebooks through an external Jupyter process.
pub struct KernelExecutor {
    /// Per-notebook execution budget
    timeout: Duration,

    /// Kernel name override, from `NB_KERNEL`
    kernel_name: Option<String>,

    /// Resolved path to the jupyter executable
    jupyter: PathBuf,
}

impl KernelExecutor {
    /// Create an executor, resolving the jupyter executable and reading the
    /// kernel override from the environment.
    pub fn from_env(timeout: Duration) -> anyhow::Result<Self> {
        let jupyter = which::which("jupyter").context(
            "jupyter not found on PATH (install with `pip install jupyter nbconvert`)",
        )?;
        Ok(Self {
            timeout,
            kernel_name: std::env::var(KERNEL_ENV_VAR).ok(),
            jupyter,
        })
    }

    /// Execute all code cells, returning the notebook with populated
    /// outputs and execution counts.
    ///
    /// Fails on the first raising cell, on deadline expiry, or if nbconvert
    /// itself cannot run. The input notebook is left untouched.
    pub async fn execute(&self, notebook: &Notebook) -> anyhow::Result<Notebook> {
        // Stage the notebook where nbconvert can read it
        let staged = tempfile::Builder::new()
            .prefix("nbprep-")
            .suffix(".ipynb")
            .tempfile()
            .context("Failed to create staging file")?;
        std::fs::write(staged.path(), notebook.to_json()?)
            .context("Failed to stage notebook for execution")?;

        let mut cmd = Command::new(&self.jupyter);
        cmd.args(self.nbconvert_args(staged.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!("Running {:?}", cmd.as_std());

        let child = cmd.spawn().context("Failed to spawn jupyter nbconvert")?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.context("Failed to collect nbconvert output")?,
            Err(_) => {
                anyhow::bail!("Execution timed out after {}s", self.timeout.as_secs());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            if detail.is_empty() {
                anyhow::bail!("nbconvert exited with {}", output.status);
            }
            anyhow::bail!("{detail}");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Notebook::from_json(&stdout).context("nbconvert returned an unparseable notebook")
    }

    /// Arguments for the nbconvert invocation.
    fn nbconvert_args(&self, staged: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "nbconvert".into(),
            "--to".into(),
            "notebook".into(),
            "--execute".into(),
            "--stdout".into(),
            "--log-level".into(),
            "WARN".into(),
            format!("--ExecutePreprocessor.timeout={}", self.timeout.as_secs()).into(),
        ];
        if let Some(kernel) = &self.kernel_name {
            args.push(format!("--ExecutePreprocessor.kernel_name={kernel}").into());
        }
        args.push(staged.as_os_str().to_os_string());
        args
    }
}
