//! Desktop shell
//!
//! Starts the backend as a child process, waits until it answers health
//! checks, runs the conversation view against it, and stops it on exit.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::conversation::BackendClient;

const HEALTH_ATTEMPTS: u32 = 50;
const HEALTH_INTERVAL: Duration = Duration::from_millis(200);

/// Managed backend process
pub struct BackendSupervisor {
    child: Child,
    client: BackendClient,
}

impl BackendSupervisor {
    /// Spawn `<program> serve`. The child inherits the environment, so it
    /// reads the same configuration as this process.
    pub fn spawn(program: PathBuf, backend_url: &str) -> Result<Self> {
        info!(program = %program.display(), url = backend_url, "Starting backend");

        let child = Command::new(&program)
            .arg("serve")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start backend {}", program.display()))?;

        Ok(Self {
            child,
            client: BackendClient::new(backend_url),
        })
    }

    /// Spawn this executable as the backend.
    pub fn spawn_current(backend_url: &str) -> Result<Self> {
        let program = std::env::current_exe().context("Cannot locate current executable")?;
        Self::spawn(program, backend_url)
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Check if process is still running
    pub fn is_running(&mut self) -> bool {
        self.child.try_wait().map(|s| s.is_none()).unwrap_or(false)
    }

    /// Poll the health endpoint until it answers or the attempts run out.
    pub async fn wait_healthy(&mut self) -> Result<()> {
        for attempt in 1..=HEALTH_ATTEMPTS {
            if !self.is_running() {
                bail!("Backend exited before becoming ready");
            }
            match self.client.health().await {
                Ok(health) => {
                    info!(model = %health.model, version = %health.version, "Backend ready");
                    return Ok(());
                }
                Err(e) => debug!(attempt, error = %e, "Backend not ready yet"),
            }
            tokio::time::sleep(HEALTH_INTERVAL).await;
        }
        bail!(
            "Backend did not become healthy at {} after {} attempts",
            self.client.base_url(),
            HEALTH_ATTEMPTS
        )
    }

    /// Kill the process and reap it.
    pub async fn stop(mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        self.child.kill().await.context("Failed to kill backend")?;
        match self.child.wait().await {
            Ok(status) => info!(?status, "Backend stopped"),
            Err(e) => warn!(error = %e, "Failed to reap backend"),
        }
        Ok(())
    }
}
