use anyhow::{Context, Result, bail};
use std::{path::Path, process::Command};

/// Controls the distributed-runtime session hosting the simulator workers.
pub struct Runtime {
    halt: String,
    boot: String,
}

impl Runtime {
    pub fn new(halt: String, boot: String) -> Self {
        Self { halt, boot }
    }

    /// Stop the current runtime session.
    ///
    /// Halting is advisory cleanup and safe to call when no session is
    /// running, so every failure is logged and swallowed.
    pub fn halt(&self) {
        match Command::new(&self.halt).status() {
            Ok(status) if status.success() => log::info!("halted runtime session"),
            Ok(status) => log::warn!("{:?} exited with {status}", self.halt),
            Err(error) => log::warn!("failed to run {:?}: {error:#}", self.halt),
        }
    }

    /// Boot a runtime session from the given host list.
    ///
    /// # Errors
    /// Returns an error if the boot command fails to start or exits nonzero.
    pub fn boot(&self, host_file: &Path) -> Result<()> {
        let status = Command::new(&self.boot)
            .arg("-v")
            .arg(host_file)
            .status()
            .with_context(|| format!("failed to run {:?}", self.boot))?;

        if !status.success() {
            bail!("{:?} exited with {status}", self.boot);
        }
        log::info!("booted runtime session from {host_file:?}");

        Ok(())
    }
}
