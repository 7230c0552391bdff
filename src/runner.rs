use crate::params::SimParams;
use anyhow::{Context, Result};
use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

/// Destination for one run's captured standard output.
#[derive(Debug, PartialEq, Clone)]
pub enum OutputSink {
    /// Create the file fresh, replacing any prior content.
    Overwrite(PathBuf),
    /// Open the file for append, keeping any prior content.
    Append(PathBuf),
}

impl OutputSink {
    pub fn path(&self) -> &Path {
        match self {
            Self::Overwrite(path) | Self::Append(path) => path,
        }
    }

    fn open(&self) -> Result<File> {
        match self {
            Self::Overwrite(path) => {
                File::create(path).with_context(|| format!("failed to create {path:?}"))
            }
            Self::Append(path) => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {path:?} for append")),
        }
    }
}

/// Outcome of one simulator invocation.
#[derive(Debug)]
pub struct RunResult {
    /// Exit status of the simulator child process.
    pub status: ExitStatus,
    /// File the run's standard output was captured to.
    pub output: PathBuf,
}

/// Runs single simulator invocations under the distributed launcher.
pub struct Runner {
    launcher: String,
    simulator: PathBuf,
}

impl Runner {
    pub fn new(launcher: String, simulator: PathBuf) -> Self {
        Self { launcher, simulator }
    }

    /// Invoke the simulator with the given parameters and block until it
    /// exits.
    ///
    /// The child's standard output is routed straight to the sink file; its
    /// standard error is left to the calling environment. A nonzero exit is
    /// reported through the returned [`RunResult`], not as an error.
    ///
    /// # Errors
    /// Returns an error if the sink file cannot be opened or the launcher
    /// fails to start.
    pub fn run(&self, par: &SimParams, sink: &OutputSink) -> Result<RunResult> {
        let stdout = sink.open().context("failed to open output destination")?;

        let status = Command::new(&self.launcher)
            .arg("-np")
            .arg(par.n_procs.to_string())
            .arg(&self.simulator)
            .args(par.simulator_args())
            .stdout(stdout)
            .status()
            .with_context(|| format!("failed to run {:?}", self.launcher))?;

        Ok(RunResult {
            status,
            output: sink.path().to_path_buf(),
        })
    }
}
