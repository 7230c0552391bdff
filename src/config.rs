use crate::params::{SimParams, SweepAxis};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Placeholder replaced by the swept value in output file names.
pub const VALUE_SLOT: &str = "{value}";

/// Experiment definition.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External tools driven by the harness.
    pub tools: Tools,
    /// Default simulator parameters, shared by every configuration.
    pub params: SimParams,
    /// Routing of captured simulator output.
    pub output: Output,
    /// Parameter sweep; absent for single-run experiments.
    #[serde(default)]
    pub sweep: Option<Sweep>,
    /// Distributed-runtime lifecycle policy.
    #[serde(default)]
    pub lifecycle: Lifecycle,
    /// Post-processing tools.
    #[serde(default)]
    pub post: Post,
}

/// External commands and paths.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Tools {
    /// Simulator binary run under the distributed launcher.
    pub simulator: PathBuf,
    /// Distributed launcher command.
    #[serde(default = "default_launcher")]
    pub launcher: String,
    /// Command stopping the current runtime session.
    #[serde(default = "default_halt")]
    pub halt: String,
    /// Command booting a runtime session from a host list.
    #[serde(default = "default_boot")]
    pub boot: String,
}

/// Output routing for captured simulator output.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Output {
    /// Directory holding all run files and datasets.
    pub data_dir: PathBuf,
    /// How each run's output reaches its file.
    pub mode: OutputMode,
    /// Output file name; [`VALUE_SLOT`] is replaced by the swept value.
    pub file: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Create the file fresh for every run, replacing prior content.
    Overwrite,
    /// Open the file for append, adding after prior content.
    Append,
}

/// Parameter sweep declaration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Sweep {
    /// Parameter varied across the sweep.
    pub axis: SweepAxis,
    /// Values substituted for the axis, processed in declared order.
    pub values: Vec<f64>,
}

/// Distributed-runtime lifecycle policy.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Lifecycle {
    #[serde(default)]
    pub mode: LifecycleMode,
    /// Host list the runtime session is booted from.
    #[serde(default)]
    pub host_file: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleMode {
    /// The launcher manages its own session per call.
    #[default]
    None,
    /// Halt and boot the session once before the whole sweep.
    PerSweep,
    /// Halt and boot the session before every value.
    PerValue,
}

/// Post-processing tools, all optional.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    /// Viewer command rendering a run file into an animation.
    pub viewer: Option<String>,
    /// Animation file name; [`VALUE_SLOT`] is replaced by the swept value.
    pub animation: Option<String>,
    /// Plotter command.
    pub plotter: String,
    /// Plot script run against the data directory.
    pub plot_script: Option<PathBuf>,
}

impl Default for Post {
    fn default() -> Self {
        Self {
            viewer: None,
            animation: None,
            plotter: default_plotter(),
            plot_script: None,
        }
    }
}

fn default_launcher() -> String {
    "mpirun".to_string()
}

fn default_halt() -> String {
    "lamhalt".to_string()
}

fn default_boot() -> String {
    "lamboot".to_string()
}

fn default_plotter() -> String {
    "gnuplot".to_string()
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be a TOML-encoded experiment definition. Performs
    /// structural validation before returning; simulator parameter ranges are
    /// not checked, the simulator owns their validation.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized, or if the
    /// experiment declaration is inconsistent.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config =
            toml::from_str(&contents).context("failed to deserialize experiment")?;

        config.validate().context("failed to validate experiment")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.output.file.is_empty() {
            bail!("output file name must not be empty");
        }

        match &self.sweep {
            Some(sweep) => {
                if self.output.mode == OutputMode::Overwrite
                    && !self.output.file.contains(VALUE_SLOT)
                {
                    bail!("overwrite output for a sweep must contain {VALUE_SLOT}");
                }
                if self.lifecycle.mode == LifecycleMode::PerValue && sweep.axis != SweepAxis::NProcs
                {
                    bail!("per-value runtime reset requires sweeping n_procs");
                }
            }
            None => {
                if self.lifecycle.mode == LifecycleMode::PerValue {
                    bail!("per-value runtime reset requires a sweep");
                }
            }
        }

        if self.lifecycle.mode != LifecycleMode::None && self.lifecycle.host_file.is_none() {
            bail!("runtime lifecycle management requires a host file");
        }

        if self.post.viewer.is_some() != self.post.animation.is_some() {
            bail!("viewer and animation file name must be declared together");
        }
        if let Some(animation) = &self.post.animation
            && self.sweep.is_some()
            && !animation.contains(VALUE_SLOT)
        {
            bail!("animation file name for a sweep must contain {VALUE_SLOT}");
        }

        Ok(())
    }
}
