use crate::config::Config;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// Invokes the visualization and plotting tools after a run.
///
/// Every failure here is logged and swallowed: post-processing must never
/// abort a sweep in progress.
pub struct PostProcessor {
    viewer: Option<String>,
    plotter: String,
    plot_script: Option<PathBuf>,
    data_dir: PathBuf,
}

impl PostProcessor {
    pub fn new(cfg: &Config) -> Self {
        Self {
            viewer: cfg.post.viewer.clone(),
            plotter: cfg.post.plotter.clone(),
            plot_script: cfg.post.plot_script.clone(),
            data_dir: cfg.output.data_dir.clone(),
        }
    }

    /// Render a captured run file into an animation.
    pub fn render(&self, animation: &Path, run_output: &Path) {
        if let Err(error) = self.try_render(animation, run_output) {
            log::warn!("failed to render {animation:?}: {error:#}");
        }
    }

    fn try_render(&self, animation: &Path, run_output: &Path) -> Result<()> {
        let Some(viewer) = &self.viewer else {
            return Ok(());
        };

        let status = Command::new(viewer)
            .arg(animation)
            .arg(run_output)
            .status()
            .with_context(|| format!("failed to run {viewer:?}"))?;

        if !status.success() {
            bail!("{viewer:?} exited with {status}");
        }

        Ok(())
    }

    /// Plot the current contents of the data directory.
    ///
    /// Called mid-sweep this plots whatever datasets exist so far.
    pub fn plot(&self) {
        if let Err(error) = self.try_plot() {
            log::warn!("failed to plot data directory: {error:#}");
        }
    }

    fn try_plot(&self) -> Result<()> {
        let Some(script) = &self.plot_script else {
            return Ok(());
        };

        let pattern = self.data_dir.join("*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let n_files = glob(pattern)
            .context("failed to glob data files")?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .count();
        log::info!("plotting {n_files} data files");

        let status = Command::new(&self.plotter)
            .arg(script)
            .status()
            .with_context(|| format!("failed to run {:?}", self.plotter))?;

        if !status.success() {
            bail!("{:?} exited with {status}", self.plotter);
        }

        Ok(())
    }
}
