use crate::config::{Config, LifecycleMode, OutputMode, VALUE_SLOT};
use crate::params::SimParams;
use crate::post::PostProcessor;
use crate::runner::{OutputSink, Runner};
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// Outcome of one configuration.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Completed,
    Failed(String),
}

/// Record of one configuration of a finished experiment.
#[derive(Debug)]
pub struct RunRecord {
    /// Swept value the configuration was derived from, or `default` for
    /// single-run experiments.
    pub label: String,
    pub outcome: Outcome,
}

/// Summary over all the configurations of an experiment.
#[derive(Debug, Default)]
pub struct Summary {
    pub records: Vec<RunRecord>,
}

impl Summary {
    pub fn n_failed(&self) -> usize {
        self.records
            .iter()
            .filter(|rec| matches!(rec.outcome, Outcome::Failed(_)))
            .count()
    }
}

/// Drives an experiment through its configurations in declared order.
///
/// Exactly one external invocation is in flight at any time.
pub struct Controller {
    cfg: Config,
    runner: Runner,
    runtime: Runtime,
    post: PostProcessor,
}

impl Controller {
    pub fn new(cfg: Config) -> Self {
        let runner = Runner::new(cfg.tools.launcher.clone(), cfg.tools.simulator.clone());
        let runtime = Runtime::new(cfg.tools.halt.clone(), cfg.tools.boot.clone());
        let post = PostProcessor::new(&cfg);
        Self {
            cfg,
            runner,
            runtime,
            post,
        }
    }

    /// Resolved configurations in execution order.
    ///
    /// Values are taken strictly in declared order, never sorted or
    /// deduplicated; duplicate values produce duplicate runs.
    pub fn configs(&self) -> Vec<(String, SimParams)> {
        match &self.cfg.sweep {
            None => vec![("default".to_string(), self.cfg.params.clone())],
            Some(sweep) => sweep
                .values
                .iter()
                .map(|&value| {
                    (
                        value.to_string(),
                        self.cfg.params.with_value(sweep.axis, value),
                    )
                })
                .collect(),
        }
    }

    /// Execute the whole experiment, blocking until the last run finishes.
    ///
    /// A failed configuration is recorded and the sweep moves on to the next
    /// value; only a failed runtime boot aborts the experiment.
    pub fn run(&self) -> Result<Summary> {
        let data_dir = &self.cfg.output.data_dir;
        fs::create_dir_all(data_dir).with_context(|| format!("failed to create {data_dir:?}"))?;

        if self.cfg.lifecycle.mode == LifecycleMode::PerSweep {
            self.reset_runtime()
                .context("failed to reset the runtime session")?;
        }

        let mut summary = Summary::default();
        for (label, par) in self.configs() {
            log::info!("running configuration {label}");

            if self.cfg.lifecycle.mode == LifecycleMode::PerValue {
                self.reset_runtime()
                    .context("failed to reset the runtime session")?;
            }

            let outcome = self.run_config(&label, &par);
            if let Outcome::Failed(reason) = &outcome {
                log::warn!("configuration {label} failed: {reason}");
            }
            summary.records.push(RunRecord { label, outcome });
        }

        let n_failed = summary.n_failed();
        let n_runs = summary.records.len();
        if n_failed > 0 {
            for rec in &summary.records {
                if let Outcome::Failed(reason) = &rec.outcome {
                    log::warn!("configuration {} failed: {reason}", rec.label);
                }
            }
            log::warn!("{n_failed} of {n_runs} configurations failed");
        } else {
            log::info!("all {n_runs} configurations completed");
        }

        Ok(summary)
    }

    fn run_config(&self, label: &str, par: &SimParams) -> Outcome {
        let sink = self.output_sink(label);

        let result = match self.runner.run(par, &sink) {
            Ok(result) => result,
            Err(error) => return Outcome::Failed(format!("{error:#}")),
        };
        if !result.status.success() {
            return Outcome::Failed(format!("simulator exited with {}", result.status));
        }

        if let Some(animation) = self.animation_file(label) {
            self.post.render(&animation, &result.output);
        }
        self.post.plot();

        Outcome::Completed
    }

    fn reset_runtime(&self) -> Result<()> {
        let host_file = self
            .cfg
            .lifecycle
            .host_file
            .as_ref()
            .context("missing host file")?;
        self.runtime.halt();
        self.runtime.boot(host_file)
    }

    fn output_sink(&self, label: &str) -> OutputSink {
        let file = self
            .cfg
            .output
            .data_dir
            .join(self.cfg.output.file.replace(VALUE_SLOT, label));
        match self.cfg.output.mode {
            OutputMode::Overwrite => OutputSink::Overwrite(file),
            OutputMode::Append => OutputSink::Append(file),
        }
    }

    fn animation_file(&self, label: &str) -> Option<PathBuf> {
        let animation = self.cfg.post.animation.as_ref()?;
        Some(
            self.cfg
                .output
                .data_dir
                .join(animation.replace(VALUE_SLOT, label)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Lifecycle, Output, Post, Sweep, Tools};
    use crate::params::SweepAxis;
    use std::path::PathBuf;

    fn test_cfg(sweep: Option<Sweep>) -> Config {
        Config {
            tools: Tools {
                simulator: PathBuf::from("./Boids"),
                launcher: "mpirun".to_string(),
                halt: "lamhalt".to_string(),
                boot: "lamboot".to_string(),
            },
            params: SimParams {
                n_procs: 10,
                n_boids: 50,
                n_loops: 500,
                knn: 7,
                max_vel: 10.0,
                max_acc: 1.25,
                width: 1000.0,
                height: 1000.0,
                sf1: 1.0,
                sf2: 32.0,
                min_dist: 50.0,
                sf3: 8.0,
                sf4: 10.0,
            },
            output: Output {
                data_dir: PathBuf::from("./data"),
                mode: OutputMode::Overwrite,
                file: "run{value}.boid".to_string(),
            },
            sweep,
            lifecycle: Lifecycle::default(),
            post: Post::default(),
        }
    }

    #[test]
    fn configs_follow_declared_order_with_duplicates() {
        let ctrl = Controller::new(test_cfg(Some(Sweep {
            axis: SweepAxis::Knn,
            values: vec![4.0, 2.0, 2.0, 8.0],
        })));

        let configs = ctrl.configs();
        let labels: Vec<_> = configs.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["4", "2", "2", "8"]);

        let knns: Vec<_> = configs.iter().map(|(_, par)| par.knn).collect();
        assert_eq!(knns, vec![4, 2, 2, 8]);
    }

    #[test]
    fn single_run_yields_one_default_config() {
        let ctrl = Controller::new(test_cfg(None));
        let configs = ctrl.configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].0, "default");
        assert_eq!(configs[0].1, ctrl.cfg.params);
    }

    #[test]
    fn empty_value_list_yields_no_configs() {
        let ctrl = Controller::new(test_cfg(Some(Sweep {
            axis: SweepAxis::NBoids,
            values: Vec::new(),
        })));
        assert!(ctrl.configs().is_empty());
    }

    #[test]
    fn output_files_are_named_by_swept_value() {
        let ctrl = Controller::new(test_cfg(Some(Sweep {
            axis: SweepAxis::Knn,
            values: vec![15.0],
        })));
        let sink = ctrl.output_sink("15");
        assert_eq!(sink, OutputSink::Overwrite(PathBuf::from("./data/run15.boid")));
    }
}
