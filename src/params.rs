use serde::{Deserialize, Serialize};

/// Full parameter set for one simulator invocation.
///
/// Field order matches the positional argument order of the simulator; see
/// [`SimParams::simulator_args`]. Parameter ranges are deliberately not
/// checked here: the simulator owns their validation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimParams {
    /// Number of worker processes started by the distributed launcher.
    pub n_procs: usize,
    /// Number of boids.
    pub n_boids: usize,
    /// Number of simulation loops.
    pub n_loops: usize,
    /// Number of nearest neighbors considered per boid.
    pub knn: usize,
    /// Maximum boid velocity.
    pub max_vel: f64,
    /// Maximum boid acceleration.
    pub max_acc: f64,
    /// Width of the simulation area.
    pub width: f64,
    /// Height of the simulation area.
    pub height: f64,
    /// First steering scale factor.
    pub sf1: f64,
    /// Second steering scale factor.
    pub sf2: f64,
    /// Minimum separation between boids.
    pub min_dist: f64,
    /// Third steering scale factor.
    pub sf3: f64,
    /// Fourth steering scale factor.
    pub sf4: f64,
}

/// Parameter varied across a sweep.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    NProcs,
    NBoids,
    NLoops,
    Knn,
    MaxVel,
    MaxAcc,
    Width,
    Height,
    Sf1,
    Sf2,
    MinDist,
    Sf3,
    Sf4,
}

impl SimParams {
    /// Derive the parameter set for one swept value.
    ///
    /// Exactly one field differs from `self`. Count fields truncate
    /// fractional values.
    pub fn with_value(&self, axis: SweepAxis, value: f64) -> Self {
        let mut par = self.clone();
        match axis {
            SweepAxis::NProcs => par.n_procs = value as usize,
            SweepAxis::NBoids => par.n_boids = value as usize,
            SweepAxis::NLoops => par.n_loops = value as usize,
            SweepAxis::Knn => par.knn = value as usize,
            SweepAxis::MaxVel => par.max_vel = value,
            SweepAxis::MaxAcc => par.max_acc = value,
            SweepAxis::Width => par.width = value,
            SweepAxis::Height => par.height = value,
            SweepAxis::Sf1 => par.sf1 = value,
            SweepAxis::Sf2 => par.sf2 = value,
            SweepAxis::MinDist => par.min_dist = value,
            SweepAxis::Sf3 => par.sf3 = value,
            SweepAxis::Sf4 => par.sf4 = value,
        }
        par
    }

    /// Ordered positional arguments passed to the simulator.
    ///
    /// The order is fixed and never depends on which field is swept.
    /// `n_procs` is not part of this list: it is rendered separately as the
    /// launcher's `-np` argument.
    pub fn simulator_args(&self) -> Vec<String> {
        vec![
            self.n_boids.to_string(),
            self.n_loops.to_string(),
            self.knn.to_string(),
            self.max_vel.to_string(),
            self.max_acc.to_string(),
            self.width.to_string(),
            self.height.to_string(),
            self.sf1.to_string(),
            self.sf2.to_string(),
            self.min_dist.to_string(),
            self.sf3.to_string(),
            self.sf4.to_string(),
        ]
    }
}
