use crate::config::{Config, ModelConfig};
use crate::model::Snapshot;
use crate::stats::{Accumulator, TimeSeries};
use anyhow::{Context, Result};
use rmp_serde::decode;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

pub trait Obs {
    fn update(&mut self, snapshot: &Snapshot) -> Result<()>;
    fn report(&self) -> serde_json::Value;
}

/// Running mean and standard deviation of every named metric.
pub struct MeanObs {
    acc_map: BTreeMap<&'static str, Accumulator>,
}

impl MeanObs {
    pub fn new() -> Self {
        Self {
            acc_map: BTreeMap::new(),
        }
    }
}

impl Obs for MeanObs {
    fn update(&mut self, snapshot: &Snapshot) -> Result<()> {
        for (name, val) in snapshot.aggregate.metrics() {
            self.acc_map.entry(name).or_insert_with(Accumulator::new).add(val);
        }
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        let reports: BTreeMap<_, _> = self
            .acc_map
            .iter()
            .map(|(name, acc)| (*name, acc.report()))
            .collect();
        serde_json::json!({ "metric_means": reports })
    }
}

/// Metrics of the last recorded tick, e.g. the burned fraction a fire run
/// ends with.
pub struct FinalObs {
    last: Option<Snapshot>,
}

impl FinalObs {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Obs for FinalObs {
    fn update(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.last = Some(snapshot.clone());
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        let Some(snapshot) = &self.last else {
            return serde_json::json!({ "final": serde_json::Value::Null });
        };
        let metrics: BTreeMap<_, _> = snapshot.aggregate.metrics().into_iter().collect();
        serde_json::json!({ "final": { "tick": snapshot.tick, "metrics": metrics } })
    }
}

/// Equilibrium estimate of one metric over the recorded trajectory.
pub struct EquilObs {
    metric: &'static str,
    time_series: TimeSeries,
}

impl EquilObs {
    pub fn new(metric: &'static str) -> Self {
        Self {
            metric,
            time_series: TimeSeries::new(),
        }
    }
}

impl Obs for EquilObs {
    fn update(&mut self, snapshot: &Snapshot) -> Result<()> {
        let val = snapshot
            .aggregate
            .metrics()
            .into_iter()
            .find(|(name, _)| *name == self.metric)
            .map(|(_, val)| val)
            .with_context(|| format!("metric {:?} missing from snapshot", self.metric))?;
        self.time_series.push(val);
        Ok(())
    }

    fn report(&self) -> serde_json::Value {
        let report = self.time_series.report();
        serde_json::json!({ "equilibrium": { "metric": self.metric, "estimate": report } })
    }
}

pub struct Analyzer {
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(cfg: &Config) -> Self {
        let mut obs_ptr_vec: Vec<Box<dyn Obs>> = Vec::new();
        obs_ptr_vec.push(Box::new(MeanObs::new()));
        obs_ptr_vec.push(Box::new(FinalObs::new()));
        if let ModelConfig::WealthTransfer { .. } = cfg.model {
            obs_ptr_vec.push(Box::new(EquilObs::new("gini")));
        }
        Self { obs_ptr_vec }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let reader = BufReader::new(file);

        let trajectory: Vec<Snapshot> =
            decode::from_read(reader).context("failed to deserialize trajectory")?;
        for snapshot in &trajectory {
            for obs in &mut self.obs_ptr_vec {
                obs.update(snapshot).context("failed to update observable")?;
            }
        }
        Ok(())
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        let reports: Vec<_> = self.obs_ptr_vec.iter().map(|obs| obs.report()).collect();
        serde_json::to_writer_pretty(writer, &reports)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Aggregate;

    fn fire_snapshot(tick: usize, n_burned: usize) -> Snapshot {
        Snapshot {
            tick,
            aggregate: Aggregate::Fire {
                n_alive: 10 - n_burned,
                n_burning: 0,
                n_burned,
                frac_burned: n_burned as f64 / 10.0,
            },
        }
    }

    #[test]
    fn final_obs_keeps_the_last_snapshot() {
        let mut obs = FinalObs::new();
        obs.update(&fire_snapshot(1, 2)).unwrap();
        obs.update(&fire_snapshot(2, 7)).unwrap();

        let report = obs.report();
        assert_eq!(report["final"]["tick"], 2);
        assert_eq!(report["final"]["metrics"]["n_burned"], 7.0);
    }

    #[test]
    fn mean_obs_averages_each_metric() {
        let mut obs = MeanObs::new();
        obs.update(&fire_snapshot(1, 2)).unwrap();
        obs.update(&fire_snapshot(2, 4)).unwrap();

        let report = obs.report();
        assert_eq!(report["metric_means"]["n_burned"]["mean"], 3.0);
    }

    #[test]
    fn equil_obs_rejects_a_missing_metric() {
        let mut obs = EquilObs::new("gini");
        assert!(obs.update(&fire_snapshot(1, 0)).is_err());
    }
}
