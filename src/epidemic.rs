//! Well-mixed epidemic: every healthy agent independently becomes infected
//! with probability `infection_chance` per tick.
//!
//! Infection is ambient rather than neighbor-borne, so the model seeds
//! itself: a fully healthy population with a nonzero infection chance will
//! produce infections. Infection is permanent.

use crate::config::ModelConfig;
use crate::model::{Aggregate, Health, Snapshot};
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct EpidemicWorld {
    infection_chance: f64,
    agents: Vec<Health>,
}

impl EpidemicWorld {
    pub fn new(model: &ModelConfig) -> Result<Self> {
        let &ModelConfig::Epidemic {
            n_agt,
            infection_chance,
        } = model
        else {
            bail!("model config does not describe an epidemic model");
        };

        Ok(Self {
            infection_chance,
            agents: vec![Health::Healthy; n_agt],
        })
    }

    /// Advance the population by one tick.
    ///
    /// Decisions for all agents are drawn first, in id order, against the
    /// states the tick started with; the transitions are applied afterwards.
    pub fn step(&mut self, rng: &mut ChaCha12Rng) -> Result<()> {
        let inf_dist = Bernoulli::new(self.infection_chance).context("invalid infection chance")?;

        let decisions: Vec<bool> = self
            .agents
            .iter()
            .map(|&health| health == Health::Healthy && inf_dist.sample(rng))
            .collect();

        for (agent, infect) in self.agents.iter_mut().zip(decisions) {
            if infect {
                *agent = Health::Infected;
            }
        }

        Ok(())
    }

    pub fn snapshot(&self, tick: usize) -> Snapshot {
        let n_infected = self
            .agents
            .iter()
            .filter(|&&health| health == Health::Infected)
            .count();

        Snapshot {
            tick,
            aggregate: Aggregate::Epidemic {
                n_healthy: self.agents.len() - n_infected,
                n_infected,
                frac_infected: n_infected as f64 / self.agents.len() as f64,
            },
        }
    }

    /// Nothing left to infect: every agent has reached the absorbing state.
    pub fn exhausted(&self) -> bool {
        self.agents.iter().all(|&health| health == Health::Infected)
    }
}
