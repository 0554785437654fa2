//! Random transfers of one unit of wealth between agents.
//!
//! Each tick every agent is classified from its current wealth: wealthy
//! agents always transfer one unit to a uniformly random partner, middle
//! class agents transfer with probability `transfer_chance`, poor agents
//! never do. The partner draw may land on the acting agent itself, which
//! makes that transfer a no-op. Transfers can drive the sender's wealth
//! negative. Total wealth is conserved and checked every tick.

use crate::config::ModelConfig;
use crate::model::{Aggregate, Snapshot, WealthClass};
use crate::stats::gini;
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Uniform};
use serde::{Deserialize, Serialize};

const TRANSFER_UNIT: f64 = 1.0;

#[derive(Debug, Serialize, Deserialize)]
pub struct WealthWorld {
    transfer_chance: f64,
    wealth: Vec<f64>,
    total_wealth: f64,
}

impl WealthWorld {
    /// Draw each agent's initial wealth uniformly from [0, 2), in id order.
    pub fn new(model: &ModelConfig, rng: &mut ChaCha12Rng) -> Result<Self> {
        let &ModelConfig::WealthTransfer {
            n_agt,
            transfer_chance,
        } = model
        else {
            bail!("model config does not describe a wealth transfer model");
        };

        let wealth_dist = Uniform::new(0.0, 2.0).context("invalid initial wealth range")?;
        let wealth: Vec<f64> = (0..n_agt).map(|_| wealth_dist.sample(rng)).collect();
        let total_wealth = wealth.iter().sum();

        Ok(Self {
            transfer_chance,
            wealth,
            total_wealth,
        })
    }

    #[cfg(test)]
    fn with_wealth(wealth: Vec<f64>, transfer_chance: f64) -> Self {
        let total_wealth = wealth.iter().sum();
        Self {
            transfer_chance,
            wealth,
            total_wealth,
        }
    }

    /// Advance the population by one tick: decide all transfers against the
    /// wealth classes the tick started with, then apply them.
    pub fn step(&mut self, rng: &mut ChaCha12Rng) -> Result<()> {
        let transfers = self.decide(rng)?;
        self.apply(&transfers)
    }

    /// Pick a transfer partner for every agent that transfers this tick.
    ///
    /// Draws are consumed in agent id order: the class branch first, then
    /// the partner draw when the agent transfers.
    fn decide(&self, rng: &mut ChaCha12Rng) -> Result<Vec<Option<usize>>> {
        let transfer_dist =
            Bernoulli::new(self.transfer_chance).context("invalid transfer chance")?;
        let n_agt = self.wealth.len();

        let transfers = self
            .wealth
            .iter()
            .map(|&wealth| match WealthClass::from_wealth(wealth) {
                WealthClass::Wealthy => Some(rng.random_range(0..n_agt)),
                WealthClass::Middle => transfer_dist
                    .sample(rng)
                    .then(|| rng.random_range(0..n_agt)),
                WealthClass::Poor => None,
            })
            .collect();

        Ok(transfers)
    }

    /// Move one unit of wealth from each transferring agent to its partner,
    /// then verify that the total has not drifted.
    fn apply(&mut self, transfers: &[Option<usize>]) -> Result<()> {
        for (i_agt, &partner) in transfers.iter().enumerate() {
            if let Some(partner) = partner {
                self.wealth[i_agt] -= TRANSFER_UNIT;
                self.wealth[partner] += TRANSFER_UNIT;
            }
        }

        let total: f64 = self.wealth.iter().sum();
        let tol = 1e-8 * self.total_wealth.abs().max(1.0);
        if (total - self.total_wealth).abs() > tol {
            bail!(
                "total wealth drifted from {} to {total} (tolerance: {tol})",
                self.total_wealth
            );
        }

        Ok(())
    }

    pub fn snapshot(&self, tick: usize) -> Snapshot {
        let mut n_poor = 0;
        let mut n_middle = 0;
        let mut n_wealthy = 0;
        for &wealth in &self.wealth {
            match WealthClass::from_wealth(wealth) {
                WealthClass::Poor => n_poor += 1,
                WealthClass::Middle => n_middle += 1,
                WealthClass::Wealthy => n_wealthy += 1,
            }
        }

        let total_wealth: f64 = self.wealth.iter().sum();

        Snapshot {
            tick,
            aggregate: Aggregate::Wealth {
                n_poor,
                n_middle,
                n_wealthy,
                total_wealth,
                mean_wealth: total_wealth / self.wealth.len() as f64,
                gini: gini(&self.wealth),
            },
        }
    }

    /// Transfers never settle on their own; only the tick budget stops
    /// this model.
    pub fn exhausted(&self) -> bool {
        false
    }
}
