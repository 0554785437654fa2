//! Susceptible-infected-recovered epidemic on a fixed random network.
//!
//! The contagion pass walks the agents that were infected when the tick
//! started and mutates neighbor state in place: an agent infected early in
//! the pass is already visible as infected to later spreaders, which skip
//! it instead of drawing again. Newly infected agents neither spread nor
//! recover until the next tick. This in-place update spreads faster than a
//! strict start-of-tick snapshot would and is kept on purpose.

use crate::config::ModelConfig;
use crate::model::{Aggregate, SirState, Snapshot};
use crate::substrate::Network;
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SirWorld {
    infection_chance: f64,
    recovery_chance: f64,
    network: Network,
    agents: Vec<SirState>,
}

impl SirWorld {
    /// Build the network and seed the infection into the lowest agent ids.
    pub fn new(model: &ModelConfig, rng: &mut ChaCha12Rng) -> Result<Self> {
        let &ModelConfig::Sir {
            n_agt,
            edge_density,
            n_seed,
            infection_chance,
            recovery_chance,
        } = model
        else {
            bail!("model config does not describe a network SIR model");
        };

        let network =
            Network::random(n_agt, edge_density, rng).context("failed to generate network")?;

        let mut agents = vec![SirState::Susceptible; n_agt];
        for agent in agents.iter_mut().take(n_seed) {
            *agent = SirState::Infected;
        }

        Ok(Self {
            infection_chance,
            recovery_chance,
            network,
            agents,
        })
    }

    #[cfg(test)]
    fn with_network(
        network: Network,
        agents: Vec<SirState>,
        infection_chance: f64,
        recovery_chance: f64,
    ) -> Self {
        Self {
            infection_chance,
            recovery_chance,
            network,
            agents,
        }
    }

    /// Advance the population by one tick.
    ///
    /// Draws are consumed in id order over the spreaders, and within one
    /// spreader in its neighbor-list order, so equal seeds replay equal
    /// trajectories.
    pub fn step(&mut self, rng: &mut ChaCha12Rng) -> Result<()> {
        let inf_dist = Bernoulli::new(self.infection_chance).context("invalid infection chance")?;
        let rec_dist = Bernoulli::new(self.recovery_chance).context("invalid recovery chance")?;

        let spreaders: Vec<usize> = (0..self.agents.len())
            .filter(|&i_agt| self.agents[i_agt] == SirState::Infected)
            .collect();

        for &i_agt in &spreaders {
            for &j_agt in self.network.neighbors(i_agt) {
                if self.agents[j_agt] == SirState::Susceptible && inf_dist.sample(rng) {
                    self.agents[j_agt] = SirState::Infected;
                }
            }
            if rec_dist.sample(rng) {
                self.agents[i_agt] = SirState::Recovered;
            }
        }

        Ok(())
    }

    pub fn snapshot(&self, tick: usize) -> Snapshot {
        let mut n_susceptible = 0;
        let mut n_infected = 0;
        let mut n_recovered = 0;
        for &agent in &self.agents {
            match agent {
                SirState::Susceptible => n_susceptible += 1,
                SirState::Infected => n_infected += 1,
                SirState::Recovered => n_recovered += 1,
            }
        }

        Snapshot {
            tick,
            aggregate: Aggregate::Sir {
                n_susceptible,
                n_infected,
                n_recovered,
                frac_infected: n_infected as f64 / self.agents.len() as f64,
            },
        }
    }

    /// No infected agents left: the contagion cannot advance further.
    pub fn exhausted(&self) -> bool {
        self.agents
            .iter()
            .all(|&agent| agent != SirState::Infected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn one_seed_infects_a_complete_network_in_one_tick() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut agents = vec![SirState::Susceptible; 10];
        agents[0] = SirState::Infected;
        let mut world = SirWorld::with_network(Network::complete(10), agents, 1.0, 0.0);

        world.step(&mut rng).unwrap();

        assert!(world.agents.iter().all(|&a| a == SirState::Infected));
        let snapshot = world.snapshot(1);
        assert_eq!(
            snapshot.aggregate,
            Aggregate::Sir {
                n_susceptible: 0,
                n_infected: 10,
                n_recovered: 0,
                frac_infected: 1.0,
            }
        );
    }

    #[test]
    fn certain_recovery_clears_the_seed() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut agents = vec![SirState::Susceptible; 3];
        agents[1] = SirState::Infected;
        let mut world = SirWorld::with_network(Network::complete(3), agents, 0.0, 1.0);

        world.step(&mut rng).unwrap();

        assert_eq!(world.agents[1], SirState::Recovered);
        assert!(world.exhausted());
    }

    #[test]
    fn agents_with_no_neighbors_stay_susceptible() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let network = Network::random(4, 0.0, &mut rng).unwrap();
        let mut agents = vec![SirState::Susceptible; 4];
        agents[0] = SirState::Infected;
        let mut world = SirWorld::with_network(network, agents, 1.0, 0.5);

        for _ in 0..20 {
            world.step(&mut rng).unwrap();
        }

        assert!(
            world.agents[1..]
                .iter()
                .all(|&a| a == SirState::Susceptible)
        );
    }

    #[test]
    fn transitions_never_reverse() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let mut seed_rng = ChaCha12Rng::seed_from_u64(12);
        let mut world = SirWorld::new(
            &ModelConfig::Sir {
                n_agt: 30,
                edge_density: 0.2,
                n_seed: 3,
                infection_chance: 0.4,
                recovery_chance: 0.2,
            },
            &mut seed_rng,
        )
        .unwrap();

        let rank = |state: SirState| match state {
            SirState::Susceptible => 0,
            SirState::Infected => 1,
            SirState::Recovered => 2,
        };

        let mut prev: Vec<u8> = world.agents.iter().map(|&a| rank(a)).collect();
        for _ in 0..50 {
            world.step(&mut rng).unwrap();
            let next: Vec<u8> = world.agents.iter().map(|&a| rank(a)).collect();
            for (p, n) in prev.iter().zip(&next) {
                assert!(n >= p);
            }
            prev = next;
        }
    }
}
