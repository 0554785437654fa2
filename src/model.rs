//! Shared simulation data types.

use serde::{Deserialize, Serialize};

/// Health of an agent in the well-mixed epidemic model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Healthy,
    Infected,
}

/// Compartment of an agent in the network SIR model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SirState {
    Susceptible,
    Infected,
    Recovered,
}

/// Wealth class, derived from an agent's current wealth on demand.
///
/// The class is never stored: it is recomputed from the wealth value
/// whenever a decision or a snapshot needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WealthClass {
    Poor,
    Middle,
    Wealthy,
}

impl WealthClass {
    /// Classify a wealth value: poor below 0.5, wealthy from 1.5 up.
    pub fn from_wealth(wealth: f64) -> Self {
        if wealth < 0.5 {
            Self::Poor
        } else if wealth < 1.5 {
            Self::Middle
        } else {
            Self::Wealthy
        }
    }
}

/// State of a tree in the forest fire model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeState {
    Alive,
    Burning,
    Burned,
}

/// Aggregate view of the population at the end of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tick the aggregate was taken at.
    pub tick: usize,

    /// Model-specific aggregate values.
    pub aggregate: Aggregate,
}

/// Per-model aggregate values derived from all agents' states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Aggregate {
    Epidemic {
        n_healthy: usize,
        n_infected: usize,
        frac_infected: f64,
    },
    Sir {
        n_susceptible: usize,
        n_infected: usize,
        n_recovered: usize,
        frac_infected: f64,
    },
    Wealth {
        n_poor: usize,
        n_middle: usize,
        n_wealthy: usize,
        total_wealth: f64,
        mean_wealth: f64,
        gini: f64,
    },
    Fire {
        n_alive: usize,
        n_burning: usize,
        n_burned: usize,
        frac_burned: f64,
    },
}

impl Aggregate {
    /// Named numeric values of this aggregate, in a fixed order.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::Epidemic {
                n_healthy,
                n_infected,
                frac_infected,
            } => vec![
                ("n_healthy", n_healthy as f64),
                ("n_infected", n_infected as f64),
                ("frac_infected", frac_infected),
            ],
            Self::Sir {
                n_susceptible,
                n_infected,
                n_recovered,
                frac_infected,
            } => vec![
                ("n_susceptible", n_susceptible as f64),
                ("n_infected", n_infected as f64),
                ("n_recovered", n_recovered as f64),
                ("frac_infected", frac_infected),
            ],
            Self::Wealth {
                n_poor,
                n_middle,
                n_wealthy,
                total_wealth,
                mean_wealth,
                gini,
            } => vec![
                ("n_poor", n_poor as f64),
                ("n_middle", n_middle as f64),
                ("n_wealthy", n_wealthy as f64),
                ("total_wealth", total_wealth),
                ("mean_wealth", mean_wealth),
                ("gini", gini),
            ],
            Self::Fire {
                n_alive,
                n_burning,
                n_burned,
                frac_burned,
            } => vec![
                ("n_alive", n_alive as f64),
                ("n_burning", n_burning as f64),
                ("n_burned", n_burned as f64),
                ("frac_burned", frac_burned),
            ],
        }
    }
}
