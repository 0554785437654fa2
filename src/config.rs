use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seed for the random number generator (OS entropy when absent).
    pub seed: Option<u64>,

    /// Maximum number of ticks advanced per invocation.
    pub max_ticks: usize,

    /// Model to simulate, with its parameters.
    pub model: ModelConfig,
}

/// Parameters of the selected model.
///
/// The `kind` key of the `[model]` table picks the variant.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModelConfig {
    /// Well-mixed epidemic: any healthy agent may become infected each tick.
    Epidemic {
        /// Number of agents.
        n_agt: usize,
        /// Probability that a healthy agent becomes infected per tick.
        infection_chance: f64,
    },

    /// Susceptible-infected-recovered dynamics on a fixed random network.
    Sir {
        /// Number of agents.
        n_agt: usize,
        /// Probability that any two agents are connected.
        edge_density: f64,
        /// Number of agents infected at setup (the lowest ids).
        n_seed: usize,
        /// Probability of infecting a susceptible neighbor per tick.
        infection_chance: f64,
        /// Probability that an infected agent recovers per tick.
        recovery_chance: f64,
    },

    /// Random transfers of one unit of wealth between agents.
    WealthTransfer {
        /// Number of agents.
        n_agt: usize,
        /// Probability that a middle-class agent transfers per tick.
        transfer_chance: f64,
    },

    /// Fire spreading through trees on a square grid.
    ForestFire {
        /// Height and width of the grid.
        size: usize,
        /// Fraction of grid cells covered by trees.
        density: f64,
    },
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.max_ticks, 1..10_000_000).context("invalid maximum number of ticks")?;

        match &self.model {
            ModelConfig::Epidemic {
                n_agt,
                infection_chance,
            } => {
                check_num(*n_agt, 1..1_000_000).context("invalid number of agents")?;
                check_num(*infection_chance, 0.0..=1.0).context("invalid infection chance")?;
            }
            ModelConfig::Sir {
                n_agt,
                edge_density,
                n_seed,
                infection_chance,
                recovery_chance,
            } => {
                check_num(*n_agt, 1..1_000_000).context("invalid number of agents")?;
                check_num(*edge_density, 0.0..=1.0).context("invalid edge density")?;
                check_num(*n_seed, 0..=*n_agt).context("invalid number of seed infections")?;
                check_num(*infection_chance, 0.0..=1.0).context("invalid infection chance")?;
                check_num(*recovery_chance, 0.0..=1.0).context("invalid recovery chance")?;
            }
            ModelConfig::WealthTransfer {
                n_agt,
                transfer_chance,
            } => {
                check_num(*n_agt, 1..1_000_000).context("invalid number of agents")?;
                check_num(*transfer_chance, 0.0..=1.0).context("invalid transfer chance")?;
            }
            ModelConfig::ForestFire { size, density } => {
                check_num(*size, 1..10_000).context("invalid grid size")?;
                check_num(*density, 0.0..=1.0).context("invalid tree density")?;
                let n_trees = (*density * (size * size) as f64) as usize;
                if n_trees == 0 {
                    bail!("density {density} places no trees on a {size}x{size} grid");
                }
            }
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
