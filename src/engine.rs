use crate::config::{Config, ModelConfig};
use crate::epidemic::EpidemicWorld;
use crate::fire::FireWorld;
use crate::model::Snapshot;
use crate::sir::SirWorld;
use crate::wealth::WealthWorld;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Population of one of the models, behind a single dispatch point.
#[derive(Serialize, Deserialize)]
pub enum World {
    Epidemic(EpidemicWorld),
    Sir(SirWorld),
    Wealth(WealthWorld),
    Fire(FireWorld),
}

impl World {
    fn from_config(model: &ModelConfig, rng: &mut ChaCha12Rng) -> Result<Self> {
        let world = match model {
            ModelConfig::Epidemic { .. } => Self::Epidemic(EpidemicWorld::new(model)?),
            ModelConfig::Sir { .. } => Self::Sir(SirWorld::new(model, rng)?),
            ModelConfig::WealthTransfer { .. } => Self::Wealth(WealthWorld::new(model, rng)?),
            ModelConfig::ForestFire { .. } => Self::Fire(FireWorld::new(model, rng)?),
        };
        Ok(world)
    }

    fn step(&mut self, rng: &mut ChaCha12Rng) -> Result<()> {
        match self {
            Self::Epidemic(world) => world.step(rng),
            Self::Sir(world) => world.step(rng),
            Self::Wealth(world) => world.step(rng),
            Self::Fire(world) => {
                world.step();
                Ok(())
            }
        }
    }

    fn snapshot(&self, tick: usize) -> Snapshot {
        match self {
            Self::Epidemic(world) => world.snapshot(tick),
            Self::Sir(world) => world.snapshot(tick),
            Self::Wealth(world) => world.snapshot(tick),
            Self::Fire(world) => world.snapshot(tick),
        }
    }

    fn exhausted(&self) -> bool {
        match self {
            Self::Epidemic(world) => world.exhausted(),
            Self::Sir(world) => world.exhausted(),
            Self::Wealth(world) => world.exhausted(),
            Self::Fire(world) => world.exhausted(),
        }
    }
}

/// Simulation engine.
///
/// Holds the configuration, current population, tick counter and random
/// number generator, and provides methods to initialize, run, save, and
/// load simulations.
#[derive(Serialize, Deserialize)]
pub struct Engine {
    cfg: Config,
    world: World,
    tick: usize,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with the given configuration.
    ///
    /// The random number generator is seeded from the configuration, or
    /// from OS entropy when no seed is given. Population setup consumes
    /// draws in agent id order, so equal seeds build equal populations.
    pub fn generate_initial_condition(cfg: Config) -> Result<Self> {
        let mut rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let world = World::from_config(&cfg.model, &mut rng)
            .context("failed to set up initial population")?;

        Ok(Self {
            cfg,
            world,
            tick: 0,
            rng,
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Advance the simulation and save the recorded trajectory segment to a
    /// binary file.
    ///
    /// The run advances by at most `max_ticks` further ticks, recording one
    /// aggregate snapshot per tick. A tick that begins with an exhausted
    /// population records a final snapshot and ends the segment without
    /// applying any transition; a population that burns out (or saturates)
    /// during tick N is therefore reported as stopped at tick N + 1.
    pub fn perform_simulation<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let mut trajectory = Vec::new();

        for _ in 0..self.cfg.max_ticks {
            let (snapshot, stopped) = self.perform_tick().context("failed to perform tick")?;
            log::debug!("{snapshot:?}");
            trajectory.push(snapshot);

            if stopped {
                log::info!("population exhausted, stopping at tick {}", self.tick);
                break;
            }
        }
        log::info!(
            "recorded {} snapshots, now at tick {}",
            trajectory.len(),
            self.tick
        );

        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, &trajectory).context("failed to serialize trajectory")?;
        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Save a checkpoint of the entire engine state.
    ///
    /// Can be used to resume the simulation later.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write(&mut writer, &self).context("failed to serialize engine")?;
        Ok(())
    }

    /// Load a previously saved engine checkpoint.
    pub fn load_checkpoint<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let engine = decode::from_read(&mut reader).context("failed to deserialize engine")?;
        Ok(engine)
    }

    fn perform_tick(&mut self) -> Result<(Snapshot, bool)> {
        self.tick += 1;

        if self.world.exhausted() {
            return Ok((self.world.snapshot(self.tick), true));
        }

        self.world
            .step(&mut self.rng)
            .context("failed to update population")?;

        Ok((self.world.snapshot(self.tick), false))
    }
}
