//! Fire spreading through trees on a square grid.
//!
//! The spread pass walks the trees that were burning when the tick started:
//! each one ignites every alive Moore neighbor and then burns out. Ignition
//! mutates tree state in place, so a tree ignited early in the pass is
//! already visible as burning to later spreaders, which leave it alone.
//! Newly ignited trees do not spread until the next tick. This in-place
//! update is the classic contagion loop and is kept on purpose; it spreads
//! faster than a strict start-of-tick snapshot would.

use crate::config::ModelConfig;
use crate::model::{Aggregate, Snapshot, TreeState};
use crate::substrate::Grid;
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Width of the strip of columns ignited at setup.
const IGNITION_COLUMNS: usize = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct FireWorld {
    grid: Grid,
    cell_of: Vec<usize>,
    trees: Vec<TreeState>,
}

impl FireWorld {
    /// Scatter `density * size^2` trees over distinct random cells and
    /// ignite every tree in the leftmost columns.
    pub fn new(model: &ModelConfig, rng: &mut ChaCha12Rng) -> Result<Self> {
        let &ModelConfig::ForestFire { size, density } = model else {
            bail!("model config does not describe a forest fire model");
        };

        let mut grid = Grid::new(size);
        let n_trees = (density * grid.n_cells() as f64) as usize;

        let all_cells: Vec<usize> = (0..grid.n_cells()).collect();
        let cell_of: Vec<usize> = all_cells
            .choose_multiple(rng, n_trees)
            .copied()
            .collect();
        for (i_tree, &cell) in cell_of.iter().enumerate() {
            grid.place(i_tree, cell)
                .context("failed to place tree on grid")?;
        }

        let trees = cell_of
            .iter()
            .map(|&cell| {
                if grid.column_of(cell) < IGNITION_COLUMNS {
                    TreeState::Burning
                } else {
                    TreeState::Alive
                }
            })
            .collect();

        Ok(Self {
            grid,
            cell_of,
            trees,
        })
    }

    #[cfg(test)]
    fn fully_planted(size: usize, trees: Vec<TreeState>) -> Self {
        let mut grid = Grid::new(size);
        let cell_of: Vec<usize> = (0..size * size).collect();
        for &cell in &cell_of {
            grid.place(cell, cell).unwrap();
        }
        Self {
            grid,
            cell_of,
            trees,
        }
    }

    /// Advance the fire by one tick. Consumes no random draws.
    pub fn step(&mut self) {
        let burning: Vec<usize> = (0..self.trees.len())
            .filter(|&i_tree| self.trees[i_tree] == TreeState::Burning)
            .collect();

        for &i_tree in &burning {
            for j_tree in self.grid.neighbor_agents(self.cell_of[i_tree]) {
                if self.trees[j_tree] == TreeState::Alive {
                    self.trees[j_tree] = TreeState::Burning;
                }
            }
            self.trees[i_tree] = TreeState::Burned;
        }
    }

    pub fn snapshot(&self, tick: usize) -> Snapshot {
        let mut n_alive = 0;
        let mut n_burning = 0;
        let mut n_burned = 0;
        for &tree in &self.trees {
            match tree {
                TreeState::Alive => n_alive += 1,
                TreeState::Burning => n_burning += 1,
                TreeState::Burned => n_burned += 1,
            }
        }

        Snapshot {
            tick,
            aggregate: Aggregate::Fire {
                n_alive,
                n_burning,
                n_burned,
                frac_burned: n_burned as f64 / self.trees.len() as f64,
            },
        }
    }

    /// No burning trees left: the fire cannot advance further.
    pub fn exhausted(&self) -> bool {
        self.trees.iter().all(|&tree| tree != TreeState::Burning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeState::{Alive, Burned, Burning};
    use rand::SeedableRng;

    #[test]
    fn fire_crosses_a_full_grid_row_by_row() {
        // 3x3 grid, every cell planted, top row burning.
        let mut world = FireWorld::fully_planted(
            3,
            vec![
                Burning, Burning, Burning, //
                Alive, Alive, Alive, //
                Alive, Alive, Alive,
            ],
        );

        world.step();
        assert_eq!(
            world.trees,
            vec![
                Burned, Burned, Burned, //
                Burning, Burning, Burning, //
                Alive, Alive, Alive,
            ]
        );

        world.step();
        assert_eq!(
            world.trees,
            vec![
                Burned, Burned, Burned, //
                Burned, Burned, Burned, //
                Burning, Burning, Burning,
            ]
        );

        world.step();
        assert!(world.trees.iter().all(|&t| t == Burned));
        assert!(world.exhausted());
    }

    #[test]
    fn burned_trees_never_reignite() {
        let mut world = FireWorld::fully_planted(2, vec![Burned, Burning, Alive, Alive]);

        world.step();

        assert_eq!(world.trees, vec![Burned, Burned, Burning, Burning]);
    }

    #[test]
    fn isolated_trees_never_ignite() {
        // Single burning tree in one corner, one alive tree outside its
        // neighborhood.
        let mut grid = Grid::new(4);
        grid.place(0, 0).unwrap();
        grid.place(1, 15).unwrap();
        let mut world = FireWorld {
            grid,
            cell_of: vec![0, 15],
            trees: vec![Burning, Alive],
        };

        world.step();
        world.step();

        assert_eq!(world.trees, vec![Burned, Alive]);
        assert!(world.exhausted());
    }

    #[test]
    fn setup_ignites_the_two_leftmost_columns() {
        let mut rng = ChaCha12Rng::seed_from_u64(21);
        let world = FireWorld::new(
            &ModelConfig::ForestFire {
                size: 10,
                density: 1.0,
            },
            &mut rng,
        )
        .unwrap();

        for (i_tree, &cell) in world.cell_of.iter().enumerate() {
            let expected = if world.grid.column_of(cell) < IGNITION_COLUMNS {
                Burning
            } else {
                Alive
            };
            assert_eq!(world.trees[i_tree], expected);
        }
        assert_eq!(
            world
                .trees
                .iter()
                .filter(|&&tree| tree == Burning)
                .count(),
            2 * 10
        );
    }

    #[test]
    fn tree_count_follows_density() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let world = FireWorld::new(
            &ModelConfig::ForestFire {
                size: 10,
                density: 0.6,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(world.trees.len(), 60);
    }
}
