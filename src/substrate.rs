//! Neighbor providers: a square grid and a fixed relational network.
//!
//! The topology of both substrates is immutable after setup; the models
//! only read adjacency and mutate their own agent state.

use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;
use serde::{Deserialize, Serialize};

/// Square non-wrapping grid holding at most one agent per cell.
///
/// Adjacency is the Moore neighborhood: the up-to-eight cells surrounding
/// a cell, without wrapping at the edges.
#[derive(Debug, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<usize>>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Place an agent on an empty cell.
    pub fn place(&mut self, agent: usize, cell: usize) -> Result<()> {
        if self.cells[cell].is_some() {
            bail!("cell {cell} is already occupied");
        }
        self.cells[cell] = Some(agent);
        Ok(())
    }

    pub fn column_of(&self, cell: usize) -> usize {
        cell % self.size
    }

    /// Agents occupying the Moore neighborhood of a cell.
    pub fn neighbor_agents(&self, cell: usize) -> Vec<usize> {
        let row = (cell / self.size) as isize;
        let col = (cell % self.size) as isize;
        let mut neighbors = Vec::with_capacity(8);

        for d_row in -1..=1isize {
            for d_col in -1..=1isize {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let n_row = row + d_row;
                let n_col = col + d_col;
                if n_row < 0 || n_col < 0 {
                    continue;
                }
                let (n_row, n_col) = (n_row as usize, n_col as usize);
                if n_row >= self.size || n_col >= self.size {
                    continue;
                }
                if let Some(agent) = self.cells[n_row * self.size + n_col] {
                    neighbors.push(agent);
                }
            }
        }

        neighbors
    }
}

/// Fixed undirected network given by per-agent adjacency lists.
#[derive(Debug, Serialize, Deserialize)]
pub struct Network {
    adj: Vec<Vec<usize>>,
}

impl Network {
    /// Generate a random network: every pair of agents is connected
    /// independently with probability `edge_density`.
    ///
    /// Pairs are visited in a fixed order so equal seeds give equal
    /// topologies.
    pub fn random(n_agt: usize, edge_density: f64, rng: &mut ChaCha12Rng) -> Result<Self> {
        let edge_dist = Bernoulli::new(edge_density).context("invalid edge density")?;

        let mut adj = vec![Vec::new(); n_agt];
        for i_agt in 0..n_agt {
            for j_agt in (i_agt + 1)..n_agt {
                if edge_dist.sample(rng) {
                    adj[i_agt].push(j_agt);
                    adj[j_agt].push(i_agt);
                }
            }
        }

        Ok(Self { adj })
    }

    /// Network connecting every pair of agents.
    #[cfg(test)]
    pub fn complete(n_agt: usize) -> Self {
        let adj = (0..n_agt)
            .map(|i_agt| (0..n_agt).filter(|&j_agt| j_agt != i_agt).collect())
            .collect();
        Self { adj }
    }

    pub fn neighbors(&self, agent: usize) -> &[usize] {
        &self.adj[agent]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn corner_cell_has_three_neighbor_cells() {
        let mut grid = Grid::new(3);
        for cell in 0..9 {
            grid.place(cell, cell).unwrap();
        }
        let mut neighbors = grid.neighbor_agents(0);
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![1, 3, 4]);
    }

    #[test]
    fn center_cell_has_eight_neighbor_cells() {
        let mut grid = Grid::new(3);
        for cell in 0..9 {
            grid.place(cell, cell).unwrap();
        }
        let mut neighbors = grid.neighbor_agents(4);
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn empty_cells_are_not_neighbors() {
        let mut grid = Grid::new(3);
        grid.place(7, 4).unwrap();
        assert!(grid.neighbor_agents(0).contains(&7));
        assert_eq!(grid.neighbor_agents(8), vec![7]);
    }

    #[test]
    fn placing_on_an_occupied_cell_fails() {
        let mut grid = Grid::new(2);
        grid.place(0, 1).unwrap();
        assert!(grid.place(1, 1).is_err());
    }

    #[test]
    fn full_density_network_is_complete() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let network = Network::random(5, 1.0, &mut rng).unwrap();
        for i_agt in 0..5 {
            assert_eq!(network.neighbors(i_agt).len(), 4);
        }
    }

    #[test]
    fn zero_density_network_has_no_edges() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let network = Network::random(5, 0.0, &mut rng).unwrap();
        for i_agt in 0..5 {
            assert!(network.neighbors(i_agt).is_empty());
        }
    }

    #[test]
    fn complete_network_excludes_self() {
        let network = Network::complete(4);
        assert_eq!(network.neighbors(2), &[0, 1, 3]);
    }
}
