//! CPU world state
//!
//! Same double-buffer protocol as the GPU path: every tick reads one complete
//! snapshot and writes the other, then the roles swap.

use rand::Rng;
use rayon::prelude::*;

use crate::kernel::step_texel;
use crate::params::{KernelParams, WorldStateOptions};
use crate::particle::{texture_size_for, ParticleGrid, WorldStats};
use crate::seeding::seed_grid;

pub struct CpuWorldState {
    params: KernelParams,
    grids: [ParticleGrid; 2],
    current: usize,
}

impl CpuWorldState {
    /// Seed a fresh world. `max_dimension` plays the role of the device texture cap.
    pub fn new<R: Rng + ?Sized>(options: &WorldStateOptions, max_dimension: u32, rng: &mut R) -> Self {
        let tex_size = texture_size_for(options.n_particles, max_dimension);
        let grid = seed_grid(options, tex_size, rng);
        Self::from_grid(KernelParams::from_options(options), grid)
    }

    /// Start from an explicit snapshot, e.g. a hand-built fixture or a GPU readback
    pub fn from_grid(params: KernelParams, grid: ParticleGrid) -> Self {
        let back = grid.clone();
        Self {
            params,
            grids: [grid, back],
            current: 0,
        }
    }

    /// Discard all state and reseed
    pub fn restart<R: Rng + ?Sized>(&mut self, options: &WorldStateOptions, max_dimension: u32, rng: &mut R) {
        *self = Self::new(options, max_dimension, rng);
    }

    pub fn params(&self) -> &KernelParams {
        &self.params
    }

    pub fn tex_size(&self) -> u32 {
        self.grids[self.current].tex_size()
    }

    /// Latest snapshot
    pub fn current(&self) -> &ParticleGrid {
        &self.grids[self.current]
    }

    pub fn stats(&self) -> WorldStats {
        self.current().stats()
    }

    /// Advance one step
    pub fn tick(&mut self) {
        let (front, back) = self.grids.split_at_mut(1);
        let (src, dst) = if self.current == 0 {
            (&front[0], &mut back[0])
        } else {
            (&back[0], &mut front[0])
        };

        let params = &self.params;
        dst.positions
            .par_iter_mut()
            .zip(dst.velocities.par_iter_mut())
            .enumerate()
            .for_each(|(id, (position, velocity))| {
                let (p, v) = step_texel(id, src, params);
                *position = p;
                *velocity = v;
            });

        self.current = 1 - self.current;
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}
