//! Simulation parameters
//!
//! [`WorldStateOptions`] is the user-facing record edited by the parameter UI or
//! loaded from a scenario file. [`KernelParams`] is the derived, ready-to-use set
//! of constants the compute step reads.

use serde::{Deserialize, Serialize};

use crate::constants::{DT, G_BASE, MOND_A0_BASE};

/// Shape of simulation space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceTopology {
    /// Open, unbounded space
    #[default]
    Normal,
    /// Periodic cube of side `2 * space_radius`
    Torus,
}

impl SpaceTopology {
    pub const ALL: [SpaceTopology; 2] = [SpaceTopology::Normal, SpaceTopology::Torus];

    /// Code used by the GPU kernel
    pub fn code(self) -> u32 {
        match self {
            SpaceTopology::Normal => 0,
            SpaceTopology::Torus => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpaceTopology::Normal => "Normal",
            SpaceTopology::Torus => "Torus",
        }
    }
}

/// Gravity law applied between every pair of live particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityLaw {
    None,
    /// Inverse-square attraction
    #[default]
    Newton,
    /// Modified Newtonian dynamics with a hard regime switch at a0
    Mond,
}

impl GravityLaw {
    pub const ALL: [GravityLaw; 3] = [GravityLaw::None, GravityLaw::Newton, GravityLaw::Mond];

    /// Code used by the GPU kernel
    pub fn code(self) -> u32 {
        match self {
            GravityLaw::None => 0,
            GravityLaw::Newton => 1,
            GravityLaw::Mond => 2,
        }
    }

    /// Whether the strength multiplier has any effect
    pub fn uses_strength(self) -> bool {
        self != GravityLaw::None
    }

    pub fn uses_mond_a0(self) -> bool {
        self == GravityLaw::Mond
    }

    pub fn label(self) -> &'static str {
        match self {
            GravityLaw::None => "None",
            GravityLaw::Newton => "Newton",
            GravityLaw::Mond => "MOND",
        }
    }
}

/// How particles are laid out when the world is seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialDistribution {
    #[default]
    Spherical,
    Cubical,
}

impl InitialDistribution {
    pub const ALL: [InitialDistribution; 2] =
        [InitialDistribution::Spherical, InitialDistribution::Cubical];

    pub fn label(self) -> &'static str {
        match self {
            InitialDistribution::Spherical => "Spherical",
            InitialDistribution::Cubical => "Cubical",
        }
    }
}

/// Full parameter set of one simulation run.
///
/// Any change requires a reseed; live state is never re-parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldStateOptions {
    pub space_topology: SpaceTopology,
    pub space_radius: f32,
    pub collisions: bool,
    pub gravity_law: GravityLaw,
    /// Multiplier on [`G_BASE`]
    pub gravity: f32,
    /// Multiplier on [`MOND_A0_BASE`]
    pub gravity_mond_a0: f32,
    pub density: f32,
    pub n_particles: u32,
    pub initial_distribution: InitialDistribution,
    pub initial_mass: f32,
    pub initial_velocity: f32,
}

impl Default for WorldStateOptions {
    fn default() -> Self {
        Self {
            space_topology: SpaceTopology::Normal,
            space_radius: 1000.0,
            collisions: true,
            gravity_law: GravityLaw::Newton,
            gravity: 1.0,
            gravity_mond_a0: 100.0,
            density: 1.0,
            n_particles: 10000,
            initial_distribution: InitialDistribution::Spherical,
            initial_mass: 100.0,
            initial_velocity: 200.0,
        }
    }
}

/// Constants consumed by the per-texel kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    pub n_particles: u32,
    pub topology: SpaceTopology,
    pub space_radius: f32,
    pub collisions: bool,
    pub density: f32,
    pub gravity_law: GravityLaw,
    /// `G_BASE * gravity`
    pub g: f32,
    /// `MOND_A0_BASE * gravity_mond_a0`
    pub mond_a0: f32,
    pub dt: f32,
}

impl KernelParams {
    pub fn from_options(options: &WorldStateOptions) -> Self {
        Self {
            n_particles: options.n_particles,
            topology: options.space_topology,
            space_radius: options.space_radius,
            collisions: options.collisions,
            density: options.density,
            gravity_law: options.gravity_law,
            g: G_BASE * options.gravity,
            mond_a0: MOND_A0_BASE * options.gravity_mond_a0,
            dt: DT,
        }
    }
}
