//! Physical and layout constants for the gravity simulation
//!
//! Values are scaled for real-time visualization rather than SI units. The
//! user-facing "gravity" and "MOND a0" options are multipliers on these bases.

/// Base gravitational constant, multiplied by the configured gravity strength
pub const G_BASE: f32 = 0.000066743;

/// Base MOND acceleration threshold a0, multiplied by the configured scale
pub const MOND_A0_BASE: f32 = 0.0000000012;

/// Simulated time advanced by one tick. Not locked to wall-clock time.
pub const DT: f32 = 1.0;

/// Two bodies merge once their distance drops to this fraction of the radii sum
pub const COLLISION_DISTANCE_FACTOR: f32 = 0.9;

/// Mass written into the velocity channel of dead or unused texels
pub const DEAD_MASS: f32 = -1.0;

/// Candidate square texture sides, smallest first
pub const TEXTURE_SIZES: [u32; 8] = [128, 256, 512, 1024, 2048, 4096, 8192, 16384];

/// Per-axis jitter of the cubical lattice, as a fraction of the cell separation
pub const CUBICAL_JITTER: f32 = 0.1;

/// Initial velocity option is scaled by this before use
pub const INITIAL_VELOCITY_SCALE: f32 = 0.01;

/// Mass that maps to the cold end of the temperature gradient
pub const COLOR_MASS_REFERENCE: f32 = 100.0;

/// log(mass / reference) range covered by the temperature gradient
pub const COLOR_LOG_RANGE: f32 = 30.0;
