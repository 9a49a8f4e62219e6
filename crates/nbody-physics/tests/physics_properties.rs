//! Physics invariants checked against the CPU reference world
//!
//! - Mass is conserved when two bodies merge
//! - Dead texels are bit-identical across ticks
//! - Torus positions stay inside the periodic cube
//! - Newtonian pair forces cancel, so momentum is conserved

use glam::Vec3;
use nbody_physics::{
    CpuWorldState, COLLISION_DISTANCE_FACTOR, GravityLaw, InitialDistribution, KernelParams, Particle, ParticleGrid,
    SpaceTopology, WorldStateOptions,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const TEX_SIZE: u32 = 128;

fn world_from(options: WorldStateOptions, bodies: &[(Vec3, Vec3, f32)]) -> CpuWorldState {
    let mut grid = ParticleGrid::dead(TEX_SIZE);
    for (id, (position, velocity, mass)) in bodies.iter().enumerate() {
        let radius = nbody_physics::radius_for_mass(*mass, options.density);
        grid.set(id, *position, *velocity, *mass, radius);
    }
    let params = KernelParams::from_options(&WorldStateOptions {
        n_particles: bodies.len() as u32,
        ..options
    });
    CpuWorldState::from_grid(params, grid)
}

fn vec3_in(range: f32) -> impl Strategy<Value = Vec3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

#[test]
fn two_body_scenario_merges_into_one() {
    let options = WorldStateOptions {
        space_topology: SpaceTopology::Normal,
        space_radius: 5.0,
        n_particles: 2,
        collisions: true,
        gravity_law: GravityLaw::Newton,
        gravity: 1.0,
        density: 1.0,
        initial_distribution: InitialDistribution::Spherical,
        initial_mass: 500.0,
        initial_velocity: 0.0,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(42);
    let mut world = CpuWorldState::new(&options, 16384, &mut rng);

    world.run(500);

    let first = world.current().particle(0);
    let second = world.current().particle(1);
    let alive: Vec<Particle> = [first, second].into_iter().filter(Particle::is_alive).collect();
    assert_eq!(alive.len(), 1, "expected exactly one survivor: {first:?} {second:?}");
    assert!((alive[0].mass().unwrap_or_default() - 1000.0).abs() < 1e-3);

    let dead_mass = world.current().velocities[1][3].min(world.current().velocities[0][3]);
    assert_eq!(dead_mass, -1.0);
}

#[test]
fn all_dead_grid_is_idempotent() {
    let grid = ParticleGrid::dead(TEX_SIZE);
    let params = KernelParams::from_options(&WorldStateOptions {
        n_particles: TEX_SIZE * TEX_SIZE,
        ..Default::default()
    });
    let mut world = CpuWorldState::from_grid(params, grid.clone());

    world.run(100);

    assert_eq!(world.current(), &grid);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn merge_conserves_mass(
        direction in vec3_in(1.0),
        overlap in 0.05f32..0.95,
        m1 in 1.0f32..1000.0,
        m2 in 1.0f32..1000.0,
    ) {
        prop_assume!(direction.length() > 0.1);
        let options = WorldStateOptions {
            collisions: true,
            gravity: 1000.0,
            ..Default::default()
        };
        let reach = COLLISION_DISTANCE_FACTOR
            * (nbody_physics::radius_for_mass(m1, options.density)
                + nbody_physics::radius_for_mass(m2, options.density));
        let offset = direction.normalize() * reach * overlap;
        let mut world = world_from(options, &[(offset, Vec3::ZERO, m1), (Vec3::ZERO, Vec3::ZERO, m2)]);

        world.tick();

        let expected = m1 as f64 + m2 as f64;
        let stats = world.stats();
        prop_assert_eq!(stats.alive, 1);
        prop_assert!((stats.total_mass - expected).abs() <= expected * 1e-5);

        let grid = world.current();
        prop_assert!(((grid.velocities[0][3] as f64) - expected).abs() <= expected * 1e-5);
        prop_assert_eq!(grid.velocities[1][3], -1.0);
    }

    #[test]
    fn dead_particles_never_move(
        bodies in prop::collection::vec((vec3_in(50.0), vec3_in(1.0), 1.0f32..500.0, any::<bool>()), 2..24),
    ) {
        let options = WorldStateOptions {
            collisions: true,
            ..Default::default()
        };
        let live: Vec<_> = bodies.iter().map(|(p, v, m, _)| (*p, *v, *m)).collect();
        let mut world = world_from(options, &live);

        let mut grid = world.current().clone();
        for (id, (_, _, _, dead)) in bodies.iter().enumerate() {
            if *dead {
                grid.velocities[id][3] = -1.0;
            }
        }
        world = CpuWorldState::from_grid(*world.params(), grid);

        for _ in 0..5 {
            let before = world.current().clone();
            world.tick();
            let after = world.current();
            for id in 0..before.texel_count() {
                if before.velocities[id][3] < 0.0 {
                    prop_assert_eq!(before.positions[id].map(f32::to_bits), after.positions[id].map(f32::to_bits));
                    prop_assert_eq!(before.velocities[id].map(f32::to_bits), after.velocities[id].map(f32::to_bits));
                }
            }
        }
    }

    #[test]
    fn torus_positions_stay_in_cube(
        radius in 1.0f32..500.0,
        bodies in prop::collection::vec((vec3_in(1.0), vec3_in(3.0)), 1..16),
    ) {
        let options = WorldStateOptions {
            space_topology: SpaceTopology::Torus,
            space_radius: radius,
            collisions: false,
            gravity_law: GravityLaw::None,
            ..Default::default()
        };
        // Unit-cube samples scaled into the domain, velocities up to 3R per tick
        let scaled: Vec<_> = bodies
            .iter()
            .map(|(p, v)| (*p * radius * 0.999, *v * radius, 1.0))
            .collect();
        let mut world = world_from(options, &scaled);

        for _ in 0..20 {
            world.tick();
            for particle in world.current().particles() {
                if let Particle::Alive { position, .. } = particle {
                    for axis in position.to_array() {
                        prop_assert!(axis >= -radius && axis < radius, "{axis} outside [-{radius}, {radius})");
                    }
                }
            }
        }
    }

    #[test]
    fn newtonian_pair_conserves_momentum(
        offset in vec3_in(30.0),
        m1 in 1.0f32..1000.0,
        m2 in 1.0f32..1000.0,
        v1 in vec3_in(0.1),
        v2 in vec3_in(0.1),
    ) {
        prop_assume!(offset.length() > 10.0);
        let options = WorldStateOptions {
            collisions: false,
            gravity_law: GravityLaw::Newton,
            ..Default::default()
        };
        let mut world = world_from(options, &[(Vec3::ZERO, v1, m1), (offset, v2, m2)]);
        let initial = world.stats().momentum;

        for _ in 0..10 {
            world.tick();
            let grid = world.current();
            let scale: f64 = (0..2)
                .map(|id| {
                    let v = grid.velocities[id];
                    Vec3::new(v[0], v[1], v[2]).length() as f64 * v[3] as f64
                })
                .sum::<f64>()
                + 1.0;
            let drift = (world.stats().momentum - initial).length();
            prop_assert!(drift <= scale * 1e-5, "momentum drift {drift}");
        }
    }
}
