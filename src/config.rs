//! Command line and scenario loading

use clap::Parser;
use nbody_physics::WorldStateOptions;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(version, about = "Interactive GPU N-body gravity simulation")]
pub struct Args {
    /// YAML file with simulation options; missing fields use defaults
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Start with the simulation paused
    #[arg(long)]
    pub paused: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open scenario {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Options from `path`, or the defaults when no scenario is given
pub fn load_options(path: Option<&Path>) -> Result<WorldStateOptions, ConfigError> {
    let Some(path) = path else {
        return Ok(WorldStateOptions::default());
    };

    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let options = parse_options(BufReader::new(file)).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Loaded scenario {}", path.display());
    Ok(options)
}

pub fn parse_options(reader: impl Read) -> Result<WorldStateOptions, serde_yaml::Error> {
    serde_yaml::from_reader(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbody_physics::{GravityLaw, InitialDistribution, SpaceTopology};

    fn scenario(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("scenarios")
            .join(name)
    }

    #[test]
    fn test_no_scenario_gives_defaults() {
        assert_eq!(load_options(None).unwrap(), WorldStateOptions::default());
    }

    #[test]
    fn test_two_body_scenario() {
        let options = load_options(Some(&scenario("two_body.yaml"))).unwrap();

        assert_eq!(options.n_particles, 2);
        assert_eq!(options.space_radius, 5.0);
        assert_eq!(options.initial_mass, 500.0);
        assert_eq!(options.initial_velocity, 0.0);
        assert_eq!(options.gravity_law, GravityLaw::Newton);
        assert!(options.collisions);
    }

    #[test]
    fn test_torus_scenario_keeps_unlisted_defaults() {
        let options = load_options(Some(&scenario("torus_mond.yaml"))).unwrap();

        assert_eq!(options.space_topology, SpaceTopology::Torus);
        assert_eq!(options.gravity_law, GravityLaw::Mond);
        assert_eq!(options.initial_distribution, InitialDistribution::Cubical);
        assert_eq!(options.density, WorldStateOptions::default().density);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_options(Some(Path::new("does/not/exist.yaml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_bad_value_is_parse_error() {
        let result = parse_options("gravityLaw: einstein\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["nbody", "--scenario", "a.yaml", "--paused"]);
        assert_eq!(args.scenario, Some(PathBuf::from("a.yaml")));
        assert!(args.paused);

        let args = Args::parse_from(["nbody"]);
        assert!(args.scenario.is_none());
        assert!(!args.paused);
    }
}
