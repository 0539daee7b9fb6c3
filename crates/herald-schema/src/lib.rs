//! Configuration, identifiers, and key composition for Herald.
//!
//! This crate defines the schema layer: operator configuration decoding
//! (`RawConfig`) and aggregate validation (`Config`), base-flexible build-id
//! parsing from the environment, artifact identifier parsing into
//! `(region, image_id)` pairs, the deterministic store key prefix, and the
//! well-known artifact state keys.

pub mod artifact;
pub mod config;
pub mod keys;

pub use artifact::{parse_artifact_id, ArtifactIdError, RegionImage, StateKey};
pub use config::{
    parse_config_file, parse_config_str, parse_build_id, Config, ConfigError, RawConfig,
    BUILD_ID_ENV,
};
pub use keys::KeyPrefix;
