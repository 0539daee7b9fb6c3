//! Publish pipeline for Herald.
//!
//! This crate ties together configuration validation, artifact identifier
//! parsing, the cloud provider, and the key-value store into the
//! [`Publisher`] — the post-build step that describes each freshly built
//! image and writes its metadata under a deterministic key prefix, one
//! region at a time. It also defines the seams toward the build-tool host
//! (`Artifact`, `Ui`) and the published-artifact output descriptor.

pub mod host;
pub mod publisher;

pub use host::{builder_kind, Artifact, StateValue, Ui};
pub use publisher::{PublishedArtifact, Publisher};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(#[from] herald_schema::ConfigError),
    #[error("artifact id error: {0}")]
    ArtifactId(#[from] herald_schema::ArtifactIdError),
    #[error("store error: {0}")]
    Store(#[from] herald_kv::KvError),
    #[error("provider error: {0}")]
    Provider(#[from] herald_ec2::Ec2Error),
    #[error("image lookup failed for '{image_id}' in {region}: {reason}")]
    ImageLookup {
        region: String,
        image_id: String,
        reason: String,
    },
    #[error("artifact state '{key}' has unexpected shape: expected {expected}")]
    StateContract {
        key: &'static str,
        expected: &'static str,
    },
}
