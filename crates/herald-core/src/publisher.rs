use crate::{builder_kind, Artifact, CoreError, StateValue, Ui};
use herald_ec2::{Credentials, Ec2Client, ImageSource};
use herald_kv::{HttpKv, KvConfig, KvStore};
use herald_schema::{parse_artifact_id, Config, KeyPrefix, RawConfig, StateKey};
use std::collections::BTreeMap;

/// Descriptor returned after a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub name: String,
    pub artifact_type: String,
    pub version: String,
    pub metadata: BTreeMap<String, String>,
    pub build_id: Option<i64>,
}

/// The post-build publish step.
///
/// Holds the validated configuration plus the two collaborator handles,
/// all created once at configure time and read-only afterwards.
pub struct Publisher {
    config: Config,
    kv: Box<dyn KvStore>,
    images: Box<dyn ImageSource>,
}

impl Publisher {
    /// Validate configuration and construct the concrete collaborators:
    /// resolved credentials behind an EC2 client, and an HTTP store handle.
    /// Each failure mode is terminal; nothing here is retried.
    pub fn configure(raw: RawConfig) -> Result<Self, CoreError> {
        let config = Config::from_raw(raw)?;
        let credentials = Credentials::resolve(
            &config.aws_access_key,
            &config.aws_secret_key,
            &config.aws_token,
        )?;
        let kv = HttpKv::connect(
            KvConfig::new(&config.kv_address)
                .with_scheme(&config.kv_scheme)
                .with_token(&config.kv_token),
        )?;
        Ok(Self::with_backends(
            config,
            Box::new(kv),
            Box::new(Ec2Client::new(credentials)),
        ))
    }

    /// Wire explicit collaborators (alternative backends, tests).
    pub fn with_backends(
        config: Config,
        kv: Box<dyn KvStore>,
        images: Box<dyn ImageSource>,
    ) -> Self {
        Self { config, kv, images }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Publish one artifact: parse its identifier, then for each
    /// `(region, image_id)` pair in order, describe the image, compose the
    /// key prefix, and write the data blob followed by the bare image id.
    /// The first error aborts the remaining regions; keys already written
    /// stay written.
    pub fn publish(
        &self,
        ui: &dyn Ui,
        artifact: &dyn Artifact,
    ) -> Result<PublishedArtifact, CoreError> {
        ui.say("Publishing build artifacts to the key-value store");
        match builder_kind(artifact.builder_id()) {
            Some(kind) => tracing::debug!("artifact from {kind} builder"),
            None => tracing::debug!("unrecognized builder id '{}'", artifact.builder_id()),
        }

        let pairs = parse_artifact_id(artifact.id())?;

        for pair in &pairs {
            let records = self
                .images
                .describe_image(&pair.region, &pair.image_id)
                .map_err(|e| CoreError::ImageLookup {
                    region: pair.region.clone(),
                    image_id: pair.image_id.clone(),
                    reason: e.to_string(),
                })?;
            // Lookup by exact id returns one record; the first is
            // authoritative if the provider ever returns more.
            let first = records.first().ok_or_else(|| CoreError::ImageLookup {
                region: pair.region.clone(),
                image_id: pair.image_id.clone(),
                reason: "no image records returned".to_owned(),
            })?;
            let root_device_type =
                first
                    .root_device_type
                    .as_deref()
                    .ok_or_else(|| CoreError::ImageLookup {
                        region: pair.region.clone(),
                        image_id: pair.image_id.clone(),
                        reason: "record has no root device type".to_owned(),
                    })?;

            let prefix = KeyPrefix::new(
                &self.config.project_name,
                root_device_type,
                &self.config.project_version,
            );
            ui.message(&format!(
                "Publishing {} image data under {prefix} in datacenter {}",
                pair.image_id, pair.region
            ));

            let payload = encode_or_empty(&records);
            self.kv.put(&pair.region, &prefix.data_key(), &payload)?;
            self.kv
                .put(&pair.region, &prefix.ami_key(), pair.image_id.as_bytes())?;
        }

        Ok(PublishedArtifact {
            name: self.config.artifact_name.clone(),
            artifact_type: self.resolve_artifact_type(artifact)?,
            version: self.config.project_version.clone(),
            metadata: self.output_metadata(artifact)?,
            build_id: self.config.build_id,
        })
    }

    /// Merge artifact-recorded metadata with configured metadata; configured
    /// values win on key collision. Pure.
    pub fn output_metadata(
        &self,
        artifact: &dyn Artifact,
    ) -> Result<BTreeMap<String, String>, CoreError> {
        let mut merged = match artifact.state(StateKey::Metadata) {
            Some(StateValue::Map(map)) => map,
            Some(StateValue::Text(_)) => {
                return Err(CoreError::StateContract {
                    key: "artifact.metadata",
                    expected: "string map",
                })
            }
            None => BTreeMap::new(),
        };
        for (key, value) in &self.config.metadata {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged)
    }

    /// The artifact's recorded type wins unless the operator set the
    /// override flag; without recorded state the configured type is used
    /// either way. Pure.
    pub fn resolve_artifact_type(&self, artifact: &dyn Artifact) -> Result<String, CoreError> {
        if !self.config.type_override {
            match artifact.state(StateKey::Type) {
                Some(StateValue::Text(recorded)) => return Ok(recorded),
                Some(StateValue::Map(_)) => {
                    return Err(CoreError::StateContract {
                        key: "artifact.type",
                        expected: "string",
                    })
                }
                None => {}
            }
        }
        Ok(self.config.artifact_type.clone())
    }
}

/// JSON-encode a value, falling back to an empty payload on failure so the
/// store write still happens. The failure is logged, not surfaced.
fn encode_or_empty<T: serde::Serialize>(value: &T) -> Vec<u8> {
    match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("image record serialization failed, writing empty payload: {e}");
            Vec::new()
        }
    }
}
