use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactIdError {
    #[error("malformed artifact id '{raw}': expected 'region:image_id[,region:image_id...]'")]
    Malformed { raw: String },
}

/// One `(region, image_id)` pair from an artifact identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionImage {
    pub region: String,
    pub image_id: String,
}

/// Parse an artifact identifier of the shape
/// `region1:imageId1,region2:imageId2,...`.
///
/// Order is preserved and duplicates are kept. Any entry that does not split
/// into exactly two colon-delimited parts fails the whole parse; nothing is
/// published from a partially valid identifier.
pub fn parse_artifact_id(id: &str) -> Result<Vec<RegionImage>, ArtifactIdError> {
    let mut pairs = Vec::new();
    for entry in id.split(',') {
        let mut parts = entry.split(':');
        let (Some(region), Some(image_id), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ArtifactIdError::Malformed { raw: id.to_owned() });
        };
        if region.is_empty() || image_id.is_empty() {
            return Err(ArtifactIdError::Malformed { raw: id.to_owned() });
        }
        pairs.push(RegionImage {
            region: region.to_owned(),
            image_id: image_id.to_owned(),
        });
    }
    Ok(pairs)
}

/// Well-known keys under which upstream builders attach state to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// A type string the post-processor uses unless overridden by config.
    Type,
    /// A string map merged into the published output metadata.
    Metadata,
}

impl StateKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::Type => "artifact.type",
            StateKey::Metadata => "artifact.metadata",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
