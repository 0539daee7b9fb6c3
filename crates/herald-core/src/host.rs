use herald_schema::StateKey;
use std::collections::BTreeMap;

/// A value attached to an artifact under a well-known state key.
///
/// The host hands state over untyped; modeling the two shapes Herald reads
/// makes the absent/present/wrong-shape outcomes explicit at the seam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Text(String),
    Map(BTreeMap<String, String>),
}

/// The output of a prior build step, as exposed by the build-tool host.
pub trait Artifact {
    /// Opaque identifier; for cloud image builds this is the
    /// `region:image_id[,region:image_id...]` list.
    fn id(&self) -> &str;

    /// Identifier of the builder that produced this artifact.
    fn builder_id(&self) -> &str;

    /// Read state recorded under a well-known key, if any.
    fn state(&self, key: StateKey) -> Option<StateValue>;
}

/// Human-readable progress reporting, provided by the host.
pub trait Ui {
    /// Announce a major step.
    fn say(&self, msg: &str);

    /// Report fine-grained progress.
    fn message(&self, msg: &str);
}

/// Map a known Amazon builder id to its short kind name. Unknown builders
/// are tolerated; the caller only uses this for log context.
pub fn builder_kind(builder_id: &str) -> Option<&'static str> {
    match builder_id {
        "mitchellh.amazonebs" => Some("amazonebs"),
        "mitchellh.amazon.instance" => Some("amazoninstance"),
        _ => None,
    }
}
