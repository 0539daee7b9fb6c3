use std::fmt;

/// Deterministic store path under which one project/device-type/version's
/// image data is published: `amis/{project}/{root_device_type}/{version}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    pub fn new(project_name: &str, root_device_type: &str, project_version: &str) -> Self {
        Self(format!(
            "amis/{project_name}/{root_device_type}/{project_version}"
        ))
    }

    /// Key holding the JSON blob of all image records for a region.
    pub fn data_key(&self) -> String {
        format!("{}/data", self.0)
    }

    /// Key holding the bare image id, as UTF-8 bytes.
    pub fn ami_key(&self) -> String {
        format!("{}/ami", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_prefix_and_keys() {
        let prefix = KeyPrefix::new("kafka", "ebs", "2");
        assert_eq!(prefix.as_str(), "amis/kafka/ebs/2");
        assert_eq!(prefix.data_key(), "amis/kafka/ebs/2/data");
        assert_eq!(prefix.ami_key(), "amis/kafka/ebs/2/ami");
    }

    #[test]
    fn display_matches_as_str() {
        let prefix = KeyPrefix::new("proj", "instance-store", "1.4.0");
        assert_eq!(prefix.to_string(), "amis/proj/instance-store/1.4.0");
    }
}
