use crate::KvError;
use serde::{Deserialize, Serialize};

/// Connection settings for the key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvConfig {
    /// `host:port` of the store endpoint.
    pub address: String,
    /// `http` or `https`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Access token sent as `X-Consul-Token`; empty means unauthenticated.
    #[serde(default)]
    pub token: String,
}

fn default_scheme() -> String {
    "http".to_owned()
}

impl KvConfig {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.trim_end_matches('/').to_owned(),
            scheme: default_scheme(),
            token: String::new(),
        }
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_owned();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = token.to_owned();
        self
    }

    /// Check address and scheme; connection construction fails fast and is
    /// never retried.
    pub fn validate(&self) -> Result<(), KvError> {
        if self.address.is_empty() {
            return Err(KvError::Connect("address must not be empty".to_owned()));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(KvError::Connect(format!(
                "unsupported scheme '{}', expected http or https",
                self.scheme
            )));
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.address)
    }
}
