//! EC2 image description client for Herald.
//!
//! This crate provides the cloud-provider seam: the [`ImageSource`] trait for
//! region-scoped image lookups, the [`ImageRecord`] data model decoded from
//! DescribeImages responses and re-serialized verbatim to JSON, credential
//! resolution (explicit keys falling back to the environment), and a blocking
//! HTTP client with SigV4 request signing.

pub mod credentials;
pub mod http;
pub mod record;
pub mod sigv4;

pub use credentials::Credentials;
pub use http::Ec2Client;
pub use record::ImageRecord;

/// Query API version sent with every DescribeImages request.
pub const API_VERSION: &str = "2016-11-15";

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Ec2Error {
    #[error("credential error: {0}")]
    Credentials(String),
    #[error("EC2 HTTP error: {0}")]
    Http(String),
    #[error("EC2 returned HTTP {code} for {url}")]
    Status { code: u16, url: String },
    #[error("failed to decode EC2 response: {0}")]
    Decode(String),
}

/// Trait for image-description backends.
pub trait ImageSource: Send + Sync {
    /// Describe one image by exact id within a region. An empty result means
    /// the image does not exist there; callers decide whether that is fatal.
    fn describe_image(&self, region: &str, image_id: &str)
        -> Result<Vec<ImageRecord>, Ec2Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let e = Ec2Error::Status {
            code: 403,
            url: "https://ec2.us-west-2.amazonaws.com/".to_owned(),
        };
        let msg = e.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("us-west-2"));
    }
}
