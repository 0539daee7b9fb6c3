use crate::Ec2Error;

/// Resolved cloud credentials, read-only after configuration.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    /// Standard resolution chain: an explicit key/secret pair wins; otherwise
    /// fall back to `AWS_ACCESS_KEY_ID`/`AWS_ACCESS_KEY` and
    /// `AWS_SECRET_ACCESS_KEY`/`AWS_SECRET_KEY` from the environment, with
    /// `AWS_SESSION_TOKEN` picked up alongside. No credentials anywhere is a
    /// fatal configuration error.
    pub fn resolve(access_key: &str, secret_key: &str, token: &str) -> Result<Self, Ec2Error> {
        if !access_key.is_empty() && !secret_key.is_empty() {
            return Ok(Self {
                access_key: access_key.to_owned(),
                secret_key: secret_key.to_owned(),
                session_token: non_empty(token.to_owned()),
            });
        }

        let env_access = first_env(&["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"]);
        let env_secret = first_env(&["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"]);
        match (env_access, env_secret) {
            (Some(access), Some(secret)) => Ok(Self {
                access_key: access,
                secret_key: secret,
                session_token: std::env::var("AWS_SESSION_TOKEN").ok().and_then(non_empty),
            }),
            _ => Err(Ec2Error::Credentials(
                "no credentials in configuration or environment".to_owned(),
            )),
        }
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().and_then(non_empty))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
