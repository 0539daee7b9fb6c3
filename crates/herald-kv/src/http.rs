use crate::{KvConfig, KvError, KvStore};

/// HTTP key-value store backend speaking the Consul-compatible REST API:
/// `PUT {scheme}://{address}/v1/kv/<key>?dc=<datacenter>`, authenticated via
/// the `X-Consul-Token` header when a token is configured.
pub struct HttpKv {
    config: KvConfig,
    agent: ureq::Agent,
}

impl HttpKv {
    /// Build the store handle, failing fast on an unusable address or scheme.
    pub fn connect(config: KvConfig) -> Result<Self, KvError> {
        config.validate()?;
        let agent = ureq::Agent::new_with_defaults();
        Ok(Self { config, agent })
    }

    fn url(&self, datacenter: &str, key: &str) -> String {
        format!(
            "{}/v1/kv/{key}?dc={datacenter}",
            self.config.base_url()
        )
    }
}

impl KvStore for HttpKv {
    fn put(&self, datacenter: &str, key: &str, value: &[u8]) -> Result<(), KvError> {
        let url = self.url(datacenter, key);
        tracing::debug!("PUT {url} ({} bytes)", value.len());
        let mut req = self
            .agent
            .put(&url)
            .header("Content-Type", "application/octet-stream");
        if !self.config.token.is_empty() {
            req = req.header("X-Consul-Token", &self.config.token);
        }
        match req.send(value) {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(code)) => Err(KvError::Status { code, url }),
            Err(e) => Err(KvError::Http(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    /// A captured HTTP request for inspection.
    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        target: String,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    }

    struct MockServer {
        addr: String,
        _handle: std::thread::JoinHandle<()>,
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
    }

    impl MockServer {
        fn start() -> Self {
            Self::start_with_status(200)
        }

        fn start_with_status(status: u16) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap().to_string();
            let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));

            let requests_clone = Arc::clone(&requests);
            let handle = std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    let reqs = Arc::clone(&requests_clone);

                    std::thread::spawn(move || {
                        let mut reader = BufReader::new(stream.try_clone().unwrap());
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).is_err() {
                            return;
                        }
                        let parts: Vec<&str> = request_line.trim().splitn(3, ' ').collect();
                        if parts.len() < 2 {
                            return;
                        }
                        let method = parts[0].to_owned();
                        let target = parts[1].to_owned();

                        let mut content_length: usize = 0;
                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                                break;
                            }
                            if let Some((k, v)) = line.trim().split_once(": ") {
                                headers.insert(k.to_lowercase(), v.to_owned());
                            }
                            let lower = line.to_lowercase();
                            if let Some(val) = lower.strip_prefix("content-length: ") {
                                content_length = val.trim().parse().unwrap_or(0);
                            }
                        }

                        let mut body = vec![0u8; content_length];
                        if content_length > 0 {
                            let _ = reader.read_exact(&mut body);
                        }

                        reqs.lock().unwrap().push(CapturedRequest {
                            method,
                            target,
                            headers,
                            body,
                        });

                        let reason = if status == 200 { "OK" } else { "Error" };
                        let response = format!(
                            "HTTP/1.1 {status} {reason}\r\nContent-Length: 4\r\nConnection: close\r\n\r\ntrue"
                        );
                        let _ = stream.write_all(response.as_bytes());
                        let _ = stream.flush();
                    });
                }
            });

            MockServer {
                addr,
                _handle: handle,
                requests,
            }
        }

        fn captured_requests(&self) -> Vec<CapturedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn test_store(addr: &str) -> HttpKv {
        HttpKv::connect(KvConfig::new(addr)).unwrap()
    }

    #[test]
    fn put_targets_kv_path_with_datacenter() {
        let server = MockServer::start();
        let store = test_store(&server.addr);

        store
            .put("us-west-2", "amis/kafka/ebs/2/data", b"[{\"imageId\":\"ami-1\"}]")
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, "PUT");
        assert_eq!(reqs[0].target, "/v1/kv/amis/kafka/ebs/2/data?dc=us-west-2");
        assert_eq!(reqs[0].body, b"[{\"imageId\":\"ami-1\"}]");
    }

    #[test]
    fn put_sends_token_header_when_configured() {
        let server = MockServer::start();
        let store = HttpKv::connect(KvConfig::new(&server.addr).with_token("secret-token-42"))
            .unwrap();

        store.put("eu-west-1", "amis/p/ebs/1/ami", b"ami-2").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert_eq!(
            reqs[0].headers.get("x-consul-token"),
            Some(&"secret-token-42".to_owned())
        );
    }

    #[test]
    fn put_omits_token_header_without_token() {
        let server = MockServer::start();
        let store = test_store(&server.addr);

        store.put("eu-west-1", "amis/p/ebs/1/ami", b"ami-2").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert!(!reqs[0].headers.contains_key("x-consul-token"));
    }

    #[test]
    fn put_error_status_is_surfaced() {
        let server = MockServer::start_with_status(500);
        let store = test_store(&server.addr);

        let err = store.put("us-west-2", "amis/p/ebs/1/data", b"x").unwrap_err();
        match err {
            KvError::Status { code, url } => {
                assert_eq!(code, 500);
                assert!(url.contains("/v1/kv/amis/p/ebs/1/data"));
            }
            other => panic!("expected Status error, got {other}"),
        }
    }

    #[test]
    fn put_connection_refused_is_error() {
        let store = test_store("127.0.0.1:1");
        assert!(store.put("dc1", "k", b"v").is_err());
    }

    #[test]
    fn connect_rejects_invalid_config() {
        assert!(HttpKv::connect(KvConfig::new("")).is_err());
        assert!(HttpKv::connect(KvConfig::new("kv:8500").with_scheme("ftp")).is_err());
    }
}
