use crate::record::decode_describe_images;
use crate::{sigv4, Credentials, Ec2Error, ImageRecord, ImageSource, API_VERSION};
use std::io::Read;

/// Blocking HTTP client for the EC2 query API.
///
/// Issues signed `DescribeImages` GETs against the region's endpoint,
/// `https://ec2.{region}.amazonaws.com/`.
pub struct Ec2Client {
    credentials: Credentials,
    agent: ureq::Agent,
    endpoint: Option<String>,
}

impl Ec2Client {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            agent: ureq::Agent::new_with_defaults(),
            endpoint: None,
        }
    }

    /// Use a fixed endpoint instead of the per-region AWS one, for
    /// EC2-compatible gateways and tests.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.trim_end_matches('/').to_owned());
        self
    }

    fn endpoint_for(&self, region: &str) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://ec2.{region}.amazonaws.com"))
    }
}

impl ImageSource for Ec2Client {
    fn describe_image(
        &self,
        region: &str,
        image_id: &str,
    ) -> Result<Vec<ImageRecord>, Ec2Error> {
        let endpoint = self.endpoint_for(region);
        let host = endpoint
            .split_once("://")
            .map_or(endpoint.as_str(), |(_, rest)| rest);

        let amz_date = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let query = [
            ("Action", "DescribeImages"),
            ("ImageId.1", image_id),
            ("Version", API_VERSION),
        ];
        let extra_headers: Vec<(&str, &str)> = match self.credentials.session_token.as_deref() {
            Some(token) => vec![("x-amz-security-token", token)],
            None => Vec::new(),
        };
        let authorization = sigv4::authorization_header(
            "GET",
            host,
            "/",
            &query,
            &extra_headers,
            b"",
            &self.credentials,
            region,
            "ec2",
            &amz_date,
        );

        let url = format!(
            "{endpoint}/?Action=DescribeImages&ImageId.1={}&Version={API_VERSION}",
            sigv4::uri_encode(image_id)
        );
        tracing::debug!("GET {url}");

        let mut req = self
            .agent
            .get(&url)
            .header("X-Amz-Date", &amz_date)
            .header("Authorization", &authorization);
        if let Some(token) = self.credentials.session_token.as_deref() {
            req = req.header("X-Amz-Security-Token", token);
        }

        let resp = match req.call() {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(code)) => return Err(Ec2Error::Status { code, url }),
            Err(e) => return Err(Ec2Error::Http(e.to_string())),
        };

        let mut body = String::new();
        resp.into_body()
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|e| Ec2Error::Http(e.to_string()))?;
        decode_describe_images(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        target: String,
        headers: HashMap<String, String>,
    }

    struct MockServer {
        addr: String,
        _handle: std::thread::JoinHandle<()>,
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
    }

    impl MockServer {
        fn start(status: u16, body: &'static str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = format!("http://{}", listener.local_addr().unwrap());
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

                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                                break;
                            }
                            if let Some((k, v)) = line.trim().split_once(": ") {
                                headers.insert(k.to_lowercase(), v.to_owned());
                            }
                        }

                        reqs.lock().unwrap().push(CapturedRequest {
                            method,
                            target,
                            headers,
                        });

                        let reason = if status == 200 { "OK" } else { "Error" };
                        let response = format!(
                            "HTTP/1.1 {status} {reason}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
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

    const RESPONSE_XML: &str = r#"<DescribeImagesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>req-1</requestId>
  <imagesSet>
    <item>
      <imageId>ami-1a2b3c4d</imageId>
      <imageState>available</imageState>
      <rootDeviceType>ebs</rootDeviceType>
    </item>
  </imagesSet>
</DescribeImagesResponse>"#;

    fn test_credentials() -> Credentials {
        Credentials {
            access_key: "ABC123".to_owned(),
            secret_key: "123123".to_owned(),
            session_token: None,
        }
    }

    #[test]
    fn describe_image_decodes_records() {
        let server = MockServer::start(200, RESPONSE_XML);
        let client = Ec2Client::new(test_credentials()).with_endpoint(&server.addr);

        let records = client.describe_image("us-west-2", "ami-1a2b3c4d").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_id, "ami-1a2b3c4d");
        assert_eq!(records[0].root_device_type.as_deref(), Some("ebs"));
    }

    #[test]
    fn describe_image_sends_signed_query() {
        let server = MockServer::start(200, RESPONSE_XML);
        let client = Ec2Client::new(test_credentials()).with_endpoint(&server.addr);

        client.describe_image("us-west-2", "ami-1a2b3c4d").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, "GET");
        assert_eq!(
            reqs[0].target,
            "/?Action=DescribeImages&ImageId.1=ami-1a2b3c4d&Version=2016-11-15"
        );
        let auth = reqs[0].headers.get("authorization").expect("signed");
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=ABC123/"));
        assert!(auth.contains("/us-west-2/ec2/aws4_request"));
        assert!(auth.contains("SignedHeaders=host;x-amz-date"));
        assert!(reqs[0].headers.contains_key("x-amz-date"));
        assert!(!reqs[0].headers.contains_key("x-amz-security-token"));
    }

    #[test]
    fn session_token_is_sent_and_signed() {
        let server = MockServer::start(200, RESPONSE_XML);
        let credentials = Credentials {
            session_token: Some("session-tok".to_owned()),
            ..test_credentials()
        };
        let client = Ec2Client::new(credentials).with_endpoint(&server.addr);

        client.describe_image("us-west-2", "ami-1a2b3c4d").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert_eq!(
            reqs[0].headers.get("x-amz-security-token"),
            Some(&"session-tok".to_owned())
        );
        let auth = reqs[0].headers.get("authorization").unwrap();
        assert!(auth.contains("SignedHeaders=host;x-amz-date;x-amz-security-token"));
    }

    #[test]
    fn error_status_is_surfaced() {
        let server = MockServer::start(403, "<Response/>");
        let client = Ec2Client::new(test_credentials()).with_endpoint(&server.addr);

        let err = client.describe_image("us-west-2", "ami-1").unwrap_err();
        assert!(matches!(err, Ec2Error::Status { code: 403, .. }));
    }

    #[test]
    fn connection_refused_is_error() {
        let client = Ec2Client::new(test_credentials()).with_endpoint("http://127.0.0.1:1");
        assert!(client.describe_image("us-west-2", "ami-1").is_err());
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let server = MockServer::start(200, "definitely not xml");
        let client = Ec2Client::new(test_credentials()).with_endpoint(&server.addr);

        let err = client.describe_image("us-west-2", "ami-1").unwrap_err();
        assert!(matches!(err, Ec2Error::Decode(_)));
    }

    #[test]
    fn default_endpoint_is_regional() {
        let client = Ec2Client::new(test_credentials());
        assert_eq!(
            client.endpoint_for("eu-west-1"),
            "https://ec2.eu-west-1.amazonaws.com"
        );
    }
}
