//! HTTP client for the products endpoint.
//!
//! One GET per render, decoded into [`SaleRecord`]s. No retries: any
//! failure is returned to the caller as a [`SourceError`].

use crate::analysis::QueryParams;
use crate::models::SaleRecord;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default products endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://labdados.com/produtos";

/// Errors raised while fetching the dataset.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Cannot connect to products endpoint at {0}")]
    Connect(String),

    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Products endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode sales payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Connection settings for the products endpoint.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl From<&crate::config::SourceSettings> for SourceConfig {
    fn from(settings: &crate::config::SourceSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            timeout_seconds: settings.timeout_seconds,
        }
    }
}

/// Client for the products endpoint.
pub struct SalesClient {
    config: SourceConfig,
    http_client: reqwest::Client,
}

impl SalesClient {
    /// Create a client with the configured timeout.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Fetch every sale record matching the upstream query parameters.
    pub async fn fetch(&self, params: &QueryParams) -> Result<Vec<SaleRecord>, SourceError> {
        let url = &self.config.endpoint;
        info!(
            "Fetching sales from {} (regiao='{}', ano='{}')",
            url, params.regiao, params.ano
        );

        let response = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout {
                        url: url.clone(),
                        seconds: self.config.timeout_seconds,
                    }
                } else if e.is_connect() {
                    SourceError::Connect(url.clone())
                } else {
                    SourceError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let body = response.text().await?;
        debug!("Received {} bytes", body.len());

        let records = decode_records(&body)?;
        info!("Fetched {} sale records", records.len());

        Ok(records)
    }
}

/// Decode the endpoint's JSON array of sale records.
pub fn decode_records(body: &str) -> Result<Vec<SaleRecord>, SourceError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer one request on a local port with a canned response.
    /// The join handle yields the request line the client sent.
    fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/produtos", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (endpoint, handle)
    }

    fn local_client(endpoint: String) -> SalesClient {
        SalesClient::new(SourceConfig {
            endpoint,
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_decode_fixture() {
        let records = decode_records(include_str!("../../fixtures/sales_sample.json")).unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records[0].seller, "Ana Souza");
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let err = decode_records(r#"{"error": "not an array"}"#).unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to decode sales payload"));
    }

    #[test]
    fn test_decode_rejects_bad_date() {
        let body = include_str!("../../fixtures/sales_sample.json").replace("05/01/2020", "2020-01-05");
        assert!(matches!(decode_records(&body), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_default_source_config() {
        let config = SourceConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_fetch_unreachable_endpoint_fails() {
        let client = SalesClient::new(SourceConfig {
            endpoint: "http://127.0.0.1:9/produtos".to_string(),
            timeout_seconds: 2,
        })
        .unwrap();

        let result = tokio_test::block_on(client.fetch(&QueryParams::default()));
        assert!(matches!(result, Err(SourceError::Connect(_))));
    }

    #[test]
    fn test_fetch_sends_region_and_year() {
        let (endpoint, server) = serve_once("200 OK", "[]");
        let client = local_client(endpoint);
        let params = QueryParams {
            regiao: "centro-oeste".to_string(),
            ano: "2022".to_string(),
        };

        let records = tokio_test::block_on(client.fetch(&params)).unwrap();
        assert!(records.is_empty());
        assert_eq!(
            server.join().unwrap(),
            "GET /produtos?regiao=centro-oeste&ano=2022 HTTP/1.1"
        );
    }

    #[test]
    fn test_fetch_sends_empty_params_for_all() {
        let (endpoint, server) = serve_once("200 OK", "[]");
        let client = local_client(endpoint);

        tokio_test::block_on(client.fetch(&QueryParams::default())).unwrap();
        assert_eq!(server.join().unwrap(), "GET /produtos?regiao=&ano= HTTP/1.1");
    }

    #[test]
    fn test_fetch_decodes_records() {
        let (endpoint, server) =
            serve_once("200 OK", include_str!("../../fixtures/sales_sample.json"));
        let client = local_client(endpoint);

        let records = tokio_test::block_on(client.fetch(&QueryParams::default())).unwrap();
        server.join().unwrap();

        assert_eq!(records.len(), 8);
        assert_eq!(records[0].product, "Smartwatch");
        assert_eq!(
            records[0].purchase_date,
            NaiveDate::from_ymd_opt(2020, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_fetch_error_status_keeps_body() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "boom");
        let client = local_client(endpoint);

        let err = tokio_test::block_on(client.fetch(&QueryParams::default())).unwrap_err();
        server.join().unwrap();

        match &err {
            SourceError::Status { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "Products endpoint returned 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn test_fetch_malformed_body_is_decode_error() {
        let (endpoint, server) = serve_once("200 OK", r#"{"error": "not an array"}"#);
        let client = local_client(endpoint);

        let err = tokio_test::block_on(client.fetch(&QueryParams::default())).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
