//! JSON-RPC 2.0 over HTTP with ranked endpoint fallthrough.
//!
//! A call makes up to `1 + retries` sweeps. Each sweep walks every endpoint
//! in ranked order and returns on the first answer. Timeouts, connection
//! errors, non-2xx statuses and malformed bodies demote the endpoint and fall
//! through to the next one. A JSON-RPC error object is an answer: the call
//! ends with `CallReverted` and the endpoint's health is unaffected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use memlane_config::RpcSettings;
use memlane_contracts::error::{MemlaneError, MemlaneResult};
use memlane_core::{retry::with_retry, traits::RpcTransport, RetryPolicy};

use crate::ranking::{EndpointHealth, EndpointRanking};

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

enum Reply {
    Result(Value),
    Error(String),
}

pub struct HttpTransport {
    client: reqwest::Client,
    ranking: EndpointRanking,
    policy: RetryPolicy,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Build a transport over `endpoints` with a per-request `timeout`.
    pub fn new(
        endpoints: impl IntoIterator<Item = String>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> MemlaneResult<Self> {
        let ranking = EndpointRanking::new(endpoints);
        if ranking.is_empty() {
            return Err(MemlaneError::Config {
                reason: "at least one RPC endpoint is required".into(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemlaneError::Config {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            ranking,
            policy,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_settings(settings: &RpcSettings) -> MemlaneResult<Self> {
        Self::new(
            settings.endpoints.iter().cloned(),
            settings.timeout(),
            settings.retry_policy(),
        )
    }

    /// Per-endpoint health, in configured order.
    pub fn endpoint_snapshot(&self) -> Vec<EndpointHealth> {
        self.ranking.snapshot()
    }

    async fn sweep(&self, method: &str, body: &Value) -> MemlaneResult<Value> {
        let candidates = self.ranking.ranked();
        let mut last_error = String::from("no endpoints");

        for url in &candidates {
            let started = Instant::now();
            match self.post(url, body).await {
                Ok(Reply::Result(value)) => {
                    self.ranking.record_success(url, started.elapsed());
                    debug!(endpoint = %url, method, "rpc call succeeded");
                    return Ok(value);
                }
                Ok(Reply::Error(reason)) => {
                    debug!(endpoint = %url, method, error = %reason, "rpc call answered with an error");
                    return Err(MemlaneError::CallReverted { reason });
                }
                Err(reason) => {
                    self.ranking.record_failure(url);
                    warn!(endpoint = %url, method, error = %reason, "rpc endpoint failed");
                    last_error = reason;
                }
            }
        }

        Err(MemlaneError::Transport {
            reason: format!(
                "all {} endpoints failed for {}; last error: {}",
                candidates.len(),
                method,
                last_error
            ),
        })
    }

    /// Endpoint faults come back as `Err(reason)`.
    async fn post(&self, url: &str, body: &Value) -> Result<Reply, String> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { "timed out".to_string() } else { e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| format!("malformed JSON-RPC body: {}", e))?;

        match (envelope.error, envelope.result) {
            (Some(err), _) => Ok(Reply::Error(format!("{} (code {})", err.message, err.code))),
            (None, Some(result)) => Ok(Reply::Result(result)),
            (None, None) => Err("response has neither result nor error".to_string()),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> MemlaneResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        with_retry(&self.policy, method, |_| self.sweep(method, &body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const OK_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#;
    const REVERT_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted"}}"#;

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            backoff_factor: 2.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Answer every request with `status` and `body`; returns the base URL.
    async fn canned_server(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        url
    }

    /// Consume one request: headers, then `Content-Length` bytes of body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    fn make_transport(urls: &[&String], max_attempts: u32) -> HttpTransport {
        HttpTransport::new(
            urls.iter().map(|u| u.to_string()),
            Duration::from_secs(2),
            no_delay(max_attempts),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_endpoint_list() {
        let result = HttpTransport::new(Vec::<String>::new(), Duration::from_secs(1), no_delay(1));
        assert!(matches!(result, Err(MemlaneError::Config { .. })));
    }

    #[test]
    fn from_settings_keeps_configured_order() {
        let settings = RpcSettings {
            endpoints: vec!["http://a.invalid".into(), "http://b.invalid".into()],
            ..RpcSettings::default()
        };
        let transport = HttpTransport::from_settings(&settings).unwrap();
        let urls: Vec<String> = transport.endpoint_snapshot().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["http://a.invalid", "http://b.invalid"]);
    }

    #[tokio::test]
    async fn unreachable_endpoints_exhaust_into_transport_error() {
        // Port 1 on loopback refuses connections immediately.
        let transport = HttpTransport::new(
            vec!["http://127.0.0.1:1".to_string(), "http://127.0.0.1:1/alt".to_string()],
            Duration::from_secs(2),
            no_delay(2),
        )
        .unwrap();

        let err = transport.call("eth_blockNumber", json!([])).await.unwrap_err();
        assert!(matches!(err, MemlaneError::Transport { .. }));
        assert!(err.is_retryable());

        // Two sweeps over two endpoints.
        let snapshot = transport.endpoint_snapshot();
        assert_eq!(snapshot.iter().map(|e| e.failures).sum::<u64>(), 4);
        assert!(snapshot.iter().all(|e| e.successes == 0));
    }

    // ── Endpoint fallthrough ──────────────────────────────────────────────────

    #[tokio::test]
    async fn server_error_demotes_endpoint_and_falls_through() {
        let failing = canned_server("503 Service Unavailable", "").await;
        let healthy = canned_server("200 OK", OK_BODY).await;
        let transport = make_transport(&[&failing, &healthy], 1);

        let result = transport.call("eth_blockNumber", json!([])).await.unwrap();
        assert_eq!(result, json!("0x10"));

        let snapshot = transport.endpoint_snapshot();
        assert_eq!(snapshot[0].url, failing);
        assert_eq!(snapshot[0].failures, 1);
        assert_eq!(snapshot[0].consecutive_failures, 1);
        assert_eq!(snapshot[0].successes, 0);
        assert_eq!(snapshot[1].successes, 1);
        assert_eq!(snapshot[1].failures, 0);
        assert_eq!(transport.ranking.ranked()[0], healthy);
    }

    #[tokio::test]
    async fn malformed_body_falls_through() {
        let garbled = canned_server("200 OK", "<html>gateway</html>").await;
        let healthy = canned_server("200 OK", OK_BODY).await;
        let transport = make_transport(&[&garbled, &healthy], 1);

        let result = transport.call("eth_chainId", json!([])).await.unwrap();
        assert_eq!(result, json!("0x10"));

        let snapshot = transport.endpoint_snapshot();
        assert_eq!(snapshot[0].failures, 1);
        assert_eq!(snapshot[1].successes, 1);
    }

    #[tokio::test]
    async fn empty_envelope_falls_through() {
        let hollow = canned_server("200 OK", r#"{"jsonrpc":"2.0","id":1}"#).await;
        let healthy = canned_server("200 OK", OK_BODY).await;
        let transport = make_transport(&[&hollow, &healthy], 1);

        transport.call("eth_chainId", json!([])).await.unwrap();
        assert_eq!(transport.endpoint_snapshot()[0].failures, 1);
    }

    #[tokio::test]
    async fn rpc_error_is_a_revert_and_leaves_health_alone() {
        let reverting = canned_server("200 OK", REVERT_BODY).await;
        let healthy = canned_server("200 OK", OK_BODY).await;
        let transport = make_transport(&[&reverting, &healthy], 3);

        let err = transport.call("eth_call", json!([])).await.unwrap_err();
        assert!(matches!(err, MemlaneError::CallReverted { .. }));
        assert!(err.to_string().contains("execution reverted"));
        assert!(!err.is_retryable());

        // Answered by the first endpoint once; no retry, no fallthrough.
        for endpoint in transport.endpoint_snapshot() {
            assert_eq!(endpoint.successes, 0, "{}", endpoint.url);
            assert_eq!(endpoint.failures, 0, "{}", endpoint.url);
            assert_eq!(endpoint.consecutive_failures, 0, "{}", endpoint.url);
        }
        assert_eq!(transport.ranking.ranked()[0], reverting);
    }

    #[tokio::test]
    async fn every_endpoint_failing_is_retried_per_policy() {
        let first = canned_server("502 Bad Gateway", "").await;
        let second = canned_server("500 Internal Server Error", "").await;
        let transport = make_transport(&[&first, &second], 2);

        let err = transport.call("eth_blockNumber", json!([])).await.unwrap_err();
        assert!(matches!(err, MemlaneError::Transport { .. }));
        assert!(err.to_string().contains("HTTP 500"));

        let snapshot = transport.endpoint_snapshot();
        assert_eq!(snapshot[0].failures, 2);
        assert_eq!(snapshot[1].failures, 2);
        assert_eq!(snapshot[1].consecutive_failures, 2);
    }
}
