//! Shared HTTP client, SSE parsing, and status mapping.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};

use crate::error::RelayError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Default JSON headers.
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Map a non-success status (and its body) to an error.
pub fn status_to_error(status: u16, headers: &HeaderMap, body: &str) -> RelayError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => RelayError::Authentication(message),
        429 => RelayError::RateLimited {
            retry_after_ms: retry_after_header(headers).or_else(|| extract_retry_after(body)),
        },
        _ => RelayError::api(status, message),
    }
}

/// Read a non-success response fully and map it to an error.
pub async fn error_from_response(resp: reqwest::Response) -> RelayError {
    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let body = resp.text().await.unwrap_or_default();
    status_to_error(status, &headers, &body)
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

/// Incremental server-sent-events decoder.
///
/// Feed raw chunks with [`SseDecoder::push`]; complete events (their joined
/// `data:` lines) come back in arrival order. Comments and other fields are dropped.
///
/// Bytes are buffered until a full line arrives, so a multi-byte character
/// split across chunks decodes intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending_data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.pending_data.is_empty() {
                    events.push(self.pending_data.join("\n"));
                    self.pending_data.clear();
                }
                continue;
            }
            self.push_field(line);
        }
        events
    }

    /// Flush a trailing event the server did not terminate with a blank line.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = String::from_utf8_lossy(&rest);
        self.push_field(rest.trim_end_matches(['\n', '\r']));
        if self.pending_data.is_empty() {
            return None;
        }
        let event = self.pending_data.join("\n");
        self.pending_data.clear();
        Some(event)
    }

    fn push_field(&mut self, line: &str) {
        if let Some(data) = line.strip_prefix("data:") {
            self.pending_data.push(data.strip_prefix(' ').unwrap_or(data).to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_handles_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: response.output_text.delta\ndata: {\"a\"").is_empty());
        let events = decoder.push(b":1}\n\ndata: second\r\n\r\n");
        assert_eq!(events, vec!["{\"a\":1}".to_string(), "second".to_string()]);
    }

    #[test]
    fn decoder_keeps_multibyte_characters_split_across_chunks() {
        let payload = "data: {\"type\":\"response.output_text.delta\",\"delta\":\"café ☕\"}\n\n";
        let bytes = payload.as_bytes();
        let split = payload.find('é').unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let events = decoder.push(&bytes[split..]);
        assert_eq!(
            events,
            vec!["{\"type\":\"response.output_text.delta\",\"delta\":\"café ☕\"}".to_string()]
        );

        let mut decoder = SseDecoder::new();
        let cup = payload.find('☕').unwrap();
        let mut events = Vec::new();
        for part in [&bytes[..cup + 1], &bytes[cup + 1..cup + 2], &bytes[cup + 2..]] {
            events.extend(decoder.push(part));
        }
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("café ☕"));
        assert!(!events[0].contains('\u{FFFD}'));
    }

    #[test]
    fn decoder_joins_multiline_data_and_flushes_tail() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: one\ndata: two\n").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("one\ntwo"));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn status_mapping_extracts_error_message() {
        let body = r#"{"error":{"code":"NotFound","message":"Agent not found"}}"#;
        match status_to_error(404, &HeaderMap::new(), body) {
            RelayError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Agent not found");
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert!(matches!(
            status_to_error(401, &HeaderMap::new(), "denied"),
            RelayError::Authentication(_)
        ));
    }

    #[test]
    fn rate_limit_prefers_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        match status_to_error(429, &headers, r#"{"error":{"retry_after":1.5}}"#) {
            RelayError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, Some(3000)),
            other => panic!("expected rate limit, got {other:?}"),
        }
        match status_to_error(429, &HeaderMap::new(), r#"{"error":{"retry_after":1.5}}"#) {
            RelayError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, Some(1500)),
            other => panic!("expected rate limit, got {other:?}"),
        }
    }
}
