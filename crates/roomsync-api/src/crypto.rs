//! Webhook signature verification.
//!
//! The document service signs each delivery with HMAC-SHA256 over
//! `{id}.{timestamp}.{body}` and sends the result base64-encoded in a
//! `webhook-signature` header (the equivalent `svix-*` header names are
//! accepted too). Verification checks the delivery timestamp against a
//! tolerance window, compares signatures in constant time, and only then
//! parses the body into a typed event. An unverified payload is never
//! interpreted.

use std::{
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use roomsync_core::{Clock, InboundEvent, RealClock};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed skew between the delivery timestamp and now.
const TIMESTAMP_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// Prefix the service's dashboard puts on signing secrets.
const SECRET_PREFIX: &str = "whsec_";

/// Signature verification errors.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A required webhook header is missing or not valid UTF-8.
    #[error("missing or unreadable header: {0}")]
    MissingHeader(&'static str),

    /// The timestamp header is not an integer.
    #[error("malformed timestamp header")]
    MalformedTimestamp,

    /// The delivery timestamp is outside the tolerance window.
    #[error("timestamp outside of tolerance window")]
    TimestampOutOfTolerance,

    /// The configured signing secret is unusable.
    #[error("invalid signing secret")]
    InvalidSecret,

    /// No candidate signature matched the expected one.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// The verified body is not a valid event document.
    #[error("malformed event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Verifies inbound webhook deliveries against a configured secret.
///
/// Cheap to clone; the application state holds one instance shared
/// across requests.
#[derive(Clone, Debug)]
pub struct WebhookVerifier {
    key: Vec<u8>,
    clock: Arc<dyn Clock>,
    tolerance: Duration,
}

impl WebhookVerifier {
    /// Creates a verifier from a signing secret, using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::InvalidSecret` if the secret is empty.
    pub fn new(secret: &str) -> Result<Self, VerifyError> {
        Self::with_clock(secret, Arc::new(RealClock::new()))
    }

    /// Creates a verifier with an injected clock.
    ///
    /// Dashboard secrets carry a `whsec_` prefix and a base64 key; both
    /// are optional here. A secret that is not valid base64 is used as a
    /// raw key, which covers self-configured senders.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::InvalidSecret` if the secret is empty.
    pub fn with_clock(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, VerifyError> {
        let material = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        if material.is_empty() {
            return Err(VerifyError::InvalidSecret);
        }

        let key = BASE64.decode(material).unwrap_or_else(|_| material.as_bytes().to_vec());

        Ok(Self { key, clock, tolerance: TIMESTAMP_TOLERANCE })
    }

    /// Verifies a delivery and returns the parsed, trusted event.
    ///
    /// `body` must be the exact bytes as received; re-serialization
    /// would invalidate the signature.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyError`] naming the first failing check:
    /// headers, timestamp window, signature comparison, or payload
    /// parsing. Any failure means the payload must not be trusted.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<InboundEvent, VerifyError> {
        let id = header_value(headers, &["webhook-id", "svix-id"])
            .ok_or(VerifyError::MissingHeader("webhook-id"))?;
        let timestamp = header_value(headers, &["webhook-timestamp", "svix-timestamp"])
            .ok_or(VerifyError::MissingHeader("webhook-timestamp"))?;
        let signatures = header_value(headers, &["webhook-signature", "svix-signature"])
            .ok_or(VerifyError::MissingHeader("webhook-signature"))?;

        self.check_timestamp(timestamp)?;

        let expected = self.sign(id, timestamp, body)?;

        // The header may carry several space-delimited versioned
        // signatures; any v1 entry matching accepts the delivery.
        let accepted = signatures
            .split_whitespace()
            .filter_map(|entry| entry.strip_prefix("v1,"))
            .filter_map(|encoded| BASE64.decode(encoded).ok())
            .any(|candidate| timing_safe_eq(&candidate, &expected));

        if !accepted {
            return Err(VerifyError::SignatureMismatch);
        }

        Ok(serde_json::from_slice(body)?)
    }

    /// Computes the expected signature for a delivery.
    fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> Result<Vec<u8>, VerifyError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| VerifyError::InvalidSecret)?;

        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);

        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Rejects deliveries whose timestamp is outside the tolerance window.
    fn check_timestamp(&self, raw: &str) -> Result<(), VerifyError> {
        let timestamp: i64 = raw.parse().map_err(|_| VerifyError::MalformedTimestamp)?;

        let now = self
            .clock
            .now_system()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| VerifyError::TimestampOutOfTolerance)?
            .as_secs();
        let now = i64::try_from(now).map_err(|_| VerifyError::TimestampOutOfTolerance)?;
        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);

        if (now - timestamp).abs() > tolerance {
            return Err(VerifyError::TimestampOutOfTolerance);
        }

        Ok(())
    }
}

/// Returns the first readable header among the given candidate names.
fn header_value<'h>(headers: &'h HeaderMap, names: &[&str]) -> Option<&'h str> {
    names.iter().find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
}

/// Timing-safe byte comparison to prevent timing attacks.
///
/// Uses constant-time comparison to avoid leaking information about the
/// expected signature through timing analysis.
fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use roomsync_core::TestClock;

    use super::*;

    const NOW: i64 = 1_700_000_000;
    const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLXNlY3JldA==";

    fn test_verifier() -> WebhookVerifier {
        WebhookVerifier::with_clock(SECRET, Arc::new(TestClock::at(NOW))).unwrap()
    }

    fn headers_for(id: &str, timestamp: i64, signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("webhook-id", HeaderValue::from_str(id).unwrap());
        headers
            .insert("webhook-timestamp", HeaderValue::from_str(&timestamp.to_string()).unwrap());
        headers.insert("webhook-signature", HeaderValue::from_str(signature).unwrap());
        headers
    }

    fn signed_headers(verifier: &WebhookVerifier, id: &str, timestamp: i64, body: &[u8]) -> HeaderMap {
        let expected = verifier.sign(id, &timestamp.to_string(), body).unwrap();
        headers_for(id, timestamp, &format!("v1,{}", BASE64.encode(expected)))
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let verifier = test_verifier();
        let body = br#"{"type":"ydocUpdated","data":{"roomId":"room-1"}}"#;
        let headers = signed_headers(&verifier, "msg_1", NOW, body);

        let event = verifier.verify(&headers, body).unwrap();
        assert_eq!(event.room_to_sync().unwrap().as_str(), "room-1");
    }

    #[test]
    fn verify_rejects_tampered_body() {
        let verifier = test_verifier();
        let body = br#"{"type":"ydocUpdated","data":{"roomId":"room-1"}}"#;
        let headers = signed_headers(&verifier, "msg_1", NOW, body);

        let tampered = br#"{"type":"ydocUpdated","data":{"roomId":"room-2"}}"#;
        let err = verifier.verify(&headers, tampered).unwrap_err();

        assert!(matches!(err, VerifyError::SignatureMismatch));
    }

    #[test]
    fn verify_rejects_missing_headers() {
        let verifier = test_verifier();
        let body = b"{}";

        let mut headers = signed_headers(&verifier, "msg_1", NOW, body);
        headers.remove("webhook-signature");
        assert!(matches!(
            verifier.verify(&headers, body).unwrap_err(),
            VerifyError::MissingHeader("webhook-signature")
        ));

        let mut headers = signed_headers(&verifier, "msg_1", NOW, body);
        headers.remove("webhook-id");
        assert!(matches!(
            verifier.verify(&headers, body).unwrap_err(),
            VerifyError::MissingHeader("webhook-id")
        ));

        let mut headers = signed_headers(&verifier, "msg_1", NOW, body);
        headers.remove("webhook-timestamp");
        assert!(matches!(
            verifier.verify(&headers, body).unwrap_err(),
            VerifyError::MissingHeader("webhook-timestamp")
        ));
    }

    #[test]
    fn verify_accepts_svix_header_names() {
        let verifier = test_verifier();
        let body = br#"{"type":"ydocUpdated","data":{"roomId":"room-1"}}"#;
        let signed = signed_headers(&verifier, "msg_1", NOW, body);

        let mut headers = HeaderMap::new();
        headers.insert("svix-id", signed.get("webhook-id").unwrap().clone());
        headers.insert("svix-timestamp", signed.get("webhook-timestamp").unwrap().clone());
        headers.insert("svix-signature", signed.get("webhook-signature").unwrap().clone());

        assert!(verifier.verify(&headers, body).is_ok());
    }

    #[test]
    fn verify_rejects_stale_timestamp() {
        let verifier = test_verifier();
        let body = b"{}";
        let headers = signed_headers(&verifier, "msg_1", NOW - 600, body);

        let err = verifier.verify(&headers, body).unwrap_err();
        assert!(matches!(err, VerifyError::TimestampOutOfTolerance));
    }

    #[test]
    fn verify_rejects_future_timestamp() {
        let verifier = test_verifier();
        let body = b"{}";
        let headers = signed_headers(&verifier, "msg_1", NOW + 600, body);

        let err = verifier.verify(&headers, body).unwrap_err();
        assert!(matches!(err, VerifyError::TimestampOutOfTolerance));
    }

    #[test]
    fn timestamp_at_tolerance_edge_is_accepted() {
        let verifier = test_verifier();
        let body = br#"{"type":"other"}"#;
        let headers = signed_headers(&verifier, "msg_1", NOW - 300, body);

        assert!(verifier.verify(&headers, body).is_ok());
    }

    #[test]
    fn advancing_the_clock_expires_a_delivery() {
        let clock = TestClock::at(NOW);
        let verifier = WebhookVerifier::with_clock(SECRET, Arc::new(clock.clone())).unwrap();
        let body = br#"{"type":"other"}"#;
        let headers = signed_headers(&verifier, "msg_1", NOW, body);

        assert!(verifier.verify(&headers, body).is_ok());

        clock.advance_secs(301);
        let err = verifier.verify(&headers, body).unwrap_err();
        assert!(matches!(err, VerifyError::TimestampOutOfTolerance));
    }

    #[test]
    fn verify_rejects_malformed_timestamp() {
        let verifier = test_verifier();
        let body = b"{}";
        let mut headers = headers_for("msg_1", NOW, "v1,AAAA");
        headers.insert("webhook-timestamp", HeaderValue::from_static("not-a-number"));

        let err = verifier.verify(&headers, body).unwrap_err();
        assert!(matches!(err, VerifyError::MalformedTimestamp));
    }

    #[test]
    fn any_matching_signature_in_the_list_accepts() {
        let verifier = test_verifier();
        let body = br#"{"type":"other"}"#;
        let expected = verifier.sign("msg_1", &NOW.to_string(), body).unwrap();

        let header = format!("v1,Z2FyYmFnZQ== v1,{}", BASE64.encode(expected));
        let headers = headers_for("msg_1", NOW, &header);

        assert!(verifier.verify(&headers, body).is_ok());
    }

    #[test]
    fn unknown_signature_versions_are_ignored() {
        let verifier = test_verifier();
        let body = br#"{"type":"other"}"#;
        let expected = verifier.sign("msg_1", &NOW.to_string(), body).unwrap();

        let header = format!("v2,{}", BASE64.encode(expected));
        let headers = headers_for("msg_1", NOW, &header);

        let err = verifier.verify(&headers, body).unwrap_err();
        assert!(matches!(err, VerifyError::SignatureMismatch));
    }

    #[test]
    fn prefixed_and_bare_secrets_derive_the_same_key() {
        let clock: Arc<dyn Clock> = Arc::new(TestClock::at(NOW));
        let prefixed = WebhookVerifier::with_clock(SECRET, clock.clone()).unwrap();
        let bare =
            WebhookVerifier::with_clock("dGVzdC1zaWduaW5nLXNlY3JldA==", clock).unwrap();

        let body = br#"{"type":"other"}"#;
        let headers = signed_headers(&prefixed, "msg_1", NOW, body);

        assert!(bare.verify(&headers, body).is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(WebhookVerifier::new("").unwrap_err(), VerifyError::InvalidSecret));
        assert!(matches!(WebhookVerifier::new("whsec_").unwrap_err(), VerifyError::InvalidSecret));
    }

    #[test]
    fn verified_but_malformed_payload_is_an_error() {
        let verifier = test_verifier();
        let body = b"not json at all";
        let headers = signed_headers(&verifier, "msg_1", NOW, body);

        let err = verifier.verify(&headers, body).unwrap_err();
        assert!(matches!(err, VerifyError::MalformedPayload(_)));
    }

    #[test]
    fn timing_safe_eq_basics() {
        assert!(timing_safe_eq(b"same", b"same"));
        assert!(!timing_safe_eq(b"same", b"diff"));
        assert!(!timing_safe_eq(b"short", b"longer-value"));
    }
}
