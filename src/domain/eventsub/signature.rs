//! Webhook signature and delivery window verification.
//!
//! Every delivery is signed with HMAC-SHA256 over the concatenation of the
//! message id, the timestamp header exactly as sent, and the raw body. The
//! signature header has the form `sha256=<hex>`.

use chrono::Duration;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;
use crate::domain::foundation::Timestamp;

/// Default maximum age of a delivery (10 minutes).
pub const DEFAULT_MAX_MESSAGE_AGE_SECS: i64 = 600;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Parsed `sha256=<hex>` signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub digest: Vec<u8>,
}

impl SignatureHeader {
    /// Parses the signature header.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::BadSignature` if the prefix is missing or the
    /// digest is not valid hex.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let hex_digest = header
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or(WebhookError::BadSignature)?;
        let digest = hex::decode(hex_digest).map_err(|_| WebhookError::BadSignature)?;
        Ok(Self { digest })
    }
}

/// Verifies delivery signatures and freshness.
pub struct SignatureVerifier {
    secret: SecretString,
    max_age: Duration,
    permissive: bool,
}

impl SignatureVerifier {
    /// Creates a strict verifier with the default 10 minute window.
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            max_age: Duration::seconds(DEFAULT_MAX_MESSAGE_AGE_SECS),
            permissive: false,
        }
    }

    /// Overrides the maximum accepted delivery age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Skips the staleness and signature checks. Local testing only.
    pub fn with_permissive(mut self, permissive: bool) -> Self {
        self.permissive = permissive;
        self
    }

    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// Verifies one delivery and hands back the authenticated body.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the timestamp header (RFC3339)
    /// 2. Reject deliveries older than the window
    /// 3. Compute the expected HMAC over id, timestamp, and body
    /// 4. Compare against the header digest in constant time
    ///
    /// Steps 2 and 4 are skipped in permissive mode. A timestamp that does
    /// not parse is rejected in every mode.
    ///
    /// # Errors
    ///
    /// - `InvalidTimestamp` - Timestamp header is not RFC3339
    /// - `StaleTimestamp` - Delivery is older than the window
    /// - `BadSignature` - Digest missing, malformed, or mismatched
    pub fn verify<'b>(
        &self,
        message_id: &str,
        timestamp: &str,
        body: &'b [u8],
        signature_header: &str,
    ) -> Result<&'b [u8], WebhookError> {
        let sent_at = Timestamp::parse_rfc3339(timestamp)
            .map_err(|e| WebhookError::InvalidTimestamp(e.to_string()))?;

        if self.permissive {
            return Ok(body);
        }

        self.validate_timestamp(&sent_at, &Timestamp::now())?;

        let header = SignatureHeader::parse(signature_header)?;
        let expected = self.compute_signature(message_id, timestamp, body)?;

        if !constant_time_compare(&expected, &header.digest) {
            return Err(WebhookError::BadSignature);
        }

        Ok(body)
    }

    fn validate_timestamp(&self, sent_at: &Timestamp, now: &Timestamp) -> Result<(), WebhookError> {
        if now.duration_since(sent_at) > self.max_age {
            return Err(WebhookError::StaleTimestamp);
        }
        Ok(())
    }

    fn compute_signature(
        &self,
        message_id: &str,
        timestamp: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, WebhookError> {
        hmac_sha256(self.secret.expose_secret().as_bytes(), message_id, timestamp, body)
    }
}

fn hmac_sha256(
    key: &[u8],
    message_id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<Vec<u8>, WebhookError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| WebhookError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(message_id.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a `sha256=<hex>` header value, the way the sender signs deliveries.
///
/// Exposed for integration tests and local tooling that replay deliveries.
///
/// # Errors
///
/// Returns `Internal` when the secret is rejected as an HMAC key.
pub fn sign_delivery(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, WebhookError> {
    let digest = hmac_sha256(secret.as_bytes(), message_id, timestamp, body)?;
    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "s3cRe7-s3cRe7-s3cRe7";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn timestamp_ago(secs: i64) -> String {
        Timestamp::now().minus_secs(secs).to_rfc3339()
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_decodes_digest() {
        let header = SignatureHeader::parse(&format!("sha256={}", "ab".repeat(32))).unwrap();
        assert_eq!(header.digest.len(), 32);
    }

    #[test]
    fn parse_header_without_prefix_fails() {
        let result = SignatureHeader::parse(&"ab".repeat(32));
        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[test]
    fn parse_header_with_other_algorithm_fails() {
        let result = SignatureHeader::parse(&format!("sha1={}", "ab".repeat(20)));
        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        let result = SignatureHeader::parse("sha256=not_valid_hex");
        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let timestamp = timestamp_ago(5);
        let body = br#"{"subscription":{},"event":{}}"#;
        let signature = sign_delivery(TEST_SECRET, "msg-1", &timestamp, body).unwrap();

        let result = verifier().verify("msg-1", &timestamp, body, &signature);

        assert_eq!(result.unwrap(), body);
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let timestamp = timestamp_ago(5);
        let body = b"{}";
        let signature = sign_delivery("wrong_secret", "msg-1", &timestamp, body).unwrap();

        let result = verifier().verify("msg-1", &timestamp, body, &signature);

        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[test]
    fn verify_covers_message_id() {
        let timestamp = timestamp_ago(5);
        let body = b"{}";
        let signature = sign_delivery(TEST_SECRET, "msg-1", &timestamp, body).unwrap();

        let result = verifier().verify("msg-2", &timestamp, body, &signature);

        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[test]
    fn verify_uses_timestamp_as_sent() {
        // Same instant, different textual form.
        let sent = "2024-01-15T12:30:00Z";
        let reformatted = "2024-01-15T12:30:00+00:00";
        let body = b"{}";
        let signature = sign_delivery(TEST_SECRET, "msg-1", sent, body).unwrap();
        let verifier = verifier().with_max_age(Duration::weeks(52 * 100));

        assert!(verifier.verify("msg-1", sent, body, &signature).is_ok());
        assert!(matches!(
            verifier.verify("msg-1", reformatted, body, &signature),
            Err(WebhookError::BadSignature)
        ));
    }

    #[test]
    fn verify_malformed_signature_fails() {
        let result = verifier().verify("msg-1", &timestamp_ago(5), b"{}", "sha256=zz");
        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn stale_timestamp_is_rejected() {
        let timestamp = timestamp_ago(11 * 60);
        let body = b"{}";
        let signature = sign_delivery(TEST_SECRET, "msg-1", &timestamp, body).unwrap();

        let result = verifier().verify("msg-1", &timestamp, body, &signature);

        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    #[test]
    fn stale_timestamp_is_accepted_when_permissive() {
        let timestamp = timestamp_ago(11 * 60);
        let body = b"{}";
        let signature = sign_delivery(TEST_SECRET, "msg-1", &timestamp, body).unwrap();

        let result = verifier()
            .with_permissive(true)
            .verify("msg-1", &timestamp, body, &signature);

        assert!(result.is_ok());
    }

    #[test]
    fn bad_signature_is_accepted_when_permissive() {
        let result = verifier()
            .with_permissive(true)
            .verify("msg-1", &timestamp_ago(5), b"{}", "sha256=00");

        assert!(result.is_ok());
    }

    #[test]
    fn unparseable_timestamp_is_rejected_even_when_permissive() {
        let result = verifier()
            .with_permissive(true)
            .verify("msg-1", "last tuesday", b"{}", "sha256=00");

        assert!(matches!(result, Err(WebhookError::InvalidTimestamp(_))));
    }

    #[test]
    fn timestamp_inside_window_is_accepted() {
        let now = Timestamp::now();
        assert!(verifier().validate_timestamp(&now.minus_secs(540), &now).is_ok());
    }

    #[test]
    fn timestamp_at_boundary_is_accepted() {
        let now = Timestamp::now();
        assert!(verifier().validate_timestamp(&now.minus_secs(600), &now).is_ok());
    }

    #[test]
    fn timestamp_just_past_boundary_is_rejected() {
        let now = Timestamp::now();
        assert!(matches!(
            verifier().validate_timestamp(&now.minus_secs(601), &now),
            Err(WebhookError::StaleTimestamp)
        ));
    }

    #[test]
    fn configured_window_is_honored() {
        let now = Timestamp::now();
        let verifier = verifier().with_max_age(Duration::seconds(60));
        assert!(verifier.validate_timestamp(&now.minus_secs(61), &now).is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    #[test]
    fn signed_delivery_is_prefixed_hex_digest() {
        let signature = sign_delivery(TEST_SECRET, "msg-1", "2023-01-01T00:00:00Z", b"{}").unwrap();

        let digest = signature.strip_prefix("sha256=").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn constant_time_compare_different_values() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }

    // ══════════════════════════════════════════════════════════════
    // Properties
    // ══════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn signed_delivery_is_accepted(
            message_id in "[a-zA-Z0-9-]{1,40}",
            secret in "[ -~]{10,100}",
            body in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let timestamp = timestamp_ago(1);
            let signature = sign_delivery(&secret, &message_id, &timestamp, &body).unwrap();
            let verifier = SignatureVerifier::new(SecretString::new(secret));

            prop_assert!(verifier.verify(&message_id, &timestamp, &body, &signature).is_ok());
        }

        #[test]
        fn flipping_any_body_byte_is_rejected(
            body in proptest::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let timestamp = timestamp_ago(1);
            let signature = sign_delivery(TEST_SECRET, "msg-1", &timestamp, &body).unwrap();

            let mut tampered = body.clone();
            let at = index.index(tampered.len());
            tampered[at] ^= flip;

            prop_assert!(matches!(
                verifier().verify("msg-1", &timestamp, &tampered, &signature),
                Err(WebhookError::BadSignature)
            ));
        }
    }
}
