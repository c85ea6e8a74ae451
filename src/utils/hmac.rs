//! HMAC request-signature primitives.
//!
//! Mutating subscriber routes are protected by a shared-secret signature:
//! the client signs the concatenation of the request timestamp (as sent on
//! the wire) and a per-route action identifier with HMAC-SHA256 and sends
//! the lowercase hex digest alongside the timestamp. Verification is a pure
//! function of the inputs and the server clock.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Why a signed request was rejected.
///
/// `SecretNotConfigured` is a server-side problem and maps to a 500 at the
/// boundary; every other variant is caused by client input and maps to a 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("signing secret is not configured")]
    SecretNotConfigured,

    #[error("timestamp or signature header is missing")]
    MissingHeaders,

    #[error("timestamp is not a base-10 unsigned integer")]
    MalformedTimestamp,

    #[error("timestamp {request} outside allowed window of server time {server}")]
    TimestampOutOfWindow { request: u64, server: u64 },

    #[error("signature does not match")]
    SignatureMismatch,
}

/// Compute the hex signature for `action` at `timestamp`.
///
/// The signed message is the timestamp string immediately followed by the
/// action identifier. There is no separator between the two fields; adding
/// one would break every already-deployed client.
pub fn sign_action(secret: &[u8], action: &str, timestamp: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(action.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a received `(timestamp, signature)` pair for `action`.
///
/// `timestamp_raw` is used byte-for-byte as received when reconstructing the
/// signed message, so clients that send `"0012345"` must have signed exactly
/// that string. `now` and `window` are in seconds; the window is symmetric,
/// accepting slightly-future as well as slightly-past timestamps.
///
/// The comparison against the expected digest is constant-time over the hex
/// strings. The expected digest is lowercase, so an uppercase signature is a
/// mismatch.
pub fn verify_signature(
    secret: &[u8],
    action: &str,
    timestamp_raw: &str,
    signature_raw: &str,
    now: u64,
    window: u64,
) -> Result<(), VerifyError> {
    if secret.is_empty() {
        return Err(VerifyError::SecretNotConfigured);
    }

    if timestamp_raw.is_empty() || signature_raw.is_empty() {
        return Err(VerifyError::MissingHeaders);
    }

    let request_timestamp: u64 = timestamp_raw
        .parse()
        .map_err(|_| VerifyError::MalformedTimestamp)?;

    if now.abs_diff(request_timestamp) > window {
        return Err(VerifyError::TimestampOutOfWindow {
            request: request_timestamp,
            server: now,
        });
    }

    let expected = sign_action(secret, action, timestamp_raw);
    let matches: bool = expected.as_bytes().ct_eq(signature_raw.as_bytes()).into();
    if matches {
        Ok(())
    } else {
        Err(VerifyError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"s3cr3t";
    const NOW: u64 = 1_700_000_000;

    #[test]
    fn accepts_fresh_correctly_signed_request() {
        let ts = NOW.to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts);
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", &ts, &sig, NOW, 300),
            Ok(())
        );
    }

    #[test]
    fn signed_message_has_no_separator() {
        // Signing "1700000000" + "subscribe-add" must equal signing the
        // pre-concatenated string with an empty action.
        let joined = sign_action(SECRET, "", "1700000000subscribe-add");
        let split = sign_action(SECRET, "subscribe-add", "1700000000");
        assert_eq!(joined, split);
    }

    #[test]
    fn timestamp_is_used_as_received() {
        // A zero-padded timestamp denotes the same instant but signs
        // differently, because the raw string is part of the message.
        let padded = sign_action(SECRET, "subscribe-add", &format!("0{NOW}"));
        let plain = sign_action(SECRET, "subscribe-add", &NOW.to_string());
        assert_ne!(padded, plain);
    }

    #[test]
    fn rejects_expired_timestamp() {
        let ts = NOW.to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts);
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", &ts, &sig, NOW + 400, 300),
            Err(VerifyError::TimestampOutOfWindow {
                request: NOW,
                server: NOW + 400
            })
        );
    }

    #[test]
    fn window_is_symmetric() {
        let ts = (NOW + 200).to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts);
        // A slightly-future timestamp is inside the window.
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", &ts, &sig, NOW, 300),
            Ok(())
        );
    }

    #[test]
    fn rejects_cross_action_replay() {
        let ts = NOW.to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts);
        assert_eq!(
            verify_signature(SECRET, "subscribe-delete", &ts, &sig, NOW, 300),
            Err(VerifyError::SignatureMismatch)
        );
    }

    #[test]
    fn rejects_tampered_signature() {
        let ts = NOW.to_string();
        let mut sig = sign_action(SECRET, "subscribe-add", &ts);
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", &ts, &sig, NOW, 300),
            Err(VerifyError::SignatureMismatch)
        );
    }

    #[test]
    fn rejects_uppercase_signature() {
        let ts = NOW.to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts).to_uppercase();
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", &ts, &sig, NOW, 300),
            Err(VerifyError::SignatureMismatch)
        );
    }

    #[test]
    fn rejects_missing_headers() {
        let ts = NOW.to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts);
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", "", &sig, NOW, 300),
            Err(VerifyError::MissingHeaders)
        );
        assert_eq!(
            verify_signature(SECRET, "subscribe-add", &ts, "", NOW, 300),
            Err(VerifyError::MissingHeaders)
        );
    }

    #[test]
    fn rejects_malformed_timestamp() {
        for raw in ["not-a-number", "12.5", "-5", "99999999999999999999999999"] {
            let outcome = verify_signature(SECRET, "subscribe-add", raw, "aa", NOW, 300);
            assert_eq!(outcome, Err(VerifyError::MalformedTimestamp), "input {raw:?}");
        }
    }

    #[test]
    fn empty_secret_is_a_configuration_error_not_a_mismatch() {
        let ts = NOW.to_string();
        let sig = sign_action(SECRET, "subscribe-add", &ts);
        assert_eq!(
            verify_signature(b"", "subscribe-add", &ts, &sig, NOW, 300),
            Err(VerifyError::SecretNotConfigured)
        );
    }
}
