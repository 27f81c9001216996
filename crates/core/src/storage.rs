//! Object paths and signed URLs for course images.
//!
//! Images live in a bucket behind the storage gateway. The API never hands
//! out bucket credentials; instead it returns short-lived URLs carrying an
//! HMAC-SHA256 token the gateway recomputes.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default lifetime of a signed URL (seconds).
pub const DEFAULT_SIGNED_URL_TTL_SECS: i64 = 3600;

/// Longest accepted object path.
pub const MAX_OBJECT_PATH_LEN: usize = 512;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Path validation
// ---------------------------------------------------------------------------

/// Object paths are relative, `/`-separated, and URL-safe without encoding.
pub fn validate_object_path(path: &str) -> Result<(), CoreError> {
    if path.trim().is_empty() {
        return Err(CoreError::Validation("Object path must not be empty".into()));
    }
    if path.len() > MAX_OBJECT_PATH_LEN {
        return Err(CoreError::Validation(format!(
            "Object path exceeds {MAX_OBJECT_PATH_LEN} characters"
        )));
    }
    if path.starts_with('/') {
        return Err(CoreError::Validation("Object path must be relative".into()));
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        return Err(CoreError::Validation(format!(
            "Invalid object path '{path}': empty or dot segments are not allowed"
        )));
    }
    if let Some(c) = path
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.')))
    {
        return Err(CoreError::Validation(format!(
            "Invalid character '{c}' in object path"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

fn signature(
    bucket: &str,
    path: &str,
    expires: i64,
    secret: &str,
) -> Result<HmacSha256, CoreError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Internal(format!("Invalid signing key: {e}")))?;
    mac.update(format!("{bucket}/{path}:{expires}").as_bytes());
    Ok(mac)
}

/// Build a URL for `bucket/path` that stays valid until `expires_at`.
pub fn sign_object_url(
    base_url: &str,
    bucket: &str,
    path: &str,
    expires_at: Timestamp,
    secret: &str,
) -> Result<String, CoreError> {
    validate_object_path(path)?;
    let expires = expires_at.timestamp();
    let token = hex::encode(signature(bucket, path, expires, secret)?.finalize().into_bytes());
    Ok(format!(
        "{}/storage/v1/object/sign/{bucket}/{path}?expires={expires}&token={token}",
        base_url.trim_end_matches('/')
    ))
}

/// Check a token produced by [`sign_object_url`].
///
/// The API only signs; this is the check the storage gateway runs when it
/// serves `/storage/v1/object/sign/...`, exported for that service and for
/// tests that pin the token format.
///
/// Fails with `Forbidden` when the token does not match or has expired.
pub fn verify_object_signature(
    bucket: &str,
    path: &str,
    expires: i64,
    token: &str,
    secret: &str,
    now: Timestamp,
) -> Result<(), CoreError> {
    if now.timestamp() > expires {
        return Err(CoreError::Forbidden("Signed URL has expired".into()));
    }
    let provided = hex::decode(token)
        .ok_or_else(|| CoreError::Forbidden("Malformed signature".into()))?;
    signature(bucket, path, expires, secret)?
        .verify_slice(&provided)
        .map_err(|_| CoreError::Forbidden("Invalid signature".into()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(text: &str) -> Option<Vec<u8>> {
        if text.len() % 2 != 0 {
            return None;
        }
        (0..text.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    const SECRET: &str = "test-signing-secret";

    fn token_of(url: &str) -> (i64, String) {
        let query = url.split_once('?').unwrap().1;
        let mut expires = 0;
        let mut token = String::new();
        for part in query.split('&') {
            match part.split_once('=').unwrap() {
                ("expires", v) => expires = v.parse().unwrap(),
                ("token", v) => token = v.to_string(),
                _ => {}
            }
        }
        (expires, token)
    }

    #[test]
    fn accepts_nested_relative_paths() {
        assert!(validate_object_path("org-1/courses/42/cover.png").is_ok());
    }

    #[test]
    fn rejects_bad_paths() {
        for bad in ["", "/abs.png", "a/../b.png", "a//b.png", "a/./b", "sp ace.png", "q?.png"] {
            assert_matches!(validate_object_path(bad), Err(CoreError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn signed_url_shape() {
        let expires_at = Utc::now() + Duration::seconds(60);
        let url = sign_object_url(
            "http://localhost:54321/",
            "course-images",
            "c/1.png",
            expires_at,
            SECRET,
        )
        .unwrap();
        assert!(
            url.starts_with("http://localhost:54321/storage/v1/object/sign/course-images/c/1.png?")
        );
        let (expires, token) = token_of(&url);
        assert_eq!(expires, expires_at.timestamp());
        assert_eq!(token.len(), 64);
    }

    #[test]
    fn round_trip_verifies() {
        let now = Utc::now();
        let url =
            sign_object_url("http://s", "b", "p.png", now + Duration::seconds(60), SECRET).unwrap();
        let (expires, token) = token_of(&url);
        assert!(verify_object_signature("b", "p.png", expires, &token, SECRET, now).is_ok());
    }

    #[test]
    fn tampered_or_expired_is_forbidden() {
        let now = Utc::now();
        let url =
            sign_object_url("http://s", "b", "p.png", now + Duration::seconds(60), SECRET).unwrap();
        let (expires, token) = token_of(&url);

        assert_matches!(
            verify_object_signature("b", "other.png", expires, &token, SECRET, now),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            verify_object_signature("b", "p.png", expires, &token, "wrong", now),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            verify_object_signature("b", "p.png", expires, "zz", SECRET, now),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            verify_object_signature(
                "b",
                "p.png",
                expires,
                &token,
                SECRET,
                now + Duration::seconds(120)
            ),
            Err(CoreError::Forbidden(_))
        );
    }
}
