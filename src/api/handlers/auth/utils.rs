//! Small helpers for auth input handling.

use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;

const MAX_TEXT_LEN: usize = 256;
const COMPARE_KEY: &[u8] = b"ttw-constant-time-compare";

/// Normalize an email for lookup.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    email_normalized.len() <= MAX_TEXT_LEN
        && Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Trim, drop control characters and cap the length of free-form input.
pub(super) fn sanitize_text(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_TEXT_LEN)
        .collect()
}

/// Sanitized, normalized login identifier; `None` when the input is too long
/// to be one rather than silently truncating it.
pub(super) fn login_identifier(raw: &str) -> Option<String> {
    if raw.trim().chars().count() > MAX_TEXT_LEN {
        return None;
    }
    Some(normalize_email(&sanitize_text(raw)))
}

/// Compare two secrets without leaking where they differ or how long `expected` is.
///
/// Both sides are MACed under the same key and the tags are compared with
/// the MAC's constant-time check.
pub(super) fn secrets_match(expected: &str, candidate: &str) -> bool {
    let Ok(mac) = Hmac::<Sha256>::new_from_slice(COMPARE_KEY) else {
        return false;
    };

    let mut expected_mac = mac.clone();
    expected_mac.update(expected.as_bytes());
    let expected_tag = expected_mac.finalize().into_bytes();

    let mut candidate_mac = mac;
    candidate_mac.update(candidate.as_bytes());
    candidate_mac.verify_slice(&expected_tag).is_ok()
}
