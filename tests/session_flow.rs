use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use secrecy::SecretString;
use std::time::Duration;
use ttw::{
    environment::Environment,
    rate_limit::{InMemoryRateLimiter, RateLimiter},
    session::{
        decode, encode, split_token, Identity, Role, SessionConfig, SessionCookies, SessionError,
        SessionPayload, SigningSecret, TokenSigner, TOKEN_VERSION,
    },
};

fn cookies(ttl_seconds: i64) -> SessionCookies {
    let secret = SigningSecret::resolve(
        Some(SecretString::from("integration-secret")),
        Environment::Production,
    );
    let Ok(signer) = secret.and_then(|secret| TokenSigner::new(&secret, Environment::Production))
    else {
        panic!("signer should build with a configured secret");
    };
    let config = SessionConfig::new(Environment::Production).with_ttl_seconds(ttl_seconds);
    let Ok(cookies) = SessionCookies::new(config, signer) else {
        panic!("default cookie name is valid");
    };
    cookies
}

// Turn the response's first Set-Cookie into the next request's Cookie header.
fn follow(response: &HeaderMap) -> HeaderMap {
    let mut request = HeaderMap::new();
    let pair = response
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .and_then(|pair| HeaderValue::from_str(pair).ok());
    if let Some(pair) = pair {
        request.insert(COOKIE, pair);
    }
    request
}

#[test]
fn issued_session_is_read_back() {
    let cookies = cookies(3600);
    let mut response = HeaderMap::new();
    let issued = cookies.issue(&Identity::new("42", Role::User), &mut response);
    assert!(issued.is_ok());

    let set_cookie = response
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(set_cookie.ends_with("; Secure"));

    let current = cookies.current_identity(&follow(&response));
    assert_eq!(
        current.map(|payload| payload.identity()),
        Some(Identity::new("42", Role::User))
    );
}

#[test]
fn logout_leaves_no_session() {
    let cookies = cookies(3600);
    let mut login = HeaderMap::new();
    assert!(cookies
        .issue(&Identity::new("42", Role::User), &mut login)
        .is_ok());

    let mut logout = HeaderMap::new();
    assert!(cookies.clear(&mut logout).is_ok());
    assert!(cookies.current_identity(&follow(&logout)).is_none());
}

#[test]
fn negative_ttl_is_already_expired() {
    let cookies = cookies(-1);
    let mut response = HeaderMap::new();
    assert!(cookies
        .issue(&Identity::new("42", Role::Admin), &mut response)
        .is_ok());
    assert!(cookies.current_identity(&follow(&response)).is_none());
}

#[test]
fn every_payload_byte_flip_is_rejected() {
    let cookies = cookies(3600);
    let mut response = HeaderMap::new();
    assert!(cookies
        .issue(&Identity::new("42", Role::User), &mut response)
        .is_ok());
    let request = follow(&response);
    let cookie = request
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let Some((name, token)) = cookie.split_once('=') else {
        panic!("cookie pair expected");
    };
    let Some((payload, signature)) = split_token(token) else {
        panic!("token has two segments");
    };

    for index in 0..payload.len() {
        let mut bytes = payload.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'a' { b'b' } else { b'a' };
        let flipped = String::from_utf8(bytes).unwrap_or_default();
        if flipped == payload {
            continue;
        }
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("{name}={flipped}.{signature}")) {
            headers.insert(COOKIE, value);
        }
        assert!(cookies.current_identity(&headers).is_none(), "byte {index}");
    }
}

#[test]
fn payload_round_trips_through_encoding() {
    for role in [Role::User, Role::Admin] {
        let payload = SessionPayload::new(&Identity::new("subject-1", role), 1_700_000_000);
        assert_eq!(payload.version, TOKEN_VERSION);
        let decoded = encode(&payload).ok().and_then(|encoded| decode(&encoded));
        assert_eq!(decoded, Some(payload));
    }
}

#[test]
fn signatures_of_other_lengths_never_verify() {
    let Ok(secret) = SigningSecret::resolve(
        Some(SecretString::from("integration-secret")),
        Environment::Development,
    ) else {
        panic!("configured secret resolves");
    };
    let Ok(signer) = TokenSigner::new(&secret, Environment::Development) else {
        panic!("signer builds");
    };
    let signature = signer.sign("payload");
    assert!(signer.verify("payload", &signature));
    assert!(!signer.verify("payload", &signature[..signature.len() - 4]));
    assert!(!signer.verify("payload", &format!("{signature}AAAA")));
    assert!(!signer.verify("payload", ""));
    assert!(!signer.verify("payload", "!!not base64!!"));
}

#[test]
fn production_requires_a_secret() {
    assert!(matches!(
        SigningSecret::resolve(None, Environment::Production),
        Err(SessionError::MissingSecret)
    ));
    assert!(matches!(
        SigningSecret::resolve(Some(SecretString::from("")), Environment::Production),
        Err(SessionError::MissingSecret)
    ));

    let Ok(fallback) = SigningSecret::resolve(None, Environment::Development) else {
        panic!("development falls back");
    };
    assert!(fallback.is_insecure());
    assert!(matches!(
        TokenSigner::new(&fallback, Environment::Production),
        Err(SessionError::InsecureSecret)
    ));
}

#[test]
fn login_budget_counts_down_and_resets() {
    let limiter = InMemoryRateLimiter::new();
    let window = Duration::from_millis(60_000);
    let now = 1_000_000;

    let remaining: Vec<u32> = (0..5)
        .map(|_| limiter.check_at("k", 5, window, now))
        .map(|decision| decision.remaining)
        .collect();
    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

    let sixth = limiter.check_at("k", 5, window, now);
    assert!(!sixth.allowed);
    assert_eq!(sixth.remaining, 0);

    let after = limiter.check_at("k", 5, window, sixth.reset_at);
    assert!(after.allowed);
    assert_eq!(after.remaining, 4);
}

#[test]
fn limiter_is_usable_behind_the_trait() {
    let limiter: Box<dyn RateLimiter> = Box::new(InMemoryRateLimiter::new());
    assert!(limiter.check("admin-login:203.0.113.9", 1, Duration::from_secs(60)).allowed);
    assert!(!limiter.check("admin-login:203.0.113.9", 1, Duration::from_secs(60)).allowed);
}
