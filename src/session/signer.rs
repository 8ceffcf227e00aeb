//! HMAC-SHA256 signing of encoded session payloads.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::fmt;
use tracing::warn;

use super::{
    error::{Rejection, SessionError},
    payload::{self, SessionPayload},
};
use crate::environment::Environment;

type HmacSha256 = Hmac<Sha256>;

/// Raw HMAC-SHA256 output length in bytes.
const SIGNATURE_LEN: usize = 32;

/// Separator between the encoded payload and its signature.
pub const TOKEN_SEPARATOR: char = '.';

const DEVELOPMENT_FALLBACK_SECRET: &str = "ttw-development-only-insecure-session-secret";

/// Key material for session signatures.
///
/// Can only be built through [`SigningSecret::resolve`], which is the single
/// place allowed to fall back to the insecure development key.
#[derive(Clone, Debug)]
pub struct SigningSecret {
    key: SecretString,
    insecure: bool,
}

impl SigningSecret {
    /// Pick the signing secret for the given deployment.
    ///
    /// # Errors
    /// Returns [`SessionError::MissingSecret`] when no (non-empty) secret is
    /// configured in production.
    pub fn resolve(
        configured: Option<SecretString>,
        environment: Environment,
    ) -> Result<Self, SessionError> {
        match configured {
            Some(key) if !key.expose_secret().is_empty() => Ok(Self {
                key,
                insecure: false,
            }),
            _ if environment.is_production() => Err(SessionError::MissingSecret),
            _ => {
                warn!("No session secret configured, using the insecure development fallback");
                Ok(Self {
                    key: SecretString::from(DEVELOPMENT_FALLBACK_SECRET),
                    insecure: true,
                })
            }
        }
    }

    #[must_use]
    pub const fn is_insecure(&self) -> bool {
        self.insecure
    }
}

#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// # Errors
    /// Refuses the development fallback secret in production.
    pub fn new(secret: &SigningSecret, environment: Environment) -> Result<Self, SessionError> {
        if secret.is_insecure() && environment.is_production() {
            return Err(SessionError::InsecureSecret);
        }

        let mac = HmacSha256::new_from_slice(secret.key.expose_secret().as_bytes())
            .map_err(|_| SessionError::InvalidKey)?;

        Ok(Self { mac })
    }

    /// Signature over the encoded payload, as unpadded base64url.
    #[must_use]
    pub fn sign(&self, encoded_payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes())
    }

    /// Check `signature` against the encoded payload in constant time.
    ///
    /// Signatures that are not base64url or not exactly one MAC long are
    /// rejected before any comparison; the length is not secret.
    #[must_use]
    pub fn verify(&self, encoded_payload: &str, signature: &str) -> bool {
        let Ok(supplied) = Base64UrlUnpadded::decode_vec(signature) else {
            return false;
        };
        if supplied.len() != SIGNATURE_LEN {
            return false;
        }

        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        mac.verify_slice(&supplied).is_ok()
    }

    /// Build the composite `"<payload>.<signature>"` token.
    ///
    /// # Errors
    /// Returns an error if the payload cannot be serialized.
    pub fn seal(&self, payload: &SessionPayload) -> Result<String, SessionError> {
        let encoded = payload::encode(payload)?;
        let signature = self.sign(&encoded);
        Ok(format!("{encoded}{TOKEN_SEPARATOR}{signature}"))
    }

    /// Split, verify and decode a composite token. Expiry is not checked here.
    pub(crate) fn unseal(&self, token: &str) -> Result<SessionPayload, Rejection> {
        let (encoded, signature) = split_token(token).ok_or(Rejection::MalformedToken)?;
        if !self.verify(encoded, signature) {
            return Err(Rejection::BadSignature);
        }
        payload::parse(encoded)
    }
}

/// Split a token into its payload and signature segments.
///
/// Returns `None` unless there is exactly one separator and both sides are
/// non-empty.
#[must_use]
pub fn split_token(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split(TOKEN_SEPARATOR);
    let (Some(encoded), Some(signature), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if encoded.is_empty() || signature.is_empty() {
        return None;
    }
    Some((encoded, signature))
}
