//! Basic credential gate for the provisioning endpoint.

use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

/// Basic credentials are accepted with or without `=` padding, as common
/// HTTP clients differ here.
const BASIC_CREDENTIALS: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Accept/reject decision against the configured credential pair.
///
/// Only SHA-256 digests of the expected values are kept; presented values
/// are digested the same way and compared in constant time, so neither the
/// length nor the content of the secret leaks through timing.
#[derive(Clone)]
pub struct AuthGate {
    username_digest: [u8; 32],
    password_digest: [u8; 32],
    realm: Arc<str>,
}

impl AuthGate {
    pub fn new(username: &str, password: &str, realm: &str) -> Self {
        Self {
            username_digest: Self::digest(username),
            password_digest: Self::digest(password),
            realm: Arc::from(realm),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.username, &config.password, &config.realm)
    }

    /// Realm announced in the authentication challenge.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    fn digest(value: &str) -> [u8; 32] {
        Sha256::digest(value.as_bytes()).into()
    }

    /// True iff a credential pair was presented and equals the configured one.
    pub fn authorize(
        &self,
        presented_identity: Option<&str>,
        presented_secret: Option<&str>,
    ) -> bool {
        let (Some(identity), Some(secret)) = (presented_identity, presented_secret) else {
            return false;
        };

        let identity_ok = Self::digest(identity)[..].ct_eq(&self.username_digest[..]);
        let secret_ok = Self::digest(secret)[..].ct_eq(&self.password_digest[..]);

        bool::from(identity_ok & secret_ok)
    }
}

/// Parse a `Basic <base64(user:password)>` header value.
///
/// The scheme is matched case-insensitively and the decoded pair is split on
/// the first `:`, so passwords may themselves contain colons. Anything else
/// yields `None`.
pub fn parse_basic_authorization(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASIC_CREDENTIALS.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (identity, secret) = decoded.split_once(':')?;

    Some((identity.to_string(), secret.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

    fn gate() -> AuthGate {
        AuthGate::new("admin", "secret", "Restricted Area")
    }

    fn basic(pair: &str) -> String {
        format!("Basic {}", STANDARD.encode(pair))
    }

    #[test]
    fn test_exact_pair_is_accepted() {
        assert!(gate().authorize(Some("admin"), Some("secret")));
    }

    #[test]
    fn test_wrong_or_absent_pairs_are_rejected() {
        let gate = gate();

        assert!(!gate.authorize(Some("admin"), Some("wrong")));
        assert!(!gate.authorize(Some("root"), Some("secret")));
        assert!(!gate.authorize(Some("admin"), Some("secret ")));
        assert!(!gate.authorize(Some("Admin"), Some("secret")));
        assert!(!gate.authorize(Some(""), Some("")));
        assert!(!gate.authorize(None, Some("secret")));
        assert!(!gate.authorize(Some("admin"), None));
        assert!(!gate.authorize(None, None));
    }

    #[test]
    fn test_parse_basic_header() {
        assert_eq!(
            parse_basic_authorization(&basic("admin:secret")),
            Some(("admin".to_string(), "secret".to_string()))
        );
        assert_eq!(
            parse_basic_authorization(&format!("bAsIc {}", STANDARD.encode("a:b"))),
            Some(("a".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        assert_eq!(
            parse_basic_authorization(&basic("admin:se:cr:et")),
            Some(("admin".to_string(), "se:cr:et".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_headers() {
        assert_eq!(parse_basic_authorization("Bearer abc.def"), None);
        assert_eq!(parse_basic_authorization("Basic"), None);
        assert_eq!(parse_basic_authorization("Basic !!!not-base64"), None);
        assert_eq!(parse_basic_authorization(&basic("no-colon")), None);
    }

    #[test]
    fn test_unpadded_credentials_are_accepted() {
        let gate = AuthGate::new("admin", "secret1", "Restricted Area");
        let padded = format!("Basic {}", STANDARD.encode("admin:secret1"));
        let unpadded = format!("Basic {}", STANDARD_NO_PAD.encode("admin:secret1"));
        assert!(padded.ends_with('='));
        assert!(!unpadded.ends_with('='));

        for header in [padded, unpadded] {
            let (identity, secret) = parse_basic_authorization(&header).unwrap();
            assert!(gate.authorize(Some(&identity), Some(&secret)));
        }
    }
}
