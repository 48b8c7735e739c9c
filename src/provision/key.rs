//! Decoding and normalization of submitted public keys.

use std::borrow::Cow;
use std::fmt;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::error::{ProvisionError, ProvisionResult};

/// Body of a key submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublicKeySubmission {
    /// Base64 encoded OpenSSH public key line.
    #[schema(example = "c3NoLWVkMjU1MTkgQUFBQS4uLiB1c2VyQGhvc3Q=")]
    pub ssh_public_key: Option<String>,
}

/// A decoded public key, always terminated by exactly one newline.
///
/// Kept as raw bytes: strict base64 may decode to text that is not UTF-8
/// (a Latin-1 comment, say) and it is persisted unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedKey(Vec<u8>);

impl DecodedKey {
    /// Normalize `raw` so it ends with a single `\n`.
    pub fn new(raw: impl AsRef<[u8]>) -> Self {
        let raw = raw.as_ref();
        let end = raw.iter().rposition(|&b| b != b'\n').map_or(0, |i| i + 1);

        let mut key = raw[..end].to_vec();
        key.push(b'\n');
        Self(key)
    }

    /// Decode a request body of the form `{"ssh_public_key": "<base64>"}`.
    pub fn from_submission(body: &[u8]) -> ProvisionResult<Self> {
        let payload: Value =
            serde_json::from_slice(body).map_err(|_| ProvisionError::MalformedPayload)?;
        if !payload.is_object() {
            return Err(ProvisionError::MalformedPayload);
        }

        // Only a non-string property can fail once the body is an object.
        let submission: PublicKeySubmission =
            serde_json::from_value(payload).map_err(|_| ProvisionError::InvalidEncoding)?;
        let encoded = submission
            .ssh_public_key
            .ok_or(ProvisionError::MissingField)?;

        // STANDARD is strict: canonical padding, no whitespace.
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| ProvisionError::InvalidEncoding)?;

        Ok(Self::new(decoded))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key as text, with invalid UTF-8 replaced.
    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// OpenSSH style `SHA256:` fingerprint for log lines.
    ///
    /// Entries that do not carry a `<type> <blob>` pair whose blob names the
    /// same type are fingerprinted over the whole line and tagged `line-`.
    pub fn fingerprint(&self) -> String {
        let tokens: Vec<&[u8]> = self
            .0
            .split(u8::is_ascii_whitespace)
            .filter(|token| !token.is_empty())
            .collect();

        for pair in tokens.windows(2) {
            if let Ok(blob) = STANDARD.decode(pair[1]) {
                if blob_key_type(&blob) == Some(pair[0]) {
                    return format!("SHA256:{}", STANDARD_NO_PAD.encode(Sha256::digest(&blob)));
                }
            }
        }

        let line = &self.0[..self.0.len() - 1];
        format!("line-SHA256:{}", STANDARD_NO_PAD.encode(Sha256::digest(line)))
    }
}

impl fmt::Display for DecodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text_lossy())
    }
}

/// The key type string at the head of an SSH wire-format key blob.
fn blob_key_type(blob: &[u8]) -> Option<&[u8]> {
    let len_bytes: [u8; 4] = blob.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    blob.get(4..4usize.checked_add(len)?)
}
