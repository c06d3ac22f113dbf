//! Strong type definitions for feed identifiers.
//!
//! Identifiers are newtypes over raw bytes; their textual form (sigil,
//! base64 body, algorithm suffix) only exists at the edges.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::crypto::Sha256Hash;
use crate::error::CoreError;

/// Decode a `<sigil><base64><suffix>` string into exactly `N` bytes.
pub(crate) fn decode_sigil<const N: usize>(
    s: &str,
    sigil: &str,
    suffix: &'static str,
) -> Result<[u8; N], CoreError> {
    let body = s
        .strip_prefix(sigil)
        .and_then(|rest| rest.strip_suffix(suffix))
        .ok_or(CoreError::InvalidSigil { expected: suffix })?;
    let bytes = STANDARD.decode(body)?;
    let got = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CoreError::InvalidLength { expected: N, got })
}

/// A 32-byte message identifier: the SHA-256 of the message's id bytes.
///
/// Textual form is `%<base64>.sha256`. Two byte-identical messages always
/// have the same MsgId.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MsgId(pub [u8; 32]);

impl MsgId {
    pub const SIGIL: &'static str = "%";
    pub const SUFFIX: &'static str = ".sha256";

    /// Create a new MsgId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the `%<base64>.sha256` form.
    pub fn from_sigil(s: &str) -> Result<Self, CoreError> {
        decode_sigil(s, Self::SIGIL, Self::SUFFIX).map(Self)
    }
}

impl fmt::Debug for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MsgId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", Self::SIGIL, STANDARD.encode(self.0), Self::SUFFIX)
    }
}

impl FromStr for MsgId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_sigil(s)
    }
}

impl AsRef<[u8]> for MsgId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for MsgId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Sha256Hash> for MsgId {
    fn from(hash: Sha256Hash) -> Self {
        Self(hash.0)
    }
}

impl Serialize for MsgId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MsgId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_sigil(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_id_sigil_roundtrip() {
        let id = MsgId::from_bytes([0x42; 32]);
        let text = id.to_string();
        assert!(text.starts_with('%'));
        assert!(text.ends_with(".sha256"));
        assert_eq!(MsgId::from_sigil(&text).unwrap(), id);
    }

    #[test]
    fn test_msg_id_rejects_wrong_suffix() {
        let text = format!("%{}.blake3", STANDARD.encode([1u8; 32]));
        assert!(matches!(
            MsgId::from_sigil(&text),
            Err(CoreError::InvalidSigil { .. })
        ));
    }

    #[test]
    fn test_msg_id_rejects_short_body() {
        let text = format!("%{}.sha256", STANDARD.encode([1u8; 16]));
        assert!(matches!(
            MsgId::from_sigil(&text),
            Err(CoreError::InvalidLength { expected: 32, got: 16 })
        ));
    }

    #[test]
    fn test_msg_id_debug() {
        let id = MsgId::from_bytes([0xcd; 32]);
        let debug = format!("{:?}", id);
        assert_eq!(debug, "MsgId(cdcdcdcdcdcdcdcd)");
    }

    #[test]
    fn test_msg_id_serde_as_string() {
        let id = MsgId::from_bytes([0x07; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: MsgId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
