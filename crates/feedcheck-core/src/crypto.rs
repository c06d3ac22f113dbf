//! Cryptographic primitives for feedcheck.
//!
//! Wraps Ed25519 signing, SHA-256 hashing and the HMAC-SHA-512-256 signing
//! domain with strong types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, KeyDefect, ValidationError};
use crate::types::decode_sigil;

/// Length of a signing-domain HMAC key.
pub const HMAC_KEY_LEN: usize = 32;

type HmacSha512 = Hmac<Sha512>;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

/// A feed identifier: the author's 32-byte Ed25519 public key.
///
/// Textual form is `@<base64>.ed25519`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedId(pub [u8; 32]);

impl FeedId {
    pub const SIGIL: &'static str = "@";
    pub const SUFFIX: &'static str = ".ed25519";

    /// Create from raw bytes.
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

    /// Parse the `@<base64>.ed25519` form.
    pub fn from_sigil(s: &str) -> Result<Self, CoreError> {
        decode_sigil(s, Self::SIGIL, Self::SUFFIX).map(Self)
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig = Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", Self::SIGIL, STANDARD.encode(self.0), Self::SUFFIX)
    }
}

impl FromStr for FeedId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_sigil(s)
    }
}

impl Serialize for FeedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_sigil(&s).map_err(serde::de::Error::custom)
    }
}

/// A 64-byte Ed25519 signature.
///
/// Textual form is `<base64>.sig.ed25519`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    pub const SUFFIX: &'static str = ".sig.ed25519";

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the `<base64>.sig.ed25519` form.
    pub fn from_sigil(s: &str) -> Result<Self, CoreError> {
        decode_sigil(s, "", Self::SUFFIX).map(Self)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", STANDARD.encode(self.0), Self::SUFFIX)
    }
}

/// A keypair for signing feed messages.
///
/// Validation never signs; this exists for fixtures and callers that publish.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// The feed this keypair authors.
    pub fn feed_id(&self) -> FeedId {
        FeedId(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.feed_id())
    }
}

/// An HMAC key as handed over by a caller, before decoding.
#[derive(Clone, PartialEq, Eq)]
pub enum HmacKeyInput {
    /// Raw key bytes.
    Bytes(Vec<u8>),
    /// Standard, padded base64.
    Base64(String),
}

impl fmt::Debug for HmacKeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HmacKeyInput::Bytes(b) => write!(f, "HmacKeyInput::Bytes(<{} bytes>)", b.len()),
            HmacKeyInput::Base64(s) => write!(f, "HmacKeyInput::Base64(<{} chars>)", s.len()),
        }
    }
}

impl From<&str> for HmacKeyInput {
    fn from(s: &str) -> Self {
        HmacKeyInput::Base64(s.to_owned())
    }
}

impl From<String> for HmacKeyInput {
    fn from(s: String) -> Self {
        HmacKeyInput::Base64(s)
    }
}

impl From<Vec<u8>> for HmacKeyInput {
    fn from(b: Vec<u8>) -> Self {
        HmacKeyInput::Bytes(b)
    }
}

/// A decoded signing-domain key.
///
/// Messages signed under a key sign `HMAC-SHA-512-256(key, bytes)` instead
/// of the bytes themselves, so they never verify outside that domain.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey([u8; HMAC_KEY_LEN]);

impl HmacKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; HMAC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode caller input into a key.
    pub fn decode(input: &HmacKeyInput) -> Result<Self, ValidationError> {
        match input {
            HmacKeyInput::Bytes(b) => Self::from_slice(b),
            HmacKeyInput::Base64(s) => Self::from_base64(s),
        }
        .map_err(ValidationError::InvalidKeyEncoding)
    }

    /// Decode an optional caller key. `None` means no signing domain.
    pub fn decode_optional(input: Option<&HmacKeyInput>) -> Result<Option<Self>, ValidationError> {
        input.map(Self::decode).transpose()
    }

    /// Parse a base64 key string.
    pub fn from_base64(s: &str) -> Result<Self, KeyDefect> {
        let bytes = STANDARD.decode(s).map_err(|_| KeyDefect::NotBase64)?;
        Self::from_slice(&bytes)
    }

    /// Take a key from a byte slice of exactly [`HMAC_KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyDefect> {
        let arr: [u8; HMAC_KEY_LEN] = bytes.try_into().map_err(|_| KeyDefect::WrongLength {
            expected: HMAC_KEY_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Base64 form of the key.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// HMAC-SHA-512 truncated to 256 bits.
    pub fn authenticate(&self, data: &[u8]) -> Result<[u8; 32], CoreError> {
        let mut mac = HmacSha512::new_from_slice(&self.0).map_err(|_| CoreError::InvalidLength {
            expected: HMAC_KEY_LEN,
            got: self.0.len(),
        })?;
        mac.update(data);
        let full = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&full[..32]);
        Ok(out)
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HmacKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        keypair
            .feed_id()
            .verify(message, &signature)
            .expect("valid signature should verify");

        let tampered = b"hello worlD";
        assert!(keypair.feed_id().verify(tampered, &signature).is_err());
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.feed_id(), kp2.feed_id());
    }

    #[test]
    fn test_sha256_known_answer() {
        assert_eq!(
            Sha256Hash::hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_feed_id_sigil_roundtrip() {
        let id = Keypair::from_seed(&[7; 32]).feed_id();
        let text = id.to_string();
        assert!(text.starts_with('@') && text.ends_with(".ed25519"));
        assert_eq!(FeedId::from_sigil(&text).unwrap(), id);
    }

    #[test]
    fn test_signature_sigil_roundtrip() {
        let sig = Keypair::from_seed(&[7; 32]).sign(b"x");
        let text = sig.to_string();
        assert!(text.ends_with(".sig.ed25519"));
        assert_eq!(Ed25519Signature::from_sigil(&text).unwrap(), sig);
    }

    #[test]
    fn test_hmac_key_from_base64_and_bytes_agree() {
        let b64 = "CbwuwYXmZgN7ZSuycCXoKGOTU1dGwBex+paeA2kr37U=";
        let from_str = HmacKey::decode(&HmacKeyInput::from(b64)).unwrap();
        let raw = STANDARD.decode(b64).unwrap();
        let from_bytes = HmacKey::decode(&HmacKeyInput::Bytes(raw)).unwrap();
        assert_eq!(from_str, from_bytes);
        assert_eq!(from_str.to_base64(), b64);
    }

    #[test]
    fn test_hmac_key_rejects_non_base64() {
        let err = HmacKey::decode(&HmacKeyInput::from("isnotvalid")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidKeyEncoding(KeyDefect::NotBase64));
    }

    #[test]
    fn test_hmac_key_rejects_wrong_length() {
        let err = HmacKey::decode(&HmacKeyInput::Bytes(vec![1; 16])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidKeyEncoding(KeyDefect::WrongLength {
                expected: 32,
                got: 16
            })
        );
    }

    #[test]
    fn test_hmac_domains_differ() {
        let k1 = HmacKey::from_bytes([1; 32]);
        let k2 = HmacKey::from_bytes([2; 32]);
        let a = k1.authenticate(b"data").unwrap();
        let b = k2.authenticate(b"data").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, k1.authenticate(b"data").unwrap());
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = HmacKey::from_bytes([9; 32]);
        assert_eq!(format!("{:?}", key), "HmacKey(<redacted>)");
    }
}
