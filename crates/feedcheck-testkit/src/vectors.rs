//! Golden messages for cross-implementation verification.
//!
//! These are real feed messages whose identifiers were computed by other
//! implementations. Any change to the canonical encoding shows up here first.

use serde_json::{json, Value};

use feedcheck_core::{HmacKeyInput, Message, ValidationError};

/// A golden message.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The message exactly as published.
    pub message: Value,
    /// Base64 HMAC key the message was signed under, if any.
    pub hmac_key: Option<&'static str>,
    /// Expected message id, in sigil form.
    pub expected_id: &'static str,
}

impl GoldenVector {
    /// The HMAC key as caller input.
    pub fn key_input(&self) -> Option<HmacKeyInput> {
        self.hmac_key.map(HmacKeyInput::from)
    }
}

/// A contact message, standard key order, no signing domain.
pub fn contact_message() -> GoldenVector {
    GoldenVector {
        name: "contact message",
        message: json!({
            "previous": "%IIjwbJbV3WBE/SBLnXEv5XM3Pr+PnMkrAJ8F+7TsUVQ=.sha256",
            "author": "@U5GvOKP/YUza9k53DSXxT0mk3PIrnyAmessvNfZl5E0=.ed25519",
            "sequence": 8,
            "timestamp": 1470187438539u64,
            "hash": "sha256",
            "content": {
                "type": "contact",
                "contact": "@ye+QM09iPcDJD6YvQYjoQc7sLF/IFhmNbEqgdzQo3lQ=.ed25519",
                "following": true,
                "blocking": false
            },
            "signature": "PkZ34BRVSmGG51vMXo4GvaoS/2NBc0lzdFoVv4wkI8E8zXv4QYyE5o2mPACKOcrhrLJpymLzqpoE70q78INuBg==.sig.ed25519"
        }),
        hmac_key: None,
        expected_id: "%kmXb3MXtBJaNugcEL/Q7G40DgcAkMNTj3yhmxKHjfCM=.sha256",
    }
}

/// A first message in legacy key order, signed inside an HMAC domain.
pub fn hmac_message() -> GoldenVector {
    GoldenVector {
        name: "hmac legacy-order message",
        message: json!({
            "previous": null,
            "sequence": 1,
            "author": "@EnPSnV1HZdyE7pcKxqukyhmnwE9076RtAlYclaUMX5g=.ed25519",
            "timestamp": 1624360181359u64,
            "hash": "sha256",
            "content": { "type": "example" },
            "signature": "w670wqnD1A5blFaYxDiIhPOTwz8I7syVx30jac1feQK/OywHFfrcLVw2S1KmxK9GzWxvKxLMle/jKjf2+pHtAg==.sig.ed25519"
        }),
        hmac_key: Some("CbwuwYXmZgN7ZSuycCXoKGOTU1dGwBex+paeA2kr37U="),
        expected_id: "%8RL6pJ+3zdcX4v9wv3inbWzlnQH7ZV4Hi0Nvzdfibu0=.sha256",
    }
}

/// Get all golden messages.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![contact_message(), hmac_message()]
}

/// Compute the id of a golden message.
pub fn compute_vector_id(vector: &GoldenVector) -> Result<String, ValidationError> {
    Ok(Message::parse(&vector.message)?.compute_id().to_string())
}

/// Check every golden message: returns (name, matches, computed id).
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match compute_vector_id(v) {
            Ok(id) => (v.name.to_string(), id == v.expected_id, id),
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}
