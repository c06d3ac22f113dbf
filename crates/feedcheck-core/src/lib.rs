//! # feedcheck core
//!
//! Pure validation primitives for signed, hash-chained feeds.
//!
//! This crate contains no I/O, no async and no storage. It answers one
//! question: is a message (or a batch of messages) a legitimate continuation
//! of, or a legitimately signed member of, an author's feed?
//!
//! ## Key Types
//!
//! - [`Message`] - One signed feed entry; parsing it is the shape check
//! - [`MsgId`] - Content-addressed message identifier (SHA-256)
//! - [`FeedId`] - An author's Ed25519 public key
//! - [`ValidationState`] - Per-run, per-author chain state
//! - [`ValidationError`] - The closed set of failures
//!
//! ## Canonicalization
//!
//! Signatures and identifiers are computed over a fixed JSON text layout.
//! See the [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod feed;
pub mod message;
pub mod types;
pub mod validation;

pub use canonical::{id_of, signing_bytes};
pub use crypto::{Ed25519Signature, FeedId, HmacKey, HmacKeyInput, Keypair, Sha256Hash, HMAC_KEY_LEN};
pub use error::{CoreError, ErrorKind, KeyDefect, ShapeDefect, ValidationError};
pub use feed::{ChainPosition, FeedState, ValidationState};
pub use message::{FieldOrder, Message, MessageBuilder, MAX_MESSAGE_LEN, MAX_SEQUENCE};
pub use types::MsgId;
pub use validation::{
    validate_batch, validate_batch_value, validate_single, validate_single_value,
    verify_signature, verify_signatures, verify_signatures_value,
};
