//! # feedcheck
//!
//! Validation entry points for signed, hash-chained feeds.
//!
//! Callers hand over messages as parsed JSON, exactly as they arrived, and
//! get back message identifiers or a classified error. The [`Validator`]
//! offers five entry points:
//!
//! - [`Validator::verify_signatures`] - signatures only, any order, any authors
//! - [`Validator::validate_single`] - one message, optionally continuing a feed
//! - [`Validator::validate_batch`] - consecutive messages, all or nothing
//! - [`Validator::validate_ooo_batch`] - signatures only, out of order
//! - [`Validator::validate_multi_author_batch`] - signatures only, many authors
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedcheck::{HmacKeyInput, Validator};
//! use serde_json::json;
//!
//! # async fn run(messages: serde_json::Value) -> feedcheck::Result<()> {
//! let validator = Validator::default();
//! validator.ready().await?;
//!
//! let ids = validator.validate_batch(None, &messages, None).await?;
//! println!("accepted {} messages", ids.len());
//!
//! let key = HmacKeyInput::from("CbwuwYXmZgN7ZSuycCXoKGOTU1dGwBex+paeA2kr37U=");
//! let ids = validator.verify_signatures(Some(&key), &messages).await?;
//! # let _ = (ids, json!(null));
//! # Ok(())
//! # }
//! ```
//!
//! The pure primitives live in [`core`].

pub mod backend;
pub mod error;
pub mod validator;

pub use feedcheck_core as core;

pub use backend::{is_ready, ready, Backend};
pub use error::{Error, Result};
pub use validator::{Validator, ValidatorConfig};

pub use feedcheck_core::{
    ErrorKind, FeedId, HmacKey, HmacKeyInput, KeyDefect, Keypair, Message, MessageBuilder, MsgId,
    ShapeDefect, ValidationError,
};
