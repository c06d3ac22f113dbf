//! Message: one signed entry in an author's feed.
//!
//! A message links to its predecessor by identifier and is signed by its
//! author over the canonical encoding of every other field. Parsing a
//! [`Message`] from JSON is the shape check: anything that parses is
//! well-formed.

use serde_json::{Map, Number, Value};

use crate::canonical::{self, encode, encoded_len};
use crate::crypto::{Ed25519Signature, FeedId, HmacKey, Keypair};
use crate::error::{CoreError, ShapeDefect, ValidationError};
use crate::types::MsgId;

/// Maximum canonical message length, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 8192;

/// The only supported content-hash scheme.
pub const HASH_ALGORITHM: &str = "sha256";

/// Largest sequence number: 2^53 - 1. Above it the canonical encoding can no
/// longer tell neighbouring integers apart.
pub const MAX_SEQUENCE: u64 = 9_007_199_254_740_991;

/// Bounds on `content.type` length, in UTF-16 code units.
pub const MIN_CONTENT_TYPE_LEN: usize = 3;
pub const MAX_CONTENT_TYPE_LEN: usize = 52;

/// Field keys.
mod keys {
    pub const PREVIOUS: &str = "previous";
    pub const AUTHOR: &str = "author";
    pub const SEQUENCE: &str = "sequence";
    pub const TIMESTAMP: &str = "timestamp";
    pub const HASH: &str = "hash";
    pub const CONTENT: &str = "content";
    pub const SIGNATURE: &str = "signature";

    pub const ALL: [&str; 7] = [PREVIOUS, AUTHOR, SEQUENCE, TIMESTAMP, HASH, CONTENT, SIGNATURE];
}

/// Order of the `author` and `sequence` keys.
///
/// Some long-lived feeds were written with `sequence` before `author`. The
/// order is part of the signed bytes, so it has to be remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldOrder {
    /// `previous, author, sequence, ...`
    #[default]
    Standard,
    /// `previous, sequence, author, ...`
    Legacy,
}

impl FieldOrder {
    fn keys(self) -> [&'static str; 7] {
        match self {
            FieldOrder::Standard => keys::ALL,
            FieldOrder::Legacy => [
                keys::PREVIOUS,
                keys::SEQUENCE,
                keys::AUTHOR,
                keys::TIMESTAMP,
                keys::HASH,
                keys::CONTENT,
                keys::SIGNATURE,
            ],
        }
    }
}

/// A well-formed feed message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Identifier of the prior message in this feed (None if sequence=1).
    pub previous: Option<MsgId>,

    /// The author's feed id.
    pub author: FeedId,

    /// Position within the feed (1-indexed).
    pub sequence: u64,

    /// Author-claimed creation time. Untrusted, kept verbatim.
    pub timestamp: Number,

    /// Content-hash scheme tag.
    pub hash: String,

    /// Application payload: an object with a `type`, or an encrypted box.
    pub content: Value,

    /// Signature over the canonical encoding of every other field.
    pub signature: Ed25519Signature,

    /// Key order the message was written in.
    pub order: FieldOrder,
}

impl Message {
    /// Parse and shape-check a JSON message value.
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let map = value.as_object().ok_or(ShapeDefect::NotAnObject)?;
        let order = check_keys(map)?;

        let previous = match &map[keys::PREVIOUS] {
            Value::Null => None,
            Value::String(s) => {
                Some(MsgId::from_sigil(s).map_err(|_| ShapeDefect::InvalidPrevious)?)
            }
            _ => return Err(wrong_type(keys::PREVIOUS, "a message id or null")),
        };

        let author = match &map[keys::AUTHOR] {
            Value::String(s) => FeedId::from_sigil(s).map_err(|_| ShapeDefect::InvalidAuthor)?,
            _ => return Err(wrong_type(keys::AUTHOR, "a feed id string")),
        };

        let sequence = match &map[keys::SEQUENCE] {
            Value::Number(n) => parse_sequence(n)?,
            _ => return Err(wrong_type(keys::SEQUENCE, "a number")),
        };

        let timestamp = match &map[keys::TIMESTAMP] {
            Value::Number(n) => n.clone(),
            _ => return Err(wrong_type(keys::TIMESTAMP, "a number")),
        };

        let hash = match &map[keys::HASH] {
            Value::String(s) if s == HASH_ALGORITHM => s.clone(),
            Value::String(s) => return Err(ShapeDefect::UnsupportedHash(s.clone()).into()),
            _ => return Err(wrong_type(keys::HASH, "a string")),
        };

        let content = map[keys::CONTENT].clone();
        check_content(&content)?;

        let signature = match &map[keys::SIGNATURE] {
            Value::String(s) => Ed25519Signature::from_sigil(s)
                .map_err(|_| ShapeDefect::InvalidSignatureEncoding)?,
            _ => return Err(wrong_type(keys::SIGNATURE, "a signature string")),
        };

        let len = encoded_len(&encode(value));
        if len > MAX_MESSAGE_LEN {
            return Err(ShapeDefect::TooLarge {
                len,
                max: MAX_MESSAGE_LEN,
            }
            .into());
        }

        Ok(Self {
            previous,
            author,
            sequence,
            timestamp,
            hash,
            content,
            signature,
            order,
        })
    }

    /// Parse a JSON message, classifying failures.
    pub fn parse(value: &Value) -> Result<Self, ValidationError> {
        Self::from_value(value).map_err(ValidationError::from)
    }

    /// The full message as JSON, fields in their written order.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields(true))
    }

    /// The message without its signature: what the author signed.
    pub fn unsigned_value(&self) -> Value {
        Value::Object(self.fields(false))
    }

    fn fields(&self, with_signature: bool) -> Map<String, Value> {
        let mut map = Map::with_capacity(7);
        for key in self.order.keys() {
            let value = match key {
                keys::PREVIOUS => self
                    .previous
                    .map_or(Value::Null, |id| Value::String(id.to_string())),
                keys::AUTHOR => Value::String(self.author.to_string()),
                keys::SEQUENCE => Value::Number(self.sequence.into()),
                keys::TIMESTAMP => Value::Number(self.timestamp.clone()),
                keys::HASH => Value::String(self.hash.clone()),
                keys::CONTENT => self.content.clone(),
                _ if with_signature => Value::String(self.signature.to_string()),
                _ => continue,
            };
            map.insert(key.to_string(), value);
        }
        map
    }

    /// Compute the message identifier.
    pub fn compute_id(&self) -> MsgId {
        canonical::id_of(self)
    }

    /// Verify the signature, optionally inside an HMAC signing domain.
    pub fn verify(&self, hmac_key: Option<&HmacKey>) -> Result<(), CoreError> {
        let bytes = canonical::signing_bytes(self);
        match hmac_key {
            Some(key) => self.author.verify(&key.authenticate(&bytes)?, &self.signature),
            None => self.author.verify(&bytes, &self.signature),
        }
    }

    /// Whether this message starts a feed.
    pub fn is_first(&self) -> bool {
        self.sequence == 1 && self.previous.is_none()
    }
}

fn wrong_type(field: &'static str, expected: &'static str) -> CoreError {
    ShapeDefect::WrongType { field, expected }.into()
}

/// Check that exactly the known keys are present, in an allowed order.
fn check_keys(map: &Map<String, Value>) -> Result<FieldOrder, ShapeDefect> {
    for key in keys::ALL {
        if !map.contains_key(key) {
            return Err(ShapeDefect::MissingField(key));
        }
    }
    if let Some(extra) = map.keys().find(|k| !keys::ALL.contains(&k.as_str())) {
        return Err(ShapeDefect::UnexpectedField(extra.clone()));
    }

    let written: Vec<&str> = map.keys().map(String::as_str).collect();
    [FieldOrder::Standard, FieldOrder::Legacy]
        .into_iter()
        .find(|order| written == order.keys())
        .ok_or(ShapeDefect::FieldOrder)
}

/// Sequence numbers are positive safe integers; `2.0` is accepted as `2`.
fn parse_sequence(n: &Number) -> Result<u64, ShapeDefect> {
    let seq = match n.as_u64() {
        Some(u) => u,
        None => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= MAX_SEQUENCE as f64 => f as u64,
            _ => return Err(ShapeDefect::SequenceNotPositive),
        },
    };
    if seq == 0 || seq > MAX_SEQUENCE {
        return Err(ShapeDefect::SequenceNotPositive);
    }
    Ok(seq)
}

fn check_content(content: &Value) -> Result<(), ShapeDefect> {
    match content {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(t)) => {
                let len = t.encode_utf16().count();
                if (MIN_CONTENT_TYPE_LEN..=MAX_CONTENT_TYPE_LEN).contains(&len) {
                    Ok(())
                } else {
                    Err(ShapeDefect::InvalidContentType { len })
                }
            }
            _ => Err(ShapeDefect::WrongType {
                field: "content.type",
                expected: "a string",
            }),
        },
        Value::String(s) if is_encrypted_box(s) => Ok(()),
        Value::String(_) => Err(ShapeDefect::InvalidEncryptedContent),
        _ => Err(ShapeDefect::WrongType {
            field: keys::CONTENT,
            expected: "an object or an encrypted string",
        }),
    }
}

/// Base64 alphabet characters, up to two `=`, then `.box`. Anything may
/// follow, so `.box2` and later box formats are accepted.
fn is_encrypted_box(s: &str) -> bool {
    let body = s
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'/' || *b == b'+')
        .count();
    if body == 0 {
        return false;
    }
    let rest = &s[body..];
    let padding = rest.bytes().take_while(|b| *b == b'=').count();
    padding <= 2 && rest[padding..].starts_with(".box")
}

/// Builder for creating signed messages.
pub struct MessageBuilder {
    author: FeedId,
    sequence: u64,
    previous: Option<MsgId>,
    timestamp: Number,
    content: Value,
    order: FieldOrder,
}

impl MessageBuilder {
    /// Start building a message.
    pub fn new(author: FeedId, sequence: u64) -> Self {
        Self {
            author,
            sequence,
            previous: None,
            timestamp: Number::from(0u64),
            content: Value::Object(Map::new()),
            order: FieldOrder::Standard,
        }
    }

    /// Start the message that follows `prev` in the same feed.
    pub fn after(prev: &Message) -> Self {
        Self::new(prev.author, prev.sequence + 1).previous(prev.compute_id())
    }

    /// Set the previous message id.
    pub fn previous(mut self, prev: MsgId) -> Self {
        self.previous = Some(prev);
        self
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, ts: impl Into<Number>) -> Self {
        self.timestamp = ts.into();
        self
    }

    /// Set the content.
    pub fn content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    /// Write `sequence` before `author`.
    pub fn legacy_order(mut self) -> Self {
        self.order = FieldOrder::Legacy;
        self
    }

    /// Build and sign the message, optionally inside an HMAC signing domain.
    pub fn sign(self, keypair: &Keypair, hmac_key: Option<&HmacKey>) -> Result<Message, CoreError> {
        let mut message = Message {
            previous: self.previous,
            author: self.author,
            sequence: self.sequence,
            timestamp: self.timestamp,
            hash: HASH_ALGORITHM.to_string(),
            content: self.content,
            signature: Ed25519Signature::from_bytes([0u8; 64]),
            order: self.order,
        };

        let bytes = canonical::signing_bytes(&message);
        message.signature = match hmac_key {
            Some(key) => keypair.sign(&key.authenticate(&bytes)?),
            None => keypair.sign(&bytes),
        };
        Ok(message)
    }
}
