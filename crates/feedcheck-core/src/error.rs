//! Error types for feedcheck core.
//!
//! [`CoreError`] is what the low-level pieces (base64, ed25519, message
//! parsing) report. [`ValidationError`] is the closed taxonomy every
//! validation entry point returns; the `From` impl between them is the only
//! place low-level failures get classified.

use thiserror::Error;

use crate::types::MsgId;

/// Low-level errors from decoding and signature primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("missing {expected} sigil or suffix")]
    InvalidSigil { expected: &'static str },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed message: {0}")]
    Malformed(ShapeDefect),
}

/// What exactly is wrong with a message that failed the shape check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeDefect {
    #[error("message must be an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unexpected field `{0}`")]
    UnexpectedField(String),

    #[error("fields are not in canonical order")]
    FieldOrder,

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("sequence must be a positive integer no greater than 2^53 - 1")]
    SequenceNotPositive,

    #[error("author is not a valid feed id")]
    InvalidAuthor,

    #[error("previous is not a valid message id")]
    InvalidPrevious,

    #[error("signature is not a valid ed25519 signature")]
    InvalidSignatureEncoding,

    #[error("unsupported hash algorithm: {0}")]
    UnsupportedHash(String),

    #[error("content type must be 3 to 52 characters, got {len}")]
    InvalidContentType { len: usize },

    #[error("string content must be an encrypted box")]
    InvalidEncryptedContent,

    #[error("encoded message is {len} characters, limit is {max}")]
    TooLarge { len: usize, max: usize },

    #[error("invalid identifier encoding")]
    InvalidEncoding,
}

/// Why a supplied HMAC key could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyDefect {
    #[error("string must be base64 encoded")]
    NotBase64,

    #[error("key must be {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },
}

/// The closed set of failures a validation call can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input must be an array of message objects")]
    InvalidInputShape,

    #[error("malformed input: {0}")]
    MalformedInput(ShapeDefect),

    #[error("invalid hmac key: {0}")]
    InvalidKeyEncoding(KeyDefect),

    #[error("signature was invalid")]
    InvalidSignature,

    #[error("the first message of a feed must have seq of 1 and no previous (got seq {sequence}, previous present: {has_previous})")]
    InvalidFirstSequence { sequence: u64, has_previous: bool },

    #[error("invalid sequence: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },

    #[error("invalid previous: expected {expected}, got {got:?}")]
    InvalidPrevious { expected: MsgId, got: Option<MsgId> },
}

/// Fieldless discriminant of [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInputShape,
    MalformedInput,
    InvalidKeyEncoding,
    InvalidSignature,
    InvalidFirstSequence,
    InvalidSequence,
    InvalidPrevious,
}

impl ValidationError {
    /// The kind of failure, without its details.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::InvalidInputShape => ErrorKind::InvalidInputShape,
            ValidationError::MalformedInput(_) => ErrorKind::MalformedInput,
            ValidationError::InvalidKeyEncoding(_) => ErrorKind::InvalidKeyEncoding,
            ValidationError::InvalidSignature => ErrorKind::InvalidSignature,
            ValidationError::InvalidFirstSequence { .. } => ErrorKind::InvalidFirstSequence,
            ValidationError::InvalidSequence { .. } => ErrorKind::InvalidSequence,
            ValidationError::InvalidPrevious { .. } => ErrorKind::InvalidPrevious,
        }
    }

    /// Whether this is a chain-continuity failure rather than a signature or
    /// shape failure.
    pub fn is_continuity(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidFirstSequence | ErrorKind::InvalidSequence | ErrorKind::InvalidPrevious
        )
    }
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                ValidationError::InvalidSignature
            }
            CoreError::Malformed(defect) => ValidationError::MalformedInput(defect),
            CoreError::Base64(_) | CoreError::InvalidLength { .. } | CoreError::InvalidSigil { .. } => {
                ValidationError::MalformedInput(ShapeDefect::InvalidEncoding)
            }
        }
    }
}

impl From<ShapeDefect> for CoreError {
    fn from(defect: ShapeDefect) -> Self {
        CoreError::Malformed(defect)
    }
}
