//! The Validator: the entry points callers use.
//!
//! Every entry point takes JSON exactly as it arrived, plus an optional HMAC
//! key, and completes with either identifiers or a classified error.

use serde_json::Value;

use feedcheck_core::{
    validate_batch_value, validate_single_value, verify_signatures_value, HmacKeyInput, MsgId,
    ValidationError,
};

use crate::backend::{self, Backend};
use crate::error::{Error, Result};

/// Configuration for the Validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Run each call on the blocking thread pool instead of inline.
    pub offload_blocking: bool,
    /// Await backend readiness before each call.
    pub auto_ready: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            offload_blocking: false,
            auto_ready: true,
        }
    }
}

/// Which entry point a call came through, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    VerifySignatures,
    Single,
    Batch,
    OutOfOrderBatch,
    MultiAuthorBatch,
}

/// The main Validator struct.
///
/// Holds no per-call state; one instance can serve any number of
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a new validator.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readiness
    // ─────────────────────────────────────────────────────────────────────────

    /// Wait until the verification backend is initialized.
    ///
    /// Safe to call any number of times; only the first call does work.
    pub async fn ready(&self) -> Result<&'static Backend> {
        backend::ready().await
    }

    /// Whether the backend has been initialized.
    pub fn is_ready(&self) -> bool {
        backend::is_ready()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signature-only validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify the signature of every message, without continuity checks.
    ///
    /// Returns identifiers in input order.
    pub async fn verify_signatures(
        &self,
        hmac_key: Option<&HmacKeyInput>,
        messages: &Value,
    ) -> Result<Vec<MsgId>> {
        self.signatures_only(Mode::VerifySignatures, hmac_key, messages)
            .await
    }

    /// Validate a batch that may be out of order. Signatures only.
    pub async fn validate_ooo_batch(
        &self,
        hmac_key: Option<&HmacKeyInput>,
        messages: &Value,
    ) -> Result<Vec<MsgId>> {
        self.signatures_only(Mode::OutOfOrderBatch, hmac_key, messages)
            .await
    }

    /// Validate a batch mixing several authors. Signatures only.
    pub async fn validate_multi_author_batch(
        &self,
        hmac_key: Option<&HmacKeyInput>,
        messages: &Value,
    ) -> Result<Vec<MsgId>> {
        self.signatures_only(Mode::MultiAuthorBatch, hmac_key, messages)
            .await
    }

    async fn signatures_only(
        &self,
        mode: Mode,
        hmac_key: Option<&HmacKeyInput>,
        messages: &Value,
    ) -> Result<Vec<MsgId>> {
        self.run(mode, hmac_key, messages, None, |key, messages, _| {
            verify_signatures_value(key, messages)
        })
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Full validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate one message, optionally continuing from `previous`.
    pub async fn validate_single(
        &self,
        hmac_key: Option<&HmacKeyInput>,
        message: &Value,
        previous: Option<&Value>,
    ) -> Result<MsgId> {
        self.run(Mode::Single, hmac_key, message, previous, validate_single_value)
            .await
    }

    /// Validate a batch as consecutive feed messages, optionally continuing
    /// from `previous`.
    ///
    /// Either every message is accepted, or none is.
    pub async fn validate_batch(
        &self,
        hmac_key: Option<&HmacKeyInput>,
        messages: &Value,
        previous: Option<&Value>,
    ) -> Result<Vec<MsgId>> {
        self.run(Mode::Batch, hmac_key, messages, previous, validate_batch_value)
            .await
    }

    /// Run one validation call according to the configuration.
    ///
    /// Inputs are borrowed on the inline path and only copied when the call
    /// moves to the blocking pool.
    async fn run<T>(
        &self,
        mode: Mode,
        hmac_key: Option<&HmacKeyInput>,
        input: &Value,
        previous: Option<&Value>,
        call: EntryFn<T>,
    ) -> Result<T>
    where
        T: Send + 'static,
    {
        if self.config.auto_ready {
            self.ready().await?;
        }

        let len = match mode {
            Mode::Single => Some(1),
            _ => batch_len(input),
        };
        let seeded = previous.is_some();
        tracing::debug!(?mode, ?len, seeded, "validation started");

        let result = if self.config.offload_blocking {
            let key = hmac_key.cloned();
            let input = input.clone();
            let previous = previous.cloned();
            tokio::task::spawn_blocking(move || call(key.as_ref(), &input, previous.as_ref()))
                .await
                .map_err(|e| Error::Backend(format!("validation task failed: {}", e)))?
        } else {
            call(hmac_key, input, previous)
        };

        match &result {
            Ok(_) => tracing::debug!(?mode, accepted = ?len, "validation succeeded"),
            Err(e) => tracing::warn!(?mode, ?len, kind = ?e.kind(), error = %e, "validation rejected"),
        }

        Ok(result?)
    }
}

/// A core entry point over raw JSON: key, input, optional seed.
type EntryFn<T> =
    fn(Option<&HmacKeyInput>, &Value, Option<&Value>) -> std::result::Result<T, ValidationError>;

fn batch_len(messages: &Value) -> Option<usize> {
    messages.as_array().map(Vec::len)
}
