//! Verification backend readiness.
//!
//! The backend is initialized once per process. Initialization runs a
//! sign-and-verify self-test in both signing domains, so a miscompiled or
//! misconfigured crypto stack is caught before the first real call.

use serde_json::json;
use tokio::sync::OnceCell;

use feedcheck_core::{validate_single, HmacKey, Keypair, MessageBuilder};

use crate::error::{Error, Result};

static BACKEND: OnceCell<Backend> = OnceCell::const_new();

/// Description of the initialized verification backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Signature scheme feed messages are verified with.
    pub signature: &'static str,
    /// Hash used for message identifiers.
    pub hash: &'static str,
    /// Keyed signing-domain construction.
    pub hmac: &'static str,
}

/// Initialize the backend if needed and return it.
///
/// Concurrent callers wait for the same initialization.
pub async fn ready() -> Result<&'static Backend> {
    BACKEND
        .get_or_try_init(|| async {
            self_test()?;
            let backend = Backend {
                signature: "ed25519",
                hash: "sha256",
                hmac: "hmac-sha512-256",
            };
            tracing::debug!(?backend, "verification backend ready");
            Ok(backend)
        })
        .await
}

/// Whether [`ready`] has completed successfully in this process.
pub fn is_ready() -> bool {
    BACKEND.initialized()
}

fn self_test() -> Result<()> {
    let keypair = Keypair::from_seed(&[0x01; 32]);
    let key = HmacKey::from_bytes([0x02; 32]);

    for domain in [None, Some(&key)] {
        let message = MessageBuilder::new(keypair.feed_id(), 1)
            .timestamp(0u64)
            .content(json!({ "type": "self-test" }))
            .sign(&keypair, domain)
            .map_err(|e| Error::Backend(format!("self-test signing failed: {}", e)))?;

        validate_single(domain, &message, None)
            .map_err(|e| Error::Backend(format!("self-test verification failed: {}", e)))?;
    }
    Ok(())
}
