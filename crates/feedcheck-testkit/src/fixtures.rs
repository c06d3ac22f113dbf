//! Test fixtures and helpers.
//!
//! Common setup code for building signed feeds in tests.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{json, Value};

use feedcheck_core::{FeedId, HmacKey, Keypair, Message, MessageBuilder};

/// An author with a keypair and an optional signing domain.
pub struct FeedFixture {
    pub keypair: Keypair,
    pub hmac_key: Option<HmacKey>,
}

impl FeedFixture {
    /// Create a new fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            hmac_key: None,
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            hmac_key: None,
        }
    }

    /// Sign every message inside the given HMAC signing domain.
    pub fn with_hmac_key(mut self, key: HmacKey) -> Self {
        self.hmac_key = Some(key);
        self
    }

    /// The feed this fixture authors.
    pub fn feed_id(&self) -> FeedId {
        self.keypair.feed_id()
    }

    /// Create the first message of the feed.
    pub fn make_first(&self, content: Value) -> Message {
        self.sign(MessageBuilder::new(self.feed_id(), 1).content(content))
    }

    /// Create the message that follows `prev`.
    pub fn make_next(&self, prev: &Message, content: Value) -> Message {
        self.sign(MessageBuilder::after(prev).content(content))
    }

    /// Create a contiguous feed of `len` messages.
    pub fn make_feed(&self, len: usize) -> Vec<Message> {
        let mut feed: Vec<Message> = Vec::with_capacity(len);
        for i in 0..len {
            let content = json!({ "type": "post", "text": format!("message {}", i + 1) });
            let msg = match feed.last() {
                Some(prev) => self.make_next(prev, content),
                None => self.make_first(content),
            };
            feed.push(msg);
        }
        feed
    }

    fn sign(&self, builder: MessageBuilder) -> Message {
        builder
            .timestamp(now_millis())
            .sign(&self.keypair, self.hmac_key.as_ref())
            .expect("fixture message signs")
    }
}

impl Default for FeedFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures for multi-author tests.
pub fn multi_author_fixtures(count: usize) -> Vec<FeedFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            FeedFixture::with_seed(seed)
        })
        .collect()
}

/// Messages as the JSON array a caller would hand over.
pub fn to_values(messages: &[Message]) -> Value {
    Value::Array(messages.iter().map(Message::to_value).collect())
}

/// A deterministic permutation of `messages`.
pub fn shuffled(messages: &[Message], seed: u64) -> Vec<Message> {
    let mut out = messages.to_vec();
    out.shuffle(&mut StdRng::seed_from_u64(seed));
    out
}

/// Get current time in milliseconds.
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as u64
}
