//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value};

use feedcheck_core::{FeedId, HmacKey, Keypair, Message, MessageBuilder, MsgId};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random MsgId.
pub fn msg_id() -> impl Strategy<Value = MsgId> {
    any::<[u8; 32]>().prop_map(MsgId::from_bytes)
}

/// Generate a random FeedId.
pub fn feed_id() -> impl Strategy<Value = FeedId> {
    keypair().prop_map(|kp| kp.feed_id())
}

/// Generate a random HMAC key.
pub fn hmac_key() -> impl Strategy<Value = HmacKey> {
    any::<[u8; 32]>().prop_map(HmacKey::from_bytes)
}

/// Generate a content type of acceptable length.
pub fn content_type() -> impl Strategy<Value = String> {
    "[a-z][a-z-]{2,51}".prop_map(String::from)
}

/// Generate a reasonable timestamp in milliseconds.
pub fn timestamp() -> impl Strategy<Value = u64> {
    0u64..=1_900_000_000_000u64
}

/// Generate message content: an object with a `type` and a few fields.
pub fn content() -> impl Strategy<Value = Value> {
    (content_type(), "\\PC{0,32}", any::<Option<i32>>(), any::<bool>()).prop_map(
        |(kind, text, n, flag)| {
            let mut content = json!({ "type": kind, "text": text, "flag": flag });
            if let Some(n) = n {
                content["n"] = json!(n);
            }
            content
        },
    )
}

/// Generate a feed length.
pub fn feed_len() -> impl Strategy<Value = usize> {
    1usize..=12
}

/// Parameters for generating a message.
#[derive(Debug, Clone)]
pub struct MessageParams {
    pub keypair: Keypair,
    pub sequence: u64,
    pub previous: Option<MsgId>,
    pub timestamp: u64,
    pub content: Value,
    pub legacy_order: bool,
    pub hmac_key: Option<HmacKey>,
}

impl Arbitrary for MessageParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            1u64..=1000u64,    // sequence
            proptest::option::of(msg_id()),
            timestamp(),
            content(),
            any::<bool>(),
            proptest::option::of(hmac_key()),
        )
            .prop_map(
                |(seed, sequence, previous, timestamp, content, legacy_order, hmac_key)| {
                    MessageParams {
                        keypair: Keypair::from_seed(&seed),
                        sequence,
                        previous,
                        timestamp,
                        content,
                        legacy_order,
                        hmac_key,
                    }
                },
            )
            .boxed()
    }
}

/// Generate a message from parameters.
pub fn message_from_params(params: &MessageParams) -> Message {
    let mut builder = MessageBuilder::new(params.keypair.feed_id(), params.sequence)
        .timestamp(params.timestamp)
        .content(params.content.clone());

    if let Some(prev) = params.previous {
        builder = builder.previous(prev);
    }
    if params.legacy_order {
        builder = builder.legacy_order();
    }

    builder
        .sign(&params.keypair, params.hmac_key.as_ref())
        .expect("generated message signs")
}

/// Generate a contiguous feed of `len` messages by one author.
pub fn feed(keypair: &Keypair, contents: &[Value], hmac_key: Option<&HmacKey>) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::with_capacity(contents.len());
    for (i, content) in contents.iter().enumerate() {
        let builder = match out.last() {
            Some(prev) => MessageBuilder::after(prev),
            None => MessageBuilder::new(keypair.feed_id(), 1),
        };
        let msg = builder
            .timestamp(1_000 + i as u64)
            .content(content.clone())
            .sign(keypair, hmac_key)
            .expect("generated message signs");
        out.push(msg);
    }
    out
}
