//! Validation: signature checks, chain continuity, and the batch fold.
//!
//! Two strengths of validation exist:
//! - full validation ([`validate_batch`], [`validate_single`]) folds messages
//!   through [`ValidationState`] in input order, checking continuity and
//!   signatures;
//! - signature-only validation ([`verify_signatures`]) checks every signature
//!   independently and never looks at ordering, for out-of-order and
//!   multi-author batches.
//!
//! Both stop at the first failure and return no identifiers on failure.
//! The `*_value` variants take JSON straight from the wire and add the
//! array and message shape checks.

use std::borrow::Borrow;

use serde_json::Value;

use crate::crypto::{HmacKey, HmacKeyInput};
use crate::error::ValidationError;
use crate::feed::ValidationState;
use crate::message::Message;
use crate::types::MsgId;

/// Verify one message's signature, optionally inside an HMAC signing domain.
pub fn verify_signature(hmac_key: Option<&HmacKey>, message: &Message) -> Result<(), ValidationError> {
    message.verify(hmac_key).map_err(ValidationError::from)
}

/// Verify signatures only, in input order, without continuity checks.
pub fn verify_signatures(
    hmac_key: Option<&HmacKey>,
    messages: &[Message],
) -> Result<Vec<MsgId>, ValidationError> {
    check_signatures(hmac_key, messages.iter().map(Ok::<_, ValidationError>))
}

/// Validate a batch as consecutive links of one or more feeds.
///
/// With `previous`, the batch continues that message's feed.
pub fn validate_batch(
    hmac_key: Option<&HmacKey>,
    messages: &[Message],
    previous: Option<&Message>,
) -> Result<Vec<MsgId>, ValidationError> {
    fold_batch(hmac_key, messages.iter().map(Ok::<_, ValidationError>), previous)
}

/// Validate one message; a batch of length one.
pub fn validate_single(
    hmac_key: Option<&HmacKey>,
    message: &Message,
    previous: Option<&Message>,
) -> Result<MsgId, ValidationError> {
    let state = seed(previous);
    let (_, id) = state.append(hmac_key, message)?;
    Ok(id)
}

/// [`verify_signatures`] over a JSON array of messages.
pub fn verify_signatures_value(
    hmac_key: Option<&HmacKeyInput>,
    messages: &Value,
) -> Result<Vec<MsgId>, ValidationError> {
    let items = as_array(messages)?;
    let key = HmacKey::decode_optional(hmac_key)?;
    check_signatures(key.as_ref(), items.iter().map(Message::parse))
}

/// [`validate_batch`] over a JSON array of messages.
pub fn validate_batch_value(
    hmac_key: Option<&HmacKeyInput>,
    messages: &Value,
    previous: Option<&Value>,
) -> Result<Vec<MsgId>, ValidationError> {
    let items = as_array(messages)?;
    let key = HmacKey::decode_optional(hmac_key)?;
    let previous = previous.map(Message::parse).transpose()?;
    fold_batch(key.as_ref(), items.iter().map(Message::parse), previous.as_ref())
}

/// [`validate_single`] over a JSON message.
pub fn validate_single_value(
    hmac_key: Option<&HmacKeyInput>,
    message: &Value,
    previous: Option<&Value>,
) -> Result<MsgId, ValidationError> {
    let key = HmacKey::decode_optional(hmac_key)?;
    let previous = previous.map(Message::parse).transpose()?;
    let message = Message::parse(message)?;
    validate_single(key.as_ref(), &message, previous.as_ref())
}

fn as_array(value: &Value) -> Result<&[Value], ValidationError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(ValidationError::InvalidInputShape)
}

fn seed(previous: Option<&Message>) -> ValidationState {
    previous.map_or_else(ValidationState::new, ValidationState::seeded)
}

/// Fold messages through the chain state, one at a time, in input order.
///
/// Messages arrive as results so that shape failures surface at their own
/// position in the batch rather than before it.
fn fold_batch<I, M>(
    hmac_key: Option<&HmacKey>,
    messages: I,
    previous: Option<&Message>,
) -> Result<Vec<MsgId>, ValidationError>
where
    I: IntoIterator<Item = Result<M, ValidationError>>,
    M: Borrow<Message>,
{
    let mut state = seed(previous);
    let mut ids = Vec::new();
    for message in messages {
        let (next, id) = state.append(hmac_key, message?.borrow())?;
        state = next;
        ids.push(id);
    }
    Ok(ids)
}

fn check_signatures<I, M>(hmac_key: Option<&HmacKey>, messages: I) -> Result<Vec<MsgId>, ValidationError>
where
    I: IntoIterator<Item = Result<M, ValidationError>>,
    M: Borrow<Message>,
{
    messages
        .into_iter()
        .map(|message| {
            let message = message?;
            let message = message.borrow();
            verify_signature(hmac_key, message)?;
            Ok(message.compute_id())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::error::{ErrorKind, KeyDefect, ShapeDefect};
    use crate::message::MessageBuilder;
    use serde_json::json;

    fn chain(kp: &Keypair, len: u64, key: Option<&HmacKey>) -> Vec<Message> {
        let mut msgs: Vec<Message> = Vec::new();
        for seq in 1..=len {
            let builder = match msgs.last() {
                Some(prev) => MessageBuilder::after(prev),
                None => MessageBuilder::new(kp.feed_id(), 1),
            };
            msgs.push(
                builder
                    .timestamp(1_700_000_000_000u64 + seq)
                    .content(json!({ "type": "post", "text": format!("message {}", seq) }))
                    .sign(kp, key)
                    .unwrap(),
            );
        }
        msgs
    }

    fn values(msgs: &[Message]) -> Value {
        Value::Array(msgs.iter().map(Message::to_value).collect())
    }

    #[test]
    fn test_full_feed_validates_in_order() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 5, None);
        let ids = validate_batch(None, &msgs, None).unwrap();
        let expected: Vec<MsgId> = msgs.iter().map(Message::compute_id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_partial_feed_with_previous() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 5, None);
        assert_eq!(validate_batch(None, &msgs[1..], Some(&msgs[0])).unwrap().len(), 4);
        assert_eq!(validate_batch(None, &msgs[2..], Some(&msgs[1])).unwrap().len(), 3);
    }

    #[test]
    fn test_partial_feed_without_previous_fails() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 5, None);
        let err = validate_batch(None, &msgs[1..], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFirstSequence);
    }

    #[test]
    fn test_tampered_middle_fails_whole_batch() {
        let kp = Keypair::from_seed(&[3; 32]);
        let mut msgs = chain(&kp, 5, None);
        msgs[2].content = json!({ "type": "post", "text": "forged" });
        let err = validate_batch(None, &msgs, None).unwrap_err();
        assert_eq!(err, ValidationError::InvalidSignature);
    }

    #[test]
    fn test_reordered_batch_fails() {
        let kp = Keypair::from_seed(&[3; 32]);
        let mut msgs = chain(&kp, 3, None);
        msgs.swap(1, 2);
        let err = validate_batch(None, &msgs, None).unwrap_err();
        assert_eq!(err, ValidationError::InvalidSequence { expected: 2, got: 3 });
    }

    #[test]
    fn test_single_first_message() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 2, None);
        assert_eq!(validate_single(None, &msgs[0], None).unwrap(), msgs[0].compute_id());
        assert_eq!(
            validate_single(None, &msgs[1], Some(&msgs[0])).unwrap(),
            msgs[1].compute_id()
        );
    }

    #[test]
    fn test_single_later_message_without_previous() {
        let kp = Keypair::from_seed(&[3; 32]);
        let mut msgs = chain(&kp, 5, None);
        msgs[3].previous = None;
        let err = validate_single(None, &msgs[3], None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFirstSequence {
                sequence: 4,
                has_previous: false
            }
        );
    }

    #[test]
    fn test_signature_only_ignores_order() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 5, None);
        let mut shuffled = msgs.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        let ids = verify_signatures(None, &shuffled).unwrap();
        let expected: Vec<MsgId> = shuffled.iter().map(Message::compute_id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_signature_only_multi_author() {
        let a = chain(&Keypair::from_seed(&[1; 32]), 3, None);
        let b = chain(&Keypair::from_seed(&[2; 32]), 3, None);
        let mixed = vec![b[2].clone(), a[0].clone(), b[0].clone(), a[2].clone()];
        assert_eq!(verify_signatures(None, &mixed).unwrap().len(), 4);
    }

    #[test]
    fn test_signature_only_still_checks_signatures() {
        let kp = Keypair::from_seed(&[3; 32]);
        let mut msgs = chain(&kp, 3, None);
        msgs[1].sequence = 7;
        assert_eq!(
            verify_signatures(None, &msgs).unwrap_err(),
            ValidationError::InvalidSignature
        );
    }

    #[test]
    fn test_hmac_domain() {
        let kp = Keypair::from_seed(&[3; 32]);
        let key = HmacKey::from_bytes([0x5a; 32]);
        let msgs = chain(&kp, 2, Some(&key));

        assert!(validate_batch(Some(&key), &msgs, None).is_ok());
        assert_eq!(
            validate_batch(None, &msgs, None).unwrap_err(),
            ValidationError::InvalidSignature
        );
        let other = HmacKey::from_bytes([0x5b; 32]);
        assert_eq!(
            verify_signatures(Some(&other), &msgs).unwrap_err(),
            ValidationError::InvalidSignature
        );
    }

    #[test]
    fn test_value_entry_rejects_non_array() {
        assert_eq!(
            verify_signatures_value(None, &json!(3)).unwrap_err(),
            ValidationError::InvalidInputShape
        );
        assert_eq!(
            validate_batch_value(None, &json!({ "not": "an array" }), None).unwrap_err(),
            ValidationError::InvalidInputShape
        );
    }

    #[test]
    fn test_value_entry_decodes_key_first() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 1, None);
        let bad = HmacKeyInput::from("isnotvalid");
        assert_eq!(
            validate_batch_value(Some(&bad), &values(&msgs), None).unwrap_err(),
            ValidationError::InvalidKeyEncoding(KeyDefect::NotBase64)
        );
        assert_eq!(
            validate_single_value(Some(&bad), &msgs[0].to_value(), None).unwrap_err(),
            ValidationError::InvalidKeyEncoding(KeyDefect::NotBase64)
        );
    }

    #[test]
    fn test_value_entry_reports_failures_in_position() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 3, None);

        // Second message forged, third malformed: the forgery comes first.
        let mut batch = values(&msgs);
        batch[1]["content"]["text"] = json!("forged");
        batch[2] = json!("not a message");
        assert_eq!(
            validate_batch_value(None, &batch, None).unwrap_err(),
            ValidationError::InvalidSignature
        );

        let mut batch = values(&msgs);
        batch[1] = json!({ "previous": null });
        assert_eq!(
            validate_batch_value(None, &batch, None).unwrap_err(),
            ValidationError::MalformedInput(ShapeDefect::MissingField("author"))
        );
    }

    #[test]
    fn test_value_entry_with_previous() {
        let kp = Keypair::from_seed(&[3; 32]);
        let msgs = chain(&kp, 4, None);
        let ids = validate_batch_value(None, &values(&msgs[2..]), Some(&msgs[1].to_value())).unwrap();
        assert_eq!(ids, vec![msgs[2].compute_id(), msgs[3].compute_id()]);
    }

    #[test]
    fn test_empty_batch() {
        assert!(validate_batch(None, &[], None).unwrap().is_empty());
        assert!(verify_signatures_value(None, &json!([])).unwrap().is_empty());
    }
}
