//! Feed state: what one validation run knows about each author's feed.
//!
//! State is created per call and threaded through the batch as an explicit
//! accumulator. Nothing here is shared between calls or persisted.

use std::collections::HashMap;

use serde_json::Number;

use crate::crypto::{FeedId, HmacKey};
use crate::error::ValidationError;
use crate::message::Message;
use crate::types::MsgId;

/// The last accepted message of one author's feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    /// Sequence number of the last accepted message.
    pub sequence: u64,

    /// Identifier of the last accepted message.
    pub id: MsgId,

    /// Timestamp of the last accepted message, as written.
    pub timestamp: Number,
}

/// Where an author's feed stands within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    /// Nothing known yet; the next message must start the feed.
    Unseeded,
    /// The next message must continue from here.
    Seeded { sequence: u64, id: MsgId },
}

/// State of one validation run: per-author feed state plus counters.
#[derive(Debug, Clone, Default)]
pub struct ValidationState {
    feeds: HashMap<FeedId, FeedState>,

    /// Messages accepted so far, including a seed message.
    pub validated: usize,
}

impl ValidationState {
    /// Start a run with no prior knowledge of any feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run continuing the feed that `previous` belongs to.
    ///
    /// The seed is trusted: its signature and its own linkage are not checked.
    pub fn seeded(previous: &Message) -> Self {
        let mut feeds = HashMap::new();
        feeds.insert(
            previous.author,
            FeedState {
                sequence: previous.sequence,
                id: previous.compute_id(),
                timestamp: previous.timestamp.clone(),
            },
        );
        Self { feeds, validated: 1 }
    }

    /// Where `author`'s feed stands.
    pub fn position(&self, author: &FeedId) -> ChainPosition {
        match self.feeds.get(author) {
            Some(state) => ChainPosition::Seeded {
                sequence: state.sequence,
                id: state.id,
            },
            None => ChainPosition::Unseeded,
        }
    }

    /// The accepted state of `author`'s feed, if any.
    pub fn feed(&self, author: &FeedId) -> Option<&FeedState> {
        self.feeds.get(author)
    }

    /// Number of distinct feeds seen.
    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }

    /// Check that `message` is the next link of its author's feed.
    pub fn check_continuity(&self, message: &Message) -> Result<(), ValidationError> {
        match self.position(&message.author) {
            ChainPosition::Unseeded => {
                if !message.is_first() {
                    return Err(ValidationError::InvalidFirstSequence {
                        sequence: message.sequence,
                        has_previous: message.previous.is_some(),
                    });
                }
            }
            ChainPosition::Seeded { sequence, id } => {
                // Sequence is checked before previous.
                match sequence.checked_add(1) {
                    Some(expected) if message.sequence == expected => {}
                    expected => {
                        return Err(ValidationError::InvalidSequence {
                            expected: expected.unwrap_or(u64::MAX),
                            got: message.sequence,
                        })
                    }
                }
                if message.previous != Some(id) {
                    return Err(ValidationError::InvalidPrevious {
                        expected: id,
                        got: message.previous,
                    });
                }
            }
        }
        Ok(())
    }

    /// Accept `message` as the next link of its feed.
    ///
    /// Consumes the state and returns the next one together with the
    /// message's identifier. On error the run is over.
    pub fn append(
        mut self,
        hmac_key: Option<&HmacKey>,
        message: &Message,
    ) -> Result<(Self, MsgId), ValidationError> {
        self.check_continuity(message)?;
        message.verify(hmac_key)?;

        let id = message.compute_id();
        self.feeds.insert(
            message.author,
            FeedState {
                sequence: message.sequence,
                id,
                timestamp: message.timestamp.clone(),
            },
        );
        self.validated += 1;
        tracing::trace!(author = %message.author, sequence = message.sequence, "accepted message");
        Ok((self, id))
    }
}
