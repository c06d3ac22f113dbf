//! # feedcheck testkit
//!
//! Testing utilities for feedcheck.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden messages**: Real feed messages with known identifiers, for
//!   checking the canonical encoding against other implementations
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for building signed feeds
//!
//! ## Golden Messages
//!
//! ```rust
//! use feedcheck_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! for (name, matches, id) in verify_all_vectors() {
//!     println!("{}: {} ({})", name, id, matches);
//! }
//! # assert_eq!(all_vectors().len(), 2);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use feedcheck_testkit::generators::{message_from_params, MessageParams};
//!
//! proptest! {
//!     #[test]
//!     fn id_is_deterministic(params: MessageParams) {
//!         let m1 = message_from_params(&params);
//!         let m2 = message_from_params(&params);
//!         prop_assert_eq!(m1.compute_id(), m2.compute_id());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use feedcheck_testkit::fixtures::FeedFixture;
//!
//! let fixture = FeedFixture::new();
//! let feed = fixture.make_feed(5);
//! assert_eq!(feed.len(), 5);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_author_fixtures, shuffled, to_values, FeedFixture};
pub use generators::{message_from_params, MessageParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
