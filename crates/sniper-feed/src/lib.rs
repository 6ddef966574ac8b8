//! Order-book feed for the whale sniper.
//!
//! Decodes MEXC protobuf limit-depth pushes into [`Snapshot`]s and keeps
//! the latest one as the canonical current book.
//!
//! [`Snapshot`]: sniper_core::Snapshot

pub mod decoder;
pub mod error;
pub mod order_book;
pub mod proto;

pub use decoder::SnapshotDecoder;
pub use error::{FeedError, FeedResult};
pub use order_book::OrderBook;
