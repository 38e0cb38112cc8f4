//! Multiplexed real-time subscriptions.
//!
//! Each topic (funding source changes, transaction upserts, transaction
//! deletes) keeps:
//! - a [`TopicRegistry`] of subscribers keyed by caller-chosen ids
//! - at most one upstream stream shared by all of them
//! - one dispatcher thread per upstream that decodes, unseals and fans out
//!   pushed events
//!
//! The first subscriber of an idle topic opens its upstream; the last one to
//! leave cancels it. A transport failure or completion disconnects every
//! subscriber of the topic, and they must subscribe again to resume.
//!
//! # Example
//!
//! ```ignore
//! let (subscriber, updates) = ChannelSubscriber::new();
//! service.subscribe_to_transactions("ledger-view", subscriber)?;
//!
//! loop {
//!     match updates.recv() {
//!         Ok(Update::Transaction { transaction, change }) => println!("{change:?}: {}", transaction.id),
//!         Ok(Update::Connection { state: ConnectionState::Disconnected }) => break,
//!         Ok(_) => {}
//!         Err(_) => break,
//!     }
//! }
//! ```

mod channel;
pub(crate) mod coordinator;
mod fanout;
mod lifecycle;
mod registry;
mod subscriber;
pub(crate) mod topics;

pub use channel::{ChannelSubscriber, Update, UpdateReceiver};
pub use registry::TopicRegistry;
pub use subscriber::{FundingSourceSubscriber, Subscriber, TransactionSubscriber};
