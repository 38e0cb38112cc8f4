//! # Card Stream
//!
//! Real-time updates for card funding sources and transactions, multiplexed
//! over a few shared server-push streams.
//!
//! ## Core Concepts
//!
//! - **Topics**: one logical event stream per kind, scoped to the signed-in user
//! - **Subscribers**: caller-registered callbacks keyed by string ids
//! - **Upstreams**: at most one transport stream per topic, opened by the
//!   first subscriber and cancelled when the last one leaves
//! - **Unsealing**: sealed record attributes are opened before delivery
//!
//! ## Example
//!
//! ```ignore
//! use cardstream::{ChannelSubscriber, HubConfig, SubscriptionService};
//!
//! let service = SubscriptionService::new(transport, identity, unsealer, HubConfig::default());
//!
//! let (subscriber, updates) = ChannelSubscriber::new();
//! service.subscribe_to_funding_sources("settings-screen", subscriber.clone())?;
//! service.subscribe_to_transactions("settings-screen", subscriber)?;
//!
//! while let Ok(update) = updates.recv() {
//!     println!("{update:?}");
//! }
//!
//! service.close();
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod records;
pub mod service;
pub mod subscriptions;
pub mod transport;
pub mod types;
pub mod unseal;

// Re-exports
pub use config::HubConfig;
pub use error::{FeedError, Result};
pub use identity::{IdentityProvider, StaticIdentity};
pub use records::{
    CurrencyAmount, FundingSource, FundingSourceState, SealedAttribute, Transaction,
    TransactionType,
};
pub use service::SubscriptionService;
pub use subscriptions::{
    ChannelSubscriber, FundingSourceSubscriber, Subscriber, TopicRegistry, TransactionSubscriber,
    Update, UpdateReceiver,
};
pub use transport::{SignalSink, StreamRequest, StreamSignal, Transport, UpstreamHandle};
pub use types::*;
pub use unseal::{UnsealError, Unsealer};
