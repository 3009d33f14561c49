//! Subscription system for store change notifications.
//!
//! Pub/sub primitives used by the store:
//! - A [`Subscriber`] binds a callback to notifications for one key
//! - A [`Subscription`] groups all subscribers for one key
//! - The [`SubscriptionManager`] indexes subscriptions by key and dispatches
//!
//! Delivery is synchronous and depth-first: subscribers are invoked in
//! registration order on the caller's stack, and no lock is held while a
//! callback runs, so a callback may re-enter the store (e.g. call
//! `set_item`) without deadlocking.
//!
//! # Example
//!
//! ```ignore
//! let store = Store::new();
//!
//! let subscriber = store.subscribe("person", |item, options| {
//!     println!("person changed: {:?}", item.value);
//! });
//!
//! store.set_item("person", json!({"id": 42})); // callback fires here
//! subscriber.unsubscribe();
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{NotificationFn, Subscriber, SubscriberId, Subscription};
