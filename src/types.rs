//! Core types for the framework.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Position of a version in the store's history. The first version is 0.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct VersionNumber(pub u64);

impl fmt::Debug for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ver({})", self.0)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl VersionNumber {
    pub fn next(self) -> Self {
        VersionNumber(self.0 + 1)
    }

    pub fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(VersionNumber(self.0 - 1))
        } else {
            None
        }
    }
}

/// An immutable key/value pair representing one piece of application state.
///
/// A store item is never mutated after creation; every set produces a new
/// item, so references to items read out of older versions stay valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    /// The key that identifies the item.
    pub key: String,
    /// The value of the item (i.e. the data).
    pub value: Value,
}

impl StoreItem {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// An immutable snapshot of all key → item bindings at one point in the
/// store's history, numbered sequentially.
///
/// Each version owns its map; items are shared via `Arc`. Deriving the next
/// version clones the map, so extending the latest version in place can
/// never alias an earlier version's data.
#[derive(Clone, Debug)]
pub struct Version {
    pub number: VersionNumber,
    pub data: HashMap<String, Arc<StoreItem>>,
}

impl Version {
    pub fn new(number: VersionNumber) -> Self {
        Self {
            number,
            data: HashMap::new(),
        }
    }

    /// Copy-on-write derivation of the successor version.
    pub(crate) fn derive_next(&self) -> Self {
        Self {
            number: self.number.next(),
            data: self.data.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<StoreItem>> {
        self.data.get(key)
    }
}

/// Options carried alongside a notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotificationOptions {
    /// Set when the notification was triggered by a routing change rather
    /// than an application data change.
    pub is_routing: bool,
}

impl NotificationOptions {
    pub fn routing() -> Self {
        Self { is_routing: true }
    }
}

/// Origin of a navigation state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationOrigin {
    /// The initial page load.
    Init,
    /// An anchor-element click.
    Clicked,
}

/// The navigation payload stored under the router key and mirrored into the
/// browser history stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub title: String,
    pub url: String,
    pub origin: NavigationOrigin,
    /// Set when the state arrives from a browser back/forward event.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_pop_state: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl NavigationState {
    pub fn init(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            origin: NavigationOrigin::Init,
            is_pop_state: false,
        }
    }

    pub fn clicked(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            origin: NavigationOrigin::Clicked,
            is_pop_state: false,
        }
    }
}

/// The context of a matched route url.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlContext {
    /// The matched url (origin stripped).
    pub url: String,
    /// Parameter bindings extracted from the url.
    pub params: HashMap<String, String>,
}

impl UrlContext {
    pub fn new(url: impl Into<String>, params: HashMap<String, String>) -> Self {
        Self {
            url: url.into(),
            params,
        }
    }
}

/// The last event a component host dispatched to its render hooks.
#[derive(Clone, Debug)]
pub enum ComponentEvent {
    /// The component's route started matching.
    RouteChanged(UrlContext),
    /// A subscribed store item changed.
    Notification(StoreItem),
}
