//! # Condition
//!
//! Boolean state providers whose changes drive the animation override

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Callback invoked when a condition changes
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ConditionSource::subscribe`], required to unsubscribe again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// An externally owned boolean with change notifications.
///
/// Callbacks carry no payload; subscribers query [`ConditionSource::get`] for the current value. They may be invoked
/// on any thread.
pub trait ConditionSource: Send + Sync {
    /// Current value
    fn get(&self) -> bool;

    /// Registers `callback` to be called whenever the value changes
    fn subscribe(&self, callback: Callback) -> SubscriptionId;

    /// Removes a callback registered with [`ConditionSource::subscribe`]. Returns `false` if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// A plain [`ConditionSource`] whose value is set directly
#[derive(Default)]
pub struct Condition {
    /// Current value
    value: AtomicBool,
    /// Id handed to the next subscriber
    next_id: AtomicU64,
    /// Registered callbacks
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl Condition {
    /// Creates a new condition with no subscribers
    pub fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
            ..Self::default()
        }
    }

    /// Sets the value, notifying subscribers if it changed.
    ///
    /// Callbacks run on the calling thread after the internal lock is released, so they may query or subscribe to
    /// this condition themselves.
    pub fn set(&self, value: bool) {
        if self.value.swap(value, Ordering::SeqCst) == value {
            return;
        }

        let callbacks: Vec<Callback> = self
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Number of registered callbacks
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Locks the subscriber list, ignoring poisoning from a panicked callback registration
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConditionSource for Condition {
    fn get(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }

    fn subscribe(&self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|(subscribed, _)| *subscribed != id);
        subscribers.len() != before
    }
}
