//! # Reactive enablement
//!
//! Keeps the animation override enabled exactly while the game is in gpose and manual posing is off

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error};

use crate::condition::{Callback, ConditionSource, SubscriptionId};
use crate::memory::{MemoryError, ProcessMemory};
use crate::patcher::lifecycle::PatchLifecycle;

/// Desired override state for the given conditions
pub fn desired_state(gpose: bool, posing: bool) -> bool {
    gpose && !posing
}

/// Lifecycle together with the teardown flag, guarded by one lock
struct Dispatch<M> {
    /// The patch being driven
    lifecycle: PatchLifecycle<M>,
    /// Set by shutdown. Notifications already being delivered when it is set must not re-apply the patch.
    stopped: bool,
}

/// State shared with the subscription callbacks
struct Shared<M> {
    /// The mutex is the single dispatch point for every toggle, whichever thread it comes from
    dispatch: Mutex<Dispatch<M>>,
    /// Whether the game is in gpose
    gpose: Arc<dyn ConditionSource>,
    /// Whether manual posing is active
    posing: Arc<dyn ConditionSource>,
}

impl<M: ProcessMemory> Shared<M> {
    /// Locks the lifecycle. A poisoned lock still holds a consistent flag, since the flag only changes after both
    /// writes succeed.
    fn lock(&self) -> MutexGuard<'_, Dispatch<M>> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recomputes the desired state and applies it. Conditions are read under the lock so the last recomputation
    /// always sees the latest values.
    ///
    /// Once stopped, nothing is written and the current state is returned.
    fn recompute(&self) -> Result<bool, MemoryError> {
        let mut dispatch = self.lock();
        if dispatch.stopped {
            debug!("ignoring animation override recompute after shutdown");
            return Ok(dispatch.lifecycle.is_enabled());
        }
        let desired = desired_state(self.gpose.get(), self.posing.get());
        debug!(desired, "recomputed animation override state");
        dispatch.lifecycle.set_enabled(desired)?;
        Ok(desired)
    }
}

/// Subscriptions held while started
struct Subscriptions {
    /// Subscription on the gpose condition
    gpose: SubscriptionId,
    /// Subscription on the posing condition
    posing: SubscriptionId,
}

/// Drives a [`PatchLifecycle`] from the gpose and posing conditions.
///
/// Dropping a started instance shuts it down.
pub struct ReactiveEnablement<M: ProcessMemory> {
    /// Lifecycle and conditions, shared with the callbacks
    shared: Arc<Shared<M>>,
    /// Present between [`ReactiveEnablement::start`] and [`ReactiveEnablement::shutdown`]
    subscriptions: Option<Subscriptions>,
}

impl<M: ProcessMemory + 'static> ReactiveEnablement<M> {
    /// Subscribes to both conditions and applies the state they currently call for.
    ///
    /// Calling this while already started only recomputes.
    pub fn start(&mut self) -> Result<(), MemoryError> {
        if self.subscriptions.is_none() {
            self.shared.lock().stopped = false;
            let gpose = self.shared.gpose.subscribe(self.callback());
            let posing = self.shared.posing.subscribe(self.callback());
            self.subscriptions = Some(Subscriptions { gpose, posing });
        }
        self.recompute().map(|_| ())
    }

    /// Creates a callback that recomputes without keeping the shared state alive
    fn callback(&self) -> Callback {
        let shared: Weak<Shared<M>> = Arc::downgrade(&self.shared);
        Arc::new(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            if let Err(err) = shared.recompute() {
                error!(error = %err, "failed to apply animation override state");
            }
        })
    }
}

impl<M: ProcessMemory> ReactiveEnablement<M> {
    /// Wraps a started lifecycle. Nothing is subscribed or written until [`ReactiveEnablement::start`].
    pub fn new(
        lifecycle: PatchLifecycle<M>,
        gpose: Arc<dyn ConditionSource>,
        posing: Arc<dyn ConditionSource>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                dispatch: Mutex::new(Dispatch {
                    lifecycle,
                    stopped: false,
                }),
                gpose,
                posing,
            }),
            subscriptions: None,
        }
    }

    /// Recomputes the desired state from both conditions and applies it, returning the state applied
    pub fn recompute(&self) -> Result<bool, MemoryError> {
        self.shared.recompute()
    }

    /// Whether the override is currently applied
    pub fn is_enabled(&self) -> bool {
        self.shared.lock().lifecycle.is_enabled()
    }

    /// Applies or reverts the override directly. The next condition change recomputes over it.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), MemoryError> {
        self.shared.lock().lifecycle.set_enabled(enabled)
    }

    /// Whether the condition subscriptions are currently held
    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Releases both subscriptions, then reverts the override.
    ///
    /// The subscriptions are always released; a failure to restore memory is logged and returned afterwards.
    /// Notifications that were already being delivered when this runs are ignored.
    pub fn shutdown(&mut self) -> Result<(), MemoryError> {
        if let Some(subscriptions) = self.subscriptions.take() {
            self.shared.gpose.unsubscribe(subscriptions.gpose);
            self.shared.posing.unsubscribe(subscriptions.posing);
        }
        let mut dispatch = self.shared.lock();
        dispatch.stopped = true;
        dispatch.lifecycle.shutdown()
    }
}

impl<M: ProcessMemory> Drop for ReactiveEnablement<M> {
    fn drop(&mut self) {
        if self.subscriptions.is_some() {
            // failures were already logged by `shutdown`
            let _ = self.shutdown();
        }
    }
}
