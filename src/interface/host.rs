use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{HostDisplay, InterfaceOrientation, OrientationListener, SubscriptionId};

struct HostState {
    orientation: InterfaceOrientation,
    listeners: HashMap<SubscriptionId, OrientationListener>,
}

/// Host display driven by explicit [`set_orientation`](Self::set_orientation)
/// calls, for embedders that receive rotation events from their own
/// windowing layer.
pub struct ManualHostDisplay {
    state: Mutex<HostState>,
    next_id: AtomicU64,
}

impl ManualHostDisplay {
    /// Host starting in `orientation`.
    pub fn new(orientation: InterfaceOrientation) -> Self {
        Self {
            state: Mutex::new(HostState {
                orientation,
                listeners: HashMap::new(),
            }),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change orientation and notify listeners (outside the lock).
    pub fn set_orientation(&self, orientation: InterfaceOrientation) {
        let listeners: Vec<OrientationListener> = {
            let mut state = self.lock();
            if state.orientation == orientation {
                return;
            }
            state.orientation = orientation;
            state.listeners.values().map(Arc::clone).collect()
        };
        for listener in listeners {
            listener(orientation);
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl HostDisplay for ManualHostDisplay {
    fn interface_orientation(&self) -> InterfaceOrientation {
        self.lock().orientation
    }

    fn subscribe(&self, listener: OrientationListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let _ = self.lock().listeners.insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let _ = self.lock().listeners.remove(&id);
    }
}
