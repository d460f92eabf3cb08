//! In-process pause notifications for running replays.
//!
//! The session store's pause flag decides whether a replay stops. This
//! registry only wakes a replay loop that is sleeping between plays so it
//! re-reads the store immediately instead of after the full interval.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use playcast_domain::UserId;
use tokio_util::sync::CancellationToken;

/// Loops currently listening for one user.
struct Listeners {
    token: CancellationToken,
    generation: u64,
    count: usize,
}

/// A loop's registration with [`PauseSignals`].
///
/// Hand it back through [`PauseSignals::release`] when the loop ends.
pub struct PauseSubscription {
    token: CancellationToken,
    generation: u64,
}

impl PauseSubscription {
    /// Completes once a pause is signalled for the subscribed user.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Default)]
pub struct PauseSignals {
    listeners: DashMap<UserId, Listeners>,
    generations: AtomicU64,
}

impl PauseSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscription that fires on the next [`signal`](Self::signal) for this user.
    pub fn subscribe(&self, user_id: &UserId) -> PauseSubscription {
        let mut listeners = self
            .listeners
            .entry(user_id.clone())
            .or_insert_with(|| Listeners {
                token: CancellationToken::new(),
                generation: self.generations.fetch_add(1, Ordering::Relaxed),
                count: 0,
            });
        listeners.count += 1;
        PauseSubscription {
            token: listeners.token.child_token(),
            generation: listeners.generation,
        }
    }

    /// Drop a subscription. The user's entry goes away with its last listener.
    ///
    /// Subscriptions already woken by a signal belong to a removed entry and
    /// release nothing.
    pub fn release(&self, user_id: &UserId, subscription: &PauseSubscription) {
        self.listeners.remove_if_mut(user_id, |_, listeners| {
            if listeners.generation == subscription.generation {
                listeners.count = listeners.count.saturating_sub(1);
            }
            listeners.count == 0
        });
    }

    /// Wake every loop subscribed for this user. Later subscribers get a
    /// fresh token.
    pub fn signal(&self, user_id: &UserId) {
        if let Some((_, listeners)) = self.listeners.remove(user_id) {
            tracing::debug!(user_id = %user_id, "Pause signal delivered");
            listeners.token.cancel();
        }
    }

    /// Number of users with at least one live subscription.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
