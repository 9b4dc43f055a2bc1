// src/services/cooldown.rs
// DOCUMENTATION: In-memory per-user reply cooldown
// PURPOSE: Limit how often one user may post replies

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::services::LoginThrottle;

/// Entries older than this are dropped by cleanup()
pub const ENTRY_MAX_AGE: Duration = Duration::from_secs(3600);

/// Last reply time per user
/// DOCUMENTATION: Thread-safe; shared across workers through web::Data<Arc<_>>
pub struct ReplyCooldown {
    last_reply: RwLock<HashMap<i64, Instant>>,
    cooldown: Duration,
}

impl ReplyCooldown {
    pub fn new(cooldown_seconds: u64) -> Self {
        Self {
            last_reply: RwLock::new(HashMap::new()),
            cooldown: Duration::from_secs(cooldown_seconds),
        }
    }

    /// Seconds the user still has to wait, if any
    pub async fn remaining(&self, user_id: i64) -> Option<u64> {
        let store = self.last_reply.read().await;
        self.wait_left(store.get(&user_id), Instant::now())
    }

    fn wait_left(&self, last: Option<&Instant>, now: Instant) -> Option<u64> {
        let elapsed = now.saturating_duration_since(*last?);
        if elapsed >= self.cooldown {
            return None;
        }

        // Round up so a caller is never told to wait 0 seconds
        let left = self.cooldown - elapsed;
        Some(left.as_secs() + u64::from(left.subsec_nanos() > 0))
    }

    /// Claim the user's reply slot now.
    /// Err carries the seconds left when the user is still cooling down.
    pub async fn try_acquire(&self, user_id: i64) -> Result<(), u64> {
        self.try_acquire_at(user_id, Instant::now()).await
    }

    async fn try_acquire_at(&self, user_id: i64, now: Instant) -> Result<(), u64> {
        let mut store = self.last_reply.write().await;
        if let Some(wait) = self.wait_left(store.get(&user_id), now) {
            return Err(wait);
        }
        store.insert(user_id, now);
        Ok(())
    }

    /// Give back a slot taken by try_acquire when the reply was never stored
    pub async fn release(&self, user_id: i64) {
        self.last_reply.write().await.remove(&user_id);
    }

    /// Drop entries older than ENTRY_MAX_AGE
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    async fn cleanup_at(&self, now: Instant) {
        let mut store = self.last_reply.write().await;
        let before_count = store.len();
        store.retain(|_, at| now.saturating_duration_since(*at) < ENTRY_MAX_AGE);
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cooldown cleanup: removed {} stale entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    pub async fn stats(&self) -> CooldownStats {
        let store = self.last_reply.read().await;
        let now = Instant::now();
        let cooling = store
            .values()
            .filter(|at| now.saturating_duration_since(**at) < self.cooldown)
            .count();

        CooldownStats {
            tracked_users: store.len(),
            cooling_down: cooling,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CooldownStats {
    pub tracked_users: usize,
    pub cooling_down: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically sweeps the cooldown map and the login limiter
pub fn start_cleanup_task(
    cooldown: Arc<ReplyCooldown>,
    throttle: Arc<LoginThrottle>,
    interval_seconds: u64,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cooldown.cleanup().await;
            throttle.cleanup();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_user_has_no_cooldown() {
        let cooldown = ReplyCooldown::new(30);
        assert_eq!(cooldown.remaining(1).await, None);
        assert_eq!(cooldown.try_acquire(1).await, Ok(()));
    }

    #[tokio::test]
    async fn test_second_acquire_is_refused() {
        let cooldown = ReplyCooldown::new(30);
        assert_eq!(cooldown.try_acquire(1).await, Ok(()));

        let left = cooldown.try_acquire(1).await.unwrap_err();
        assert!(left > 0 && left <= 30);
        assert!(cooldown.remaining(1).await.is_some());

        // Other users are unaffected
        assert_eq!(cooldown.try_acquire(2).await, Ok(()));
    }

    #[tokio::test]
    async fn test_concurrent_acquires_admit_one() {
        let cooldown = Arc::new(ReplyCooldown::new(30));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cooldown = cooldown.clone();
                tokio::spawn(async move { cooldown.try_acquire(7).await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn test_release_frees_the_slot() {
        let cooldown = ReplyCooldown::new(30);
        cooldown.try_acquire(1).await.unwrap();
        cooldown.release(1).await;

        assert_eq!(cooldown.remaining(1).await, None);
        assert_eq!(cooldown.try_acquire(1).await, Ok(()));
    }

    #[tokio::test]
    async fn test_cooldown_expires() {
        let cooldown = ReplyCooldown::new(30);
        let start = Instant::now();
        cooldown.try_acquire_at(1, start).await.unwrap();

        assert!(cooldown
            .try_acquire_at(1, start + Duration::from_secs(10))
            .await
            .is_err());
        assert_eq!(
            cooldown
                .try_acquire_at(1, start + Duration::from_secs(30))
                .await,
            Ok(())
        );
    }

    #[tokio::test]
    async fn test_zero_cooldown_never_blocks() {
        let cooldown = ReplyCooldown::new(0);
        cooldown.try_acquire(1).await.unwrap();
        assert_eq!(cooldown.remaining(1).await, None);
        assert_eq!(cooldown.try_acquire(1).await, Ok(()));
    }

    #[tokio::test]
    async fn test_cleanup_keeps_recent_entries() {
        let cooldown = ReplyCooldown::new(30);
        cooldown.try_acquire(1).await.unwrap();
        cooldown.try_acquire(2).await.unwrap();

        cooldown.cleanup().await;

        let stats = cooldown.stats().await;
        assert_eq!(stats.tracked_users, 2);
        assert_eq!(stats.cooling_down, 2);
    }

    #[tokio::test]
    async fn test_cleanup_drops_entries_past_max_age() {
        let cooldown = ReplyCooldown::new(30);
        let start = Instant::now();
        cooldown.try_acquire_at(1, start).await.unwrap();
        cooldown
            .try_acquire_at(2, start + Duration::from_secs(2 * 3600 - 60))
            .await
            .unwrap();

        cooldown.cleanup_at(start + Duration::from_secs(2 * 3600)).await;

        let store = cooldown.last_reply.read().await;
        assert!(!store.contains_key(&1));
        assert!(store.contains_key(&2));
    }
}
