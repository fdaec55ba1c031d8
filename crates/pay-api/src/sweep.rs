//! # Session Sweep
//!
//! Periodically removes long-expired sessions from the store.

use pay_core::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Spawn the cleanup loop. The first sweep runs one `period` after start.
pub fn spawn_cleanup_task(store: Arc<SessionStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = store.cleanup_expired_sessions();
            if removed > 0 {
                debug!("Swept {} expired sessions", removed);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use pay_core::{MockClock, NewSession, SessionStatus};

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_old_expired_sessions() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(MockClock::new(start));
        let store = Arc::new(SessionStore::new(clock.clone()));

        store.create_session(NewSession {
            checkout_id: "co_1".to_string(),
            address: "shop@bringin.xyz".to_string(),
            amount_eur: 1.0,
            amount_sats: 1_000,
            invoice: "lnbc1".to_string(),
            verify_url: "https://bringin.xyz/lnurlp/shop/verify/1".to_string(),
            payment_reference: None,
            expires_at: start + ChronoDuration::minutes(15),
        });
        store.update_session_status("co_1", SessionStatus::Expired, None);
        clock.advance(ChronoDuration::hours(2));

        let handle = spawn_cleanup_task(store.clone(), Duration::from_secs(600));

        tokio::time::sleep(Duration::from_secs(599)).await;
        assert_eq!(store.len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.is_empty());

        handle.abort();
    }
}
