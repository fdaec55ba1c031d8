//! # Session Store
//!
//! Process-local store of checkout sessions plus the mock-payment markers
//! used by the demo fallback. Nothing here fails: missing sessions are
//! reported as `None` or `false`.

use crate::clock::SharedClock;
use crate::config::PolicyConfig;
use crate::session::{CheckoutSession, NewSession, SessionStatus};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tracing::{debug, info};

/// Thresholds the store applies
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    /// Age after which `should_mock_paid` starts returning true
    pub mock_paid_after: Duration,
    /// How long past expiry an expired session is kept
    pub retention: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            mock_paid_after: Duration::seconds(12),
            retention: Duration::hours(1),
        }
    }
}

impl From<&PolicyConfig> for StoreSettings {
    fn from(policy: &PolicyConfig) -> Self {
        Self {
            mock_paid_after: policy.mock_paid_after(),
            retention: policy.retention(),
        }
    }
}

/// In-memory checkout session store
pub struct SessionStore {
    clock: SharedClock,
    settings: StoreSettings,
    sessions: RwLock<HashMap<String, CheckoutSession>>,
    mock_marks: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new(clock: SharedClock) -> Self {
        Self::with_settings(clock, StoreSettings::default())
    }

    pub fn with_settings(clock: SharedClock, settings: StoreSettings) -> Self {
        Self {
            clock,
            settings,
            sessions: RwLock::new(HashMap::new()),
            mock_marks: Mutex::new(HashMap::new()),
        }
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Insert a pending session, replacing any session with the same id
    pub fn create_session(&self, new: NewSession) -> CheckoutSession {
        let session = CheckoutSession {
            checkout_id: new.checkout_id,
            address: new.address,
            amount_eur: new.amount_eur,
            amount_sats: new.amount_sats,
            invoice: new.invoice,
            verify_url: new.verify_url,
            payment_reference: new.payment_reference,
            created_at: self.clock.now(),
            expires_at: new.expires_at,
            status: SessionStatus::Pending,
            paid_at: None,
            last_checked_at: None,
        };

        debug!(
            checkout_id = %session.checkout_id,
            expires_at = %session.expires_at,
            "Created checkout session"
        );

        self.sessions
            .write()
            .insert(session.checkout_id.clone(), session.clone());
        session
    }

    pub fn get_session(&self, id: &str) -> Option<CheckoutSession> {
        self.sessions.read().get(id).cloned()
    }

    /// Set status and stamp `last_checked_at`. `paid_at` is only ever set, never cleared.
    pub fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
        paid_at: Option<DateTime<Utc>>,
    ) {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let Some(session) = sessions.get_mut(id) else {
            return;
        };

        session.status = status;
        session.last_checked_at = Some(now);
        if let Some(paid_at) = paid_at {
            session.paid_at = Some(paid_at);
        }
    }

    /// True once the clock has passed the session's expiry, whatever its status
    pub fn is_session_expired(&self, session: &CheckoutSession) -> bool {
        self.clock.now() > session.expires_at
    }

    /// Demo fallback trigger.
    ///
    /// Returns true if a mock payment was already recorded for `id`. Otherwise,
    /// once `mock_paid_after` has elapsed since `created_at`, records a marker
    /// and returns true. Sticky after the first true.
    pub fn should_mock_paid(&self, id: &str, created_at: DateTime<Utc>) -> bool {
        let mut marks = self.mock_marks.lock();
        if marks.contains_key(id) {
            return true;
        }

        let now = self.clock.now();
        if now - created_at >= self.settings.mock_paid_after {
            marks.insert(id.to_string(), now);
            return true;
        }
        false
    }

    /// Remove expired sessions whose expiry is older than the retention window.
    /// Returns the number removed.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let cutoff = self.clock.now() - self.settings.retention;
        let mut sessions = self.sessions.write();
        let stale: Vec<String> = sessions
            .values()
            .filter(|s| s.status == SessionStatus::Expired && s.expires_at < cutoff)
            .map(|s| s.checkout_id.clone())
            .collect();

        if stale.is_empty() {
            return 0;
        }

        let mut marks = self.mock_marks.lock();
        for id in &stale {
            sessions.remove(id);
            marks.remove(id);
        }

        info!("Cleaned up {} expired checkout sessions", stale.len());
        stale.len()
    }

    /// Remove a session and its mock marker. Returns true if it existed.
    pub fn delete_session(&self, id: &str) -> bool {
        self.mock_marks.lock().remove(id);
        self.sessions.write().remove(id).is_some()
    }

    pub fn clear_all_sessions(&self) {
        self.sessions.write().clear();
        self.mock_marks.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
