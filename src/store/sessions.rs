use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rand::seq::SliceRandom;

use crate::error::StoreError;

use super::kv::{read_json_or_default, write_json};
use super::{ACTIVE_SESSIONS_KEY, KeyValueStore, SESSION_ID_KEY, SESSION_START_KEY, USER_TOKEN_KEY};

/// Sessions not seen for longer than this are dropped on the next write.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60);

const SESSION_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_ID_LEN: usize = 11;

type LastSeen = BTreeMap<String, i64>;

/// Session id to last-seen epoch millis, swept on every write.
///
/// The active count is only as fresh as the last write: nothing sweeps on a
/// timer.
pub struct SessionRegistry {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(kv, DEFAULT_SESSION_TTL)
    }

    #[must_use]
    pub fn with_ttl(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    /// Marks `session_id` as seen at `now`, drops stale entries, and persists.
    /// Returns the number of sessions left.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written.
    pub fn refresh(&self, session_id: &str, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut sessions: LastSeen = read_json_or_default(self.kv.as_ref(), ACTIVE_SESSIONS_KEY)?;
        let now_ms = now.timestamp_millis();
        sessions.insert(session_id.to_owned(), now_ms);
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        sessions.retain(|_, last_seen| now_ms.saturating_sub(*last_seen) <= ttl_ms);
        write_json(self.kv.as_ref(), ACTIVE_SESSIONS_KEY, &sessions)?;
        Ok(sessions.len())
    }

    /// Number of entries as of the last write.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn active_count(&self) -> Result<usize, StoreError> {
        let sessions: LastSeen = read_json_or_default(self.kv.as_ref(), ACTIVE_SESSIONS_KEY)?;
        Ok(sessions.len())
    }

    /// Entries as of the last write, ordered by session id.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn sessions(&self) -> Result<Vec<(String, DateTime<Utc>)>, StoreError> {
        let sessions: LastSeen = read_json_or_default(self.kv.as_ref(), ACTIVE_SESSIONS_KEY)?;
        Ok(sessions
            .into_iter()
            .filter_map(|(id, millis)| {
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .map(|seen| (id, seen))
            })
            .collect())
    }

    /// Removes one session immediately.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written.
    pub fn end(&self, session_id: &str) -> Result<bool, StoreError> {
        let mut sessions: LastSeen = read_json_or_default(self.kv.as_ref(), ACTIVE_SESSIONS_KEY)?;
        let removed = sessions.remove(session_id).is_some();
        if removed {
            write_json(self.kv.as_ref(), ACTIVE_SESSIONS_KEY, &sessions)?;
        }
        Ok(removed)
    }
}

/// Scalar bookkeeping for the current session.
pub struct SessionBook {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionBook {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Returns the persisted session id, generating one on first use.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written.
    pub fn session_id(&self) -> Result<String, StoreError> {
        if let Some(existing) = self.current_session_id()? {
            return Ok(existing);
        }
        let session_id = generate_session_id();
        self.kv.set(SESSION_ID_KEY, &session_id)?;
        tracing::debug!("Started session {}", session_id);
        Ok(session_id)
    }

    /// Returns the session id without creating one.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn current_session_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .kv
            .get(SESSION_ID_KEY)?
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty()))
    }

    /// Milliseconds since the session started. The first call records the
    /// start and returns zero.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written.
    pub fn session_duration_ms(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let now_ms = now.timestamp_millis();
        let started = self
            .kv
            .get(SESSION_START_KEY)?
            .and_then(|value| value.trim().parse::<i64>().ok());
        let Some(started) = started else {
            self.kv.set(SESSION_START_KEY, &now_ms.to_string())?;
            return Ok(0);
        };
        Ok(u64::try_from(now_ms.saturating_sub(started)).unwrap_or(0))
    }

    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.kv.get(USER_TOKEN_KEY)?.is_some())
    }

    /// Forgets the session id and start time.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn end(&self) -> Result<(), StoreError> {
        self.kv.remove(SESSION_ID_KEY)?;
        self.kv.remove(SESSION_START_KEY)
    }
}

fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    (0..SESSION_ID_LEN)
        .filter_map(|_| SESSION_ID_ALPHABET.choose(&mut rng))
        .map(|byte| char::from(*byte))
        .collect()
}
