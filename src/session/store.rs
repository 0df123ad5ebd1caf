//! Process-wide session storage and the per-request session handle.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{FrameworkError, FrameworkResult};

const FORM_TOKEN_LEN: usize = 40;

/// Session policy knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// How long a session may go untouched before it is destroyed.
    pub ttl: Duration,
    /// Upper bound on session starts before the token must rotate.
    /// Zero or negative disables rotation.
    pub max_regenerate: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            ttl: Duration::from_secs(1800),
            max_regenerate: 40,
        }
    }
}

/// Everything stored for one session token.
#[derive(Debug, Default)]
struct SessionRecord {
    remote_addr: Option<IpAddr>,
    last_access: Option<Instant>,
    access_level: u32,
    regenerate_threshold: u32,
    regenerate_counter: u32,
    form_tokens: HashSet<String>,
    values: HashMap<String, Value>,
}

/// Keyed session storage shared across requests.
///
/// Each token maps to its own locked record: requests presenting different
/// tokens never block each other, while two requests racing on one token
/// serialize on its mutex.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<SessionRecord>>>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Start or resume a session for this request.
    ///
    /// An unknown or absent token yields a fresh session under a new
    /// identifier; a presented token is never adopted for a new record, so
    /// a fixated token can never become a live session. The rotation
    /// policy runs on every open.
    pub fn open(self: &Arc<Self>, presented: Option<&str>, remote_addr: IpAddr) -> Session {
        let existing = presented.and_then(|t| {
            self.sessions
                .get(t)
                .map(|entry| (t.to_string(), Arc::clone(entry.value())))
        });
        let (id, record) = match existing {
            Some(found) => found,
            None => {
                let id = new_session_id();
                let record = Arc::new(Mutex::new(SessionRecord::default()));
                self.sessions.insert(id.clone(), Arc::clone(&record));
                tracing::debug!(session = %id, "Session created");
                (id, record)
            }
        };

        let mut session = Session {
            store: Arc::clone(self),
            id,
            record,
            remote_addr,
            rotated: false,
            destroyed: false,
        };
        session.apply_rotation();
        session
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Per-request handle over one session record.
///
/// Every read and write first runs the validity check: remote-address
/// binding, then TTL, then a last-access refresh. A failed check destroys
/// the session before the error is returned.
#[derive(Debug)]
pub struct Session {
    store: Arc<SessionStore>,
    id: String,
    record: Arc<Mutex<SessionRecord>>,
    remote_addr: IpAddr,
    rotated: bool,
    destroyed: bool,
}

impl Session {
    /// Current session identifier, possibly rotated since the request
    /// presented it.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the identifier rotated during this open.
    pub fn rotated(&self) -> bool {
        self.rotated
    }

    /// Whether this session has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Read a stored value.
    pub fn read(&mut self, key: &str) -> FrameworkResult<Option<Value>> {
        self.with_record(|rec| rec.values.get(key).cloned())
    }

    /// Write a value under a key.
    pub fn write(&mut self, key: &str, value: Value) -> FrameworkResult<()> {
        self.with_record(|rec| {
            rec.values.insert(key.to_string(), value);
        })
    }

    /// Remove the value stored under a key.
    pub fn remove(&mut self, key: &str) -> FrameworkResult<()> {
        self.with_record(|rec| {
            rec.values.remove(key);
        })
    }

    /// Recorded access level, 0 when never set.
    pub fn access_level(&mut self) -> FrameworkResult<u32> {
        self.with_record(|rec| rec.access_level)
    }

    /// Record the access level granted by a login event.
    pub fn set_access_level(&mut self, level: u32) -> FrameworkResult<()> {
        self.with_record(|rec| rec.access_level = level)
    }

    /// Create a random form token, remember it in the session and return
    /// it for embedding in the next form.
    pub fn issue_form_token(&mut self) -> FrameworkResult<String> {
        self.with_record(|rec| {
            let token: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(FORM_TOKEN_LEN)
                .map(char::from)
                .collect();
            rec.form_tokens.insert(token.clone());
            token
        })
    }

    /// Verify a submitted form token against the session's active set.
    ///
    /// On success the whole set is cleared for page requests; AJAX
    /// requests keep it, since a page issuing repeated AJAX calls does not
    /// receive a fresh token per call.
    pub fn check_form_token(&mut self, presented: &str, is_ajax: bool) -> FrameworkResult<()> {
        self.with_record(|rec| {
            if !rec.form_tokens.contains(presented) {
                return Err(FrameworkError::InvalidFormToken);
            }
            if !is_ajax {
                rec.form_tokens.clear();
            }
            Ok(())
        })
        .and_then(|inner| inner)
    }

    /// Destroy the session: clear the record, drop the token from the
    /// store and mark this handle dead. The adapter answers with an
    /// already-expired cookie.
    pub fn destroy(&mut self) -> FrameworkResult<()> {
        let record = Arc::clone(&self.record);
        let mut rec = lock(&record)?;
        self.destroy_locked(&mut rec);
        Ok(())
    }

    fn with_record<T>(&mut self, f: impl FnOnce(&mut SessionRecord) -> T) -> FrameworkResult<T> {
        if self.destroyed {
            return Err(FrameworkError::Session(
                "session has been destroyed".to_string(),
            ));
        }
        let record = Arc::clone(&self.record);
        let mut rec = lock(&record)?;
        self.validate(&mut rec)?;
        Ok(f(&mut rec))
    }

    fn validate(&mut self, rec: &mut SessionRecord) -> FrameworkResult<()> {
        match rec.remote_addr {
            None => rec.remote_addr = Some(self.remote_addr),
            Some(bound) if bound != self.remote_addr => {
                let reason = format!("session bound to {bound} used from {}", self.remote_addr);
                tracing::warn!(session = %self.id, %reason, "Session destroyed");
                self.destroy_locked(rec);
                return Err(FrameworkError::SessionExpired { reason });
            }
            Some(_) => {}
        }

        if let Some(last) = rec.last_access {
            if last.elapsed() > self.store.config.ttl {
                tracing::debug!(session = %self.id, "Session timed out");
                self.destroy_locked(rec);
                return Err(FrameworkError::SessionExpired {
                    reason: "session timed out".to_string(),
                });
            }
        }
        rec.last_access = Some(Instant::now());
        Ok(())
    }

    fn destroy_locked(&mut self, rec: &mut SessionRecord) {
        *rec = SessionRecord::default();
        self.store.sessions.remove(&self.id);
        self.destroyed = true;
    }

    /// Count this start against the randomized rotation threshold and
    /// rotate the identifier when it is reached.
    fn apply_rotation(&mut self) {
        if self.store.config.max_regenerate <= 0 {
            return;
        }
        let max = self.store.config.max_regenerate as u32;

        let record = Arc::clone(&self.record);
        let Ok(mut rec) = record.lock() else {
            return;
        };
        if rec.regenerate_threshold == 0 {
            rec.regenerate_threshold = rand::thread_rng().gen_range(1..=max);
        }
        rec.regenerate_counter += 1;
        if rec.regenerate_counter < rec.regenerate_threshold {
            return;
        }

        rec.regenerate_counter = 0;
        rec.regenerate_threshold = rand::thread_rng().gen_range((max / 2).max(1)..=max);

        let new_id = new_session_id();
        if let Some((_, entry)) = self.store.sessions.remove(&self.id) {
            self.store.sessions.insert(new_id.clone(), entry);
        }
        tracing::debug!(old = %self.id, new = %new_id, "Session identifier rotated");
        self.id = new_id;
        self.rotated = true;
    }
}

fn lock(record: &Arc<Mutex<SessionRecord>>) -> FrameworkResult<std::sync::MutexGuard<'_, SessionRecord>> {
    record
        .lock()
        .map_err(|_| FrameworkError::Session("session record lock poisoned".to_string()))
}
