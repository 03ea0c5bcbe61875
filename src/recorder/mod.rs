//! Records the current visitor's country once per page load.
//!
//! The lookup is best effort: a failed request, an unexpected payload or an
//! unwritable store is logged and the page load carries on without a visit.

mod geolocation;

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::{Config, DedupMode, MAX_TRACKED_SESSIONS, SESSIONS_KEY};
use crate::error_handling::StorageError;
use crate::storage::{KeyValueStorage, VisitRecord, VisitRecordStore};

pub use geolocation::{lookup_visitor_country, VisitorCountry};

/// What happened to this page load's visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The visit was added to the store.
    Recorded {
        /// Country reported by the lookup
        country: VisitorCountry,
        /// Record after the increment
        record: VisitRecord,
    },
    /// The session had already been counted.
    DuplicateSession,
    /// The country could not be resolved.
    LookupFailed,
    /// The country was resolved but could not be stored.
    StorageFailed,
}

impl RecordOutcome {
    /// Whether a visit was added.
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded { .. })
    }
}

/// Resolves the visitor's country and feeds it into a [`VisitRecordStore`].
#[derive(Debug, Clone)]
pub struct VisitRecorder {
    client: Arc<reqwest::Client>,
    endpoint: String,
    session: Option<String>,
}

impl VisitRecorder {
    /// Recorder querying `endpoint`, counting every call.
    pub fn new(client: Arc<reqwest::Client>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            session: None,
        }
    }

    /// Counts each session id at most once.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session = Some(session_id.into());
        self
    }

    /// Recorder for the configured endpoint and dedup mode.
    pub fn from_config(client: Arc<reqwest::Client>, config: &Config) -> Self {
        let recorder = Self::new(client, config.geolocation_url.clone());
        match (config.dedup, config.session_id.as_deref()) {
            (DedupMode::Session, Some(id)) if !id.trim().is_empty() => {
                recorder.with_session(id.trim())
            }
            (DedupMode::Session, _) => {
                warn!("Session deduplication requested without a session id; every load counts");
                recorder
            }
            (DedupMode::None, _) => recorder,
        }
    }

    /// One-shot lookup of the visitor's country, recorded into `store`.
    ///
    /// Never returns an error: every failure is logged and reported through
    /// the outcome.
    pub async fn record_current_visitor<S: KeyValueStorage>(
        &self,
        store: &mut VisitRecordStore<S>,
    ) -> RecordOutcome {
        if let Some(session) = &self.session {
            match session_seen(store.storage(), session) {
                Ok(true) => {
                    debug!("Session {session} already counted");
                    return RecordOutcome::DuplicateSession;
                }
                Ok(false) => {}
                Err(e) => warn!("Counted sessions unavailable: {e}"),
            }
        }

        let country = match lookup_visitor_country(&self.client, &self.endpoint).await {
            Ok(country) => country,
            Err(e) => {
                warn!("Error tracking visitor country: {e}");
                return RecordOutcome::LookupFailed;
            }
        };

        let Some(record) = store.record_visit(&country.code, &country.name) else {
            return RecordOutcome::StorageFailed;
        };
        info!(
            "Recorded visit from {} ({}): {} visit(s)",
            record.name, country.code, record.count
        );

        if let Some(session) = &self.session {
            if let Err(e) = remember_session(store.storage_mut(), session) {
                warn!("Session {session} not remembered: {e}");
            }
        }

        RecordOutcome::Recorded { country, record }
    }
}

fn load_sessions<S: KeyValueStorage>(storage: &S) -> Result<Vec<String>, StorageError> {
    match storage.get_item(SESSIONS_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

fn session_seen<S: KeyValueStorage>(storage: &S, session: &str) -> Result<bool, StorageError> {
    Ok(load_sessions(storage)?.iter().any(|s| s == session))
}

fn remember_session<S: KeyValueStorage>(storage: &mut S, session: &str) -> Result<(), StorageError> {
    let mut sessions = load_sessions(storage)?;
    sessions.push(session.to_string());
    if sessions.len() > MAX_TRACKED_SESSIONS {
        let excess = sessions.len() - MAX_TRACKED_SESSIONS;
        sessions.drain(..excess);
    }
    storage.set_item(SESSIONS_KEY, &serde_json::to_string(&sessions)?)
}
