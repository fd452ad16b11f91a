use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::models::{now_iso, LedgerRecord, SyncSnapshot, SyncStatus};
use crate::store::RecordStore;

/// Quiet window after a mutation before a debounced sync fires. Every
/// further mutation pushes the deadline out again.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(800);

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Serialize, Deserialize)]
struct SyncPayload {
    #[serde(default)]
    records: Vec<LedgerRecord>,
}

/// Remote side of a sync cycle. The HTTP implementation talks to the
/// configured endpoint; tests substitute a scripted fake.
pub trait SyncTransport {
    /// Upload a batch of dirty records. Must be idempotent on record id
    /// server-side; the engine may resend a batch after a failed cycle.
    fn push(&self, records: &[LedgerRecord]) -> Result<()>;

    /// Download the full remote record set.
    fn pull(&self) -> Result<Vec<LedgerRecord>>;
}

pub struct HttpTransport {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Result<HttpTransport> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TallyError::Network(e.to_string()))?;
        Ok(HttpTransport {
            base: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn sync_url(&self) -> String {
        format!("{}/sync", self.base)
    }
}

impl SyncTransport for HttpTransport {
    fn push(&self, records: &[LedgerRecord]) -> Result<()> {
        let payload = SyncPayload { records: records.to_vec() };
        let response = self
            .client
            .post(self.sync_url())
            .json(&payload)
            .send()
            .map_err(|e| TallyError::Network(format!("Sync push failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TallyError::Network(format!(
                "Sync push failed: {} {}",
                status.as_u16(),
                body.trim()
            )));
        }
        Ok(())
    }

    fn pull(&self) -> Result<Vec<LedgerRecord>> {
        let response = self
            .client
            .get(self.sync_url())
            .send()
            .map_err(|e| TallyError::Network(format!("Sync pull failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TallyError::Network(format!(
                "Sync pull failed: {}",
                status.as_u16()
            )));
        }
        let payload: SyncPayload = response
            .json()
            .map_err(|e| TallyError::Network(format!("Sync pull failed: {e}")))?;
        // Remote copies are the confirmed state, never dirty.
        Ok(payload
            .records
            .into_iter()
            .map(|mut record| {
                record.dirty = false;
                record
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// An explicit user request; runs a cycle right away.
    Manual,
    /// A record changed; arms the debounce window instead of firing.
    Mutation,
}

/// Deadline for a pending debounced cycle.
struct Debounce {
    deadline: Option<Instant>,
}

impl Debounce {
    fn new() -> Debounce {
        Debounce { deadline: None }
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + DEBOUNCE_WINDOW);
    }

    fn due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    fn disarm(&mut self) {
        self.deadline = None;
    }
}

/// Drives sync cycles and owns the status state machine.
///
/// With no transport the engine is permanently offline: triggers are
/// accepted and ignored, and nothing ever touches the network. Otherwise
/// the status runs idle -> syncing -> success | error, and a new cycle may
/// start from any state except syncing.
pub struct SyncEngine<T: SyncTransport> {
    transport: Option<T>,
    snapshot: SyncSnapshot,
    debounce: Debounce,
    in_flight: bool,
}

impl<T: SyncTransport> SyncEngine<T> {
    pub fn new(transport: Option<T>, last_synced_at: Option<String>) -> SyncEngine<T> {
        let status = if transport.is_some() {
            SyncStatus::Idle
        } else {
            SyncStatus::Offline
        };
        SyncEngine {
            transport,
            snapshot: SyncSnapshot { status, last_synced_at, error: None },
            debounce: Debounce::new(),
            in_flight: false,
        }
    }

    pub fn snapshot(&self) -> &SyncSnapshot {
        &self.snapshot
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Single entry point for both trigger sources. Manual requests run a
    /// cycle immediately; mutations only arm the debounce so bursts of
    /// edits collapse into one cycle.
    pub fn request_sync(&mut self, store: &RecordStore, trigger: SyncTrigger, now: Instant) {
        match trigger {
            SyncTrigger::Manual => self.run_cycle(store),
            SyncTrigger::Mutation => {
                if self.transport.is_some() {
                    self.debounce.arm(now);
                }
            }
        }
    }

    /// Fire a due debounced cycle. Due-while-in-flight re-arms the window
    /// rather than queueing a second cycle.
    pub fn poll(&mut self, store: &RecordStore, now: Instant) {
        if !self.debounce.due(now) {
            return;
        }
        if self.in_flight {
            self.debounce.arm(now);
            return;
        }
        self.debounce.disarm();
        self.run_cycle(store);
    }

    /// Block until a pending debounced cycle has fired. No-op when nothing
    /// is armed; used by the CLI so a mutation's sync lands before exit.
    pub fn drain(&mut self, store: &RecordStore) {
        while self.debounce.deadline.is_some() {
            std::thread::sleep(DRAIN_POLL);
            self.poll(store, Instant::now());
        }
    }

    fn run_cycle(&mut self, store: &RecordStore) {
        if self.in_flight {
            return;
        }
        let Some(transport) = self.transport.as_ref() else {
            // Unconfigured: stay offline, never touch the network.
            return;
        };
        self.in_flight = true;
        self.snapshot.status = SyncStatus::Syncing;
        self.snapshot.error = None;

        match execute_cycle(transport, store) {
            Ok(timestamp) => {
                self.snapshot.status = SyncStatus::Success;
                self.snapshot.last_synced_at = Some(timestamp);
            }
            Err(err) => {
                self.snapshot.status = SyncStatus::Error;
                self.snapshot.error = Some(err.to_string());
            }
        }
        self.in_flight = false;
    }
}

/// One push-then-pull cycle. A push failure aborts before any dirty flag is
/// cleared; flags are cleared only for the ids that were actually pushed.
/// A later pull failure leaves those flags cleared: delivery is at least
/// once and the remote upsert is idempotent on id.
fn execute_cycle<T: SyncTransport>(transport: &T, store: &RecordStore) -> Result<String> {
    let dirty = store.list_dirty()?;
    if !dirty.is_empty() {
        transport.push(&dirty)?;
        let ids: Vec<String> = dirty.iter().map(|r| r.id.clone()).collect();
        store.clear_dirty(&ids)?;
    }

    let remote = transport.pull()?;
    for record in &remote {
        store.apply_remote(record)?;
    }

    let timestamp = now_iso();
    store.set_last_synced_at(&timestamp)?;
    Ok(timestamp)
}
