use std::path::Path;

use rusqlite::Connection;
use uuid::Uuid;

use crate::db;
use crate::error::{Result, TallyError};
use crate::models::{
    now_iso, AiUsage, ChallengeDefinition, LedgerRecord, PlanTier, RecordDraft, RecordPatch,
};

/// Single source of truth for ledger records. Every mutation goes through
/// here so the dirty flag and timestamps stay consistent; the sync engine
/// and the CLI both hold a reference instead of reaching into the database.
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    pub fn open(db_path: &Path) -> Result<RecordStore> {
        let conn = db::get_connection(db_path)?;
        db::init_db(&conn)?;
        Ok(RecordStore { conn })
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    pub fn create(&self, draft: RecordDraft) -> Result<LedgerRecord> {
        validate_amount(draft.amount)?;
        if draft.category.trim().is_empty() {
            return Err(TallyError::Validation("category is required".to_string()));
        }
        validate_date(&draft.date)?;

        let now = now_iso();
        let record = LedgerRecord {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            amount: draft.amount,
            currency: draft.currency,
            category: draft.category.trim().to_string(),
            note: normalize_note(draft.note),
            date: draft.date,
            tags: normalize_tags(draft.tags),
            created_at: now.clone(),
            updated_at: now,
            deleted: false,
            dirty: true,
        };
        db::upsert_record(&self.conn, &record)?;
        Ok(record)
    }

    pub fn update(&self, id: &str, patch: RecordPatch) -> Result<LedgerRecord> {
        let mut record = self.require(id)?;

        if let Some(kind) = patch.kind {
            record.kind = kind;
        }
        if let Some(amount) = patch.amount {
            record.amount = amount;
        }
        if let Some(currency) = patch.currency {
            record.currency = currency;
        }
        if let Some(category) = patch.category {
            record.category = category.trim().to_string();
        }
        if let Some(note) = patch.note {
            record.note = normalize_note(Some(note));
        }
        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(tags) = patch.tags {
            record.tags = normalize_tags(tags);
        }

        validate_amount(record.amount)?;
        if record.category.is_empty() {
            return Err(TallyError::Validation("category is required".to_string()));
        }
        validate_date(&record.date)?;

        record.updated_at = bump_timestamp(&record.updated_at);
        record.dirty = true;
        db::upsert_record(&self.conn, &record)?;
        Ok(record)
    }

    /// Soft delete: the record disappears from reads immediately but the
    /// tombstone stays dirty until a sync pushes it.
    pub fn soft_delete(&self, id: &str) -> Result<()> {
        let record = self.require(id)?;
        let timestamp = bump_timestamp(&record.updated_at);
        db::mark_deleted(&self.conn, id, &timestamp)?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<LedgerRecord>> {
        db::list_records(&self.conn)
    }

    pub fn list_dirty(&self) -> Result<Vec<LedgerRecord>> {
        db::list_dirty(&self.conn)
    }

    /// Every row including tombstones; used for status counts and tests.
    pub fn read_all(&self) -> Result<Vec<LedgerRecord>> {
        db::read_all(&self.conn)
    }

    pub fn get(&self, id: &str) -> Result<Option<LedgerRecord>> {
        db::get_record(&self.conn, id)
    }

    /// Resolve a full id or a unique id prefix to a record id.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        if self.get(prefix)?.is_some() {
            return Ok(prefix.to_string());
        }
        let matches: Vec<String> = self
            .read_all()?
            .into_iter()
            .filter(|r| !r.deleted && r.id.starts_with(prefix))
            .map(|r| r.id)
            .collect();
        match matches.as_slice() {
            [] => Err(TallyError::NotFound(prefix.to_string())),
            [only] => Ok(only.clone()),
            many => Err(TallyError::Other(format!(
                "id prefix '{prefix}' is ambiguous ({} matches)",
                many.len()
            ))),
        }
    }

    pub fn clear_dirty(&self, ids: &[String]) -> Result<()> {
        db::clear_dirty(&self.conn, ids)
    }

    /// Merge path for pulled records: overwrite whatever is local and force
    /// the copy clean. Last write wins, field by field comparisons are not
    /// attempted.
    pub fn apply_remote(&self, record: &LedgerRecord) -> Result<()> {
        let mut incoming = record.clone();
        incoming.dirty = false;
        db::upsert_record(&self.conn, &incoming)
    }

    /// Physically delete every record. Never called by sync; this is the
    /// explicit reset path only. Meta (plan, usage) survives.
    pub fn purge_all(&self) -> Result<()> {
        db::purge_records(&self.conn)
    }

    // -----------------------------------------------------------------------
    // Meta
    // -----------------------------------------------------------------------

    pub fn plan(&self) -> Result<PlanTier> {
        db::get_plan(&self.conn)
    }

    pub fn set_plan(&self, plan: PlanTier) -> Result<()> {
        db::set_plan(&self.conn, plan)
    }

    pub fn last_synced_at(&self) -> Result<Option<String>> {
        db::get_last_sync_at(&self.conn)
    }

    pub fn set_last_synced_at(&self, timestamp: &str) -> Result<()> {
        db::set_last_sync_at(&self.conn, timestamp)
    }

    pub fn ai_usage(&self) -> Result<Option<AiUsage>> {
        db::get_ai_usage(&self.conn)
    }

    /// Bump today's usage counter; a date change starts a fresh count.
    pub fn increment_ai_usage(&self, today: &str) -> Result<AiUsage> {
        let count = match self.ai_usage()? {
            Some(usage) if usage.date == today => usage.count + 1,
            _ => 1,
        };
        let usage = AiUsage { date: today.to_string(), count };
        db::set_ai_usage(&self.conn, &usage)?;
        Ok(usage)
    }

    pub fn custom_challenges(&self) -> Result<Vec<ChallengeDefinition>> {
        db::get_custom_challenges(&self.conn)
    }

    /// Add or replace a custom challenge by id.
    pub fn add_custom_challenge(&self, challenge: ChallengeDefinition) -> Result<()> {
        let mut challenges: Vec<ChallengeDefinition> = self
            .custom_challenges()?
            .into_iter()
            .filter(|c| c.id != challenge.id)
            .collect();
        challenges.push(challenge);
        db::set_custom_challenges(&self.conn, &challenges)
    }

    pub fn remove_custom_challenge(&self, id: &str) -> Result<bool> {
        let challenges = self.custom_challenges()?;
        let before = challenges.len();
        let remaining: Vec<ChallengeDefinition> =
            challenges.into_iter().filter(|c| c.id != id).collect();
        db::set_custom_challenges(&self.conn, &remaining)?;
        Ok(remaining.len() != before)
    }

    fn require(&self, id: &str) -> Result<LedgerRecord> {
        match self.get(id)? {
            Some(record) if !record.deleted => Ok(record),
            _ => Err(TallyError::NotFound(id.to_string())),
        }
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(TallyError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<()> {
    let day = date.get(0..10).unwrap_or(date);
    if chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").is_err() {
        return Err(TallyError::Validation(format!("invalid date: {date}")));
    }
    Ok(())
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Next updated_at for a mutation: now, clamped so the value never moves
/// backwards even if the wall clock does.
fn bump_timestamp(previous: &str) -> String {
    let now = now_iso();
    if now.as_str() > previous {
        now
    } else {
        previous.to_string()
    }
}
