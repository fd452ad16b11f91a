use std::path::Path;

use rusqlite::{Connection, Row};

use crate::error::Result;
use crate::models::{AiUsage, ChallengeDefinition, LedgerRecord, PlanTier, RecordKind};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY NOT NULL,
    type TEXT NOT NULL,
    amount REAL NOT NULL,
    currency TEXT NOT NULL,
    category TEXT NOT NULL,
    note TEXT,
    date TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0,
    dirty INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT
);
";

// Meta keys shared with the sync wire format.
pub const META_PLAN: &str = "plan";
pub const META_LAST_SYNC_AT: &str = "lastSyncAt";
pub const META_AI_USAGE: &str = "aiUsage";
pub const META_CUSTOM_CHALLENGES: &str = "customChallenges";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn map_record(row: &Row) -> rusqlite::Result<LedgerRecord> {
    let kind: String = row.get(1)?;
    let tags: Option<String> = row.get(7)?;
    Ok(LedgerRecord {
        id: row.get(0)?,
        // Unknown kinds decay to expense, same as plan decays to free.
        kind: RecordKind::parse(&kind).unwrap_or(RecordKind::Expense),
        amount: row.get(2)?,
        currency: row.get(3)?,
        category: row.get(4)?,
        note: row.get(5)?,
        date: row.get(6)?,
        tags: tags
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default(),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        deleted: row.get::<_, i64>(10)? == 1,
        dirty: row.get::<_, i64>(11)? == 1,
    })
}

const RECORD_COLUMNS: &str =
    "id, type, amount, currency, category, note, date, tags, created_at, updated_at, deleted, dirty";

fn select_records(conn: &Connection, sql: &str) -> Result<Vec<LedgerRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map_record)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Every row, tombstones included. Gives the sync and reset paths the
/// complete picture; normal reads go through `list_records`.
pub fn read_all(conn: &Connection) -> Result<Vec<LedgerRecord>> {
    select_records(
        conn,
        &format!("SELECT {RECORD_COLUMNS} FROM records ORDER BY date DESC, created_at DESC"),
    )
}

/// Non-deleted records, newest business date first.
pub fn list_records(conn: &Connection) -> Result<Vec<LedgerRecord>> {
    select_records(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE deleted = 0 \
             ORDER BY date DESC, created_at DESC"
        ),
    )
}

/// Records whose local state has not been confirmed remote, tombstones included.
pub fn list_dirty(conn: &Connection) -> Result<Vec<LedgerRecord>> {
    select_records(
        conn,
        &format!("SELECT {RECORD_COLUMNS} FROM records WHERE dirty = 1 ORDER BY date DESC"),
    )
}

pub fn get_record(conn: &Connection, id: &str) -> Result<Option<LedgerRecord>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"))?;
    let mut rows = stmt.query_map([id], map_record)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn upsert_record(conn: &Connection, record: &LedgerRecord) -> Result<()> {
    let tags = serde_json::to_string(&record.tags)?;
    conn.execute(
        "INSERT INTO records (id, type, amount, currency, category, note, date, tags, created_at, updated_at, deleted, dirty) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
         ON CONFLICT(id) DO UPDATE SET \
            type = excluded.type, \
            amount = excluded.amount, \
            currency = excluded.currency, \
            category = excluded.category, \
            note = excluded.note, \
            date = excluded.date, \
            tags = excluded.tags, \
            created_at = excluded.created_at, \
            updated_at = excluded.updated_at, \
            deleted = excluded.deleted, \
            dirty = excluded.dirty",
        rusqlite::params![
            record.id,
            record.kind.as_str(),
            record.amount,
            record.currency,
            record.category,
            record.note,
            record.date,
            tags,
            record.created_at,
            record.updated_at,
            record.deleted as i64,
            record.dirty as i64,
        ],
    )?;
    Ok(())
}

/// Soft delete: the row stays until the deletion has been pushed.
/// Returns false when the id does not exist.
pub fn mark_deleted(conn: &Connection, id: &str, timestamp: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE records SET deleted = 1, dirty = 1, updated_at = ?1 WHERE id = ?2",
        rusqlite::params![timestamp, id],
    )?;
    Ok(changed > 0)
}

/// Clear dirty flags for the given ids. Unknown ids are ignored.
pub fn clear_dirty(conn: &Connection, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let placeholders = (1..=ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(",");
    let params: Vec<&dyn rusqlite::types::ToSql> =
        ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
    conn.execute(
        &format!("UPDATE records SET dirty = 0 WHERE id IN ({placeholders})"),
        params.as_slice(),
    )?;
    Ok(())
}

/// Physically delete every record, tombstones included. Meta is untouched.
pub fn purge_records(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM records", [])?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM meta WHERE key = ?1")?;
    let mut rows = stmt.query_map([key], |row| row.get::<_, Option<String>>(0))?;
    match rows.next() {
        Some(value) => Ok(value?),
        None => Ok(None),
    }
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

/// Unknown or missing plan values decay to free.
pub fn get_plan(conn: &Connection) -> Result<PlanTier> {
    let raw = get_meta(conn, META_PLAN)?;
    Ok(raw
        .as_deref()
        .and_then(PlanTier::parse)
        .unwrap_or(PlanTier::Free))
}

pub fn set_plan(conn: &Connection, plan: PlanTier) -> Result<()> {
    set_meta(conn, META_PLAN, plan.as_str())
}

pub fn get_last_sync_at(conn: &Connection) -> Result<Option<String>> {
    get_meta(conn, META_LAST_SYNC_AT)
}

pub fn set_last_sync_at(conn: &Connection, timestamp: &str) -> Result<()> {
    set_meta(conn, META_LAST_SYNC_AT, timestamp)
}

/// Malformed stored JSON reads as no usage rather than an error.
pub fn get_ai_usage(conn: &Connection) -> Result<Option<AiUsage>> {
    let raw = get_meta(conn, META_AI_USAGE)?;
    Ok(raw.and_then(|value| serde_json::from_str(&value).ok()))
}

pub fn set_ai_usage(conn: &Connection, usage: &AiUsage) -> Result<()> {
    set_meta(conn, META_AI_USAGE, &serde_json::to_string(usage)?)
}

/// Malformed stored JSON reads as an empty list rather than an error.
pub fn get_custom_challenges(conn: &Connection) -> Result<Vec<ChallengeDefinition>> {
    let raw = get_meta(conn, META_CUSTOM_CHALLENGES)?;
    Ok(raw
        .and_then(|value| serde_json::from_str(&value).ok())
        .unwrap_or_default())
}

pub fn set_custom_challenges(conn: &Connection, challenges: &[ChallengeDefinition]) -> Result<()> {
    set_meta(conn, META_CUSTOM_CHALLENGES, &serde_json::to_string(challenges)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now_iso;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn sample_record(id: &str, date: &str) -> LedgerRecord {
        let now = now_iso();
        LedgerRecord {
            id: id.to_string(),
            kind: RecordKind::Expense,
            amount: 120.0,
            currency: "TWD".to_string(),
            category: "food".to_string(),
            note: Some("lunch".to_string()),
            date: date.to_string(),
            tags: vec!["noodles".to_string()],
            created_at: now.clone(),
            updated_at: now,
            deleted: false,
            dirty: true,
        }
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["records", "meta"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_upsert_inserts_then_overwrites() {
        let (_dir, conn) = test_db();
        let mut record = sample_record("r1", "2026-08-20");
        upsert_record(&conn, &record).unwrap();

        record.amount = 250.0;
        record.dirty = false;
        upsert_record(&conn, &record).unwrap();

        let all = read_all(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, 250.0);
        assert!(!all[0].dirty);
    }

    #[test]
    fn test_list_records_hides_tombstones_and_sorts_by_date() {
        let (_dir, conn) = test_db();
        upsert_record(&conn, &sample_record("old", "2026-08-01")).unwrap();
        upsert_record(&conn, &sample_record("new", "2026-08-20")).unwrap();
        let mut gone = sample_record("gone", "2026-08-10");
        gone.deleted = true;
        upsert_record(&conn, &gone).unwrap();

        let visible = list_records(&conn).unwrap();
        let ids: Vec<&str> = visible.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_list_dirty_includes_tombstones() {
        let (_dir, conn) = test_db();
        let mut clean = sample_record("clean", "2026-08-01");
        clean.dirty = false;
        upsert_record(&conn, &clean).unwrap();
        upsert_record(&conn, &sample_record("pending", "2026-08-02")).unwrap();
        let mut gone = sample_record("gone", "2026-08-03");
        gone.deleted = true;
        upsert_record(&conn, &gone).unwrap();

        let dirty = list_dirty(&conn).unwrap();
        let ids: Vec<&str> = dirty.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"pending"));
        assert!(ids.contains(&"gone"));
        assert!(!ids.contains(&"clean"));
    }

    #[test]
    fn test_mark_deleted_keeps_row_and_flags_dirty() {
        let (_dir, conn) = test_db();
        let mut record = sample_record("r1", "2026-08-20");
        record.dirty = false;
        upsert_record(&conn, &record).unwrap();

        let changed = mark_deleted(&conn, "r1", "2026-08-21T00:00:00.000Z").unwrap();
        assert!(changed);
        assert!(!mark_deleted(&conn, "missing", "2026-08-21T00:00:00.000Z").unwrap());

        let row = get_record(&conn, "r1").unwrap().unwrap();
        assert!(row.deleted);
        assert!(row.dirty);
        assert_eq!(row.updated_at, "2026-08-21T00:00:00.000Z");
        assert!(list_records(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_clear_dirty_only_touches_given_ids() {
        let (_dir, conn) = test_db();
        upsert_record(&conn, &sample_record("a", "2026-08-01")).unwrap();
        upsert_record(&conn, &sample_record("b", "2026-08-02")).unwrap();

        let ids = ["a".to_string(), "missing".to_string()];
        clear_dirty(&conn, &ids).unwrap();
        // Repeating the same batch is a no-op.
        clear_dirty(&conn, &ids).unwrap();
        clear_dirty(&conn, &[]).unwrap();

        let a = get_record(&conn, "a").unwrap().unwrap();
        let b = get_record(&conn, "b").unwrap().unwrap();
        assert!(!a.dirty);
        assert!(b.dirty);
    }

    #[test]
    fn test_purge_records_leaves_meta() {
        let (_dir, conn) = test_db();
        upsert_record(&conn, &sample_record("r1", "2026-08-20")).unwrap();
        set_plan(&conn, PlanTier::Pro).unwrap();

        purge_records(&conn).unwrap();

        assert!(read_all(&conn).unwrap().is_empty());
        assert_eq!(get_plan(&conn).unwrap(), PlanTier::Pro);
    }

    #[test]
    fn test_plan_decays_to_free_on_unknown_value() {
        let (_dir, conn) = test_db();
        assert_eq!(get_plan(&conn).unwrap(), PlanTier::Free);
        set_meta(&conn, META_PLAN, "platinum").unwrap();
        assert_eq!(get_plan(&conn).unwrap(), PlanTier::Free);
        set_plan(&conn, PlanTier::Enterprise).unwrap();
        assert_eq!(get_plan(&conn).unwrap(), PlanTier::Enterprise);
    }

    #[test]
    fn test_ai_usage_round_trip_and_decay() {
        let (_dir, conn) = test_db();
        assert!(get_ai_usage(&conn).unwrap().is_none());

        let usage = AiUsage { date: "2026-08-23".to_string(), count: 3 };
        set_ai_usage(&conn, &usage).unwrap();
        let loaded = get_ai_usage(&conn).unwrap().unwrap();
        assert_eq!(loaded.date, "2026-08-23");
        assert_eq!(loaded.count, 3);

        set_meta(&conn, META_AI_USAGE, "not json").unwrap();
        assert!(get_ai_usage(&conn).unwrap().is_none());
    }

    #[test]
    fn test_custom_challenges_round_trip_and_decay() {
        let (_dir, conn) = test_db();
        assert!(get_custom_challenges(&conn).unwrap().is_empty());

        let defs = vec![ChallengeDefinition {
            id: "amount-5000".to_string(),
            title: "Lean month".to_string(),
            description: "Cap spending at 5,000.".to_string(),
            target: 5000.0,
            kind: crate::models::ChallengeKind::Amount,
        }];
        set_custom_challenges(&conn, &defs).unwrap();
        let loaded = get_custom_challenges(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "amount-5000");

        set_meta(&conn, META_CUSTOM_CHALLENGES, "{broken").unwrap();
        assert!(get_custom_challenges(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_tags_survive_round_trip_and_bad_json_decays() {
        let (_dir, conn) = test_db();
        let record = sample_record("r1", "2026-08-20");
        upsert_record(&conn, &record).unwrap();
        let loaded = get_record(&conn, "r1").unwrap().unwrap();
        assert_eq!(loaded.tags, vec!["noodles".to_string()]);

        conn.execute("UPDATE records SET tags = 'oops' WHERE id = 'r1'", []).unwrap();
        let loaded = get_record(&conn, "r1").unwrap().unwrap();
        assert!(loaded.tags.is_empty());
    }
}
