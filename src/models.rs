use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "TWD";

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "entertainment",
    "housing",
    "utilities",
    "shopping",
    "salary",
    "other",
];

/// Current UTC time as an RFC 3339 string with millisecond precision.
/// Timestamps in this format compare correctly as plain strings.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Expense,
    Income,
}

impl RecordKind {
    pub fn parse(value: &str) -> Option<RecordKind> {
        match value {
            "expense" => Some(RecordKind::Expense),
            "income" => Some(RecordKind::Income),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Expense => "expense",
            RecordKind::Income => "income",
        }
    }
}

/// A single ledger entry. Serialized field names match the sync wire format,
/// which uses camelCase and calls the kind field `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dirty: bool,
}

/// Input for creating a record. The store assigns id, timestamps and flags.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub kind: RecordKind,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub note: Option<String>,
    pub date: String,
    pub tags: Vec<String>,
}

/// Partial update for an existing record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub kind: Option<RecordKind>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success,
    Error,
    Offline,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
            SyncStatus::Offline => "offline",
        }
    }
}

/// Read-only view of the sync state machine.
#[derive(Debug, Clone)]
pub struct SyncSnapshot {
    pub status: SyncStatus,
    pub last_synced_at: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Enterprise,
}

impl PlanTier {
    pub fn parse(value: &str) -> Option<PlanTier> {
        match value {
            "free" => Some(PlanTier::Free),
            "pro" => Some(PlanTier::Pro),
            "enterprise" => Some(PlanTier::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Pro => "Pro",
            PlanTier::Enterprise => "Enterprise",
        }
    }

    /// Assistant questions allowed per day on this plan.
    pub fn daily_ai_limit(&self) -> u32 {
        match self {
            PlanTier::Free => 5,
            PlanTier::Pro => 1000,
            PlanTier::Enterprise => 5000,
        }
    }
}

/// Daily assistant usage counter persisted in the meta table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiUsage {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Streak,
    Count,
    Amount,
}

impl ChallengeKind {
    pub fn parse(value: &str) -> Option<ChallengeKind> {
        match value {
            "streak" => Some(ChallengeKind::Streak),
            "count" => Some(ChallengeKind::Count),
            "amount" => Some(ChallengeKind::Amount),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Streak => "streak",
            ChallengeKind::Count => "count",
            ChallengeKind::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub target: f64,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
}

#[derive(Debug, Clone)]
pub struct ChallengeProgress {
    pub definition: ChallengeDefinition,
    /// Completion ratio clamped to [0, 1].
    pub progress: f64,
    pub achieved: bool,
    pub metric_label: String,
}
