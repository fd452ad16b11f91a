use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::fmt;
use crate::models::{LedgerRecord, PlanTier};
use crate::reports;
use crate::store::RecordStore;

/// At most this many records ride along as context for a remote question.
pub const CONTEXT_LIMIT: usize = 500;

const AI_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct Answer {
    pub reply: String,
    /// True when the reply came from the built-in offline analysis instead
    /// of the remote assistant.
    pub used_fallback: bool,
}

#[derive(Serialize)]
struct AiRequest<'a> {
    question: &'a str,
    ledger: &'a [LedgerRecord],
    plan: PlanTier,
}

#[derive(Deserialize)]
struct AiResponse {
    reply: Option<String>,
}

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

/// Questions left today under the current plan. `today` is a `YYYY-MM-DD`
/// key; a usage row from an earlier day counts as zero.
pub fn remaining_quota(store: &RecordStore, today: &str) -> Result<u32> {
    let limit = store.plan()?.daily_ai_limit();
    let used = match store.ai_usage()? {
        Some(usage) if usage.date == today => usage.count,
        _ => 0,
    };
    Ok(limit.saturating_sub(used))
}

// ---------------------------------------------------------------------------
// Asking
// ---------------------------------------------------------------------------

/// Answer a question about the ledger. Remote failures quietly fall back to
/// the offline analysis; only an exhausted daily quota is surfaced as an
/// error. Every answered question counts against the quota.
pub fn ask(
    store: &RecordStore,
    endpoint: Option<&str>,
    currency: &str,
    question: &str,
    today: NaiveDate,
) -> Result<Answer> {
    let date_key = today.format("%Y-%m-%d").to_string();
    if remaining_quota(store, &date_key)? == 0 {
        return Err(TallyError::Other(
            "Daily question limit reached. Try again tomorrow or upgrade your plan.".to_string(),
        ));
    }

    let records = store.list()?;
    let context = &records[..records.len().min(CONTEXT_LIMIT)];
    let plan = store.plan()?;

    let remote = endpoint.and_then(|endpoint| remote_reply(endpoint, question, context, plan).ok());
    let answer = match remote {
        Some(reply) => Answer { reply, used_fallback: false },
        None => Answer {
            reply: local_insights(question, context, currency, today),
            used_fallback: true,
        },
    };

    store.increment_ai_usage(&date_key)?;
    Ok(answer)
}

// ---------------------------------------------------------------------------
// Offline analysis
// ---------------------------------------------------------------------------

/// Deterministic insights computed from the ledger alone, used whenever no
/// assistant endpoint is reachable.
pub fn local_insights(
    question: &str,
    records: &[LedgerRecord],
    currency: &str,
    today: NaiveDate,
) -> String {
    if records.is_empty() {
        return "No records yet. Add your first expense or income and ask again.".to_string();
    }

    let weekly = weekly_spending(records, today);
    let (top_name, top_total) = match reports::top_category(records) {
        Some(top) => (top.category, top.total),
        None => ("other".to_string(), 0.0),
    };
    let tip = if question.to_lowercase().contains("coffee") {
        "Try capping the daily coffee budget at 120 and the weekly total will follow."
    } else {
        "For deeper analysis, upgrade your plan and connect an assistant endpoint."
    };

    format!(
        "Spending over the last 7 days: {}.\nYour top spending category is \"{}\" at {}.\n{}",
        fmt::money(weekly, currency),
        top_name,
        fmt::money(top_total, currency),
        tip
    )
}

fn weekly_spending(records: &[LedgerRecord], today: NaiveDate) -> f64 {
    let Some(cutoff) = today.checked_sub_days(Days::new(7)) else {
        return 0.0;
    };
    records
        .iter()
        .filter(|r| r.kind == crate::models::RecordKind::Expense)
        .filter(|r| {
            NaiveDate::parse_from_str(fmt::day(&r.date), "%Y-%m-%d")
                .map(|date| date > cutoff)
                .unwrap_or(false)
        })
        .map(|r| r.amount)
        .sum()
}

// ---------------------------------------------------------------------------
// Remote assistant
// ---------------------------------------------------------------------------

fn remote_reply(
    endpoint: &str,
    question: &str,
    ledger: &[LedgerRecord],
    plan: PlanTier,
) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(AI_TIMEOUT)
        .build()
        .map_err(|e| TallyError::Network(e.to_string()))?;
    let url = format!("{}/ai/query", endpoint.trim_end_matches('/'));
    let response = client
        .post(url)
        .json(&AiRequest { question, ledger, plan })
        .send()
        .map_err(|e| TallyError::Network(format!("AI request failed: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(TallyError::Network(format!(
            "AI request failed: {}",
            status.as_u16()
        )));
    }
    let payload: AiResponse = response
        .json()
        .map_err(|e| TallyError::Network(format!("AI request failed: {e}")))?;
    match payload.reply {
        Some(reply) if !reply.is_empty() => Ok(reply),
        _ => Err(TallyError::Network("AI response missing reply".to_string())),
    }
}
