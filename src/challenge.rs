use std::collections::HashSet;

use chrono::{Days, NaiveDate};

use crate::models::{ChallengeDefinition, ChallengeKind, ChallengeProgress, LedgerRecord, RecordKind};

struct BuiltIn {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    target: f64,
    kind: ChallengeKind,
}

const BUILT_IN: &[BuiltIn] = &[
    BuiltIn {
        id: "streak-7",
        title: "Log 7 days in a row",
        description: "Keep the habit going for a full week.",
        target: 7.0,
        kind: ChallengeKind::Streak,
    },
    BuiltIn {
        id: "count-20",
        title: "20 records this month",
        description: "Capture every expense and income, no gaps.",
        target: 20.0,
        kind: ChallengeKind::Count,
    },
    BuiltIn {
        id: "amount-15000",
        title: "Keep monthly spending under 15,000",
        description: "Hold the line on the budget envelope.",
        target: 15000.0,
        kind: ChallengeKind::Amount,
    },
];

pub fn built_in_challenges() -> Vec<ChallengeDefinition> {
    BUILT_IN
        .iter()
        .map(|c| ChallengeDefinition {
            id: c.id.to_string(),
            title: c.title.to_string(),
            description: c.description.to_string(),
            target: c.target,
            kind: c.kind,
        })
        .collect()
}

/// Consecutive days ending today with at least one record, scanning back at
/// most 60 days. A day without records breaks the chain immediately, so a
/// quiet today means zero.
pub fn daily_streak(records: &[LedgerRecord], today: NaiveDate) -> u32 {
    let days: HashSet<&str> = records.iter().filter_map(|r| r.date.get(0..10)).collect();
    let mut streak = 0;
    for offset in 0..60u64 {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        let key = day.format("%Y-%m-%d").to_string();
        if days.contains(key.as_str()) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Expense total for the month `today` falls in.
pub fn monthly_spending(records: &[LedgerRecord], today: NaiveDate) -> f64 {
    let prefix = today.format("%Y-%m").to_string();
    records
        .iter()
        .filter(|r| r.kind == RecordKind::Expense && r.date.starts_with(&prefix))
        .map(|r| r.amount)
        .sum()
}

/// Evaluate built-in plus custom challenges against the visible record set.
/// Pure: reads records, mutates nothing.
pub fn evaluate(
    records: &[LedgerRecord],
    custom: &[ChallengeDefinition],
    today: NaiveDate,
) -> Vec<ChallengeProgress> {
    let streak = daily_streak(records, today);
    let month_prefix = today.format("%Y-%m").to_string();
    let monthly_count = records.iter().filter(|r| r.date.starts_with(&month_prefix)).count();
    let spending = monthly_spending(records, today);

    let mut definitions = built_in_challenges();
    definitions.extend(custom.iter().cloned());

    definitions
        .into_iter()
        .map(|definition| {
            let (progress, achieved, metric_label) = match definition.kind {
                ChallengeKind::Streak => (
                    (streak as f64 / definition.target).min(1.0),
                    streak as f64 >= definition.target,
                    format!("{streak} days so far"),
                ),
                ChallengeKind::Count => (
                    (monthly_count as f64 / definition.target).min(1.0),
                    monthly_count as f64 >= definition.target,
                    format!("{monthly_count} records this month"),
                ),
                ChallengeKind::Amount => (
                    (definition.target / spending.max(1.0)).min(1.0),
                    spending <= definition.target,
                    format!("spent {spending:.0} this month"),
                ),
            };
            ChallengeProgress { definition, progress, achieved, metric_label }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now_iso;

    fn record_on(date: &str, kind: RecordKind, amount: f64) -> LedgerRecord {
        let now = now_iso();
        LedgerRecord {
            id: format!("{date}-{amount}"),
            kind,
            amount,
            currency: "TWD".to_string(),
            category: "food".to_string(),
            note: None,
            date: date.to_string(),
            tags: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            deleted: false,
            dirty: false,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_streak_counts_consecutive_days_back_from_today() {
        let records = vec![
            record_on("2026-08-23", RecordKind::Expense, 10.0),
            record_on("2026-08-22", RecordKind::Income, 20.0),
            record_on("2026-08-21", RecordKind::Expense, 30.0),
            // gap on the 20th
            record_on("2026-08-19", RecordKind::Expense, 40.0),
        ];
        assert_eq!(daily_streak(&records, day("2026-08-23")), 3);
    }

    #[test]
    fn test_streak_is_zero_when_today_has_no_record() {
        let records = vec![record_on("2026-08-22", RecordKind::Expense, 10.0)];
        assert_eq!(daily_streak(&records, day("2026-08-23")), 0);
        assert_eq!(daily_streak(&[], day("2026-08-23")), 0);
    }

    #[test]
    fn test_streak_caps_at_sixty_days() {
        let mut records = Vec::new();
        let today = day("2026-08-23");
        for offset in 0..90u64 {
            let d = today.checked_sub_days(Days::new(offset)).unwrap();
            records.push(record_on(&d.format("%Y-%m-%d").to_string(), RecordKind::Expense, 1.0));
        }
        assert_eq!(daily_streak(&records, today), 60);
    }

    #[test]
    fn test_monthly_spending_ignores_income_and_other_months() {
        let records = vec![
            record_on("2026-08-02", RecordKind::Expense, 100.0),
            record_on("2026-08-15", RecordKind::Expense, 250.0),
            record_on("2026-08-10", RecordKind::Income, 9999.0),
            record_on("2026-07-30", RecordKind::Expense, 400.0),
        ];
        assert_eq!(monthly_spending(&records, day("2026-08-23")), 350.0);
    }

    #[test]
    fn test_evaluate_includes_builtins_and_custom() {
        let custom = vec![ChallengeDefinition {
            id: "count-5".to_string(),
            title: "Five this month".to_string(),
            description: "Small steps.".to_string(),
            target: 5.0,
            kind: ChallengeKind::Count,
        }];
        let progress = evaluate(&[], &custom, day("2026-08-23"));
        assert_eq!(progress.len(), 4);
        assert_eq!(progress[0].definition.id, "streak-7");
        assert_eq!(progress[3].definition.id, "count-5");
    }

    #[test]
    fn test_count_challenge_progress_and_achievement() {
        let today = day("2026-08-23");
        let mut records = Vec::new();
        for d in 1..=10 {
            records.push(record_on(&format!("2026-08-{d:02}"), RecordKind::Expense, 5.0));
        }
        let progress = evaluate(&records, &[], today);
        let count = progress.iter().find(|p| p.definition.id == "count-20").unwrap();
        assert!((count.progress - 0.5).abs() < 1e-9);
        assert!(!count.achieved);
        assert_eq!(count.metric_label, "10 records this month");
    }

    #[test]
    fn test_amount_challenge_achieved_while_under_target() {
        let today = day("2026-08-23");
        let under = vec![record_on("2026-08-05", RecordKind::Expense, 9000.0)];
        let progress = evaluate(&under, &[], today);
        let amount = progress.iter().find(|p| p.definition.id == "amount-15000").unwrap();
        assert!(amount.achieved);
        assert_eq!(amount.progress, 1.0);

        let over = vec![record_on("2026-08-05", RecordKind::Expense, 30000.0)];
        let progress = evaluate(&over, &[], today);
        let amount = progress.iter().find(|p| p.definition.id == "amount-15000").unwrap();
        assert!(!amount.achieved);
        assert!((amount.progress - 0.5).abs() < 1e-9);
        assert_eq!(amount.metric_label, "spent 30000 this month");
    }

    #[test]
    fn test_amount_challenge_with_no_spending_is_achieved() {
        let progress = evaluate(&[], &[], day("2026-08-23"));
        let amount = progress.iter().find(|p| p.definition.id == "amount-15000").unwrap();
        assert!(amount.achieved);
        assert_eq!(amount.progress, 1.0);
    }

    #[test]
    fn test_streak_challenge_achieved_at_seven_days() {
        let today = day("2026-08-23");
        let mut records = Vec::new();
        for offset in 0..7u64 {
            let d = today.checked_sub_days(Days::new(offset)).unwrap();
            records.push(record_on(&d.format("%Y-%m-%d").to_string(), RecordKind::Expense, 1.0));
        }
        let progress = evaluate(&records, &[], today);
        let streak = progress.iter().find(|p| p.definition.id == "streak-7").unwrap();
        assert!(streak.achieved);
        assert_eq!(streak.metric_label, "7 days so far");
    }
}
