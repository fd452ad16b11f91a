/// Format an amount with thousands separators and a currency code:
/// `TWD 1,234`. Ledger amounts are whole units, so no decimals.
pub fn money(val: f64, currency: &str) -> String {
    let negative = val < -0.5;
    let rounded = val.abs().round() as i64;
    let digits = rounded.to_string();

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("{currency} -{with_commas}")
    } else {
        format!("{currency} {with_commas}")
    }
}

/// Trim a timestamp or date string down to its `YYYY-MM-DD` day.
pub fn day(date: &str) -> &str {
    date.get(0..10).unwrap_or(date)
}

/// Render a ratio in [0, 1] as a fixed-width text progress bar.
pub fn bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut out = String::with_capacity(width);
    for i in 0..width {
        out.push(if i < filled { '█' } else { '░' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, "TWD"), "TWD 1,235");
        assert_eq!(money(-500.0, "TWD"), "TWD -500");
        assert_eq!(money(0.0, "USD"), "USD 0");
        assert_eq!(money(1000000.0, "TWD"), "TWD 1,000,000");
        assert_eq!(money(42.0, "TWD"), "TWD 42");
    }

    #[test]
    fn test_day_trims_timestamps() {
        assert_eq!(day("2026-08-23T10:15:00.000Z"), "2026-08-23");
        assert_eq!(day("2026-08-23"), "2026-08-23");
        assert_eq!(day("short"), "short");
    }

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar(0.0, 10), "░░░░░░░░░░");
        assert_eq!(bar(0.5, 10), "█████░░░░░");
        assert_eq!(bar(1.0, 10), "██████████");
        assert_eq!(bar(2.0, 10), "██████████");
    }
}
