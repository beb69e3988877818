use chrono::{DateTime, Utc};

/// Format an amount in whole taka, grouped the Bengali way: last three
/// digits, then pairs (1,20,000).
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts = Vec::new();
        let mut idx = head.len();
        while idx > 2 {
            parts.push(&head[idx - 2..idx]);
            idx -= 2;
        }
        parts.push(&head[..idx]);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    if amount < 0 {
        format!("-৳{}", grouped)
    } else {
        format!("৳{}", grouped)
    }
}

/// Render an optional timestamp as "06 Aug 2026", or "-" when absent.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%d %b %Y").to_string(),
        None => "-".to_string(),
    }
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_currency_small_amounts() {
        assert_eq!(format_currency(0), "৳0");
        assert_eq!(format_currency(500), "৳500");
        assert_eq!(format_currency(999), "৳999");
    }

    #[test]
    fn format_currency_lakh_grouping() {
        assert_eq!(format_currency(1200), "৳1,200");
        assert_eq!(format_currency(120000), "৳1,20,000");
        assert_eq!(format_currency(12345678), "৳1,23,45,678");
    }

    #[test]
    fn format_currency_negative() {
        assert_eq!(format_currency(-500), "-৳500");
        assert_eq!(format_currency(-120000), "-৳1,20,000");
    }

    #[test]
    fn format_date_renders_or_dashes() {
        let date = Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap();
        assert_eq!(format_date(Some(date)), "06 Aug 2026");
        assert_eq!(format_date(None), "-");
    }
}
