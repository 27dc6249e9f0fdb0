//! Date utilities

use chrono::{NaiveDate, Utc};

/// Current UTC date, the granularity `lastUpdated` is stored at
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_after_2000() {
        let date = today();
        assert!(date > NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn test_today_serializes_as_plain_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 19).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-06-19\"");
    }
}
