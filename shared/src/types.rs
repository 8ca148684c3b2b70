//! Common types used across the ledger

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The (date, item) pair every ledger record is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
    pub date: NaiveDate,
    pub item: String,
}

impl LedgerKey {
    pub fn new(date: NaiveDate, item: impl Into<String>) -> Self {
        Self {
            date,
            item: item.into(),
        }
    }

    /// Same item, previous calendar day
    pub fn previous(&self) -> Option<Self> {
        previous_day(self.date).map(|date| Self {
            date,
            item: self.item.clone(),
        })
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.item, self.date)
    }
}

/// The calendar day before `date`, `None` only at the minimum date
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Standard message body returned by the mutating endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_day_crosses_boundaries() {
        assert_eq!(previous_day(day(2024, 1, 2)), Some(day(2024, 1, 1)));
        assert_eq!(previous_day(day(2024, 3, 1)), Some(day(2024, 2, 29)));
        assert_eq!(previous_day(day(2023, 3, 1)), Some(day(2023, 2, 28)));
        assert_eq!(previous_day(day(2024, 1, 1)), Some(day(2023, 12, 31)));
        assert_eq!(previous_day(NaiveDate::MIN), None);
    }

    #[test]
    fn test_ledger_key_ordering_follows_date() {
        let today = LedgerKey::new(day(2024, 1, 2), "175/65R14");
        let yesterday = today.previous().unwrap();
        assert!(yesterday < today);
        assert_eq!(yesterday.item, today.item);
        assert_eq!(today.to_string(), "175/65R14@2024-01-02");
    }
}
