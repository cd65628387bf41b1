//! Sort keys, directions and the column-header toggle.

use serde::{Deserialize, Serialize};

/// The table columns that can be sorted on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Category,
    Name,
    Note,
    Amount,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

serde_plain::derive_display_from_serialize!(SortDirection);
serde_plain::derive_fromstr_from_deserialize!(SortDirection);

impl SortDirection {
    /// Applies this direction to an ascending comparison.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The active sort column and direction. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// The sort after a click on the `key` column header. A first click on any column sorts it
    /// descending; only a second click on a descending column flips it to ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Descending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        Self { key, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_is_date_descending() {
        assert_eq!(
            SortSpec::default(),
            SortSpec::new(SortKey::Date, SortDirection::Descending)
        );
    }

    #[test]
    fn test_toggle_same_key_descending_flips() {
        let spec = SortSpec::new(SortKey::Date, SortDirection::Descending);
        assert_eq!(
            spec.toggle(SortKey::Date),
            SortSpec::new(SortKey::Date, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_toggle_same_key_ascending_resets() {
        let spec = SortSpec::new(SortKey::Date, SortDirection::Ascending);
        assert_eq!(
            spec.toggle(SortKey::Date),
            SortSpec::new(SortKey::Date, SortDirection::Descending)
        );
    }

    #[test]
    fn test_toggle_other_key_starts_descending() {
        let spec = SortSpec::new(SortKey::Date, SortDirection::Descending);
        assert_eq!(
            spec.toggle(SortKey::Category),
            SortSpec::new(SortKey::Category, SortDirection::Descending)
        );
        let spec = SortSpec::new(SortKey::Amount, SortDirection::Ascending);
        assert_eq!(
            spec.toggle(SortKey::Note),
            SortSpec::new(SortKey::Note, SortDirection::Descending)
        );
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(SortKey::from_str("amount").unwrap(), SortKey::Amount);
        assert_eq!(SortDirection::Ascending.to_string(), "ascending");
        assert!(SortKey::from_str("payee").is_err());
    }
}
