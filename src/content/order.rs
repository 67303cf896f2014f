use crate::content::ContentRecord;
use serde::Deserialize;
use std::cmp::Reverse;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest date first, undated records last.
    #[default]
    Date,
    /// Highest week number first.
    Week,
}

/// Sort key; ascending order of `Order` is display order.
#[derive(Eq, PartialEq, Ord, PartialOrd)]
pub enum Order {
    Date {
        undated: bool,
        date: Reverse<String>,
        slug: String,
    },
    Week {
        week: Reverse<u64>,
        date: Reverse<String>,
        slug: String,
    },
}

impl Order {
    pub fn new(sort_by: SortBy, record: &ContentRecord) -> Self {
        match sort_by {
            SortBy::Date => Self::Date {
                undated: record.date.is_empty(),
                date: Reverse(record.date.clone()),
                slug: record.slug.clone(),
            },
            SortBy::Week => Self::Week {
                week: Reverse(record.week_number()),
                date: Reverse(record.date.clone()),
                slug: record.slug.clone(),
            },
        }
    }
}

pub fn sort_records(sort_by: SortBy, records: &mut [ContentRecord]) {
    records.sort_by_cached_key(|record| Order::new(sort_by, record));
}
