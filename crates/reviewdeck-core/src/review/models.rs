use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An approved guest review as shown in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    #[serde(rename = "client_name")]
    pub name: String,
    /// Star rating, 1 to 5
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "is_approved")]
    pub approved: bool,
}

/// A review row exactly as a backend returned it, before shape validation
///
/// Missing, `null` and mistyped fields decode to their defaults, so one bad
/// row cannot fail decoding of a page. `validate_record` rejects it instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub client_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub comment: String,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_approved: bool,
}

impl ReviewRecord {
    /// Decode one row of a JSON page. A row that is not an object becomes an
    /// empty record, which still counts towards the page length.
    pub fn from_json(row: Value) -> Self {
        serde_json::from_value(row).unwrap_or_default()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Data submitted by a guest; stored unapproved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    #[serde(rename = "client_name")]
    pub name: String,
    pub rating: u8,
    pub comment: String,
}

impl Review {
    /// Rating rendered as filled and empty stars
    pub fn stars(&self) -> String {
        let filled = self.rating.min(5) as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

/// Moderation listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewFilter {
    #[default]
    All,
    Approved,
    Pending,
}

impl FromStr for ReviewFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ReviewFilter::All),
            "approved" => Ok(ReviewFilter::Approved),
            "pending" => Ok(ReviewFilter::Pending),
            other => Err(crate::Error::Other(format!("Unknown review filter: {}", other))),
        }
    }
}

impl fmt::Display for ReviewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewFilter::All => "all",
            ReviewFilter::Approved => "approved",
            ReviewFilter::Pending => "pending",
        };
        f.write_str(name)
    }
}
