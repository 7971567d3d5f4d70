use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single search hit from the NIBL search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub bot_id: i64,
    pub number: i64,
    pub name: String,
    /// Human readable size label, e.g. `"150M"`.
    pub size: String,
    #[serde(rename = "sizekbits")]
    pub size_kbits: u64,
    pub episode_number: i64,
    #[serde(with = "super::timestamp")]
    pub last_modified: NaiveDateTime,
}

/// An XDCC bot serving packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: i64,
    pub name: String,
    pub owner: String,
    #[serde(with = "super::timestamp")]
    pub last_processed: NaiveDateTime,
    pub batch_enable: i64,
    pub pack_size: i64,
}
