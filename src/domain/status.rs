use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Maximum length a status comment is stored at.
pub const MAX_COMMENT_LEN: usize = 100;

/// One status comment left against a facility.
///
/// The "current" status of a facility is the entry with the most recent
/// timestamp; ties are broken by the highest id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub id: i64,
    pub facility_id: i64,
    pub comment: String,
    pub user_id: i64,
    pub timestamp: NaiveDateTime,
}
