use crate::domain::status::StatusEntry;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single facility row as stored in the directory.
///
/// Address components are individually optional; coordinates are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRecord {
    pub id: i64,
    pub title: String,
    pub category: i64,
    pub description: String,
    pub house_number: Option<String>,
    pub street_name: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub contributor: i64,
}

impl FacilityRecord {
    /// Joins the non-empty address components with `", "`.
    ///
    /// Empty or whitespace-only components are omitted entirely, so the
    /// result never contains placeholders or doubled separators.
    pub fn full_address(&self) -> String {
        [
            &self.house_number,
            &self.street_name,
            &self.town,
            &self.county,
            &self.postcode,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A facility row decorated for the API: category name, latest status
/// comment and a preformatted address. Optional fields are simply absent
/// from the JSON when there is nothing to attach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFacility {
    pub id: i64,
    pub title: String,
    pub category: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    pub full_address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_timestamp: Option<NaiveDateTime>,
    /// Only present on proximity query results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl EnrichedFacility {
    pub fn from_record(
        record: FacilityRecord,
        category_name: Option<String>,
        status: Option<StatusEntry>,
    ) -> Self {
        let full_address = record.full_address();
        let (status_comment, status_author_id, status_timestamp) = match status {
            Some(s) => (Some(s.comment), Some(s.user_id), Some(s.timestamp)),
            None => (None, None, None),
        };

        EnrichedFacility {
            id: record.id,
            title: record.title,
            category: record.category,
            description: record.description,
            house_number: record.house_number,
            street_name: record.street_name,
            town: record.town,
            county: record.county,
            postcode: record.postcode,
            full_address,
            lat: record.lat,
            lng: record.lng,
            category_name,
            status_comment,
            status_author_id,
            status_timestamp,
            distance_km: None,
        }
    }
}

/// A category a facility can belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
