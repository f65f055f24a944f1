//! Gauge location, reading and presentation models

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{SiteId, SiteStatus, TriggerState};
use crate::types::GpsCoordinates;

/// Monitoring location metadata for a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: SiteId,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl LocationRecord {
    pub fn coordinates(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.lat, self.lon)
    }
}

/// Latest gage-height observation for a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub monitoring_location_id: Option<String>,
    /// ISO-8601 observation time as reported upstream
    pub time: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub parameter_code: Option<String>,
}

/// A reading merged with whatever location metadata is known for the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeRecord {
    #[serde(flatten)]
    pub reading: ReadingRecord,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationRecord>,
}

impl GaugeRecord {
    pub fn new(reading: ReadingRecord, location: Option<LocationRecord>) -> Self {
        Self { reading, location }
    }
}

/// Normalized per-site view served to the mobile client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub id: SiteId,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub low_triggered: bool,
    pub high_triggered: bool,
    pub status: SiteStatus,
    pub updated_at: String,
}

impl SiteSummary {
    /// Build a summary, filling the name and timestamp when upstream gave none
    pub fn from_parts(
        id: &SiteId,
        location: Option<&LocationRecord>,
        reading: Option<&ReadingRecord>,
        triggers: TriggerState,
        now: DateTime<Utc>,
    ) -> Self {
        let name = location
            .and_then(|l| l.name.as_deref())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.fallback_name());

        let coords = location.map(LocationRecord::coordinates);

        let updated_at = reading
            .and_then(|r| r.time.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Micros, true));

        Self {
            id: id.clone(),
            name,
            latitude: coords.as_ref().map(|c| c.latitude),
            longitude: coords.as_ref().map(|c| c.longitude),
            low_triggered: triggers.low,
            high_triggered: triggers.high,
            status: triggers.status(),
            updated_at,
        }
    }
}
