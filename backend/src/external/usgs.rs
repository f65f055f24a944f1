//! USGS Water Data OGC API client
//!
//! Two read-only collections are queried per site:
//! - `monitoring-locations` for the site name and coordinates
//! - `latest-continuous` for the most recent gage-height value
//!
//! Every failure (transport, HTTP status, decode, empty result, bad
//! geometry) is logged and returned as `None`. There are no retries; the
//! cache TTL decides when a site is asked again.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shared::{GpsCoordinates, LocationRecord, ReadingRecord, SiteId};

use crate::config::UsgsConfig;
use crate::error::{AppError, AppResult, UpstreamError};

/// Parameter code for gage height, feet
pub const GAGE_HEIGHT_PARAMETER: &str = "00065";

const LOCATIONS_COLLECTION: &str = "monitoring-locations";
const LATEST_COLLECTION: &str = "latest-continuous";

/// USGS API client
#[derive(Clone)]
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

/// GeoJSON feature collection as returned by the OGC API
#[derive(Debug, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(default)]
    pub features: Option<Vec<Feature<P>>>,
}

#[derive(Debug, Deserialize)]
pub struct Feature<P> {
    #[serde(default)]
    pub properties: Option<P>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Option<Vec<Value>>,
}

/// Properties of a `monitoring-locations` feature
#[derive(Debug, Default, Deserialize)]
pub struct LocationProperties {
    pub monitoring_location_number: Option<String>,
    pub id: Option<String>,
    pub monitoring_location_name: Option<String>,
    pub name: Option<String>,
}

/// Properties of a `latest-continuous` feature
#[derive(Debug, Default, Deserialize)]
pub struct LatestProperties {
    pub monitoring_location_id: Option<String>,
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    pub unit_of_measure: Option<String>,
    pub parameter_code: Option<String>,
}

impl UsgsClient {
    /// Create a new UsgsClient from configuration
    pub fn new(config: &UsgsConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration(format!("USGS HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new UsgsClient with custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let config = UsgsConfig {
            base_url: base_url.into(),
            timeout_seconds: timeout.as_secs().max(1),
            ..UsgsConfig::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up name and coordinates for a site
    pub async fn fetch_location(&self, site: &SiteId) -> Option<LocationRecord> {
        let params = [
            ("f", "json"),
            ("monitoring_location_number", site.as_str()),
            ("limit", "1"),
        ];

        let result = self
            .get_features(LOCATIONS_COLLECTION, &params)
            .await
            .and_then(|collection| parse_location(site, collection));
        absent_on_error(site, LOCATIONS_COLLECTION, result)
    }

    /// Most recent gage-height reading for a site
    pub async fn fetch_latest_reading(&self, site: &SiteId) -> Option<ReadingRecord> {
        let params = [
            ("f", "json"),
            ("monitoring_location_id", site.as_str()),
            ("parameter_code", GAGE_HEIGHT_PARAMETER),
            ("limit", "1"),
            ("skipGeometry", "true"),
        ];

        let result = self
            .get_features(LATEST_COLLECTION, &params)
            .await
            .and_then(parse_latest_reading);
        absent_on_error(site, LATEST_COLLECTION, result)
    }

    async fn get_features<P>(
        &self,
        collection: &str,
        params: &[(&str, &str)],
    ) -> Result<FeatureCollection<P>, UpstreamError>
    where
        P: for<'de> Deserialize<'de> + Default,
    {
        let url = format!("{}/collections/{}/items", self.base_url, collection);

        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        Ok(response.json().await?)
    }
}

fn absent_on_error<T>(site: &SiteId, collection: &str, result: Result<T, UpstreamError>) -> Option<T> {
    match result {
        Ok(record) => Some(record),
        Err(UpstreamError::NoFeatures) => {
            tracing::debug!(%site, collection, "no matching USGS feature");
            None
        }
        Err(e) => {
            tracing::warn!(%site, collection, error = %e, "USGS query failed");
            None
        }
    }
}

/// Map the first `monitoring-locations` feature into a location record
pub fn parse_location(
    requested: &SiteId,
    collection: FeatureCollection<LocationProperties>,
) -> Result<LocationRecord, UpstreamError> {
    let feature = first_feature(collection)?;
    let props = feature.properties.unwrap_or_default();

    let position: Vec<f64> = feature
        .geometry
        .and_then(|g| g.coordinates)
        .ok_or(UpstreamError::MalformedGeometry)?
        .iter()
        .map(|v| v.as_f64().ok_or(UpstreamError::MalformedGeometry))
        .collect::<Result<_, _>>()?;
    let coords = GpsCoordinates::from_geojson(&position).ok_or(UpstreamError::MalformedGeometry)?;

    let id = props
        .monitoring_location_number
        .or(props.id)
        .map(SiteId::from)
        .unwrap_or_else(|| requested.clone());

    Ok(LocationRecord {
        id,
        name: props.monitoring_location_name.or(props.name),
        lat: coords.latitude,
        lon: coords.longitude,
    })
}

/// Map the first `latest-continuous` feature into a reading record
pub fn parse_latest_reading(
    collection: FeatureCollection<LatestProperties>,
) -> Result<ReadingRecord, UpstreamError> {
    let props = first_feature(collection)?.properties.unwrap_or_default();

    Ok(ReadingRecord {
        monitoring_location_id: props.monitoring_location_id,
        time: props.time,
        value: props.value,
        unit: props.unit_of_measure,
        parameter_code: props.parameter_code,
    })
}

fn first_feature<P>(collection: FeatureCollection<P>) -> Result<Feature<P>, UpstreamError> {
    collection
        .features
        .and_then(|features| features.into_iter().next())
        .ok_or(UpstreamError::NoFeatures)
}

/// USGS reports values as either JSON numbers or numeric strings
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}
