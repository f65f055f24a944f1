//! Gauge service: resolves per-site locations and readings through the
//! caches and fans out across the configured site list

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{GaugeRecord, LocationRecord, ReadingRecord, SiteId, SiteSummary, TriggerState};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::UsgsClient;

/// Hard ceiling on concurrent per-site resolutions
pub const MAX_FAN_OUT: usize = 12;

/// Gauge service for the fixed site list
pub struct GaugeService {
    client: UsgsClient,
    sites: Vec<SiteId>,
    locations: TtlCache<SiteId, LocationRecord>,
    readings: TtlCache<SiteId, ReadingRecord>,
    max_concurrency: usize,
}

/// Everything currently known about one site
#[derive(Debug, Clone)]
pub struct SiteSnapshot {
    pub site: SiteId,
    pub location: Option<LocationRecord>,
    pub reading: Option<ReadingRecord>,
}

impl SiteSnapshot {
    /// Reading merged with location, if there is a reading at all
    pub fn into_gauge_record(self) -> Option<GaugeRecord> {
        let reading = self.reading?;
        Some(GaugeRecord::new(reading, self.location))
    }
}

impl GaugeService {
    /// Create a new GaugeService instance
    pub fn new(
        client: UsgsClient,
        sites: Vec<SiteId>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            client,
            sites,
            locations: TtlCache::new("locations", ttl, clock.clone()),
            readings: TtlCache::new("readings", ttl, clock),
            max_concurrency,
        }
    }

    /// Build the service from loaded configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = UsgsClient::new(&config.usgs)?;
        let sites = config
            .site_ids()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self::new(
            client,
            sites,
            config.cache.ttl(),
            Arc::new(SystemClock),
            config.aggregator.max_concurrency,
        ))
    }

    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }

    /// Number of sites resolved at once by `site_summaries`
    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrency
            .min(MAX_FAN_OUT)
            .min(self.sites.len())
            .max(1)
    }

    pub async fn cached_location(&self, site: &SiteId) -> Option<LocationRecord> {
        let client = &self.client;
        self.locations
            .get_or_fetch(site, |site| async move { client.fetch_location(&site).await })
            .await
    }

    pub async fn cached_reading(&self, site: &SiteId) -> Option<ReadingRecord> {
        let client = &self.client;
        self.readings
            .get_or_fetch(site, |site| async move { client.fetch_latest_reading(&site).await })
            .await
    }

    /// Resolve reading and location for one site, each through its own cache
    pub async fn resolve(&self, site: &SiteId) -> SiteSnapshot {
        let reading = self.cached_reading(site).await;
        let location = self.cached_location(site).await;

        SiteSnapshot {
            site: site.clone(),
            location,
            reading,
        }
    }

    /// Composite record for the first configured site
    pub async fn primary_latest(&self) -> Option<GaugeRecord> {
        let site = self.sites.first()?;
        self.resolve(site).await.into_gauge_record()
    }

    /// Every site that has a reading, in configured order
    pub async fn all_gauges(&self) -> Vec<GaugeRecord> {
        let mut records = Vec::with_capacity(self.sites.len());
        for site in &self.sites {
            if let Some(record) = self.resolve(site).await.into_gauge_record() {
                records.push(record);
            }
        }
        records
    }

    /// Normalized summary of every configured site, sorted by name.
    ///
    /// Sites are resolved concurrently, at most `concurrency_limit()` at a
    /// time. A site whose task panics is reported with no data.
    pub async fn site_summaries(self: &Arc<Self>) -> AppResult<Vec<SiteSummary>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit()));
        let mut tasks = JoinSet::new();

        for (index, site) in self.sites.iter().cloned().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(format!("fan-out semaphore closed: {}", e)))?;
            let service = Arc::clone(self);

            tasks.spawn(async move {
                let _permit = permit;
                (index, service.resolve(&site).await)
            });
        }

        let mut snapshots: Vec<Option<SiteSnapshot>> = vec![None; self.sites.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, snapshot)) => snapshots[index] = Some(snapshot),
                Err(e) => tracing::error!(error = %e, "site resolution task failed"),
            }
        }

        let now = Utc::now();
        let mut summaries: Vec<SiteSummary> = self
            .sites
            .iter()
            .zip(snapshots)
            .map(|(site, snapshot)| {
                let (location, reading) = snapshot
                    .map(|s| (s.location, s.reading))
                    .unwrap_or((None, None));
                SiteSummary::from_parts(
                    site,
                    location.as_ref(),
                    reading.as_ref(),
                    TriggerState::default(),
                    now,
                )
            })
            .collect();

        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }
}
