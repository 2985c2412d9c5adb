//! Prometheus registry for the study app.
//!
//! Static collectors live on an owned `Registry`. Domain gauges are built fresh
//! on every scrape from aggregate queries, so nothing is retained between
//! collections and concurrent scrapes never share state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use storage::repository::{CountedTable, StatsRepository, StorageError};
use study_core::{Clock, VersionInfo};

use crate::error::MetricsError;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Users seen within this window count as active.
const ACTIVE_WINDOW_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Value of the `server` label on every exported sample.
    pub server_name: String,
    pub version: String,
    pub query_timeout: Duration,
}

impl MetricsConfig {
    #[must_use]
    pub fn new(server_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            version: version.into(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}

/// A gauge computed from one aggregate query per scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainGauge {
    Users,
    ActiveUsers,
    StudySets,
    Folders,
    Terms,
    StudySetExperiences,
    FolderExperiences,
    StudiableTerms,
    StarredTerms,
    StudySetsOnFolders,
}

impl DomainGauge {
    pub const ALL: [DomainGauge; 10] = [
        DomainGauge::Users,
        DomainGauge::ActiveUsers,
        DomainGauge::StudySets,
        DomainGauge::Folders,
        DomainGauge::Terms,
        DomainGauge::StudySetExperiences,
        DomainGauge::FolderExperiences,
        DomainGauge::StudiableTerms,
        DomainGauge::StarredTerms,
        DomainGauge::StudySetsOnFolders,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DomainGauge::Users => "users",
            DomainGauge::ActiveUsers => "active_users",
            DomainGauge::StudySets => "study_sets",
            DomainGauge::Folders => "folders",
            DomainGauge::Terms => "terms",
            DomainGauge::StudySetExperiences => "study_set_experiences",
            DomainGauge::FolderExperiences => "folder_experiences",
            DomainGauge::StudiableTerms => "studiable_terms",
            DomainGauge::StarredTerms => "starred_terms",
            DomainGauge::StudySetsOnFolders => "study_sets_on_folders",
        }
    }

    fn help(self) -> &'static str {
        match self {
            DomainGauge::Users => "Number of users",
            DomainGauge::ActiveUsers => "Users seen in the last 10 minutes",
            DomainGauge::StudySets => "Number of study sets",
            DomainGauge::Folders => "Number of folders",
            DomainGauge::Terms => "Number of terms",
            DomainGauge::StudySetExperiences => "Number of study set experiences",
            DomainGauge::FolderExperiences => "Number of folder experiences",
            DomainGauge::StudiableTerms => "Number of studiable terms",
            DomainGauge::StarredTerms => "Number of starred terms",
            DomainGauge::StudySetsOnFolders => "Number of study sets placed in folders",
        }
    }

    fn table(self) -> Option<CountedTable> {
        Some(match self {
            DomainGauge::ActiveUsers => return None,
            DomainGauge::Users => CountedTable::Users,
            DomainGauge::StudySets => CountedTable::StudySets,
            DomainGauge::Folders => CountedTable::Folders,
            DomainGauge::Terms => CountedTable::Terms,
            DomainGauge::StudySetExperiences => CountedTable::StudySetExperiences,
            DomainGauge::FolderExperiences => CountedTable::FolderExperiences,
            DomainGauge::StudiableTerms => CountedTable::StudiableTerms,
            DomainGauge::StarredTerms => CountedTable::StarredTerms,
            DomainGauge::StudySetsOnFolders => CountedTable::StudySetsOnFolders,
        })
    }
}

/// Process-scoped metrics handle. Build once at startup and share via `Arc`.
pub struct MetricsRegistry {
    registry: Registry,
    server_name: String,
    query_timeout: Duration,
    stats: Arc<dyn StatsRepository>,
    clock: Clock,
    authed_requests: IntCounterVec,
}

impl MetricsRegistry {
    /// Register the static collectors.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError` if a collector cannot be registered.
    pub fn new(
        config: &MetricsConfig,
        stats: Arc<dyn StatsRepository>,
        clock: Clock,
    ) -> Result<Self, MetricsError> {
        let labels = HashMap::from([("server".to_string(), config.server_name.clone())]);
        let registry = Registry::new_custom(None, Some(labels))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let authed_requests = IntCounterVec::new(
            Opts::new(
                "authed_api_requests_total",
                "API requests made by authenticated users",
            ),
            &["method", "path"],
        )?;
        registry.register(Box::new(authed_requests.clone()))?;

        let info = VersionInfo::parse(&config.version);
        let version_info = IntGaugeVec::new(
            Opts::new("version_info", "Build version of the running server"),
            &["version", "major", "minor", "patch"],
        )?;
        version_info.with_label_values(&info.label_values()).set(1);
        registry.register(Box::new(version_info))?;

        tracing::info!(
            server = %config.server_name,
            version = %info.version,
            "metrics registry initialised"
        );

        Ok(Self {
            registry,
            server_name: config.server_name.clone(),
            query_timeout: config.query_timeout,
            stats,
            clock,
            authed_requests,
        })
    }

    /// Count one request from an authenticated user.
    pub fn record_authed_request(&self, method: &str, path: &str) {
        self.authed_requests
            .with_label_values(&[method, path])
            .inc();
    }

    /// Collect static and domain metrics, sorted by name.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let mut families = self.registry.gather();

        let domain = join_all(DomainGauge::ALL.into_iter().map(|g| self.collect_gauge(g))).await;
        families.extend(domain.into_iter().flatten().flatten());

        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        families
    }

    /// Render a scrape in the Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError` if encoding fails.
    pub async fn render(&self) -> Result<String, MetricsError> {
        let families = self.gather().await;
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|_| MetricsError::Encoding)
    }

    /// Content type of `render` output.
    #[must_use]
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    async fn collect_gauge(&self, gauge: DomainGauge) -> Option<Vec<MetricFamily>> {
        let value = match tokio::time::timeout(self.query_timeout, self.query(gauge)).await {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                tracing::warn!(gauge = gauge.name(), error = %err, "gauge query failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(gauge = gauge.name(), "gauge query timed out");
                return None;
            }
        };

        let opts = Opts::new(gauge.name(), gauge.help())
            .const_label("server", self.server_name.as_str());
        let metric = match IntGauge::with_opts(opts) {
            Ok(metric) => metric,
            Err(err) => {
                tracing::warn!(gauge = gauge.name(), error = %err, "invalid gauge");
                return None;
            }
        };
        metric.set(i64::try_from(value).unwrap_or(i64::MAX));
        Some(metric.collect())
    }

    async fn query(&self, gauge: DomainGauge) -> Result<u64, StorageError> {
        match gauge.table() {
            Some(table) => self.stats.count(table).await,
            None => {
                let since = self
                    .clock
                    .window_start(chrono::Duration::minutes(ACTIVE_WINDOW_MINUTES));
                self.stats.count_users_seen_since(since).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_names_are_unique() {
        let mut names: Vec<_> = DomainGauge::ALL.iter().map(|g| g.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DomainGauge::ALL.len());
    }

    #[test]
    fn only_active_users_is_windowed() {
        let windowed: Vec<_> = DomainGauge::ALL
            .into_iter()
            .filter(|g| g.table().is_none())
            .collect();
        assert_eq!(windowed, vec![DomainGauge::ActiveUsers]);
    }
}
