// Dashboard service - Use cases for overview, list pages and analytics
use crate::application::collection_fetcher::CollectionFetcher;
use crate::application::collection_repository::CollectionRepository;
use crate::domain::aggregate::{TimeBucket, bucket_by_date, classify};
use crate::domain::analytics::{
    DepartmentSummary, TechnicianWorkload, WarrantyReport, department_breakdown,
    technician_workload,
};
use crate::domain::dashboard::{
    AirtimeStats, AssetStats, DashboardOverview, IncidentStats, RequestStats, UserStats,
};
use crate::domain::directory::UserDirectory;
use crate::domain::filter::{FilterSpec, filter};
use crate::domain::outcome::Outcome;
use crate::domain::parse::optional_date;
use crate::domain::records::{AirtimeBundle, Asset, Incident, Request, Searchable, User};
use crate::domain::views::{AirtimeRow, AssetRow, IncidentRow, ListPage, RequestRow, UserRow};
use crate::infrastructure::config::WindowSettings;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Filter a collection and build display rows for the matches.
fn list_page<T: Searchable + Clone, R>(
    records: Vec<T>,
    spec: &FilterSpec,
    row: impl Fn(T) -> R,
) -> ListPage<R> {
    let rows = filter(&records, spec).into_iter().cloned().map(row).collect();
    ListPage::new(records.len(), rows)
}

/// Users loaded alongside a page only for joining names. A failed user
/// fetch degrades names to "Unknown" instead of failing the page.
fn directory_from(users: &Outcome<Vec<User>>) -> UserDirectory {
    if let Outcome::FetchFailed { reason } = users {
        tracing::warn!("User lookup unavailable, names will not resolve: {}", reason);
    }
    UserDirectory::new(users.records())
}

#[derive(Clone)]
pub struct DashboardService {
    fetcher: CollectionFetcher,
    windows: WindowSettings,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn CollectionRepository>, windows: WindowSettings) -> Self {
        Self {
            fetcher: CollectionFetcher::new(repository),
            windows,
        }
    }

    pub async fn overview(&self, now: DateTime<Utc>) -> DashboardOverview {
        let (users, assets, incidents, requests, airtime) = tokio::join!(
            self.fetcher.fetch::<User>(),
            self.fetcher.fetch::<Asset>(),
            self.fetcher.fetch::<Incident>(),
            self.fetcher.fetch::<Request>(),
            self.fetcher.fetch::<AirtimeBundle>(),
        );

        let warranty_window = self.windows.warranty();
        let airtime_window = self.windows.airtime();

        DashboardOverview {
            generated_at: now,
            users: users.map(|u| UserStats::from_records(&u)),
            assets: assets.map(|a| AssetStats::from_records(&a, now, warranty_window)),
            incidents: incidents.map(|i| IncidentStats::from_records(&i)),
            requests: requests.map(|r| RequestStats::from_records(&r)),
            airtime: airtime.map(|b| AirtimeStats::from_records(&b, now, airtime_window)),
        }
    }

    pub async fn users_page(&self, params: &HashMap<String, String>) -> Outcome<ListPage<UserRow>> {
        let spec = FilterSpec::for_record::<User>(params);
        let (users, assets) = tokio::join!(
            self.fetcher.fetch::<User>(),
            self.fetcher.fetch::<Asset>(),
        );

        // Counts are withheld rather than zeroed when assets are unavailable
        let assigned = match &assets {
            Outcome::FetchFailed { reason } => {
                tracing::warn!("Asset counts unavailable for users page: {}", reason);
                None
            }
            _ => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for asset in assets.records() {
                    if let Some(owner) = &asset.assigned_to {
                        *counts.entry(owner.clone()).or_insert(0) += 1;
                    }
                }
                Some(counts)
            }
        };

        users.map(|users| {
            list_page(users, &spec, |user| UserRow {
                assigned_assets: assigned
                    .as_ref()
                    .map(|counts| counts.get(&user.id).copied().unwrap_or(0)),
                user,
            })
        })
    }

    pub async fn assets_page(
        &self,
        params: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Outcome<ListPage<AssetRow>> {
        let spec = FilterSpec::for_record::<Asset>(params);
        let (assets, users) = tokio::join!(
            self.fetcher.fetch::<Asset>(),
            self.fetcher.fetch::<User>(),
        );
        let directory = directory_from(&users);
        let window = self.windows.warranty();

        assets.map(|assets| {
            list_page(assets, &spec, |asset| AssetRow::new(asset, &directory, now, window))
        })
    }

    pub async fn incidents_page(
        &self,
        params: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Outcome<ListPage<IncidentRow>> {
        let spec = FilterSpec::for_record::<Incident>(params);
        let (incidents, users) = tokio::join!(
            self.fetcher.fetch::<Incident>(),
            self.fetcher.fetch::<User>(),
        );
        let directory = directory_from(&users);

        incidents.map(|incidents| {
            list_page(incidents, &spec, |incident| IncidentRow::new(incident, &directory, now))
        })
    }

    pub async fn requests_page(
        &self,
        params: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Outcome<ListPage<RequestRow>> {
        let spec = FilterSpec::for_record::<Request>(params);
        let (requests, users) = tokio::join!(
            self.fetcher.fetch::<Request>(),
            self.fetcher.fetch::<User>(),
        );
        let directory = directory_from(&users);

        requests.map(|requests| {
            list_page(requests, &spec, |request| RequestRow::new(request, &directory, now))
        })
    }

    pub async fn airtime_page(
        &self,
        params: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Outcome<ListPage<AirtimeRow>> {
        let spec = FilterSpec::for_record::<AirtimeBundle>(params);
        let (bundles, users) = tokio::join!(
            self.fetcher.fetch::<AirtimeBundle>(),
            self.fetcher.fetch::<User>(),
        );
        let directory = directory_from(&users);
        let window = self.windows.airtime();

        bundles.map(|bundles| {
            list_page(bundles, &spec, |bundle| AirtimeRow::new(bundle, &directory, now, window))
        })
    }

    /// Warranty alerts. `window_days` overrides the configured window
    /// for this report only.
    pub async fn warranty_report(
        &self,
        window_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Outcome<WarrantyReport> {
        let window = window_days
            .map(Duration::days)
            .unwrap_or_else(|| self.windows.warranty());
        let (assets, users) = tokio::join!(
            self.fetcher.fetch::<Asset>(),
            self.fetcher.fetch::<User>(),
        );
        let directory = directory_from(&users);

        assets.map(|assets| {
            let warranty = |a: &Asset| optional_date(a.warranty_expiry.as_deref());
            let buckets = bucket_by_date(&assets, warranty, now, window);

            let mut overdue = Vec::new();
            let mut expiring_soon = Vec::new();
            for asset in assets {
                match classify(warranty(&asset), now, window) {
                    TimeBucket::Overdue => overdue.push(AssetRow::new(asset, &directory, now, window)),
                    TimeBucket::ThisWindow => {
                        expiring_soon.push(AssetRow::new(asset, &directory, now, window))
                    }
                    TimeBucket::Later | TimeBucket::None => {}
                }
            }

            WarrantyReport {
                buckets,
                overdue,
                expiring_soon,
            }
        })
    }

    pub async fn departments(&self) -> Outcome<Vec<DepartmentSummary>> {
        let (users, assets) = tokio::join!(
            self.fetcher.fetch::<User>(),
            self.fetcher.fetch::<Asset>(),
        );
        if let Outcome::FetchFailed { reason } = &assets {
            return Outcome::failed(reason.clone());
        }

        users.map(|users| department_breakdown(&users, assets.records()))
    }

    pub async fn technicians(&self) -> Outcome<Vec<TechnicianWorkload>> {
        let (incidents, users) = tokio::join!(
            self.fetcher.fetch::<Incident>(),
            self.fetcher.fetch::<User>(),
        );
        let directory_users = users.records();
        if users.is_failed() {
            tracing::warn!("Technician names unavailable, showing workload by id only");
        }

        incidents.map(|incidents| technician_workload(directory_users, &incidents))
    }
}
