// Streaming dashboard service - Re-fetch the overview whenever records change
use crate::application::change_feed::{ChangeNotifier, next_batch};
use crate::application::dashboard_service::DashboardService;
use crate::domain::dashboard::DashboardOverview;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct StreamingDashboardService {
    dashboard: DashboardService,
    notifier: ChangeNotifier,
    debounce: Duration,
}

impl StreamingDashboardService {
    pub fn new(dashboard: DashboardService, notifier: ChangeNotifier, debounce: Duration) -> Self {
        Self {
            dashboard,
            notifier,
            debounce,
        }
    }

    /// Send the current overview, then a fresh one after every debounced
    /// burst of changes. The background task ends as soon as the
    /// receiver is dropped, including while a fetch is in flight.
    pub fn stream_overview(&self) -> mpsc::Receiver<DashboardOverview> {
        let (tx, rx) = mpsc::channel(4);
        // Subscribe before the first fetch so no change slips between them
        let mut changes = self.notifier.subscribe();
        let dashboard = self.dashboard.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            let overview = tokio::select! {
                _ = tx.closed() => return,
                overview = dashboard.overview(Utc::now()) => overview,
            };
            if tx.send(overview).await.is_err() {
                return;
            }

            loop {
                let batch = tokio::select! {
                    _ = tx.closed() => break,
                    batch = next_batch(&mut changes, debounce) => batch,
                };
                let Some(batch) = batch else {
                    tracing::debug!("Change feed closed, ending dashboard stream");
                    break;
                };

                tracing::debug!("Refreshing dashboard after {} changes", batch.len());
                let overview = tokio::select! {
                    _ = tx.closed() => break,
                    overview = dashboard.overview(Utc::now()) => overview,
                };
                if tx.send(overview).await.is_err() {
                    break;
                }
            }

            tracing::debug!("Dashboard stream finished");
        });

        rx
    }
}
