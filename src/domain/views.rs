// List-page rows: records enriched with joined names and display strings
use super::aggregate::{TimeBucket, classify, ratio_percentage};
use super::directory::UserDirectory;
use super::format::{format_currency, format_percentage, relative_time};
use super::parse::{currency_or_zero, optional_date, optional_number};
use super::records::{AirtimeBundle, Asset, Incident, Request, User};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A filtered page: how many records existed, how many matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage<R> {
    pub total: usize,
    pub matched: usize,
    pub rows: Vec<R>,
}

impl<R> ListPage<R> {
    pub fn new(total: usize, rows: Vec<R>) -> Self {
        Self {
            total,
            matched: rows.len(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    #[serde(flatten)]
    pub user: User,
    /// `None` when the asset collection could not be loaded.
    pub assigned_assets: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetRow {
    #[serde(flatten)]
    pub asset: Asset,
    pub assignee_name: String,
    pub warranty_bucket: TimeBucket,
}

impl AssetRow {
    pub fn new(
        asset: Asset,
        directory: &UserDirectory,
        now: DateTime<Utc>,
        warranty_window: Duration,
    ) -> Self {
        let warranty_bucket = classify(
            optional_date(asset.warranty_expiry.as_deref()),
            now,
            warranty_window,
        );
        Self {
            assignee_name: directory.resolve(asset.assigned_to.as_deref()),
            warranty_bucket,
            asset,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentRow {
    #[serde(flatten)]
    pub incident: Incident,
    pub assignee_name: String,
    pub opened: Option<String>,
}

impl IncidentRow {
    pub fn new(incident: Incident, directory: &UserDirectory, now: DateTime<Utc>) -> Self {
        Self {
            assignee_name: directory.resolve(incident.assignee.as_deref()),
            opened: optional_date(incident.created_at.as_deref()).map(|t| relative_time(t, now)),
            incident,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestRow {
    #[serde(flatten)]
    pub request: Request,
    pub requester_name: String,
    pub budget_display: Option<String>,
    pub submitted: Option<String>,
}

impl RequestRow {
    pub fn new(request: Request, directory: &UserDirectory, now: DateTime<Utc>) -> Self {
        Self {
            requester_name: directory.resolve(request.requester.as_deref()),
            budget_display: request
                .budget
                .as_deref()
                .map(|b| format_currency(currency_or_zero(b))),
            submitted: optional_date(request.created_at.as_deref()).map(|t| relative_time(t, now)),
            request,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AirtimeRow {
    #[serde(flatten)]
    pub bundle: AirtimeBundle,
    pub assignee_name: String,
    pub usage: Option<f64>,
    pub usage_display: Option<String>,
    pub expiry_bucket: TimeBucket,
}

impl AirtimeRow {
    pub fn new(
        bundle: AirtimeBundle,
        directory: &UserDirectory,
        now: DateTime<Utc>,
        expiry_window: Duration,
    ) -> Self {
        let used = optional_number(bundle.data_used.as_deref());
        let limit = optional_number(bundle.data_limit.as_deref());
        let usage = match (used, limit) {
            (Some(u), Some(l)) if l > 0.0 => Some(ratio_percentage(u, l)),
            _ => None,
        };

        Self {
            assignee_name: directory.resolve(bundle.assigned_to.as_deref()),
            usage,
            usage_display: usage.map(format_percentage),
            expiry_bucket: classify(
                optional_date(bundle.expiry_date.as_deref()),
                now,
                expiry_window,
            ),
            bundle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{AssetStatus, IncidentStatus, RequestStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn directory() -> UserDirectory {
        UserDirectory::new(&[User {
            id: "7".to_string(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            role: "Technician".to_string(),
            department: Some("IT".to_string()),
            status: "active".to_string(),
            created_at: None,
            updated_at: None,
        }])
    }

    #[test]
    fn test_asset_row_joins_and_buckets() {
        let asset = Asset {
            id: "a1".to_string(),
            name: "MacBook".to_string(),
            kind: "Laptop".to_string(),
            status: AssetStatus::Assigned,
            assigned_to: Some("7".to_string()),
            warranty_expiry: Some("2026-06-20".to_string()),
            serial_number: None,
        };

        let row = AssetRow::new(asset, &directory(), now(), Duration::days(30));
        assert_eq!(row.assignee_name, "Grace");
        assert_eq!(row.warranty_bucket, TimeBucket::ThisWindow);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["name"], "MacBook");
        assert_eq!(json["type"], "Laptop");
        assert_eq!(json["warranty_bucket"], "this_window");
    }

    #[test]
    fn test_incident_row_with_dangling_assignee() {
        let incident = Incident {
            id: "i1".to_string(),
            title: "VPN down".to_string(),
            status: IncidentStatus::New,
            priority: "Critical".to_string(),
            assignee: Some("99".to_string()),
            created_at: Some("2026-06-15T09:30:00Z".to_string()),
        };

        let row = IncidentRow::new(incident, &directory(), now());
        assert_eq!(row.assignee_name, "Unknown");
        assert_eq!(row.opened.as_deref(), Some("2h ago"));
    }

    #[test]
    fn test_request_row_formats_budget() {
        let request = Request {
            id: "r1".to_string(),
            title: "Licences".to_string(),
            kind: "Software".to_string(),
            status: RequestStatus::Pending,
            requester: None,
            budget: Some("$2500/month".to_string()),
            created_at: Some("2026-06-10".to_string()),
        };

        let row = RequestRow::new(request, &directory(), now());
        assert_eq!(row.requester_name, "Unassigned");
        assert_eq!(row.budget_display.as_deref(), Some("$2,500"));
        assert_eq!(row.submitted.as_deref(), Some("5d ago"));
    }

    #[test]
    fn test_airtime_row_usage() {
        let bundle = AirtimeBundle {
            id: "b1".to_string(),
            name: "Field team".to_string(),
            provider: "MTN".to_string(),
            data_used: Some("3".to_string()),
            data_limit: Some("0".to_string()),
            expiry_date: None,
            assigned_to: Some("7".to_string()),
        };

        let row = AirtimeRow::new(bundle, &directory(), now(), Duration::days(7));
        assert_eq!(row.usage, None);
        assert_eq!(row.expiry_bucket, TimeBucket::None);
        assert_eq!(row.assignee_name, "Grace");
    }
}
