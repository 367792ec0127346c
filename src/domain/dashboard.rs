// Dashboard overview domain model
use super::aggregate::{
    ExpiryBuckets, Metric, aggregate, bucket_by_date, count, group_count, percentage,
    ratio_percentage, sum,
};
use super::format::{format_currency, format_percentage};
use super::outcome::Outcome;
use super::parse::{currency_or_zero, optional_date, optional_number};
use super::records::{
    AirtimeBundle, Asset, AssetStatus, Incident, IncidentStatus, Request, RequestStatus, User,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const NO_DEPARTMENT: &str = "Unassigned";
const NO_VALUE: &str = "Unspecified";

fn label_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub active_display: String,
    pub by_department: BTreeMap<String, usize>,
    pub by_role: BTreeMap<String, usize>,
}

impl UserStats {
    pub fn from_records(users: &[User]) -> Self {
        let active = count(users, User::is_active);
        Self {
            total: users.len(),
            active,
            active_display: format_percentage(percentage(active, users.len())),
            by_department: group_count(users, |u| {
                label_or(u.department.as_deref().unwrap_or(""), NO_DEPARTMENT)
            }),
            by_role: group_count(users, |u| label_or(&u.role, NO_VALUE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetStats {
    pub total: usize,
    pub available: usize,
    pub assigned: usize,
    pub maintenance: usize,
    pub retired: usize,
    pub utilization: f64,
    pub utilization_display: String,
    pub warranty: ExpiryBuckets,
    pub by_type: BTreeMap<String, usize>,
}

impl AssetStats {
    pub fn from_records(assets: &[Asset], now: DateTime<Utc>, warranty_window: Duration) -> Self {
        let by_status = |status: AssetStatus| count(assets, |a| a.status == status);
        let assigned = by_status(AssetStatus::Assigned);
        let utilization = percentage(assigned, assets.len());

        Self {
            total: assets.len(),
            available: by_status(AssetStatus::Available),
            assigned,
            maintenance: by_status(AssetStatus::Maintenance),
            retired: by_status(AssetStatus::Retired),
            utilization,
            utilization_display: format_percentage(utilization),
            warranty: bucket_by_date(
                assets,
                |a| optional_date(a.warranty_expiry.as_deref()),
                now,
                warranty_window,
            ),
            by_type: group_count(assets, |a| label_or(&a.kind, NO_VALUE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentStats {
    pub total: usize,
    pub open: usize,
    pub resolved: usize,
    pub escalated: usize,
    pub resolution_rate: f64,
    pub resolution_rate_display: String,
    pub by_priority: BTreeMap<String, usize>,
}

impl IncidentStats {
    pub fn from_records(incidents: &[Incident]) -> Self {
        let resolved = count(incidents, |i| i.status == IncidentStatus::Resolved);
        let resolution_rate = percentage(resolved, incidents.len());

        Self {
            total: incidents.len(),
            open: count(incidents, |i| i.status.is_open()),
            resolved,
            escalated: count(incidents, |i| i.status == IncidentStatus::Escalated),
            resolution_rate,
            resolution_rate_display: format_percentage(resolution_rate),
            by_priority: group_count(incidents, |i| label_or(&i.priority, NO_VALUE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub fulfilled: usize,
    /// Approved or fulfilled, over all decided requests.
    pub approval_rate: f64,
    pub approval_rate_display: String,
    pub total_budget: f64,
    pub total_budget_display: String,
    /// Budget still awaiting a decision.
    pub pending_budget: Metric,
}

impl RequestStats {
    pub fn from_records(requests: &[Request]) -> Self {
        let by_status = |status: RequestStatus| count(requests, |r| r.status == status);
        let approved = by_status(RequestStatus::Approved);
        let rejected = by_status(RequestStatus::Rejected);
        let fulfilled = by_status(RequestStatus::Fulfilled);
        let approval_rate = percentage(approved + fulfilled, approved + fulfilled + rejected);
        let budget = |r: &Request| r.budget.as_deref().map(currency_or_zero);
        let total_budget = sum(requests, budget);
        let is_pending = |r: &Request| r.status == RequestStatus::Pending;
        let pending_budget = aggregate(requests, budget, Some(&is_pending));

        Self {
            total: requests.len(),
            pending: pending_budget.count,
            approved,
            rejected,
            fulfilled,
            approval_rate,
            approval_rate_display: format_percentage(approval_rate),
            total_budget,
            total_budget_display: format_currency(total_budget),
            pending_budget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirtimeStats {
    pub total: usize,
    pub by_provider: BTreeMap<String, usize>,
    pub data_used: f64,
    pub data_limit: f64,
    pub usage: f64,
    pub usage_display: String,
    pub expiry: ExpiryBuckets,
}

impl AirtimeStats {
    pub fn from_records(
        bundles: &[AirtimeBundle],
        now: DateTime<Utc>,
        expiry_window: Duration,
    ) -> Self {
        // Usage only counts bundles where both figures parse, so a bad
        // limit never inflates the percentage.
        let measured: Vec<(f64, f64)> = bundles
            .iter()
            .filter_map(|b| {
                let used = optional_number(b.data_used.as_deref())?;
                let limit = optional_number(b.data_limit.as_deref())?;
                Some((used, limit))
            })
            .collect();
        let data_used = sum(&measured, |(used, _)| Some(*used));
        let data_limit = sum(&measured, |(_, limit)| Some(*limit));
        let usage = ratio_percentage(data_used, data_limit);

        Self {
            total: bundles.len(),
            by_provider: group_count(bundles, |b| label_or(&b.provider, NO_VALUE)),
            data_used,
            data_limit,
            usage,
            usage_display: format_percentage(usage),
            expiry: bucket_by_date(
                bundles,
                |b| optional_date(b.expiry_date.as_deref()),
                now,
                expiry_window,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub generated_at: DateTime<Utc>,
    pub users: Outcome<UserStats>,
    pub assets: Outcome<AssetStats>,
    pub incidents: Outcome<IncidentStats>,
    pub requests: Outcome<RequestStats>,
    pub airtime: Outcome<AirtimeStats>,
}
