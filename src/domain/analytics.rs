// Analytics page models: warranty report, departments, technician workload
use super::aggregate::{ExpiryBuckets, percentage};
use super::directory::{UNASSIGNED, UNKNOWN, UserDirectory};
use super::format::format_percentage;
use super::records::{Asset, Incident, IncidentStatus, User};
use super::views::AssetRow;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct WarrantyReport {
    pub buckets: ExpiryBuckets,
    pub overdue: Vec<AssetRow>,
    pub expiring_soon: Vec<AssetRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub users: usize,
    pub active_users: usize,
    pub assigned_assets: usize,
}

fn department_entry<'a>(
    departments: &'a mut BTreeMap<String, DepartmentSummary>,
    name: &str,
) -> &'a mut DepartmentSummary {
    departments
        .entry(name.to_string())
        .or_insert_with(|| DepartmentSummary {
            department: name.to_string(),
            users: 0,
            active_users: 0,
            assigned_assets: 0,
        })
}

/// Users and assigned assets per department. Assets assigned to users
/// without a department land under "Unassigned"; assets pointing at a
/// user id that does not exist land under "Unknown".
pub fn department_breakdown(users: &[User], assets: &[Asset]) -> Vec<DepartmentSummary> {
    let directory = UserDirectory::new(users);
    let mut departments: BTreeMap<String, DepartmentSummary> = BTreeMap::new();

    for user in users {
        let name = user
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNASSIGNED);
        let summary = department_entry(&mut departments, name);
        summary.users += 1;
        if user.is_active() {
            summary.active_users += 1;
        }
    }

    for asset in assets {
        let Some(owner) = asset.assigned_to.as_deref() else {
            continue;
        };
        let name = if directory.contains(owner) {
            directory
                .department_of(owner)
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(UNASSIGNED)
        } else {
            UNKNOWN
        };
        department_entry(&mut departments, name).assigned_assets += 1;
    }

    departments.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianWorkload {
    pub assignee_id: Option<String>,
    pub name: String,
    pub assigned: usize,
    pub open: usize,
    pub resolved: usize,
    pub resolution_rate: f64,
    pub resolution_rate_display: String,
}

/// Incident load per assignee, busiest first. Computed from actual
/// incident records; there is no synthetic performance score.
pub fn technician_workload(users: &[User], incidents: &[Incident]) -> Vec<TechnicianWorkload> {
    let directory = UserDirectory::new(users);
    let mut per_assignee: BTreeMap<Option<String>, (usize, usize, usize)> = BTreeMap::new();

    for incident in incidents {
        let counts = per_assignee.entry(incident.assignee.clone()).or_default();
        counts.0 += 1;
        if incident.status.is_open() {
            counts.1 += 1;
        }
        if incident.status == IncidentStatus::Resolved {
            counts.2 += 1;
        }
    }

    let mut workload: Vec<TechnicianWorkload> = per_assignee
        .into_iter()
        .map(|(assignee_id, (assigned, open, resolved))| {
            let resolution_rate = percentage(resolved, assigned);
            TechnicianWorkload {
                name: directory.resolve(assignee_id.as_deref()),
                assignee_id,
                assigned,
                open,
                resolved,
                resolution_rate,
                resolution_rate_display: format_percentage(resolution_rate),
            }
        })
        .collect();

    // Stable sort keeps id order among equally loaded assignees
    workload.sort_by(|a, b| b.open.cmp(&a.open).then(b.assigned.cmp(&a.assigned)));
    workload
}
