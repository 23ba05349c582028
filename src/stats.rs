use crate::models::{ClusterPoint, DashboardAnalytics, Period};
use crate::trends::period_totals;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub current_registrations: u64,
    pub current_unemployed: u64,
    pub previous_registrations: u64,
    pub previous_unemployed: u64,
    /// Percent change in registrations; `None` when the previous period is zero.
    pub registration_change_pct: Option<f64>,
    pub unemployed_change_pct: Option<f64>,
    pub employment_rate_pct: Option<f64>,
    pub pending_accounts: Option<u64>,
    pub approved_accounts: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: u32,
    pub members: usize,
    pub mean_certification_relatedness: f64,
    pub mean_employment_score: f64,
}

pub fn build_summary(
    analytics: &DashboardAnalytics,
    pending_accounts: Option<u64>,
    approved_accounts: Option<u64>,
) -> DashboardSummary {
    let (current_registrations, current_unemployed) =
        period_totals(analytics.series(Period::Current));
    let (previous_registrations, previous_unemployed) =
        period_totals(analytics.series(Period::Previous));

    let employment_rate_pct = (analytics.total_alumni > 0).then(|| {
        analytics.employed_alumni.min(analytics.total_alumni) as f64
            / analytics.total_alumni as f64
            * 100.0
    });

    DashboardSummary {
        current_registrations,
        current_unemployed,
        previous_registrations,
        previous_unemployed,
        registration_change_pct: percent_change(previous_registrations, current_registrations),
        unemployed_change_pct: percent_change(previous_unemployed, current_unemployed),
        employment_rate_pct,
        pending_accounts,
        approved_accounts,
    }
}

pub fn percent_change(previous: u64, current: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

pub fn summarize_clusters(points: &[ClusterPoint]) -> Vec<ClusterSummary> {
    let mut clusters: BTreeMap<u32, (usize, f64, f64)> = BTreeMap::new();
    for point in points {
        let slot = clusters.entry(point.cluster).or_default();
        slot.0 += 1;
        slot.1 += point.certification_relatedness;
        slot.2 += point.employment_score;
    }

    clusters
        .into_iter()
        .map(|(cluster, (members, cert_sum, emp_sum))| {
            let denom = members as f64;
            ClusterSummary {
                cluster,
                members,
                mean_certification_relatedness: cert_sum / denom,
                mean_employment_score: emp_sum / denom,
            }
        })
        .collect()
}

/// Display helper: one decimal, or `N/A` when the figure is undefined.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}%"),
        None => "N/A".to_string(),
    }
}
