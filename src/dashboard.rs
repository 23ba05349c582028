//! Admin dashboard data: the concurrent loads behind one page render and the
//! chart views derived from them.

use crate::client::{ApiClient, Session};
use crate::correlation::{ClassifiedCorrelation, classify_all};
use crate::fetch::{CancelScope, FetchState, Resource};
use crate::models::{AlumniRecord, DashboardAnalytics, DateRange, MergedMonthlyPoint};
use crate::regions::{self, JobTotal, RegionFilter, RegionTotal, TOP_JOBS_PER_REGION};
use crate::stats::{DashboardSummary, build_summary};
use crate::trends::merge_periods;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub struct DashboardData {
    pub range: DateRange,
    pub filter: RegionFilter,
    pub analytics: FetchState<DashboardAnalytics>,
    pub pending: FetchState<u64>,
    pub approved: FetchState<u64>,
    pub unemployed: FetchState<Vec<AlumniRecord>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionBreakdown {
    pub filter: RegionFilter,
    pub totals: Vec<RegionTotal>,
    pub jobs: Vec<String>,
    pub years: Vec<i32>,
    /// Only present for the unfiltered chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_jobs: Option<BTreeMap<String, Vec<JobTotal>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    pub summary: DashboardSummary,
    pub trend: Vec<MergedMonthlyPoint>,
    pub regions: RegionBreakdown,
    pub correlations: Vec<ClassifiedCorrelation>,
}

/// Loads every data need of the admin dashboard concurrently. Dropping the
/// returned future (the client went away) cancels the outstanding requests.
pub async fn load_dashboard(
    client: &ApiClient,
    session: &Session,
    range: DateRange,
    filter: RegionFilter,
) -> DashboardData {
    let scope = CancelScope::new();
    let token = session.token();

    let mut analytics: Resource<DashboardAnalytics> = Resource::new("dashboard-analytics");
    let mut pending: Resource<u64> = Resource::new("pending-accounts");
    let mut approved: Resource<u64> = Resource::new("approved-accounts");
    let mut unemployed: Resource<Vec<AlumniRecord>> = Resource::new("unemployed-alumni");

    let analytics_job = analytics.start(&scope, token, {
        let client = client.clone();
        move |token| {
            let client = client.with_token(token);
            async move { client.dashboard_analytics(&range).await }
        }
    });
    let pending_job = pending.start(&scope, token, {
        let client = client.clone();
        move |token| {
            let client = client.with_token(token);
            async move { client.pending_accounts().await }
        }
    });
    let approved_job = approved.start(&scope, token, {
        let client = client.clone();
        move |token| {
            let client = client.with_token(token);
            async move { client.approved_accounts().await }
        }
    });
    let unemployed_job = unemployed.start(&scope, token, {
        let client = client.clone();
        move |token| {
            let client = client.with_token(token);
            async move { client.unemployed_alumni().await }
        }
    });

    tokio::join!(
        analytics.finish(analytics_job),
        pending.finish(pending_job),
        approved.finish(approved_job),
        unemployed.finish(unemployed_job),
    );

    debug!(
        analytics = analytics.state().kind(),
        pending = pending.state().kind(),
        approved = approved.state().kind(),
        unemployed = unemployed.state().kind(),
        "dashboard loaded"
    );

    DashboardData {
        range,
        filter,
        analytics: analytics.into_state(),
        pending: pending.into_state(),
        approved: approved.into_state(),
        unemployed: unemployed.into_state(),
    }
}

impl DashboardData {
    pub fn view(&self) -> Option<AnalyticsView> {
        let analytics = self.analytics.loaded()?;
        Some(AnalyticsView {
            summary: build_summary(
                analytics,
                self.pending.loaded().copied(),
                self.approved.loaded().copied(),
            ),
            trend: merge_periods(&analytics.current, &analytics.previous),
            regions: region_breakdown(analytics, &self.filter),
            correlations: classify_all(&analytics.correlations),
        })
    }
}

pub fn region_breakdown(analytics: &DashboardAnalytics, filter: &RegionFilter) -> RegionBreakdown {
    let flat = regions::flatten(&analytics.region_job_year);
    RegionBreakdown {
        filter: filter.clone(),
        totals: regions::aggregate(&flat, filter),
        jobs: regions::distinct_jobs(&flat),
        years: regions::distinct_years(&flat),
        top_jobs: (!filter.is_active())
            .then(|| regions::top_jobs_by_region(&flat, TOP_JOBS_PER_REGION)),
    }
}
