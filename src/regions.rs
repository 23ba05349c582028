//! Regional employment breakdowns built from the region -> job -> year counts.

use crate::models::{RegionJobYearCount, RegionJobYearMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Jobs kept per region when the chart is unfiltered.
pub const TOP_JOBS_PER_REGION: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionFilter {
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl RegionFilter {
    pub fn is_active(&self) -> bool {
        self.job.is_some() || self.year.is_some()
    }

    fn matches(&self, entry: &RegionJobYearCount) -> bool {
        self.job.as_deref().is_none_or(|job| entry.job == job)
            && self.year.is_none_or(|year| entry.year == year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTotal {
    pub region: String,
    pub total: u64,
    pub job_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTotal {
    pub job: String,
    pub total: u64,
}

pub fn flatten(map: &RegionJobYearMap) -> Vec<RegionJobYearCount> {
    map.iter()
        .flat_map(|(region, jobs)| {
            jobs.iter().flat_map(move |(job, years)| {
                years.iter().map(move |(year, count)| RegionJobYearCount {
                    region: region.clone(),
                    job: job.clone(),
                    year: *year,
                    count: count.0,
                })
            })
        })
        .collect()
}

pub fn distinct_jobs(entries: &[RegionJobYearCount]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.job.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn distinct_years(entries: &[RegionJobYearCount]) -> Vec<i32> {
    entries
        .iter()
        .map(|e| e.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Filtered mode sums every matching tuple per region; with no filter the
/// region total is the sum of its top five jobs across all years.
pub fn aggregate(entries: &[RegionJobYearCount], filter: &RegionFilter) -> Vec<RegionTotal> {
    if filter.is_active() {
        aggregate_filtered(entries, filter)
    } else {
        aggregate_top_jobs(entries, TOP_JOBS_PER_REGION)
    }
}

pub fn aggregate_filtered(
    entries: &[RegionJobYearCount],
    filter: &RegionFilter,
) -> Vec<RegionTotal> {
    let mut regions: BTreeMap<&str, (u64, BTreeSet<&str>)> = BTreeMap::new();
    for entry in entries.iter().filter(|e| filter.matches(e)) {
        let slot = regions.entry(entry.region.as_str()).or_default();
        slot.0 = slot.0.saturating_add(entry.count);
        slot.1.insert(entry.job.as_str());
    }

    regions
        .into_iter()
        .map(|(region, (total, jobs))| RegionTotal {
            region: region.to_string(),
            total,
            job_count: jobs.len(),
        })
        .collect()
}

pub fn aggregate_top_jobs(entries: &[RegionJobYearCount], limit: usize) -> Vec<RegionTotal> {
    top_jobs_by_region(entries, limit)
        .into_iter()
        .map(|(region, jobs)| RegionTotal {
            region,
            total: jobs.iter().map(|j| j.total).sum(),
            job_count: jobs.len(),
        })
        .collect()
}

/// Per-region job totals across all years, highest first (ties by job name),
/// truncated to `limit`.
pub fn top_jobs_by_region(
    entries: &[RegionJobYearCount],
    limit: usize,
) -> BTreeMap<String, Vec<JobTotal>> {
    let mut per_job: HashMap<(&str, &str), u64> = HashMap::new();
    for entry in entries {
        let total = per_job.entry((entry.region.as_str(), entry.job.as_str())).or_default();
        *total = total.saturating_add(entry.count);
    }

    let mut regions: BTreeMap<String, Vec<JobTotal>> = BTreeMap::new();
    for ((region, job), total) in per_job {
        regions.entry(region.to_string()).or_default().push(JobTotal {
            job: job.to_string(),
            total,
        });
    }

    for jobs in regions.values_mut() {
        jobs.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.job.cmp(&b.job)));
        jobs.truncate(limit);
    }
    regions
}
