use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Approval state of an alumni account. Wire codes: "0" rejected, "1" pending, "2" approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountStatus {
    Rejected,
    #[default]
    Pending,
    Approved,
}

impl AccountStatus {
    pub fn code(self) -> &'static str {
        match self {
            AccountStatus::Rejected => "0",
            AccountStatus::Pending => "1",
            AccountStatus::Approved => "2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "0" | "rejected" => Some(AccountStatus::Rejected),
            "1" | "pending" => Some(AccountStatus::Pending),
            "2" | "approved" => Some(AccountStatus::Approved),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccountStatus::Rejected => "Rejected",
            AccountStatus::Pending => "Pending",
            AccountStatus::Approved => "Approved",
        }
    }
}

/// Employment state of an alumnus. Wire codes: "0" unemployed, "1" freelance, "2" employed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmploymentStatus {
    Unemployed,
    Freelance,
    Employed,
}

impl EmploymentStatus {
    pub fn code(self) -> &'static str {
        match self {
            EmploymentStatus::Unemployed => "0",
            EmploymentStatus::Freelance => "1",
            EmploymentStatus::Employed => "2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "0" | "unemployed" => Some(EmploymentStatus::Unemployed),
            "1" | "freelance" => Some(EmploymentStatus::Freelance),
            "2" | "employed" => Some(EmploymentStatus::Employed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Unemployed => "Unemployed",
            EmploymentStatus::Freelance => "Freelance",
            EmploymentStatus::Employed => "Employed",
        }
    }
}

macro_rules! status_code_serde {
    ($ty:ty, $what:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Scalar::deserialize(deserializer)?.into_key();
                <$ty>::from_code(&raw)
                    .ok_or_else(|| de::Error::custom(format!("unknown {} code {raw:?}", $what)))
            }
        }
    };
}

status_code_serde!(AccountStatus, "account status");
status_code_serde!(EmploymentStatus, "employment status");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Alumni,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub email: String,
    #[serde(default, alias = "verified", alias = "is_verified")]
    pub email_verified: bool,
    /// Accepted on input, never echoed back.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub alumni_id: Option<u64>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, alias = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlumniRecord {
    pub id: u64,
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phone_number", alias = "contact_number")]
    pub phone: Option<String>,
    #[serde(default, alias = "year_graduated", deserialize_with = "opt_key")]
    pub batch: Option<String>,
    #[serde(default, alias = "job", alias = "current_job")]
    pub job_title: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(default)]
    pub account: Option<Account>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Current,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDataPoint {
    #[serde(deserialize_with = "key")]
    pub month: String,
    #[serde(default, deserialize_with = "count")]
    pub registrations: u64,
    #[serde(default, deserialize_with = "count")]
    pub unemployed: u64,
}

/// One month of the current-vs-previous comparison. `None` means the period
/// has no entry for the month, which is not the same as a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedMonthlyPoint {
    pub month: String,
    pub current_registrations: Option<u64>,
    pub current_unemployed: Option<u64>,
    pub previous_registrations: Option<u64>,
    pub previous_unemployed: Option<u64>,
}

/// region -> job title -> year -> count
pub type RegionJobYearMap = BTreeMap<String, BTreeMap<String, BTreeMap<i32, Count>>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionJobYearCount {
    pub region: String,
    pub job: String,
    pub year: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    #[serde(alias = "metric")]
    pub label: String,
    #[serde(alias = "value", alias = "correlation")]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardAnalytics {
    #[serde(
        default,
        alias = "current_period",
        alias = "currentPeriod",
        deserialize_with = "nullable"
    )]
    pub current: Vec<MonthlyDataPoint>,
    #[serde(
        default,
        alias = "previous_period",
        alias = "previousPeriod",
        deserialize_with = "nullable"
    )]
    pub previous: Vec<MonthlyDataPoint>,
    #[serde(
        default,
        alias = "regionJobYear",
        alias = "region_job_counts",
        deserialize_with = "region_map"
    )]
    pub region_job_year: RegionJobYearMap,
    #[serde(default, deserialize_with = "nullable")]
    pub correlations: Vec<CorrelationEntry>,
    #[serde(default, alias = "totalAlumni", deserialize_with = "count")]
    pub total_alumni: u64,
    #[serde(default, alias = "employedAlumni", deserialize_with = "count")]
    pub employed_alumni: u64,
}

impl DashboardAnalytics {
    pub fn series(&self, period: Period) -> &[MonthlyDataPoint] {
        match period {
            Period::Current => &self.current,
            Period::Previous => &self.previous,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Career {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default, alias = "organization")]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "date", alias = "created_at")]
    pub posted_at: Option<String>,
    #[serde(default, alias = "url")]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramEvent {
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default, alias = "location")]
    pub venue: Option<String>,
    #[serde(default, alias = "event_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPoint {
    #[serde(default)]
    pub alumni_id: Option<u64>,
    pub cluster: u32,
    #[serde(default, alias = "x")]
    pub certification_relatedness: f64,
    #[serde(default, alias = "y")]
    pub employment_score: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Optional `from`/`to` window for the dashboard analytics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, String> {
        let range = Self {
            from: parse_date("from", from)?,
            to: parse_date("to", to)?,
        };
        if let (Some(from), Some(to)) = (range.from, range.to) {
            if from > to {
                return Err(format!("from ({from}) must not be after to ({to})"));
            }
        }
        Ok(range)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.from {
            pairs.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

fn parse_date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{name} must be a YYYY-MM-DD date, got {raw:?}")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub user: Option<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAction {
    #[serde(rename = "actionType")]
    pub action_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Listing endpoints answer either with a bare array or `{"data": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

/// Count endpoints answer either with a bare number or `{"count": n}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CountResponse {
    Bare(Count),
    Wrapped {
        #[serde(alias = "total")]
        count: Count,
    },
}

impl CountResponse {
    pub fn value(&self) -> u64 {
        match self {
            CountResponse::Bare(count) | CountResponse::Wrapped { count } => count.0,
        }
    }
}

/// Non-negative integer accepted as a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Count(pub u64);

/// `null` reads as zero.
impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(Count(0)),
            Some(Scalar::Int(n)) => u64::try_from(n)
                .map(Count)
                .map_err(|_| de::Error::custom(format!("negative count {n}"))),
            Some(Scalar::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Ok(Count(f as u64)),
            Some(Scalar::Float(f)) => Err(de::Error::custom(format!("invalid count {f}"))),
            Some(Scalar::Str(s)) => s
                .trim()
                .parse()
                .map(Count)
                .map_err(|_| de::Error::custom(format!("invalid count {s:?}"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_key(self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s.trim().to_string(),
        }
    }
}

fn key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(Scalar::into_key)
}

fn opt_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_key))
}

fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Count::deserialize(deserializer).map(|c| c.0)
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

type RawLeaves = Option<BTreeMap<String, serde_json::Value>>;

/// Leaves that are not a `year -> count` pair are dropped so one bad cell
/// does not cost the whole chart.
fn region_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RegionJobYearMap, D::Error> {
    let raw: Option<BTreeMap<String, Option<BTreeMap<String, RawLeaves>>>> =
        Option::deserialize(deserializer)?;

    let mut map = RegionJobYearMap::new();
    for (region, jobs) in raw.unwrap_or_default() {
        let mut region_jobs = BTreeMap::new();
        for (job, years) in jobs.unwrap_or_default() {
            let job_years: BTreeMap<i32, Count> = years
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(year, value)| {
                    let year = year.trim().parse::<i32>().ok()?;
                    let count = serde_json::from_value::<Count>(value).ok()?;
                    Some((year, count))
                })
                .collect();
            if !job_years.is_empty() {
                region_jobs.insert(job, job_years);
            }
        }
        if !region_jobs.is_empty() {
            map.insert(region, region_jobs);
        }
    }
    Ok(map)
}
