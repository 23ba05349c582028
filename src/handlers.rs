use crate::client::{Session, TOKEN_COOKIE};
use crate::correlation::{ClassifiedCorrelation, classify_all};
use crate::dashboard::{RegionBreakdown, load_dashboard, region_breakdown};
use crate::errors::{ApiError, AppError};
use crate::fetch::{CancelScope, FetchState, Resource};
use crate::models::{
    AccountType, AlumniRecord, DashboardAnalytics, DateRange, LoginRequest, MergedMonthlyPoint,
    MessageResponse, ResetPasswordRequest, StatusUpdate, UpdateAction,
};
use crate::regions::RegionFilter;
use crate::state::AppState;
use crate::stats::{ClusterSummary, summarize_clusters};
use crate::trends::merge_periods;
use crate::ui;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub job: Option<String>,
    pub year: Option<String>,
}

impl DashboardQuery {
    fn range(&self) -> Result<DateRange, AppError> {
        DateRange::parse(self.from.as_deref(), self.to.as_deref()).map_err(AppError::bad_request)
    }

    /// Blank form fields mean "no filter". A job name is matched exactly, untrimmed.
    fn filter(&self) -> Result<RegionFilter, AppError> {
        let job = self.job.clone().filter(|job| !job.trim().is_empty());
        let year = match non_blank(self.year.as_deref()) {
            None => None,
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                AppError::bad_request(format!("year must be an integer, got {raw:?}"))
            })?),
        };
        Ok(RegionFilter { job, year })
    }
}

/// JSON envelope that keeps "no data" apart from real data.
#[derive(Debug, Serialize)]
pub struct ApiView<T> {
    pub state: &'static str,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct AlumniListing {
    pub alumni: Vec<AlumniRecord>,
    pub unemployed: Vec<AlumniRecord>,
}

pub async fn index() -> Html<String> {
    Html(ui::render_landing().into_string())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn careers(State(state): State<AppState>) -> Html<String> {
    let careers = FetchState::from_result(state.client.careers().await);
    if let FetchState::Failed(err) = &careers {
        warn!("careers listing unavailable: {err}");
    }
    Html(ui::render_careers(&careers).into_string())
}

pub async fn events(State(state): State<AppState>) -> Html<String> {
    let events = FetchState::from_result(state.client.program_events().await);
    if let FetchState::Failed(err) = &events {
        warn!("program events unavailable: {err}");
    }
    Html(ui::render_events(&events).into_string())
}

pub async fn login(
    State(state): State<AppState>,
    Form(credentials): Form<LoginRequest>,
) -> Result<Response, AppError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }

    let response = state.client.login(&credentials).await?;
    let cookie = HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        response.token
    ))
    .map_err(AppError::internal)?;

    let is_admin = response
        .user
        .as_ref()
        .is_some_and(|user| user.account_type == AccountType::Admin);
    info!(email = %credentials.email, admin = is_admin, "signed in");

    let target = if is_admin { "/admin" } else { "/" };
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
}

pub async fn logout() -> Result<Response, AppError> {
    let cookie = HeaderValue::from_str(&format!(
        "{TOKEN_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"
    ))
    .map_err(AppError::internal)?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

pub async fn reset_password(
    State(state): State<AppState>,
    Form(request): Form<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if request.password.is_empty() {
        return Err(AppError::bad_request("password is required"));
    }
    if request.password != request.password_confirmation {
        return Err(AppError::bad_request("password confirmation does not match"));
    }
    Ok(Json(state.client.reset_password(&request).await?))
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let range = query.range()?;
    let filter = query.filter()?;
    let session = Session::from_headers(&headers);
    let data = load_dashboard(&state.client, &session, range, filter).await;
    Ok(Html(ui::render_dashboard(&data).into_string()))
}

pub async fn admin_alumni(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AlumniListing>, AppError> {
    let client = state.client.with_session(&Session::from_headers(&headers));
    let (alumni, unemployed) = tokio::try_join!(client.list_alumni(), client.unemployed_alumni())?;
    Ok(Json(AlumniListing { alumni, unemployed }))
}

pub async fn update_account_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(account_id): Path<u64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<MessageResponse>, AppError> {
    let client = state.client.with_session(&Session::from_headers(&headers));
    let ack = client.update_account_status(account_id, update.status).await?;
    info!(account_id, status = update.status.label(), "account status updated");
    Ok(Json(ack))
}

pub async fn send_sms(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(account_id): Path<u64>,
) -> Result<Response, AppError> {
    let client = state.client.with_session(&Session::from_headers(&headers));
    let ack = client.send_sms(account_id).await?;
    info!(account_id, "sms sent");
    if is_form_post(&headers) {
        return Ok(Redirect::to("/admin").into_response());
    }
    Ok(Json(ack).into_response())
}

pub async fn send_unemployment_updates(
    State(state): State<AppState>,
    Json(action): Json<UpdateAction>,
) -> Result<Json<MessageResponse>, AppError> {
    let action_type = action.action_type.trim();
    if action_type.is_empty() {
        return Err(AppError::bad_request("actionType is required"));
    }
    let ack = state.client.send_unemployment_updates(action_type).await?;
    info!(action_type, "bulk unemployment update sent");
    Ok(Json(ack))
}

pub async fn send_update_to(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let phone = phone.trim();
    if !is_phone_number(phone) {
        return Err(AppError::bad_request(format!("invalid phone number {phone:?}")));
    }
    let ack = state.client.send_update_to(phone).await?;
    info!(phone, "update sent");
    Ok(Json(ack))
}

pub async fn api_trends(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiView<Vec<MergedMonthlyPoint>>>, AppError> {
    let (kind, analytics) = load_analytics(&state, &headers, query.range()?).await?;
    Ok(Json(ApiView {
        state: kind,
        data: merge_periods(&analytics.current, &analytics.previous),
    }))
}

pub async fn api_regions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiView<RegionBreakdown>>, AppError> {
    let filter = query.filter()?;
    let (kind, analytics) = load_analytics(&state, &headers, query.range()?).await?;
    Ok(Json(ApiView {
        state: kind,
        data: region_breakdown(&analytics, &filter),
    }))
}

pub async fn api_correlations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiView<Vec<ClassifiedCorrelation>>>, AppError> {
    let (kind, analytics) = load_analytics(&state, &headers, query.range()?).await?;
    Ok(Json(ApiView {
        state: kind,
        data: classify_all(&analytics.correlations),
    }))
}

pub async fn api_clusters(
    State(state): State<AppState>,
) -> Result<Json<ApiView<Vec<ClusterSummary>>>, AppError> {
    let points = FetchState::from_result(state.client.clustered_certification_employment().await);
    let kind = points.kind();
    match points {
        FetchState::Failed(err) => Err(err.into()),
        FetchState::Loaded(points) => Ok(Json(ApiView {
            state: kind,
            data: summarize_clusters(&points),
        })),
        _ => Ok(Json(ApiView {
            state: kind,
            data: Vec::new(),
        })),
    }
}

async fn load_analytics(
    state: &AppState,
    headers: &HeaderMap,
    range: DateRange,
) -> Result<(&'static str, DashboardAnalytics), AppError> {
    let session = Session::from_headers(headers);
    let scope = CancelScope::new();
    let mut analytics: Resource<DashboardAnalytics> = Resource::new("dashboard-analytics");
    let client = state.client.clone();
    analytics
        .load(&scope, session.token(), move |token| {
            let client = client.with_token(token);
            async move { client.dashboard_analytics(&range).await }
        })
        .await;

    let analytics = analytics.into_state();
    let kind = analytics.kind();
    match analytics {
        FetchState::Loaded(data) => Ok((kind, data)),
        FetchState::Empty => Ok((kind, DashboardAnalytics::default())),
        FetchState::Idle => Err(ApiError::MissingToken.into()),
        FetchState::Failed(err) => Err(err.into()),
        FetchState::Loading => Err(ApiError::Cancelled.into()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Dashboard buttons submit plain HTML forms; API callers send JSON or no body.
fn is_form_post(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

fn is_phone_number(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && value
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || c == '-' || c == ' ' || (c == '+' && i == 0))
}
