use crate::config::PortalConfig;
use crate::errors::ApiError;
use crate::models::{
    AccountStatus, AlumniRecord, Career, ClusterPoint, CountResponse, DashboardAnalytics, DateRange,
    Listing, LoginRequest, LoginResponse, MessageResponse, ProgramEvent, ResetPasswordRequest,
    StatusUpdate, UpdateAction,
};
use axum::http::{HeaderMap, header};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const TOKEN_COOKIE: &str = "alumnilink_token";

/// Bearer token for the upstream API, carried explicitly from the incoming
/// request to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.trim().is_empty()).then_some(token),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `Authorization: Bearer` wins over the session cookie.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        if let Some(token) = bearer {
            return Self::new(token);
        }

        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == TOKEN_COOKIE)
            .map(|(_, value)| value);
        cookie.map(Self::new).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &PortalConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|err| ApiError::BaseUrl(format!("{}: {err}", config.api_base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(config.api_base_url.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            token: None,
        })
    }

    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            token: session.token().map(str::to_string),
            ..self.clone()
        }
    }

    pub fn with_token(&self, token: impl Into<String>) -> Self {
        self.with_session(&Session::new(token))
    }

    pub async fn list_alumni(&self) -> Result<Vec<AlumniRecord>, ApiError> {
        let req = self.authed(Method::GET, &["admin", "get-alumni"])?;
        self.send::<Listing<AlumniRecord>>(req).await.map(Listing::into_vec)
    }

    pub async fn pending_accounts(&self) -> Result<u64, ApiError> {
        let req = self.authed(Method::GET, &["admin", "pending-accounts"])?;
        self.send::<CountResponse>(req).await.map(|c| c.value())
    }

    pub async fn approved_accounts(&self) -> Result<u64, ApiError> {
        let req = self.authed(Method::GET, &["admin", "approved-accounts"])?;
        self.send::<CountResponse>(req).await.map(|c| c.value())
    }

    pub async fn update_account_status(
        &self,
        account_id: u64,
        status: AccountStatus,
    ) -> Result<MessageResponse, ApiError> {
        let id = account_id.to_string();
        let req = self
            .authed(Method::PUT, &["admin", "approval-email", &id])?
            .json(&StatusUpdate { status });
        self.send_ack(req).await
    }

    pub async fn unemployed_alumni(&self) -> Result<Vec<AlumniRecord>, ApiError> {
        let req = self.authed(Method::GET, &["admin", "unemployed-alumni-data"])?;
        self.send::<Listing<AlumniRecord>>(req).await.map(Listing::into_vec)
    }

    pub async fn send_sms(&self, account_id: u64) -> Result<MessageResponse, ApiError> {
        let id = account_id.to_string();
        let req = self.authed(Method::PUT, &["admin", "send-sms", &id])?;
        self.send_ack(req).await
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let req = self.public(Method::POST, &["login"])?.json(credentials);
        self.send(req).await
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        let req = self.public(Method::POST, &["reset-password"])?.json(request);
        self.send_ack(req).await
    }

    pub async fn dashboard_analytics(
        &self,
        range: &DateRange,
    ) -> Result<DashboardAnalytics, ApiError> {
        let req = self
            .authed(Method::GET, &["dashboard-analytics"])?
            .query(&range.query_pairs());
        self.send(req).await
    }

    pub async fn careers(&self) -> Result<Vec<Career>, ApiError> {
        let req = self.public(Method::GET, &["careers"])?;
        self.send::<Listing<Career>>(req).await.map(Listing::into_vec)
    }

    pub async fn program_events(&self) -> Result<Vec<ProgramEvent>, ApiError> {
        let req = self.public(Method::GET, &["program-events"])?;
        self.send::<Listing<ProgramEvent>>(req).await.map(Listing::into_vec)
    }

    pub async fn clustered_certification_employment(
        &self,
    ) -> Result<Vec<ClusterPoint>, ApiError> {
        let req = self.public(Method::GET, &["clustered-certification-employment"])?;
        self.send::<Listing<ClusterPoint>>(req).await.map(Listing::into_vec)
    }

    pub async fn send_unemployment_updates(
        &self,
        action_type: &str,
    ) -> Result<MessageResponse, ApiError> {
        let req = self
            .public(Method::POST, &["unemployed-updates"])?
            .json(&UpdateAction {
                action_type: action_type.to_string(),
            });
        self.send_ack(req).await
    }

    pub async fn send_update_to(&self, phone_number: &str) -> Result<MessageResponse, ApiError> {
        let req = self.public(Method::POST, &["send-updates", phone_number])?;
        self.send_ack(req).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn public(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "upstream request");
        Ok(self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json"))
    }

    fn authed(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
        Ok(self.public(method, segments)?.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Like `send`, but an empty success body is a valid acknowledgement.
    async fn send_ack(&self, req: RequestBuilder) -> Result<MessageResponse, ApiError> {
        let body = self.execute(req).await?;
        if body.trim().is_empty() {
            return Ok(MessageResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<String, ApiError> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, "upstream request failed");
            return Err(ApiError::Status { status, body });
        }
        Ok(body)
    }
}
