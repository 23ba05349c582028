//! Per-page data loading: one [`Resource`] per data need, each moving through
//! `Idle -> Loading -> Loaded | Empty | Failed`, with every request bound to a
//! [`CancelScope`] owned by the page render that started it.

use crate::errors::ApiError;
use crate::models::{AlumniRecord, Career, ClusterPoint, DashboardAnalytics, ProgramEvent};
use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Decides whether a successful payload counts as "no data".
pub trait Payload {
    fn is_empty_payload(&self) -> bool {
        false
    }
}

impl Payload for u64 {}

impl Payload for Vec<AlumniRecord> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for Vec<Career> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for Vec<ProgramEvent> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for Vec<ClusterPoint> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for DashboardAnalytics {
    fn is_empty_payload(&self) -> bool {
        self.current.is_empty()
            && self.previous.is_empty()
            && self.region_job_year.is_empty()
            && self.correlations.is_empty()
    }
}

#[derive(Debug)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(T),
    Empty,
    Failed(ApiError),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Loaded(_) => "loaded",
            FetchState::Empty => "empty",
            FetchState::Failed(_) => "failed",
        }
    }
}

impl<T: Payload> FetchState<T> {
    /// Classifies a one-shot load that is not tied to a session token.
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Err(err) => FetchState::Failed(err),
            Ok(value) if value.is_empty_payload() => FetchState::Empty,
            Ok(value) => FetchState::Loaded(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

pub struct Pending<T> {
    ticket: Ticket,
    handle: JoinHandle<Result<T, ApiError>>,
}

pub struct Resource<T> {
    name: &'static str,
    token: Option<String>,
    generation: u64,
    state: FetchState<T>,
}

impl<T: Payload> Resource<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            token: None,
            generation: 0,
            state: FetchState::Idle,
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn into_state(self) -> FetchState<T> {
        self.state
    }

    /// Starts a new fetch cycle when the token changes. Without a token the
    /// resource goes back to `Idle` and nothing is requested.
    pub fn set_token(&mut self, token: Option<&str>) -> Option<Ticket> {
        if token == self.token.as_deref() && !matches!(self.state, FetchState::Idle) {
            return None;
        }

        self.token = token.map(str::to_string);
        self.generation += 1;
        match token {
            None => {
                self.state = FetchState::Idle;
                None
            }
            Some(_) => {
                self.state = FetchState::Loading;
                Some(Ticket {
                    generation: self.generation,
                })
            }
        }
    }

    /// Applies a result if it belongs to the current cycle. Results from an
    /// older token and cancelled requests are dropped.
    pub fn settle(&mut self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        if ticket.generation != self.generation {
            debug!(resource = self.name, "dropping result from a superseded fetch");
            return false;
        }

        match &result {
            Err(ApiError::Cancelled) => {
                debug!(resource = self.name, "fetch cancelled");
                return false;
            }
            Err(err) => warn!(resource = self.name, "fetch failed: {err}"),
            Ok(_) => {}
        }
        self.state = FetchState::from_result(result);
        true
    }

    /// Sets the token and, if a cycle starts, runs `fetch` on its own task
    /// under `scope`.
    pub fn start<F, Fut>(
        &mut self,
        scope: &CancelScope,
        token: Option<&str>,
        fetch: F,
    ) -> Option<Pending<T>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        let ticket = self.set_token(token)?;
        let token = self.token.clone()?;
        let guard = scope.token();
        let handle = tokio::spawn(guard.run(fetch(token)));
        Some(Pending { ticket, handle })
    }

    pub async fn finish(&mut self, pending: Option<Pending<T>>) {
        let Some(Pending { ticket, handle }) = pending else {
            return;
        };
        let result = match handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(ApiError::Cancelled),
        };
        self.settle(ticket, result);
    }

    /// `start` followed by `finish`.
    pub async fn load<F, Fut>(&mut self, scope: &CancelScope, token: Option<&str>, fetch: F)
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        let pending = self.start(scope, token, fetch);
        self.finish(pending).await;
    }
}

/// Cancels every request started under it when cancelled or dropped.
pub struct CancelScope {
    tx: watch::Sender<bool>,
}

impl CancelScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub async fn cancelled(&mut self) {
        // A closed channel means the scope is gone, which also cancels.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    pub async fn run<T, F>(mut self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }
}
