mod common;

use common::{EMPTY_RANGE_FROM, TOKEN, upstream_url};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode, header, redirect::Policy};
use serde::Deserialize;
use serde_json::Value;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ApiView {
    state: String,
    data: Value,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_alumnilink"))
        .env("PORT", port.to_string())
        .env("ALUMNILINK_API_URL", upstream_url())
        .env("ALUMNILINK_REQUEST_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn no_redirects() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn http_landing_page_offers_sign_in() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let page = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("AlumniLink"));
    assert!(page.contains("action=\"/login\""));
}

#[tokio::test]
async fn http_login_sets_cookie_and_redirects_admin() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = no_redirects()
        .post(format!("{}/login", server.base_url))
        .form(&[("email", "admin@example.edu"), ("password", "secret")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("alumnilink_token={TOKEN}")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn http_login_with_bad_password_is_unauthorized() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = no_redirects()
        .post(format!("{}/login", server.base_url))
        .form(&[("email", "admin@example.edu"), ("password", "guess")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn http_dashboard_renders_sections_for_session_cookie() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let page = Client::new()
        .get(format!("{}/admin", server.base_url))
        .header(header::COOKIE, format!("theme=dark; alumnilink_token={TOKEN}"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Registrations: current vs previous"));
    assert!(page.contains("Correlations"));
    assert!(page.contains("Strong Positive"));
    assert!(page.contains("Ben Reyes"));
    assert!(!page.contains("Sign in to load"));
}

#[tokio::test]
async fn http_dashboard_without_session_asks_for_sign_in() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/admin", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response.text().await.unwrap().contains("Sign in to load this section."));
}

#[tokio::test]
async fn http_trends_merge_both_periods() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let view: ApiView = Client::new()
        .get(format!("{}/api/trends", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.state, "loaded");
    let points = view.data.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["month"], "1");
    assert_eq!(points[0]["currentRegistrations"], 10);
    assert!(points[0]["previousRegistrations"].is_null());
    assert_eq!(points[2]["previousRegistrations"], 4);
}

#[tokio::test]
async fn http_trends_require_a_token() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/api/trends", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_empty_range_reports_empty_state() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let view: ApiView = Client::new()
        .get(format!("{}/api/trends?from={EMPTY_RANGE_FROM}", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.state, "empty");
    assert_eq!(view.data, Value::Array(Vec::new()));
}

#[tokio::test]
async fn http_regions_apply_filters() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let by_job: ApiView = client
        .get(format!("{}/api/regions?job=Developer", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let totals = by_job.data["totals"].as_array().unwrap();
    let total_of = |region: &str| {
        totals
            .iter()
            .find(|t| t["region"] == region)
            .map(|t| t["total"].as_u64().unwrap())
    };
    assert_eq!(total_of("NCR"), Some(10));
    assert_eq!(total_of("Region VII"), Some(2));
    assert!(by_job.data.get("top_jobs").is_none());

    let by_year: ApiView = client
        .get(format!("{}/api/regions?year=2023", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ncr = by_year.data["totals"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["region"] == "NCR")
        .unwrap();
    assert_eq!(ncr["total"], 6 + 3 + 2 + 7);
    assert_eq!(ncr["job_count"], 4);

    let unfiltered: ApiView = client
        .get(format!("{}/api/regions?job=&year=", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ncr_jobs = unfiltered.data["top_jobs"]["NCR"].as_array().unwrap();
    assert_eq!(ncr_jobs.len(), 5);
    assert_eq!(ncr_jobs[0]["job"], "Developer");
}

#[tokio::test]
async fn http_regions_reject_non_numeric_year() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .get(format!("{}/api/regions?year=recent", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_account_status_update_is_forwarded() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = Client::new()
        .post(format!("{}/admin/accounts/9/status", server.base_url))
        .bearer_auth(TOKEN)
        .json(&serde_json::json!({ "status": "rejected" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "status for 9 set to 0");
}

#[tokio::test]
async fn http_sms_form_post_returns_to_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = no_redirects();

    let from_form = client
        .post(format!("{}/admin/accounts/2/sms", server.base_url))
        .header(header::COOKIE, format!("alumnilink_token={TOKEN}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("")
        .send()
        .await
        .unwrap();
    assert_eq!(from_form.status(), StatusCode::SEE_OTHER);
    assert_eq!(from_form.headers()[header::LOCATION], "/admin");

    let from_api = client
        .post(format!("{}/admin/accounts/2/sms", server.base_url))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(from_api.status(), StatusCode::OK);
}

#[tokio::test]
async fn http_logout_clears_cookie() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let response = no_redirects()
        .post(format!("{}/logout", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("alumnilink_token=;"));
}

#[tokio::test]
async fn http_careers_page_lists_openings() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let page = Client::new()
        .get(format!("{}/careers", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Backend Engineer"));
    assert!(page.contains("https://jobs.example.com/7"));
}
