use crate::dashboard::{AnalyticsView, DashboardData, RegionBreakdown};
use crate::fetch::FetchState;
use crate::models::{AlumniRecord, Career, MergedMonthlyPoint, ProgramEvent};
use crate::stats::{DashboardSummary, format_pct};
use crate::trends::{calendar_order, month_label};
use chrono::{Local, NaiveDate};
use maud::{DOCTYPE, Markup, PreEscaped, html};

pub fn render_landing() -> Markup {
    page(
        "AlumniLink",
        html! {
            header {
                h1 { "AlumniLink" }
                p class="subtitle" { "Stay connected with your alma mater: careers, programs and events for graduates." }
            }
            section class="panel" {
                a class="stat link" href="/careers" {
                    span class="label" { "Browse" }
                    span class="value" { "Careers" }
                }
                a class="stat link" href="/events" {
                    span class="label" { "Join" }
                    span class="value" { "Programs & events" }
                }
            }
            (card("Sign in", html! {
                form class="form" method="post" action="/login" {
                    label { "Email " input type="email" name="email" required; }
                    label { "Password " input type="password" name="password" required; }
                    button class="btn-primary" type="submit" { "Sign in" }
                }
            }))
        },
    )
}

pub fn render_careers(careers: &FetchState<Vec<Career>>) -> Markup {
    let list = section(careers, "careers", |careers| {
        html! {
            ul class="listing" {
                @for career in careers {
                    @let meta: Vec<&str> = [
                        career.company.as_deref(),
                        career.location.as_deref(),
                        career.posted_at.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();
                    li {
                        strong { (career.title) }
                        @if !meta.is_empty() {
                            span class="meta" { (meta.join(" · ")) }
                        }
                        @if let Some(description) = &career.description {
                            p { (description) }
                        }
                        @if let Some(link) = career.link.as_deref().filter(|l| is_http_link(l)) {
                            a href=(link) { "Apply" }
                        }
                    }
                }
            }
        }
    });
    page(
        "Careers · AlumniLink",
        html! {
            header {
                h1 { "Careers" }
                p class="subtitle" { "Openings shared with our graduates." }
            }
            section class="card" { (list) }
        },
    )
}

pub fn render_events(events: &FetchState<Vec<ProgramEvent>>) -> Markup {
    let list = section(events, "events", |events| {
        html! {
            ul class="listing" {
                @for event in events {
                    li {
                        strong { (event.title) }
                        span class="meta" {
                            (event.date.as_deref().unwrap_or("N/A"))
                            " · "
                            (event.venue.as_deref().unwrap_or("N/A"))
                        }
                        @if let Some(description) = &event.description {
                            p { (description) }
                        }
                    }
                }
            }
        }
    });
    page(
        "Programs & events · AlumniLink",
        html! {
            header { h1 { "Programs & events" } }
            section class="card" { (list) }
        },
    )
}

pub fn render_dashboard(data: &DashboardData) -> Markup {
    let view = data.view();
    page(
        "Dashboard · AlumniLink",
        html! {
            header {
                h1 { "Alumni dashboard" }
                p class="subtitle" { "Generated " (Local::now().format("%Y-%m-%d %H:%M").to_string()) }
            }
            (filter_form(data, view.as_ref().map(|v| &v.regions)))

            @match &view {
                Some(view) => {
                    (summary_cards(&view.summary))
                    (card("Registrations: current vs previous", trend_table(&view.trend)))
                    (card(&region_title(&view.regions), region_chart(&view.regions)))
                    (card("Correlations", correlation_list(view)))
                }
                None => {
                    (card("Analytics", section(&data.analytics, "analytics", |_| html! {})))
                }
            }

            (card("Accounts", html! {
                div class="panel" {
                    (stat("Pending accounts", &count_value(&data.pending)))
                    (stat("Approved accounts", &count_value(&data.approved)))
                }
            }))
            (card("Unemployed alumni", section(&data.unemployed, "unemployed alumni", |alumni| unemployed_table(alumni))))
            form method="post" action="/logout" {
                button class="btn-secondary" type="submit" { "Sign out" }
            }
        },
    )
}

fn filter_form(data: &DashboardData, regions: Option<&RegionBreakdown>) -> Markup {
    let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    html! {
        form class="form inline" method="get" action="/admin" {
            label { "From " input type="date" name="from" value=(date(data.range.from)); }
            label { "To " input type="date" name="to" value=(date(data.range.to)); }
            label {
                "Job "
                select name="job" {
                    option value="" { "All jobs" }
                    @if let Some(regions) = regions {
                        @for job in &regions.jobs {
                            option value=(job) selected[data.filter.job.as_deref() == Some(job.as_str())] { (job) }
                        }
                    }
                }
            }
            label {
                "Year "
                select name="year" {
                    option value="" { "All years" }
                    @if let Some(regions) = regions {
                        @for year in &regions.years {
                            option value=(year) selected[data.filter.year == Some(*year)] { (year) }
                        }
                    }
                }
            }
            button class="btn-primary" type="submit" { "Apply" }
        }
    }
}

fn summary_cards(summary: &DashboardSummary) -> Markup {
    let count = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "N/A".to_string());
    html! {
        section class="panel" {
            (stat("Registrations", &summary.current_registrations.to_string()))
            (stat("vs previous", &format_pct(summary.registration_change_pct)))
            (stat("Unemployed", &summary.current_unemployed.to_string()))
            (stat("Employment rate", &format_pct(summary.employment_rate_pct)))
            (stat("Pending approval", &count(summary.pending_accounts)))
        }
    }
}

fn trend_table(trend: &[MergedMonthlyPoint]) -> Markup {
    if trend.is_empty() {
        return html! { p class="hint" { "No monthly data for this range." } };
    }
    let mut rows = trend.to_vec();
    calendar_order(&mut rows);

    let cell = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "—".to_string());
    html! {
        table {
            thead {
                tr {
                    th { "Month" }
                    th { "Registrations" }
                    th { "Prev. registrations" }
                    th { "Unemployed" }
                    th { "Prev. unemployed" }
                }
            }
            tbody {
                @for row in &rows {
                    tr {
                        td { (month_label(&row.month)) }
                        td { (cell(row.current_registrations)) }
                        td { (cell(row.previous_registrations)) }
                        td { (cell(row.current_unemployed)) }
                        td { (cell(row.previous_unemployed)) }
                    }
                }
            }
        }
    }
}

fn region_title(regions: &RegionBreakdown) -> String {
    match (&regions.filter.job, regions.filter.year) {
        (None, None) => "Employment by region (top 5 jobs)".to_string(),
        (Some(job), None) => format!("{job} by region"),
        (None, Some(year)) => format!("Employment by region, {year}"),
        (Some(job), Some(year)) => format!("{job} by region, {year}"),
    }
}

fn region_chart(regions: &RegionBreakdown) -> Markup {
    if regions.totals.is_empty() {
        return html! { p class="hint" { "No regional data matches this filter." } };
    }
    let max = regions.totals.iter().map(|r| r.total).max().unwrap_or(0).max(1);

    html! {
        div class="bars" {
            @for region in &regions.totals {
                @let width = region.total as f64 / max as f64 * 100.0;
                div class="bar-row" {
                    span class="bar-label" { (region.region) }
                    span class="bar" style=(format!("width: {width:.1}%")) {}
                    span class="bar-value" { (region.total) " (" (region.job_count) " jobs)" }
                }
                @if let Some(top) = regions.top_jobs.as_ref().and_then(|t| t.get(&region.region)) {
                    p class="meta" {
                        @for (i, job) in top.iter().enumerate() {
                            @if i > 0 { ", " }
                            (job.job) " (" (job.total) ")"
                        }
                    }
                }
            }
        }
    }
}

fn correlation_list(view: &AnalyticsView) -> Markup {
    if view.correlations.is_empty() {
        return html! { p class="hint" { "No correlation scores available." } };
    }
    html! {
        ul class="listing" {
            @for entry in &view.correlations {
                li {
                    strong { (entry.label) }
                    " " (format!("{:.2}", entry.score)) " "
                    span class="badge" style=(format!("background: {}", entry.color)) { (entry.strength_label) }
                }
            }
        }
    }
}

fn unemployed_table(alumni: &[AlumniRecord]) -> Markup {
    let na = |v: Option<&str>| v.unwrap_or("N/A").to_string();
    html! {
        table {
            thead {
                tr {
                    th { "Name" }
                    th { "Email" }
                    th { "Phone" }
                    th { "Batch" }
                    th {}
                }
            }
            tbody {
                @for alumnus in alumni {
                    tr {
                        td { (na(alumnus.name.as_deref())) }
                        td { (na(alumnus.email.as_deref())) }
                        td { (na(alumnus.phone.as_deref())) }
                        td { (na(alumnus.batch.as_deref())) }
                        td {
                            form method="post" action=(format!("/admin/accounts/{}/sms", sms_target(alumnus))) {
                                button class="btn-secondary" type="submit" { "Send SMS" }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// SMS goes to the linked account; records without one fall back to their own id.
fn sms_target(alumnus: &AlumniRecord) -> u64 {
    alumnus.account.as_ref().map_or(alumnus.id, |account| account.id)
}

fn count_value(state: &FetchState<u64>) -> String {
    match state {
        FetchState::Loaded(n) => n.to_string(),
        FetchState::Empty => "0".to_string(),
        FetchState::Idle | FetchState::Loading => "—".to_string(),
        FetchState::Failed(_) => "N/A".to_string(),
    }
}

/// Renders a loaded section, or the message for whichever state it is in.
fn section<T>(state: &FetchState<T>, what: &str, render: impl FnOnce(&T) -> Markup) -> Markup {
    match state {
        FetchState::Loaded(value) => render(value),
        FetchState::Idle => html! { p class="hint" { "Sign in to load this section." } },
        FetchState::Loading => html! { p class="hint" { "Loading…" } },
        FetchState::Empty => html! { p class="hint" { "No " (what) " yet." } },
        FetchState::Failed(err) => html! {
            p class="status" data-type="error" { "Could not load " (what) ": " (err.to_string()) }
        },
    }
}

fn stat(label: &str, value: &str) -> Markup {
    html! {
        div class="stat" {
            span class="label" { (label) }
            span class="value" { (value) }
        }
    }
}

fn card(title: &str, content: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            (content)
        }
    }
}

fn is_http_link(link: &str) -> bool {
    link.starts_with("https://") || link.starts_with("http://")
}

fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(STYLES)) }
            }
            body {
                main class="app" { (body) }
            }
        }
    }
}

const STYLES: &str = r#"
:root {
  --bg-1: #eef3f8;
  --ink: #1f2a37;
  --accent: #1d4ed8;
  --accent-2: #0f766e;
  --card: rgba(255, 255, 255, 0.92);
  --shadow: 0 24px 60px rgba(31, 42, 55, 0.12);
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  min-height: 100vh;
  background: linear-gradient(135deg, var(--bg-1), #f8fafc 60%);
  color: var(--ink);
  font-family: "Trebuchet MS", sans-serif;
  display: grid;
  place-items: start center;
  padding: 32px 18px 48px;
}

.app {
  width: min(1040px, 100%);
  display: grid;
  gap: 24px;
}

h1 {
  font-family: "Georgia", serif;
  font-size: clamp(2rem, 4vw, 2.6rem);
  margin: 0;
}

h2 {
  margin: 0 0 12px;
  font-size: 1.25rem;
}

.subtitle,
.hint,
.meta {
  margin: 0;
  color: #5b6675;
  font-size: 0.95rem;
}

.meta {
  display: block;
}

.panel {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(170px, 1fr));
  gap: 16px;
}

.card,
.stat {
  background: var(--card);
  border-radius: 18px;
  padding: 18px;
  border: 1px solid rgba(31, 42, 55, 0.08);
  box-shadow: var(--shadow);
}

.stat {
  display: grid;
  gap: 6px;
  color: inherit;
  text-decoration: none;
}

.stat .label {
  font-size: 0.8rem;
  text-transform: uppercase;
  letter-spacing: 0.12em;
  color: #7b8794;
}

.stat .value {
  font-size: 1.6rem;
  font-weight: 600;
  color: var(--accent-2);
}

.form {
  display: grid;
  gap: 12px;
}

.form.inline {
  grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
  align-items: end;
}

.form label {
  display: grid;
  gap: 4px;
  font-size: 0.9rem;
}

input,
select {
  padding: 8px 10px;
  border-radius: 10px;
  border: 1px solid rgba(31, 42, 55, 0.2);
  font: inherit;
}

button {
  appearance: none;
  border: none;
  border-radius: 999px;
  padding: 10px 18px;
  font-weight: 600;
  cursor: pointer;
}

.btn-primary {
  background: var(--accent);
  color: white;
}

.btn-secondary {
  background: rgba(31, 42, 55, 0.08);
  color: var(--ink);
}

table {
  width: 100%;
  border-collapse: collapse;
}

th,
td {
  text-align: left;
  padding: 8px;
  border-bottom: 1px solid rgba(31, 42, 55, 0.08);
}

.listing {
  list-style: none;
  padding: 0;
  margin: 0;
  display: grid;
  gap: 12px;
}

.bars {
  display: grid;
  gap: 10px;
}

.bar-row {
  display: grid;
  grid-template-columns: 160px 1fr 140px;
  align-items: center;
  gap: 10px;
}

.bar {
  display: block;
  height: 14px;
  border-radius: 999px;
  background: var(--accent);
}

.badge {
  border-radius: 999px;
  padding: 2px 10px;
  color: white;
  font-size: 0.8rem;
}

.status[data-type="error"] {
  color: #c63b2b;
}
"#;
