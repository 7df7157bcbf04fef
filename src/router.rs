use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use astra::Request;

use crate::api::{sample, ApiError, ReportFilter, ReportsClient};
use crate::db::connection::Database;
use crate::db::pause_ledger::{PauseLedger, SqlitePauseLedger};
use crate::db::{photos, settings, snapshots};
use crate::domain::logic::status_counts;
use crate::domain::normalize::Normalizer;
use crate::domain::report::{Report, UiStatus};
use crate::domain::status;
use crate::domain::sync::WorkingSet;
use crate::errors::ServerError;
use crate::events::{EventBus, ReportStatusChanged};
use crate::responses::{html_response, redirect_response, ResultResp};
use crate::spreadsheets::export_reports_xlsx;
use crate::templates::pages::{
    citizen_page, detail_page, login_page, map_page, worker_page, CitizenVm, WorkerVm,
};

/// How long after an optimistic merge before the reconciling re-fetch.
const RECONCILE_DELAY_MS: u64 = 1500;

/// Everything a request handler needs. Cheap to clone: each field is a
/// handle.
#[derive(Clone)]
pub struct App {
    pub db: Database,
    pub client: ReportsClient,
    pub working: Arc<WorkingSet>,
    pub events: Arc<EventBus>,
    pub ledger: Arc<SqlitePauseLedger>,
    pub normalizer: Normalizer,
    /// Transitions performed this session, fed by an event bus subscriber.
    pub transitions: Arc<AtomicU64>,
}

impl App {
    pub fn new(db: Database, client: ReportsClient) -> Self {
        let ledger = Arc::new(SqlitePauseLedger::new(db.clone()));
        let normalizer = Normalizer::new(ledger.clone(), client.base().clone());

        Self {
            db,
            client,
            working: Arc::new(WorkingSet::new()),
            events: Arc::new(EventBus::new()),
            ledger,
            normalizer,
            transitions: Arc::new(AtomicU64::new(0)),
        }
    }
}

pub fn handle(mut req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => citizen_panel(app),
        ("GET", ["worker"]) => worker_panel(app, None),
        ("GET", ["worker", "export"]) => export_panel(app),
        ("GET", ["map"]) => map_view(app),
        ("GET", ["reports", id]) => report_detail(app, id),
        ("GET", ["login"]) => login_view(app, query.as_deref()),

        ("POST", ["worker", "reports", id, "status"]) => {
            let id = id.to_string();
            let form = parse_form_body(&mut req)?;
            update_report_status(app, &id, &form)
        }
        ("POST", ["reports", id, "photos"]) => {
            let id = id.to_string();
            upload_report_photos(app, &id)
        }
        ("POST", ["photos"]) => {
            let form = parse_form_body(&mut req)?;
            add_captured_photo(app, &form)
        }
        ("POST", ["refresh"]) => {
            let form = parse_form_body(&mut req)?;
            force_refresh(app, &form)
        }
        ("POST", ["login"]) => {
            let form = parse_form_body(&mut req)?;
            do_login(app, &form)
        }
        ("POST", ["logout"]) => do_logout(app),

        _ => Err(ServerError::NotFound),
    }
}

// ---------- panels ----------

fn citizen_panel(app: &App) -> ResultResp {
    let error = ensure_loaded(app)?;
    let reports = app.working.reports();
    let pending_photos = photos::list_photos(&app.db).unwrap_or_else(|e| {
        eprintln!("⚠️ Photo cache read failed: {e}");
        Vec::new()
    });

    html_response(citizen_page(&CitizenVm {
        reports,
        pending_photos,
        degraded: app.working.is_degraded(),
        error,
    }))
}

fn worker_panel(app: &App, error: Option<String>) -> ResultResp {
    let load_error = ensure_loaded(app)?;
    let reports = app.working.reports();
    let counts = status_counts(&reports);

    html_response(worker_page(&WorkerVm {
        reports,
        counts,
        degraded: app.working.is_degraded(),
        error: error.or(load_error),
        transitions: app.transitions.load(Ordering::SeqCst),
    }))
}

fn export_panel(app: &App) -> ResultResp {
    ensure_loaded(app)?;
    export_reports_xlsx(&app.working.reports())
}

fn map_view(app: &App) -> ResultResp {
    ensure_loaded(app)?;
    html_response(map_page(&app.working.reports(), app.working.is_degraded()))
}

fn report_detail(app: &App, id: &str) -> ResultResp {
    ensure_loaded(app)?;

    let report = match app.working.get(id) {
        Some(report) => report,
        None => {
            // Maybe it arrived since the last fetch.
            refresh_working_set(app)?;
            app.working.get(id).ok_or(ServerError::NotFound)?
        }
    };

    let pending = pending_photos_for(app, id)?;
    html_response(detail_page(&report, pending.len()))
}

fn login_view(app: &App, query: Option<&str>) -> ResultResp {
    let expired = query.map(|q| q.contains("expired=1")).unwrap_or(false);
    let has_token = settings::get_auth_token(&app.db)?.is_some();
    html_response(login_page(expired, has_token))
}

// ---------- actions ----------

fn update_report_status(app: &App, id: &str, form: &HashMap<String, String>) -> ResultResp {
    let requested = status::parse_intent(form.get("status").map(String::as_str).unwrap_or(""));
    let previous = app
        .working
        .get(id)
        .map(|r| r.status)
        .unwrap_or(UiStatus::Assigned);

    let mut update = status::to_server_status(requested, previous);
    if let Some(comment) = form.get("comment") {
        if !comment.trim().is_empty() {
            update.comment = Some(comment.trim().to_string());
        }
    }

    match app.client.update_status(id, &update) {
        Ok(raw) => {
            // Ledger bookkeeping mirrors what went upstream.
            if requested == UiStatus::Paused {
                app.ledger.mark_paused(id);
            } else if previous == UiStatus::Paused && requested == UiStatus::InProgress {
                app.ledger.clear_paused(id);
            }

            // The coerced fallback shows as in-progress locally too.
            let effective = match requested {
                UiStatus::Assigned => UiStatus::InProgress,
                other => other,
            };

            if !app.working.apply_status_update(id, effective) {
                eprintln!("⚠️ Updated report {id} is not in the working set");
            }
            if let Err(e) = snapshots::save_snapshots(&app.db, &[raw]) {
                eprintln!("⚠️ Snapshot save failed: {e}");
            }

            app.events.publish(&ReportStatusChanged {
                report_id: id.to_string(),
                status: effective,
            });

            schedule_reconcile(app);
            redirect_response("/worker")
        }
        Err(ApiError::Unauthorized) => handle_unauthorized(app),
        Err(e) => {
            eprintln!("⚠️ Status update for {id} failed: {e}");
            worker_panel(app, Some(format!("Could not update report: {e}")))
        }
    }
}

fn upload_report_photos(app: &App, id: &str) -> ResultResp {
    let pending = pending_photos_for(app, id)?;
    if pending.is_empty() {
        return redirect_response(&format!("/reports/{id}"));
    }

    let data_urls: Vec<String> = pending.iter().map(|p| p.data_url.clone()).collect();

    match app.client.upload_images(id, &data_urls) {
        Ok(urls) => {
            eprintln!("✅ Uploaded {} photo(s) to report {id}", urls.len());
            for photo in &pending {
                photos::remove_photo(&app.db, &photo.id)?;
            }
            schedule_reconcile(app);
            redirect_response(&format!("/reports/{id}"))
        }
        Err(ApiError::Unauthorized) => handle_unauthorized(app),
        Err(e) => Err(ServerError::ApiError(format!("photo upload failed: {e}"))),
    }
}

fn add_captured_photo(app: &App, form: &HashMap<String, String>) -> ResultResp {
    let data_url = form
        .get("data_url")
        .map(String::as_str)
        .unwrap_or("")
        .trim();
    if data_url.is_empty() {
        return Err(ServerError::BadRequest("missing photo data".into()));
    }

    let report_id = form
        .get("report_id")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    let id = photos::add_photo(&app.db, report_id, data_url)?;
    eprintln!("📷 Cached photo {}", &id[..12.min(id.len())]);
    redirect_response("/")
}

fn force_refresh(app: &App, form: &HashMap<String, String>) -> ResultResp {
    refresh_working_set(app)?;
    let back = form.get("back").map(String::as_str).unwrap_or("/");
    // Only ever bounce back to our own panels.
    let back = if back.starts_with('/') { back } else { "/" };
    redirect_response(back)
}

fn do_login(app: &App, form: &HashMap<String, String>) -> ResultResp {
    let token = form.get("token").map(String::as_str).unwrap_or("").trim();
    if token.is_empty() {
        return Err(ServerError::BadRequest("token must not be empty".into()));
    }

    settings::set_auth_token(&app.db, token)?;
    eprintln!("✅ Stored new API token");

    // Warm the working set with the new credentials.
    let background = app.clone();
    std::thread::spawn(move || {
        if let Err(e) = refresh_working_set(&background) {
            eprintln!("⚠️ Post-login fetch failed: {e}");
        }
    });

    redirect_response("/worker")
}

fn do_logout(app: &App) -> ResultResp {
    settings::clear_auth_token(&app.db)?;
    redirect_response("/login")
}

// ---------- fetch pipeline ----------

/// Fetch, snapshot, normalize, install. Transport failures degrade to the
/// snapshot cache, then to sample data; only auth failures surface as
/// errors.
pub fn refresh_working_set(app: &App) -> Result<(), ServerError> {
    let seq = app.working.begin_fetch();

    match app.client.fetch_reports(&ReportFilter::default()) {
        Ok(raws) => {
            if let Err(e) = snapshots::save_snapshots(&app.db, &raws) {
                eprintln!("⚠️ Snapshot save failed: {e}");
            }
            let reports = normalize_all(app, &raws);
            app.working.apply_fetch(seq, reports, false);
            Ok(())
        }
        Err(ApiError::Unauthorized) => {
            let _ = settings::clear_auth_token(&app.db);
            Err(ServerError::Unauthorized)
        }
        Err(e) if e.is_transport() => {
            eprintln!("⚠️ Report fetch failed, using fallback data: {e}");
            let mut raws = snapshots::load_snapshots(&app.db).unwrap_or_else(|e| {
                eprintln!("⚠️ Snapshot load failed: {e}");
                Vec::new()
            });
            if raws.is_empty() {
                raws = sample::sample_reports();
            }
            let reports = normalize_all(app, &raws);
            app.working.apply_fetch(seq, reports, true);
            Ok(())
        }
        Err(e) => Err(ServerError::ApiError(e.to_string())),
    }
}

/// First page view triggers the initial fetch. Non-auth load problems
/// come back as a banner message, not a failed response.
fn ensure_loaded(app: &App) -> Result<Option<String>, ServerError> {
    if app.working.is_loaded() {
        return Ok(None);
    }
    match refresh_working_set(app) {
        Ok(()) => Ok(None),
        Err(ServerError::Unauthorized) => Err(ServerError::Unauthorized),
        Err(e) => Ok(Some(format!("Could not load reports: {e}"))),
    }
}

fn normalize_all(app: &App, raws: &[serde_json::Value]) -> Vec<Report> {
    raws.iter()
        .map(|raw| app.normalizer.normalize(raw))
        .filter(|report| {
            if report.id.is_empty() {
                eprintln!("Skipping report with no id");
                false
            } else {
                true
            }
        })
        .collect()
}

/// The optimistic merge is provisional; the server stays the source of
/// truth, so a re-fetch runs shortly after every local mutation.
fn schedule_reconcile(app: &App) {
    let app = app.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(RECONCILE_DELAY_MS));
        eprintln!("🧵 Reconciling with server after local update");
        if let Err(e) = refresh_working_set(&app) {
            eprintln!("⚠️ Reconciling fetch failed: {e}");
        }
    });
}

fn handle_unauthorized(app: &App) -> ResultResp {
    let _ = settings::clear_auth_token(&app.db);
    Err(ServerError::Unauthorized)
}

fn pending_photos_for(app: &App, report_id: &str) -> Result<Vec<photos::CachedPhoto>, ServerError> {
    // Photos attached to this report, plus captures not yet assigned.
    let mut pending = photos::photos_for_report(&app.db, report_id)?;
    pending.extend(
        photos::list_photos(&app.db)?
            .into_iter()
            .filter(|p| p.report_id.is_none()),
    );
    Ok(pending)
}

// ---------- request parsing ----------

fn parse_form_body(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    use std::io::Read;

    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("failed to read body: {e}")))?;

    let body = String::from_utf8(buf)
        .map_err(|_| ServerError::BadRequest("body is not valid UTF-8".into()))?;

    Ok(parse_urlencoded(&body))
}

fn parse_urlencoded(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for pair in s.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
            map.insert(url_decode(k), url_decode(v));
        }
    }

    map
}

fn url_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut bytes = s.bytes();

    while let Some(b) = bytes.next() {
        match b {
            b'+' => out.push(' '),
            b'%' => {
                let hi = bytes.next();
                let lo = bytes.next();
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        let hex = [hi, lo];
                        match u8::from_str_radix(std::str::from_utf8(&hex).unwrap_or(""), 16) {
                            Ok(byte) => out.push(byte as char),
                            Err(_) => {
                                out.push('%');
                                out.push(hi as char);
                                out.push(lo as char);
                            }
                        }
                    }
                    _ => out.push('%'),
                }
            }
            other => out.push(other as char),
        }
    }

    out
}
