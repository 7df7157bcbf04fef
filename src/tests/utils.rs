use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::api::{ClientConfig, ReportsClient};
use crate::db::connection::{init_db, Database};
use crate::router::App;

/// Initialize a fresh test DB using the production schema.
pub fn init_test_db(tag: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "civic_test_{tag}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let db = Database::new(path.to_string_lossy().to_string());

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    db
}

/// App wired to an address nothing listens on: every API call fails fast,
/// which is exactly what the fallback paths under test need.
pub fn make_app(tag: &str) -> App {
    let db = init_test_db(tag);

    let mut config = ClientConfig::with_base("http://127.0.0.1:9").unwrap();
    config.fetch_attempts = 1;
    config.timeout = Duration::from_secs(1);

    let client = ReportsClient::new(config, db.clone()).expect("client");
    App::new(db, client)
}

pub fn request(method: &str, path: &str, body: &str) -> astra::Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(astra::Body::from(body.to_string()))
        .expect("failed to build test request")
}

pub fn body_string(resp: &mut astra::Response) -> String {
    use std::io::Read;

    let mut bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut bytes)
        .expect("failed to read response body");
    String::from_utf8(bytes).expect("response body was not UTF-8")
}

/// Install the built-in sample reports as the current working set, the
/// way a successful fetch would.
pub fn seed_with_samples(app: &App) {
    let raws = crate::api::sample::sample_reports();
    let reports: Vec<_> = raws.iter().map(|raw| app.normalizer.normalize(raw)).collect();

    let seq = app.working.begin_fetch();
    app.working.apply_fetch(seq, reports, false);
}
