// client.rs
use std::time::Duration;

use rand::Rng;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::envelope::{parse_report_object, parse_reports_envelope};
use crate::api::ApiError;
use crate::db::connection::Database;
use crate::db::settings;
use crate::domain::normalize::resolve_image_ref;
use crate::domain::report::ServerStatus;
use crate::domain::status::StatusUpdate;

const DEFAULT_API_BASE: &str = "https://api.civicconnect.example/";

/// Fetches that hang past this leave the panel on fallback data instead
/// of a perpetual spinner.
const REQUEST_TIMEOUT_SECS: u64 = 8;

/// Attempts per list fetch before the caller falls back to cached data.
const DEFAULT_FETCH_ATTEMPTS: u64 = 3;

#[derive(Clone)]
pub struct ClientConfig {
    pub base: Url,
    pub timeout: Duration,
    pub fetch_attempts: u64,
}

impl ClientConfig {
    /// Reads `CIVIC_API_BASE`; falls back to the hosted API.
    pub fn from_env() -> Result<Self, ApiError> {
        let raw = std::env::var("CIVIC_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::with_base(&raw)
    }

    pub fn with_base(raw: &str) -> Result<Self, ApiError> {
        // A trailing slash keeps Url::join from eating the last path segment.
        let mut raw = raw.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw)
            .map_err(|e| ApiError::Config(format!("Invalid CIVIC_API_BASE '{raw}': {e}")))?;
        Ok(Self {
            base,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
        })
    }
}

// What actually crosses the wire for mutations.

#[derive(Serialize)]
struct StatusPayload<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
struct ImagesPayload<'a> {
    images: &'a [String],
}

/// Which slice of the working set to ask the server for.
#[derive(Debug, Default, Clone)]
pub struct ReportFilter {
    pub statuses: Vec<ServerStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ReportFilter {
    pub fn apply_to(&self, url: &mut Url) {
        if self.statuses.is_empty() && self.page.is_none() && self.limit.is_none() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if !self.statuses.is_empty() {
            let joined = self
                .statuses
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");
            pairs.append_pair("status", &joined);
        }
        if let Some(page) = self.page {
            pairs.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
    }
}

/// Blocking client for the CivicConnect reports API. Auth comes from the
/// settings store on every request so a login/logout takes effect without
/// rebuilding the client.
#[derive(Clone)]
pub struct ReportsClient {
    client: Client,
    base: Url,
    db: Database,
    fetch_attempts: u64,
}

impl ReportsClient {
    pub fn new(config: ClientConfig, db: Database) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base: config.base,
            db,
            fetch_attempts: config.fetch_attempts.max(1),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET /api/reports with retry. List fetches are safe to repeat, so
    /// transport failures get a couple of backoff attempts before the
    /// caller falls back to cached data.
    pub fn fetch_reports(&self, filter: &ReportFilter) -> Result<Vec<Value>, ApiError> {
        const MAX_BACKOFF_SECS: u64 = 6;
        const JITTER_MAX_SECS: u64 = 2;

        let mut last_err = None;

        for attempt in 1..=self.fetch_attempts {
            match self.try_fetch_reports(filter) {
                Ok(reports) => {
                    eprintln!("📄 Fetched {} reports (attempt {attempt})", reports.len());
                    return Ok(reports);
                }
                Err(e) if e.is_transport() && attempt < self.fetch_attempts => {
                    eprintln!("⚠️ Report fetch attempt {attempt} failed: {e}");
                    last_err = Some(e);

                    let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
                    std::thread::sleep(Duration::from_secs(base + jitter));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| ApiError::Network("fetch retry loop failed".into())))
    }

    fn try_fetch_reports(&self, filter: &ReportFilter) -> Result<Vec<Value>, ApiError> {
        let mut url = self.endpoint("api/reports")?;
        filter.apply_to(&mut url);

        let body = self.get_json(url)?;
        Ok(parse_reports_envelope(&body))
    }

    /// PATCH /api/reports/{id}/status. Returns the updated raw report for
    /// re-normalization.
    pub fn update_status(&self, report_id: &str, update: &StatusUpdate) -> Result<Value, ApiError> {
        let url = self.endpoint(&format!("api/reports/{report_id}/status"))?;

        let payload = StatusPayload {
            status: update.server_status.as_str(),
            comment: update.comment.as_deref(),
        };

        let request = self.client.patch(url).json(&payload);
        let body = self.send_json(request)?;

        parse_report_object(&body)
            .ok_or_else(|| ApiError::UnexpectedShape("status update returned no report".into()))
    }

    /// POST /api/reports/{id}/images with data-URL payloads. Returns the
    /// uploaded refs resolved to absolute URLs.
    pub fn upload_images(
        &self,
        report_id: &str,
        data_urls: &[String],
    ) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&format!("api/reports/{report_id}/images"))?;

        let request = self
            .client
            .post(url)
            .json(&ImagesPayload { images: data_urls });
        let body = self.send_json(request)?;

        let refs = body
            .get("images")
            .and_then(|v| v.as_array())
            .or_else(|| body.as_array())
            .ok_or_else(|| ApiError::UnexpectedShape("image upload returned no refs".into()))?;

        Ok(refs
            .iter()
            .filter_map(|r| resolve_image_ref(&self.base, r))
            .collect())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Config(format!("Bad endpoint path '{path}': {e}")))
    }

    fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        self.send_json(self.client.get(url))
    }

    fn send_json(&self, request: reqwest::blocking::RequestBuilder) -> Result<Value, ApiError> {
        let mut request = request;
        if let Ok(Some(token)) = settings::get_auth_token(&self.db) {
            request = request.bearer_auth(token);
        }

        let resp = request.send().map_err(classify_transport_error)?;

        let status = resp.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }

        let text = resp.text().map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(ApiError::Network(format!(
                "HTTP {status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::JsonParse(e.to_string()))
    }
}

fn classify_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_base_gets_a_trailing_slash() {
        let config = ClientConfig::with_base("https://api.example.com/v1").unwrap();
        assert_eq!(config.base.as_str(), "https://api.example.com/v1/");

        // join must append, not replace, the last segment
        assert_eq!(
            config.base.join("api/reports").unwrap().as_str(),
            "https://api.example.com/v1/api/reports"
        );
    }

    #[test]
    fn config_rejects_garbage_base() {
        assert!(ClientConfig::with_base("not a url").is_err());
    }

    #[test]
    fn filter_joins_statuses_with_commas() {
        let mut url = Url::parse("https://api.example.com/api/reports").unwrap();
        let filter = ReportFilter {
            statuses: vec![ServerStatus::Assigned, ServerStatus::InProgress],
            page: Some(2),
            limit: Some(50),
        };
        filter.apply_to(&mut url);

        assert_eq!(
            url.query(),
            Some("status=assigned%2Cin_progress&page=2&limit=50")
        );
    }

    #[test]
    fn status_payload_omits_absent_comment() {
        let payload = StatusPayload {
            status: "resolved",
            comment: None,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"status":"resolved"}"#
        );

        let payload = StatusPayload {
            status: "in_progress",
            comment: Some("Task paused"),
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"status":"in_progress","comment":"Task paused"}"#
        );
    }

    #[test]
    fn empty_filter_adds_no_query() {
        let mut url = Url::parse("https://api.example.com/api/reports").unwrap();
        ReportFilter::default().apply_to(&mut url);
        assert_eq!(url.query(), None);
    }
}
