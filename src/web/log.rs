use axum::http::{Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use serde_with::skip_serializing_none;
use tracing::debug;

use super::error::ClientError;
use crate::{model::RecordOutcome, web::Error};

/// Everything the response mapper knows about a finished request.
pub struct RequestSummary<'a> {
    pub request_id: String,
    pub req_method: Method,
    pub uri: Uri,
    pub status_code: StatusCode,
    pub record_outcome: Option<RecordOutcome>,
    pub web_error: Option<&'a Error>,
    pub client_status_and_error: Option<(StatusCode, ClientError)>,
}

pub fn log_request(summary: RequestSummary<'_>) {
    let logline = LogLine::from(summary);
    debug!("LOGLINE: {}", json!(logline));
}

#[skip_serializing_none]
#[derive(Serialize)]
struct LogLine {
    timestamp: String,
    request_id: String,

    req_method: String,
    uri: String,
    status_code: u16,

    record_outcome: Option<String>,
    client_error_type: Option<String>,
    web_error_type: Option<String>,
}

impl From<RequestSummary<'_>> for LogLine {
    fn from(summary: RequestSummary<'_>) -> Self {
        let RequestSummary {
            request_id,
            req_method,
            uri,
            status_code,
            record_outcome,
            web_error,
            client_status_and_error,
        } = summary;

        let client_error_type = client_status_and_error
            .as_ref()
            .map(|(_, ce)| ce.as_ref().to_string());
        // A mapped error replaces the response, so its status is the one the client sees.
        let status_code = client_status_and_error
            .map(|(sc, _)| sc.as_u16())
            .unwrap_or(status_code.as_u16());

        LogLine {
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id,
            req_method: req_method.to_string(),
            uri: uri.to_string(),
            status_code,
            record_outcome: record_outcome.map(|o| o.as_ref().to_string()),
            client_error_type,
            web_error_type: web_error.map(|we| we.as_ref().to_string()),
        }
    }
}
