use std::sync::Arc;

use axum::{
    http::{HeaderMap, Method, Uri},
    response::Response,
};
use uuid::Uuid;

use crate::{
    model::RecordOutcome,
    web::{
        log::{self, RequestSummary},
        types::ApiAck,
        Error, REQUEST_ID_HEADER,
    },
};

/// Turns a `web::Error` stashed in the response extensions into the client facing
/// acknowledgment (`{"success": false, "error": "<kind>"}`) and logs the request.
/// Responses without an error pass through untouched.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    headers: HeaderMap,
    resp: Response,
) -> Response {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| er.as_ref());
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    if let (Some(er), Some((status, _))) = (web_error, &client_status_and_error) {
        if status.is_server_error() {
            tracing::error!("SERVER ERROR: {er} ID: {request_id}");
        }
    }

    let err_resp = client_status_and_error
        .as_ref()
        .map(|(status, cl_err)| ApiAck::rejected(cl_err).into_response_with(*status));

    log::log_request(RequestSummary {
        request_id,
        req_method,
        uri,
        status_code: resp.status(),
        record_outcome: resp.extensions().get::<RecordOutcome>().copied(),
        web_error,
        client_status_and_error,
    });

    err_resp.unwrap_or(resp)
}
