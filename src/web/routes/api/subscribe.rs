use axum::{extract::State, Extension};
use tracing::info;

use crate::{
    model::RecordOutcome,
    web::{
        types::{ApiAck, SubscribeRequest, ValidEmail},
        WebResult,
    },
    AppState,
};

/// Records an email sign-up.
///
/// Rejects with `400 {"success": false, "error": "invalid_email"}` when no valid address could
/// be extracted. Otherwise responds `200 {"success": true}`, whether the address was new or
/// already subscribed; an existing record is left untouched. The outcome rides along in the
/// response extensions for the request log.
#[tracing::instrument(name = "Recording email sign-up", skip_all)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    request: SubscribeRequest,
) -> WebResult<(Extension<RecordOutcome>, ApiAck)> {
    let SubscribeRequest {
        candidate,
        user_agent_hint,
    } = request;

    let email = ValidEmail::from_candidate(candidate.as_deref())?;

    let outcome = app_state
        .model_mgr
        .record_subscriber(&email, user_agent_hint)
        .await?;

    match outcome {
        RecordOutcome::Created => info!("new subscriber recorded"),
        RecordOutcome::AlreadySubscribed => info!("already subscribed, nothing written"),
    }

    Ok((Extension(outcome), ApiAck::accepted()))
}
