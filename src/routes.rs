use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    error::{ActivityLogError, AppError},
    record::ActivityRecord,
    state::AppState,
    verify::{VerificationRequest, VerificationResult},
};

/// `{"query": .., "variables": {..}}` as posted by the UI's GraphQL client
#[derive(Debug, Default, Deserialize)]
pub struct GraphQlRequest {
    #[serde(default)]
    query: Option<Value>,
    #[serde(default)]
    variables: Option<Map<String, Value>>,
}

impl GraphQlRequest {
    /// lenient decode, anything unreadable is treated as an empty request
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn query(&self) -> String {
        self.query.as_ref().map(coerce).unwrap_or_default()
    }

    fn var(&self, key: &str) -> String {
        self.variables.as_ref()
            .and_then(|vars| vars.get(key))
            .map(coerce)
            .unwrap_or_default()
    }
}

/// render a JSON scalar as the string a caller meant by it
fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn graphql_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, AppError> {
    let request = GraphQlRequest::parse(&body);
    let query = request.query();

    if query.contains("verifyAddress") {
        let input = VerificationRequest {
            suburb: request.var("suburb"),
            postcode: request.var("postcode"),
            state: request.var("state"),
        };
        let result = state.reconciler
            .verify(&input)
            .await
            .map_err(|e| {
                error!("cannot verify address: {:?}", e);
                AppError::VerifyUpstream(e)
            })?;

        record_verification(state.clone(), input, result.clone());
        return Ok(Json(json!({ "data": { "verifyAddress": result } })).into_response());
    }

    if query.contains("searchLocations") {
        let text = request.var("q");
        let filter = request.var("state");
        let state_filter = Some(filter.as_str()).filter(|s| !s.is_empty());

        let localities = state.reconciler
            .search_localities(&text, state_filter)
            .await
            .map_err(|e| {
                error!("cannot search localities: {:?}", e);
                AppError::SearchUpstream(e)
            })?;

        info!("search [{}] returned [{}] localities", text, localities.len());
        return Ok(Json(json!({ "data": { "searchLocations": localities } })).into_response());
    }

    warn!("unknown query: {}", query);
    Err(AppError::UnknownQuery)
}

/// store the verification in the activity log without holding up the response
fn record_verification(state: Arc<AppState>, input: VerificationRequest, output: VerificationResult) {
    tokio::spawn(async move {
        let record = match ActivityRecord::from_verification(&input, &output) {
            Ok(record) => record,
            Err(e) => {
                error!("cannot build activity record: {:?}", e);
                return;
            }
        };
        if let Err(e) = state.activity.record(&record).await {
            warn!("cannot record verification activity: {:?}", e);
        }
    });
}

pub async fn recent_logs_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let hits = state.activity.recent().await.unwrap_or_else(|e| {
        warn!("cannot fetch recent activity: {:?}", e);
        Vec::new()
    });
    Json(json!({ "hits": hits }))
}

pub async fn record_log_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let doc = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    match state.activity.record(&doc).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            let reason = match e {
                ActivityLogError::Rejected { body, .. } => body,
                other => other.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false, "error": reason }))).into_response()
        }
    }
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
