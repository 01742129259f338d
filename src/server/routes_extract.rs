use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::path::PathBuf;

use super::AppContext;
use crate::batch::Orchestrator;
use crate::report::TranscriptReporter;

pub fn extract_routes() -> Router<AppContext> {
    Router::new().route("/extract", get(extract_get).post(extract_post))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractParams {
    pub path: Option<String>,
}

async fn extract_get(
    State(ctx): State<AppContext>,
    Query(params): Query<ExtractParams>,
) -> Response {
    process_request(&ctx, params.path).await
}

async fn extract_post(State(ctx): State<AppContext>, body: Bytes) -> Response {
    tracing::debug!("POST /extract body: {}", String::from_utf8_lossy(&body));

    let params: ExtractParams = match serde_json::from_slice(&body) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("Rejecting POST /extract: {}", e);
            return text(StatusCode::BAD_REQUEST, "Error: Invalid JSON in request body.");
        }
    };

    process_request(&ctx, params.path).await
}

async fn process_request(ctx: &AppContext, path: Option<String>) -> Response {
    let Some(raw) = path.filter(|p| !p.is_empty()) else {
        return text(
            StatusCode::BAD_REQUEST,
            "Error: 'path' parameter is required in the URL query or JSON body.",
        );
    };

    let target = PathBuf::from(&raw);
    if !target.exists() {
        return text(
            StatusCode::BAD_REQUEST,
            format!("Error: The specified path does not exist: '{}'", raw),
        );
    }

    tracing::info!("Extraction requested for {:?}", target);

    let engine = match ctx.engine.engine() {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("{}", e);
            return text(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process '{}'.\n\n--- ERROR ---\n{}\n", raw, e),
            );
        }
    };

    let transcript = TranscriptReporter::new();
    let result = Orchestrator::new(engine)
        .with_jobs(ctx.jobs)
        .with_timeout(ctx.decode_timeout)
        .with_cancellation(ctx.shutdown.child_token())
        .with_claimed(ctx.claimed.clone())
        .run(&target, &transcript)
        .await;

    match result {
        Ok(_) => text(
            StatusCode::OK,
            format!(
                "Successfully processed '{}'.\n\n--- OUTPUT ---\n{}",
                raw,
                transcript.text()
            ),
        ),
        Err(e) => {
            tracing::error!("{}", e);
            text(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Failed to process '{}'.\n\n--- ERROR ---\n{}\n\n--- OUTPUT ---\n{}",
                    raw,
                    e,
                    transcript.text()
                ),
            )
        }
    }
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}
