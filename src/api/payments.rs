//! Payment endpoints and reconciliation summaries.

use crate::{
    api::{AppState, error::ApiResult, extract::{ApiJson, ApiPath}, projects::visible_project},
    core::{
        access::Actor,
        payment::{self as payment_core, PaymentSummary},
        project as project_core, stage as stage_core,
    },
    entities::{PaymentStatus, payment, stage},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: PaymentStatus,
}

#[derive(Debug, Serialize)]
struct StageSummary {
    stage: stage::Model,
    #[serde(flatten)]
    summary: PaymentSummary,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects/:id/payments",
            get(list_payments).post(record_payment),
        )
        .route("/api/projects/:id/payment-summary", get(project_summary))
        .route("/api/stages/:id/payment-summary", get(stage_summary))
        .route("/api/payments/:id/status", put(review_payment))
}

async fn list_payments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<payment::Model>>> {
    visible_project(&state.db, &actor, project_id).await?;
    Ok(Json(
        payment_core::list_project_payments(&state.db, project_id).await?,
    ))
}

async fn record_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(input): ApiJson<payment_core::NewPayment>,
) -> ApiResult<(StatusCode, Json<payment::Model>)> {
    let project = project_core::get_project(&state.db, project_id).await?;
    actor.ensure_can_record_payment(&project)?;
    let payment =
        payment_core::record_payment(&state.db, project_id, actor.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn review_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(payment_id): ApiPath<i64>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<payment::Model>> {
    let payment = payment_core::get_payment(&state.db, payment_id).await?;
    let project = project_core::get_project(&state.db, payment.project_id).await?;
    actor.ensure_can_review_payment(&project)?;
    Ok(Json(
        payment_core::set_payment_status(&state.db, payment_id, req.status).await?,
    ))
}

async fn project_summary(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<PaymentSummary>> {
    visible_project(&state.db, &actor, project_id).await?;
    Ok(Json(
        payment_core::project_payment_summary(&state.db, project_id).await?,
    ))
}

async fn stage_summary(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(stage_id): ApiPath<i64>,
) -> ApiResult<Json<StageSummary>> {
    let stage = stage_core::get_stage(&state.db, stage_id).await?;
    visible_project(&state.db, &actor, stage.project_id).await?;
    let (stage, summary) = payment_core::stage_payment_summary(&state.db, stage_id).await?;
    Ok(Json(StageSummary { stage, summary }))
}
