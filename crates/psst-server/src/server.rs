/// HTTP surface of the service.
///
/// Request validation lives here, at the boundary: a missing required field
/// is rejected with 400 and an unknown industry code with 404 before any
/// external call is made. Handlers return `Result<_, AppError>`; the error
/// type owns the status/code/message mapping.
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::export::{self, HwpClient};
use crate::gate::{self, AccessGate};
use crate::generate::{Generator, Tunables};
use crate::ksic::ReferenceData;
use crate::model::{Grade, PsstDocument};
use crate::parse;
use crate::schedule::ScheduleBook;

const MSG_MISSING_FIELDS: &str = "업종코드와 사용자 아이디어가 필요합니다.";
const MSG_MISSING_CODE: &str = "업종코드가 필요합니다.";
const MSG_MISSING_DOCUMENT: &str = "PSST 문서가 필요합니다.";
const MSG_UNKNOWN_CODE: &str = "해당 업종 데이터를 찾을 수 없습니다.";
const MSG_NO_CANNED_DRAFT: &str = "해당 업종의 PSST 초안이 없습니다.";
const MSG_PAYMENT_FAILED: &str = "결제가 취소되었거나 실패했습니다.";

pub struct AppState {
    pub config: Config,
    pub reference: ReferenceData,
    pub schedule: ScheduleBook,
    pub gate: AccessGate,
    pub generator: Generator,
    pub hwp: HwpClient,
}

pub type SharedState = Arc<AppState>;

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/psst/generate", post(generate_psst))
        .route("/api/ksic/{code}", get(industry_info))
        .route("/api/psst/{code}", get(canned_psst))
        .route("/api/schedule/{year}", get(schedule_for_year))
        .route("/api/export/markdown", post(export_markdown))
        .route("/api/hwp/generate", post(export_hwp))
        .route("/api/payment/checkout", post(payment_checkout))
        .route("/payment/success", get(payment_success))
        .route("/payment/fail", get(payment_fail))
        .with_state(state)
}

// ── PSST 생성 ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateParams {
    #[serde(default)]
    ksic_code: String,
    #[serde(default)]
    user_idea: String,
    additional_keywords: Option<String>,
    score_factors: Option<String>,
    differentiation_point: Option<String>,
}

fn validate_generate(params: &GenerateParams) -> Result<(String, String), AppError> {
    let code = params.ksic_code.trim();
    let idea = params.user_idea.trim();
    if code.is_empty() || idea.is_empty() {
        return Err(AppError::Validation(MSG_MISSING_FIELDS.to_string()));
    }
    Ok((code.to_string(), idea.to_string()))
}

fn generation_notice(model: &str) -> String {
    format!(
        "본 초안은 나랏돈네비 AI 기술({model})을 활용하여 작성되었습니다.\n{}",
        crate::prompt::AI_DISCLOSURE_REGULATION
    )
}

/// POST /api/psst/generate
async fn generate_psst(
    State(state): State<SharedState>,
    Json(params): Json<GenerateParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (code, idea) = validate_generate(&params)?;
    let record = state
        .reference
        .get(&code)
        .ok_or_else(|| AppError::NotFound(MSG_UNKNOWN_CODE.to_string()))?;

    let tunables = Tunables {
        additional_keywords: params.additional_keywords,
        score_factors: params.score_factors,
        differentiation_point: params.differentiation_point,
    };
    let document = state.generator.generate(record, &idea, &tunables).await?;

    Ok(Json(json!({
        "success": true,
        "data": document,
        "notice": generation_notice(state.generator.model()),
        "metadata": {
            "ksicCode": record.code,
            "industryName": record.name,
            "grade": record.grade,
            "generatedAt": document.metadata.created_at,
        },
    })))
}

// ── 업종 진단 / 초안 조회 ───────────────────────────────────────────

/// GET /api/ksic/{code}
async fn industry_info(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = state
        .reference
        .get(code.trim())
        .ok_or_else(|| AppError::NotFound(MSG_UNKNOWN_CODE.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "code": record.code,
            "name": record.name,
            "grade": record.grade,
            "maxAmount": record.max_amount,
            "solution": record.solution,
            "hasPsst": record.psst.is_some(),
        },
    })))
}

/// GET /api/psst/{code}
///
/// The gate decision is part of the payload, not the error taxonomy: an
/// unpaid code gets the locked view, mirroring the original UI.
async fn canned_psst(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let record = state
        .reference
        .get(code.trim())
        .ok_or_else(|| AppError::NotFound(MSG_UNKNOWN_CODE.to_string()))?;
    let canned = record
        .psst
        .as_ref()
        .ok_or_else(|| AppError::NotFound(MSG_NO_CANNED_DRAFT.to_string()))?;

    if !state.gate.is_paid(&record.code) {
        return Ok(Json(json!({
            "success": true,
            "locked": true,
            "amount": gate::PAYMENT_AMOUNT_KRW,
            "orderName": gate::ORDER_NAME,
        })));
    }

    let document = parse::upgrade_canned(canned, record, Utc::now());
    Ok(Json(json!({
        "success": true,
        "locked": false,
        "document": document,
    })))
}

// ── 일정 조회 ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    grade: Option<Grade>,
}

/// GET /api/schedule/{year}?grade=B
async fn schedule_for_year(
    State(state): State<SharedState>,
    Path(year): Path<i32>,
    Query(query): Query<ScheduleQuery>,
) -> Json<serde_json::Value> {
    let entries = state.schedule.query(year, query.grade);
    Json(json!({
        "success": true,
        "year": year,
        "count": entries.len(),
        "schedules": entries,
    }))
}

// ── 문서 내보내기 ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DocumentParams {
    document: Option<PsstDocument>,
}

/// POST /api/export/markdown
async fn export_markdown(Json(params): Json<DocumentParams>) -> Result<Response, AppError> {
    let document = params
        .document
        .ok_or_else(|| AppError::Validation(MSG_MISSING_DOCUMENT.to_string()))?;
    let markdown = export::render_markdown(&document);
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    )
        .into_response())
}

/// POST /api/hwp/generate — proxy to the conversion backend, binary back.
async fn export_hwp(
    State(state): State<SharedState>,
    Json(params): Json<DocumentParams>,
) -> Result<Response, AppError> {
    let document = params
        .document
        .ok_or_else(|| AppError::Validation(MSG_MISSING_DOCUMENT.to_string()))?;

    let bytes = state.hwp.generate(&document).await.map_err(AppError::from)?;
    let filename = export::attachment_filename(&document.metadata.industry_name, Utc::now());
    info!(filename = %filename, bytes = bytes.len(), "hwp conversion complete");

    Ok((
        [
            (header::CONTENT_TYPE, export::HWP_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                export::content_disposition(&filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ── 결제 ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutParams {
    #[serde(default)]
    ksic_code: String,
}

fn checkout_urls(base: &str, code: &str) -> (String, String) {
    (
        format!("{base}/payment/success?code={code}"),
        format!("{base}/payment/fail?code={code}"),
    )
}

/// POST /api/payment/checkout
///
/// Describes the outbound gateway redirect for the client: the gateway
/// appends `orderId` to the success URL on its way back. The gate itself is
/// only updated by the success callback.
async fn payment_checkout(
    State(state): State<SharedState>,
    Json(params): Json<CheckoutParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let code = params.ksic_code.trim();
    if code.is_empty() {
        return Err(AppError::Validation(MSG_MISSING_CODE.to_string()));
    }
    let record = state
        .reference
        .get(code)
        .ok_or_else(|| AppError::NotFound(MSG_UNKNOWN_CODE.to_string()))?;

    let order_id = gate::new_order_id(&record.code, Utc::now());
    let (success_url, fail_url) = checkout_urls(&state.config.public_base_url, &record.code);

    Ok(Json(json!({
        "success": true,
        "orderId": order_id,
        "amount": gate::PAYMENT_AMOUNT_KRW,
        "orderName": gate::ORDER_NAME,
        "successUrl": format!("{success_url}&orderId={order_id}"),
        "failUrl": fail_url,
    })))
}

#[derive(Debug, Deserialize)]
struct PaymentSuccessQuery {
    #[serde(default)]
    code: String,
    #[serde(default, rename = "orderId")]
    order_id: String,
    idea: Option<String>,
}

/// GET /payment/success — gateway redirect back after a confirmed payment.
/// The gate is updated only on a non-empty orderId.
async fn payment_success(
    State(state): State<SharedState>,
    Query(query): Query<PaymentSuccessQuery>,
) -> Response {
    let code = query.code.trim();
    let order_id = query.order_id.trim();

    if code.is_empty() || order_id.is_empty() {
        warn!(code, "payment success callback without confirmation, not unlocking");
        return Redirect::to(&format!("/payment/fail?code={code}")).into_response();
    }

    if !state.gate.record_payment(code, order_id) {
        // Storage refused the write; the user still paid, so continue to the
        // report — the gate will simply show locked until storage recovers.
        warn!(code, order_id, "payment recorded at gateway but local gate write failed");
    } else {
        info!(code, order_id, "payment recorded");
    }

    let mut target = format!("/report/view?code={code}&orderId={order_id}");
    if let Some(idea) = query.idea.as_deref().filter(|i| !i.trim().is_empty()) {
        target.push_str(&format!("&idea={}", export::percent_encode(idea)));
    }
    Redirect::to(&target).into_response()
}

#[derive(Debug, Deserialize)]
struct PaymentFailQuery {
    code: Option<String>,
    message: Option<String>,
}

/// GET /payment/fail — short message plus the way back, no automatic retry.
async fn payment_fail(Query(query): Query<PaymentFailQuery>) -> Json<serde_json::Value> {
    info!(
        code = query.code.as_deref().unwrap_or(""),
        "payment failure callback"
    );
    Json(json!({
        "success": false,
        "code": query.code,
        "message": query.message.unwrap_or_else(|| MSG_PAYMENT_FAILED.to_string()),
        "returnTo": "/diagnosis",
    }))
}
