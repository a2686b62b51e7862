//! API route handlers.
//!
//! All endpoints speak JSON. State is shared via `Arc<ApiState>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, warn};
use uuid::Uuid;

use crate::extraction::{self, ExtractedFields, ExtractionError, FieldExtractor, Workbook};
use crate::report::ReportWriter;
use crate::storage::ValuationStore;
use crate::types::{AxiomaError, Company, ValuationInputs, ValuationRecord};
use crate::valuation::cache::CacheStats;
use crate::valuation::projection::WhatIf;
use crate::valuation::{ValuationAnalysis, Valuator};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ApiState {
    pub valuator: Mutex<Valuator>,
    pub store: RwLock<ValuationStore>,
    pub extractor: Box<dyn FieldExtractor>,
    pub reporter: Box<dyn ReportWriter>,
}

impl ApiState {
    pub fn new(
        valuator: Valuator,
        store: ValuationStore,
        extractor: Box<dyn FieldExtractor>,
        reporter: Box<dyn ReportWriter>,
    ) -> Self {
        Self {
            valuator: Mutex::new(valuator),
            store: RwLock::new(store),
            extractor,
            reporter,
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResponse {
    pub scenario: WhatIf,
    pub inputs: ValuationInputs,
    pub analysis: ValuationAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub markdown: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    pub workbook: Workbook,
    #[serde(default)]
    pub inputs: ValuationInputs,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub fields: ExtractedFields,
    pub inputs: ValuationInputs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub sector: Option<String>,
    pub cnpj: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error rendered as `{"error": "..."}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = match err.downcast_ref::<AxiomaError>() {
            Some(AxiomaError::CompanyNotFound(_)) | Some(AxiomaError::ValuationNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Some(AxiomaError::InvalidInput(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %format!("{err:#}"), "Request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        let status = match err {
            ExtractionError::NothingFound | ExtractionError::Malformed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ExtractionError::Service { .. } => {
                error!(error = %err, "Extraction failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn require_finite(inputs: &ValuationInputs) -> Result<(), ApiError> {
    if inputs.is_finite() {
        return Ok(());
    }
    warn!(inputs = %inputs, "Rejected non-finite valuation inputs");
    Err(AxiomaError::InvalidInput("all inputs must be finite numbers".into()).into())
}

impl From<AxiomaError> for ApiError {
    fn from(err: AxiomaError) -> Self {
        anyhow::Error::from(err).into()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/valuation
pub async fn post_valuation(
    State(state): State<AppState>,
    Json(inputs): Json<ValuationInputs>,
) -> Result<Json<ValuationAnalysis>, ApiError> {
    require_finite(&inputs)?;
    let mut valuator = state.valuator.lock().await;
    Ok(Json(valuator.analyze(&inputs)))
}

/// POST /api/scenarios/:name
pub async fn post_scenario(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(inputs): Json<ValuationInputs>,
) -> Result<Json<ScenarioResponse>, ApiError> {
    let scenario: WhatIf = name
        .parse()
        .map_err(|e: anyhow::Error| ApiError::new(StatusCode::NOT_FOUND, e.to_string()))?;
    require_finite(&inputs)?;

    let transformed = scenario.apply(&inputs);
    let analysis = state.valuator.lock().await.analyze(&transformed);
    Ok(Json(ScenarioResponse {
        scenario,
        inputs: transformed,
        analysis,
    }))
}

/// POST /api/report
pub async fn post_report(
    State(state): State<AppState>,
    Json(inputs): Json<ValuationInputs>,
) -> Result<Json<ReportResponse>, ApiError> {
    require_finite(&inputs)?;
    let result = state.valuator.lock().await.compute(&inputs);
    let markdown = state.reporter.write_report(&inputs, &result).await?;
    Ok(Json(ReportResponse { markdown }))
}

/// POST /api/extract
pub async fn post_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let (fields, inputs) =
        extraction::extract_into(&*state.extractor, &req.workbook, &req.inputs).await?;
    Ok(Json(ExtractResponse { fields, inputs }))
}

/// GET /api/companies
pub async fn list_companies(State(state): State<AppState>) -> Json<Vec<Company>> {
    let store = state.store.read().await;
    Json(store.list_companies())
}

/// POST /api/companies
pub async fn create_company(
    State(state): State<AppState>,
    Json(body): Json<NewCompany>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let mut store = state.store.write().await;
    let company = store.create_company(&body.name, body.sector.as_deref(), body.cnpj.as_deref())?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// DELETE /api/companies/:id
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.delete_company(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/companies/:id/valuations
pub async fn list_valuations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ValuationRecord>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.list_valuations(id)?))
}

/// POST /api/companies/:id/valuations
///
/// Results are always computed here; clients only send inputs.
pub async fn save_valuation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(inputs): Json<ValuationInputs>,
) -> Result<(StatusCode, Json<ValuationRecord>), ApiError> {
    require_finite(&inputs)?;
    let results = state.valuator.lock().await.compute(&inputs);
    if !results.is_finite() {
        warn!(inputs = %inputs, "Valuation overflowed, not saving");
        return Err(AxiomaError::InvalidInput("valuation result is not finite".into()).into());
    }
    let record = state.store.write().await.save_valuation(id, inputs, results)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/valuations/:id
pub async fn delete_valuation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.delete_valuation(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cache
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    let valuator = state.valuator.lock().await;
    Json(valuator.cache_stats())
}
