//! Mock collaborators for integration testing.
//!
//! Deterministic `FieldExtractor` and `ReportWriter` implementations that
//! record their calls, so the API can be exercised without real document
//! parsing or report generation.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use axioma::api::build_router;
use axioma::api::routes::{ApiState, AppState};
use axioma::extraction::{
    extract_into, Confidence, ExtractedFields, ExtractionError, FieldExtractor, Workbook,
};
use axioma::report::ReportWriter;
use axioma::storage::ValuationStore;
use axioma::types::{ValuationInputs, ValuationResult};
use axioma::valuation::Valuator;

/// An extractor returning preset fields.
pub struct MockExtractor {
    fields: ExtractedFields,
    calls: Arc<Mutex<usize>>,
    /// If set, every call fails with a service error carrying this message.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockExtractor {
    pub fn new(fields: ExtractedFields) -> Self {
        Self {
            fields,
            calls: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> Arc<Mutex<usize>> {
        self.calls.clone()
    }
}

#[async_trait]
impl FieldExtractor for MockExtractor {
    async fn extract(&self, _workbook: &Workbook) -> Result<ExtractedFields, ExtractionError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(ExtractionError::Service {
                service: "mock".to_string(),
                message: msg,
            });
        }
        Ok(self.fields.clone())
    }
}

/// A report writer that echoes the enterprise value, or fails on demand.
pub struct MockReporter {
    fail: bool,
    seen: Arc<Mutex<Vec<ValuationResult>>>,
}

impl MockReporter {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ReportWriter for MockReporter {
    async fn write_report(
        &self,
        _inputs: &ValuationInputs,
        result: &ValuationResult,
    ) -> Result<String> {
        self.seen.lock().unwrap().push(*result);
        if self.fail {
            return Err(anyhow!("report service unavailable"));
        }
        Ok(format!("EV={:.0}", result.enterprise_value))
    }
}

fn make_fields() -> ExtractedFields {
    ExtractedFields {
        ebitda: Some(600_000.0),
        growth_rate: Some(18.0),
        confidence: Confidence::High,
        fields_found: vec!["ebitda".to_string(), "growthRate".to_string()],
        ..ExtractedFields::empty()
    }
}

fn make_state(extractor: MockExtractor, reporter: MockReporter) -> AppState {
    let path = std::env::temp_dir().join(format!("axioma_mock_{}.json", uuid::Uuid::new_v4()));
    Arc::new(ApiState::new(
        Valuator::default(),
        ValuationStore::open(path).unwrap(),
        Box::new(extractor),
        Box::new(reporter),
    ))
}

async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// -- Extraction ---------------------------------------------------------------

#[tokio::test]
async fn test_extract_into_with_mock() {
    let extractor = MockExtractor::new(make_fields());
    let calls = extractor.calls();
    let (fields, merged) = extract_into(&extractor, &Workbook::default(), &ValuationInputs::default())
        .await
        .unwrap();

    assert_eq!(fields.confidence, Confidence::High);
    assert_eq!(merged.monthly_ebitda, 50_000.0);
    assert_eq!(merged.annual_growth, 18.0);
    assert_eq!(merged.owner_dependency, 90.0);
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_extract_route_uses_configured_extractor() {
    let extractor = MockExtractor::new(make_fields());
    let calls = extractor.calls();
    let state = make_state(extractor, MockReporter::new(false));

    let (status, body) = post(&state, "/api/extract", json!({ "workbook": { "sheets": [] } })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inputs"]["monthlyEbitda"], 50_000.0);
    assert_eq!(body["fields"]["confidence"], "high");
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_extractor_service_error_is_500() {
    let extractor = MockExtractor::new(make_fields());
    extractor.set_error("quota exceeded");
    let state = make_state(extractor, MockReporter::new(false));

    let (status, body) = post(&state, "/api/extract", json!({ "workbook": { "sheets": [] } })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("quota exceeded"));
}

// -- Reporting ----------------------------------------------------------------

#[tokio::test]
async fn test_report_route_passes_engine_result() {
    let reporter = MockReporter::new(false);
    let seen = reporter.seen.clone();
    let state = make_state(MockExtractor::new(make_fields()), reporter);

    let inputs = ValuationInputs {
        monthly_ebitda: 10_000.0,
        owner_dependency: 0.0,
        governance_score: 5.0,
        annual_growth: 5.0,
        ..ValuationInputs::default()
    };
    let (status, body) = post(&state, "/api/report", serde_json::to_value(inputs).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["markdown"], "EV=480000");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].base_value, 480_000.0);
}

#[tokio::test]
async fn test_report_failure_is_500() {
    let state = make_state(MockExtractor::new(make_fields()), MockReporter::new(true));
    let (status, body) = post(
        &state,
        "/api/report",
        serde_json::to_value(ValuationInputs::default()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "report service unavailable");
}
