//! HTTP routes: draws, submissions, catalog and system endpoints

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use prize_ledger::{
    AsyncSubmissionLedger, Registrant, Submission, SubmissionFilter, SubmissionRecord,
};
use prize_wheel::{DrawResult, PrizeSelector, Rotation, WheelLayout, SPIN_DURATION};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_scalar::{Scalar, Servable};

use crate::ledger::Ledger;

// =============================================================================
// App State
// =============================================================================

pub struct AppState {
    pub selector: PrizeSelector,
    pub wheel: WheelLayout,
    pub ledger: Ledger,
}

impl AppState {
    pub fn new(selector: PrizeSelector, ledger: Ledger) -> Self {
        let wheel = WheelLayout::new(selector.catalog());
        Self {
            selector,
            wheel,
            ledger,
        }
    }
}

// =============================================================================
// OpenAPI Schema
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Prize Wheel API",
        description = "Spin-to-win prize draws and registration logging",
        version = "0.1.0",
        license(name = "BSD-2-Clause"),
    ),
    paths(health, get_catalog, spin, submit, list_submissions, get_stats),
    components(schemas(
        HealthResponse,
        CatalogResponse,
        PrizeInfo,
        SegmentInfo,
        SpinResponse,
        WheelTarget,
        SubmitRequest,
        SubmitResponse,
        ErrorResponse,
        ListSubmissionsQuery,
        SubmissionInfo,
        ListSubmissionsResponse,
        StatsResponse,
        PrizeCountInfo,
    ))
)]
pub struct ApiDoc;

// =============================================================================
// Types
// =============================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeInfo {
    pub id: String,
    pub label: String,
    pub weight: f64,
    /// weight / total weight
    pub probability: f64,
    pub color: String,
    pub text_color: String,
    /// The two wheel segments showing this prize
    pub segments: Vec<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SegmentInfo {
    pub index: usize,
    pub label: String,
    pub color: String,
    pub text_color: String,
    /// Center angle in degrees
    pub angle: f64,
    /// Conic-gradient span in percent
    pub gradient_start: f64,
    pub gradient_end: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub total_weight: f64,
    pub min_revolutions: u32,
    pub spin_duration_ms: u64,
    pub prizes: Vec<PrizeInfo>,
    pub segments: Vec<SegmentInfo>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WheelTarget {
    /// Segment the pointer lands on
    pub segment: usize,
    /// Absolute rotation in degrees
    pub rotation: f64,
    /// Reveal the prize only after this many milliseconds
    pub duration_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpinResponse {
    pub success: bool,
    pub prize: String,
    pub code: String,
    pub wheel: WheelTarget,
}

/// Registration details plus the prize won
///
/// Every field is optional on the wire so missing ones can be reported
/// together. The original form keys are accepted as aliases.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "formacao")]
    pub has_degree: Option<String>,
    #[serde(alias = "area_atuacao")]
    pub operating_area: Option<String>,
    #[serde(alias = "area_atuacao_outro")]
    pub operating_area_other: Option<String>,
    #[serde(alias = "interesse_formacao")]
    pub training_interest: Option<String>,
    pub prize: Option<String>,
    pub code: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl SubmitRequest {
    /// Names of required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("has_degree", &self.has_degree),
            ("operating_area", &self.operating_area),
            ("training_interest", &self.training_interest),
            ("prize", &self.prize),
            ("code", &self.code),
        ]
        .into_iter()
        .filter(|(_, value)| !present(value))
        .map(|(field, _)| field)
        .collect()
    }

    /// Convert a complete request into a timestamped submission
    pub fn into_submission(self) -> Option<Submission> {
        let registrant = Registrant {
            name: self.name?,
            phone: self.phone?,
            email: self.email?,
            has_degree: self.has_degree?,
            operating_area: self.operating_area?,
            operating_area_other: self.operating_area_other.filter(|v| !v.trim().is_empty()),
            training_interest: self.training_interest?,
        };
        Some(Submission::new(registrant, self.prize?, self.code?))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ErrorResponse {
    fn reply(status: StatusCode, error: &str) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                error: error.to_string(),
                missing: Vec::new(),
            }),
        )
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListSubmissionsQuery {
    pub prize: Option<String>,
    #[param(default = 100, maximum = 1000)]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub has_degree: String,
    pub operating_area: String,
    pub operating_area_other: Option<String>,
    pub training_interest: String,
    pub prize: String,
    pub code: String,
    /// RFC 3339 timestamp
    pub recorded_at: String,
}

impl From<SubmissionRecord> for SubmissionInfo {
    fn from(record: SubmissionRecord) -> Self {
        let s = record.submission;
        let r = s.registrant;
        Self {
            id: record.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            has_degree: r.has_degree,
            operating_area: r.operating_area,
            operating_area_other: r.operating_area_other,
            training_interest: r.training_interest,
            prize: s.prize,
            code: s.code,
            recorded_at: s.recorded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListSubmissionsResponse {
    pub submissions: Vec<SubmissionInfo>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeCountInfo {
    pub prize: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub submissions: i64,
    pub by_prize: Vec<PrizeCountInfo>,
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "System"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[utoipa::path(
    get,
    path = "/catalog",
    responses((status = 200, description = "Prizes and wheel layout", body = CatalogResponse)),
    tag = "Wheel"
)]
async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let catalog = state.selector.catalog();

    let prizes = catalog
        .categories()
        .iter()
        .enumerate()
        .map(|(i, c)| PrizeInfo {
            id: c.id.clone(),
            label: c.label.clone(),
            weight: c.weight,
            probability: catalog.probability(i).unwrap_or_default(),
            color: c.color.clone(),
            text_color: c.text_color.clone(),
            segments: state.wheel.segment_pair(i).map(Vec::from).unwrap_or_default(),
        })
        .collect();

    let segments = state
        .wheel
        .segments()
        .iter()
        .map(|s| SegmentInfo {
            index: s.index,
            label: s.label.clone(),
            color: s.color.clone(),
            text_color: s.text_color.clone(),
            angle: s.angle,
            gradient_start: s.gradient_start,
            gradient_end: s.gradient_end,
        })
        .collect();

    Json(CatalogResponse {
        total_weight: catalog.total_weight(),
        min_revolutions: state.wheel.min_revolutions(),
        spin_duration_ms: SPIN_DURATION.as_millis() as u64,
        prizes,
        segments,
    })
}

/// OPTIONS handler returns the OpenAPI schema for API discovery
async fn options_schema() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// One draw plus its landing segment
fn draw_once(state: &AppState) -> (DrawResult, Rotation) {
    let mut rng = rand::thread_rng();
    let result = state.selector.draw(&mut rng);
    let rotation = state.wheel.rotation_for(result.index, &mut rng);
    (result, rotation)
}

#[utoipa::path(
    post,
    path = "/spin",
    responses(
        (status = 200, description = "Prize drawn", body = SpinResponse),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Draw failed", body = ErrorResponse)
    ),
    tag = "Wheel"
)]
async fn spin(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SpinResponse>, (StatusCode, Json<ErrorResponse>)> {
    // A draw cannot fail on a validated catalog; a panic still must not issue a code
    let (result, rotation) =
        std::panic::catch_unwind(AssertUnwindSafe(|| draw_once(&state))).map_err(|_| {
            tracing::error!("Draw panicked");
            ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to spin")
        })?;

    if rotation.fallback {
        tracing::warn!(
            prize = %result.category.label,
            "No segment mapping for prize, using default segments"
        );
    }
    tracing::info!(
        prize = %result.category.label,
        code = %result.code,
        segment = rotation.segment,
        "Prize drawn"
    );

    Ok(Json(SpinResponse {
        success: true,
        prize: result.category.label,
        code: result.code.into(),
        wheel: WheelTarget {
            segment: rotation.segment,
            rotation: rotation.degrees,
            duration_ms: SPIN_DURATION.as_millis() as u64,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/submit",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Submission logged", body = SubmitResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 500, description = "Ledger unavailable", body = ErrorResponse)
    ),
    tag = "Submissions"
)]
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<ErrorResponse>)> {
    let missing = req.missing_fields();
    if !missing.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing required fields".to_string(),
                missing: missing.into_iter().map(String::from).collect(),
            }),
        ));
    }

    let submission = req.into_submission().ok_or_else(|| {
        ErrorResponse::reply(StatusCode::BAD_REQUEST, "Missing required fields")
    })?;

    if let Err(e) = state.ledger.append(&submission).await {
        tracing::error!(
            error = %e,
            ledger = %state.ledger.describe(),
            prize = %submission.prize,
            code = %submission.code,
            "Failed to log submission"
        );
        return Err(ErrorResponse::reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to submit",
        ));
    }

    tracing::info!(prize = %submission.prize, code = %submission.code, "Submission logged");
    Ok(Json(SubmitResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/submissions",
    params(ListSubmissionsQuery),
    responses(
        (status = 200, description = "Recorded submissions, newest first", body = ListSubmissionsResponse),
        (status = 501, description = "Ledger cannot be read back", body = ErrorResponse)
    ),
    tag = "Submissions"
)]
async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<ListSubmissionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let limit = query.limit.unwrap_or(100).min(1000);
    let offset = query.offset.unwrap_or(0);

    let filter = SubmissionFilter {
        prize: query.prize,
        limit: Some(limit),
        offset: Some(offset),
    };

    let records = state
        .ledger
        .list(&filter)
        .await
        .ok_or_else(|| {
            ErrorResponse::reply(
                StatusCode::NOT_IMPLEMENTED,
                "Ledger does not support listing",
            )
        })?
        .map_err(|e| ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    Ok(Json(ListSubmissionsResponse {
        submissions: records.into_iter().map(SubmissionInfo::from).collect(),
        limit,
        offset,
    }))
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Submission statistics", body = StatsResponse),
        (status = 501, description = "Ledger cannot be read back", body = ErrorResponse)
    ),
    tag = "Submissions"
)]
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stats = state
        .ledger
        .stats()
        .await
        .ok_or_else(|| {
            ErrorResponse::reply(
                StatusCode::NOT_IMPLEMENTED,
                "Ledger does not support statistics",
            )
        })?
        .map_err(|e| ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;

    Ok(Json(StatsResponse {
        submissions: stats.total,
        by_prize: stats
            .by_prize
            .into_iter()
            .map(|p| PrizeCountInfo {
                prize: p.prize,
                count: p.count,
            })
            .collect(),
    }))
}

// =============================================================================
// Router
// =============================================================================

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/catalog", get(get_catalog))
        .route("/spin", post(spin))
        .route("/submit", post(submit))
        .route("/submissions", get(list_submissions))
        .route("/stats", get(get_stats))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state)
        .layer(cors);

    // Root OPTIONS returns the OpenAPI schema, outside the CORS layer
    Router::new()
        .route("/", axum::routing::options(options_schema))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> SubmitRequest {
        SubmitRequest {
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            phone: Some("62981624758".into()),
            has_degree: Some("Sim".into()),
            operating_area: Some("Produção".into()),
            operating_area_other: Some("  ".into()),
            training_interest: Some("Graduação".into()),
            prize: Some("E-book Digital Exclusive".into()),
            code: Some("123456".into()),
        }
    }

    #[test]
    fn test_missing_fields() {
        assert!(complete_request().missing_fields().is_empty());

        let req = SubmitRequest {
            email: None,
            code: Some("   ".into()),
            ..complete_request()
        };
        assert_eq!(req.missing_fields(), vec!["email", "code"]);
        assert_eq!(SubmitRequest::default().missing_fields().len(), 8);
    }

    #[test]
    fn test_other_area_is_not_required() {
        let req = SubmitRequest {
            operating_area_other: None,
            ..complete_request()
        };
        assert!(req.missing_fields().is_empty());
    }

    #[test]
    fn test_into_submission_drops_blank_other_area() {
        let submission = complete_request().into_submission().unwrap();
        assert_eq!(submission.registrant.operating_area_other, None);
        assert_eq!(submission.code, "123456");
    }

    #[test]
    fn test_openapi_lists_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/catalog", "/spin", "/submit", "/submissions", "/stats"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
