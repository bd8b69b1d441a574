//! HTTP routes for the gateway

use std::any::Any;
use std::sync::Arc;
use axum::{
  extract::{rejection::JsonRejection, FromRequest, State},
  http::StatusCode,
  response::{IntoResponse, Json, Response},
  routing::{get, post},
  Router,
};
use chrono::Utc;
use log::{debug, error, warn};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use crate::client::Orchestrator;
use crate::error::Error;
use crate::providers::CompletionBackend;
use crate::registry::TemplateRegistry;
use crate::request::{
  BatchResponse, ContentBatchItem, ContentRequest, ContentResponse
, ErrorResponse, HealthResponse, RephraseBatchItem, RephraseRequest
, RephraseResponse
};
use crate::{ContentType, Length, Style, Tone};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared per-process state.
/// Transformation handlers take their body as `Result` so a missing
/// backend is reported as 503 before the body is looked at.
/// `orchestrator` is `None` when no provider credential is configured.
#[derive(Clone)]
pub struct AppState
{   registry: Arc<TemplateRegistry>
  , orchestrator: Option<Orchestrator>
}

impl AppState
{   pub fn new(
      registry: Arc<TemplateRegistry>
    , backend: Option<Arc<dyn CompletionBackend>>
    ) -> Self
    {   if backend.is_none()
        {   warn!("No completion backend; transformation endpoints will return 503");
        }
        let orchestrator = backend
          .map(|b| Orchestrator::new(registry.clone(), b));
        AppState
        {   registry
          , orchestrator
        }
    }

    pub fn is_available(&self) -> bool
    {   self.orchestrator.is_some()
    }

    fn orchestrator(&self) -> Result<&Orchestrator, Error>
    {   self.orchestrator.as_ref().ok_or(Error::ServiceUnavailable)
    }
}

/// JSON body extractor that reports bad bodies as 400
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for Error
{   fn from(rejection: JsonRejection) -> Self
    {   Error::InvalidRequest(rejection.body_text())
    }
}

impl Error
{   pub fn status_code(&self) -> StatusCode
    {   match self
        {   Error::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE
          , e if e.is_client_error() => StatusCode::BAD_REQUEST
          , _ => StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for Error
{   fn into_response(self) -> Response
    {   let status = self.status_code();
        if status.is_server_error()
        {   error!("Request failed ({}): {}", status, self);
        } else
        {   warn!("Request rejected ({}): {}", status, self);
        }
        let body = ErrorResponse
        {   error: self.to_string()
          , status_code: status.as_u16()
          , timestamp: Utc::now()
        };
        (status, Json(body)).into_response()
    }
}

/// Catch-all for panics inside handlers; never leaks the payload
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response
{   let detail = payload
      .downcast_ref::<String>()
      .map(String::as_str)
      .or_else(|| payload.downcast_ref::<&str>().copied())
      .unwrap_or("unknown panic");
    error!("Unhandled exception: {}", detail);

    let body = json!({
      "error": "Internal server error",
      "message": "An unexpected error occurred",
      "timestamp": Utc::now(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Build the gateway router
pub fn router(state: AppState) -> Router
{   Router::new()
      .route("/health", get(health))
      .route("/rephrase", post(rephrase))
      .route("/rephrase/batch", post(rephrase_batch))
      .route("/generate-content", post(generate_content))
      .route("/generate-content/batch", post(generate_content_batch))
      .route("/styles", get(styles))
      .route("/content-types", get(content_types))
      .route("/tones", get(tones))
      .route("/lengths", get(lengths))
      .with_state(state)
      .layer(CatchPanicLayer::custom(handle_panic))
      .layer(
        CorsLayer::new()
          .allow_origin(AnyOrigin)
          .allow_methods(AnyOrigin)
          .allow_headers(AnyOrigin)
      )
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse>
{   Json(HealthResponse
    {   status: "healthy".to_string()
      , timestamp: Utc::now()
      , groq_available: state.is_available()
      , version: VERSION.to_string()
    })
}

/// POST /rephrase
async fn rephrase(
  State(state): State<AppState>
, body: Result<ApiJson<RephraseRequest>, Error>
) -> Result<Json<RephraseResponse>, Error>
{   let orchestrator = state.orchestrator()?;
    let ApiJson(request) = body?;
    let result = orchestrator.rephrase_request(&request).await?;
    debug!("rephrase served by {}", result.model);
    Ok(Json(RephraseResponse::from_result(&request, result)))
}

/// POST /generate-content
async fn generate_content(
  State(state): State<AppState>
, body: Result<ApiJson<ContentRequest>, Error>
) -> Result<Json<ContentResponse>, Error>
{   let orchestrator = state.orchestrator()?;
    let ApiJson(request) = body?;
    let result = orchestrator.generate_request(&request).await?;
    debug!("generate_content served by {}", result.model);
    Ok(Json(ContentResponse::from_result(&request, result)))
}

/// POST /rephrase/batch
async fn rephrase_batch(
  State(state): State<AppState>
, body: Result<ApiJson<Vec<RephraseRequest>>, Error>
) -> Result<Json<BatchResponse<RephraseBatchItem>>, Error>
{   let orchestrator = state.orchestrator()?;
    let ApiJson(requests) = body?;
    let outcomes = orchestrator.rephrase_batch(&requests).await?;

    let results = requests
      .iter()
      .zip(outcomes)
      .map(|(request, outcome)| match outcome
      {   Ok(result) => RephraseBatchItem::Ok(
            RephraseResponse::from_result(request, result)
          )
        , Err(e) => RephraseBatchItem::Failed
          {   error: e.to_string()
            , original_text: request.text.clone()
            , style: request.style
          }
      })
      .collect();

    Ok(Json(BatchResponse { results }))
}

/// POST /generate-content/batch
async fn generate_content_batch(
  State(state): State<AppState>
, body: Result<ApiJson<Vec<ContentRequest>>, Error>
) -> Result<Json<BatchResponse<ContentBatchItem>>, Error>
{   let orchestrator = state.orchestrator()?;
    let ApiJson(requests) = body?;
    let outcomes = orchestrator.generate_content_batch(&requests).await?;

    let results = requests
      .iter()
      .zip(outcomes)
      .map(|(request, outcome)| match outcome
      {   Ok(result) => ContentBatchItem::Ok(
            ContentResponse::from_result(request, result)
          )
        , Err(e) => ContentBatchItem::Failed
          {   error: e.to_string()
            , prompt: request.prompt.clone()
            , kind: request.kind
          }
      })
      .collect();

    Ok(Json(BatchResponse { results }))
}

/// GET /styles
async fn styles() -> Json<serde_json::Value>
{   let styles: Vec<_> = Style::ALL
      .iter()
      .map(|s| json!({
        "key": s,
        "name": s.label(),
        "description": s.description(),
      }))
      .collect();
    Json(json!({ "styles": styles }))
}

/// GET /content-types
async fn content_types(State(state): State<AppState>)
  -> Result<Json<serde_json::Value>, Error>
{   let mut types = Vec::with_capacity(ContentType::ALL.len());
    for kind in ContentType::ALL
    {   let template = state.registry.resolve_content(kind)?;
        types.push(json!({
          "key": kind,
          "name": kind.label(),
          "description": kind.description(),
          "requires_context": template.requires_context,
        }));
    }
    Ok(Json(json!({ "types": types })))
}

/// GET /tones
async fn tones() -> Json<serde_json::Value>
{   let tones: Vec<_> = Tone::ALL
      .iter()
      .map(|t| json!({
        "key": t,
        "name": t.label(),
        "description": t.description(),
      }))
      .collect();
    Json(json!({ "tones": tones }))
}

/// GET /lengths
async fn lengths(State(state): State<AppState>)
  -> Result<Json<serde_json::Value>, Error>
{   let mut lengths = Vec::with_capacity(Length::ALL.len());
    for length in Length::ALL
    {   let guideline = state.registry.resolve_length(length)?;
        lengths.push(json!({
          "key": length,
          "name": length.label(),
          "description": guideline.description,
          "detail_level": guideline.detail_level,
        }));
    }
    Ok(Json(json!({ "lengths": lengths })))
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn status_codes_follow_error_kind()
    {   assert_eq!(
          Error::EmptyInput("Text".into()).status_code()
        , StatusCode::BAD_REQUEST
        );
        assert_eq!(
          Error::UnknownEnumValue { kind: "tone", value: "x".into() }
            .status_code()
        , StatusCode::BAD_REQUEST
        );
        assert_eq!(
          Error::ServiceUnavailable.status_code()
        , StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
          Error::CompletionFailed("x".into()).status_code()
        , StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
          Error::UnrenderedPlaceholder("x".into()).status_code()
        , StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn panic_body_hides_detail()
    {   use http_body_util::BodyExt;

        let response = handle_panic(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret detail"));

        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "An unexpected error occurred");
        assert!(body["timestamp"].is_string());
        assert_eq!(body.as_object().unwrap().len(), 3);
    }
}
