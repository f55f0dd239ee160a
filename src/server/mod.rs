//! HTTP boundary: `POST /api/xml-to-xml` runs one pipeline per request; `GET /api/health`.

use crate::core::barcode::BarcodeGenerator;
use crate::core::config::{ContainersConfig, ServerConfig, ServiceConfig};
use crate::core::error::ClassifiedError;
use crate::core::modules::RhaiModuleRuntime;
use crate::core::orchestrator::{PipelineOutcome, TransformPipeline};
use crate::core::store::ContentStore;
use crate::core::types::{SourceInput, StatusClass, TransformRequest};
use anyhow::{anyhow, Context};
use axum::{
    body::{Body, Bytes},
    extract::Extension,
    http::{header, HeaderValue, Response, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::util::MapResponseLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;
use xslmapper_types::{ErrorResponse, XmlToXmlMapperRequest, XmlToXmlMapperResponse};

/// State shared across requests. Holds no per-run state.
pub struct ServiceState {
    pipeline: TransformPipeline,
    containers: ContainersConfig,
    default_base64: bool,
    store_backend: &'static str,
}

impl ServiceState {
    pub fn new(
        store: Arc<dyn ContentStore>,
        barcode: BarcodeGenerator,
        containers: ContainersConfig,
        default_base64: bool,
    ) -> Self {
        Self {
            store_backend: store.backend(),
            pipeline: TransformPipeline::new(store, Arc::new(RhaiModuleRuntime::default()), barcode),
            containers,
            default_base64,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> crate::Result<Self> {
        let store = config.store.build()?;
        Ok(Self::new(
            store,
            BarcodeGenerator::new(config.barcode.clone()),
            config.containers.clone(),
            config.output.encode_base64,
        ))
    }

    /// Translate the wire payload into a pipeline request.
    pub fn transform_request(&self, payload: XmlToXmlMapperRequest) -> TransformRequest {
        TransformRequest {
            template: self
                .containers
                .template_location(&payload.mapper.directory, &payload.mapper.name),
            input: SourceInput::Text(payload.input_xml),
            modules: payload
                .extension_objects
                .iter()
                .map(|object| {
                    self.containers.module_descriptor(
                        &object.directory,
                        &object.name,
                        &object.namespace,
                        &object.class_name,
                    )
                })
                .collect(),
            encode_base64: payload.encode_base64_output.unwrap_or(self.default_base64),
        }
    }
}

/// Start the HTTP boundary and block until the service terminates.
pub async fn serve(config: &ServiceConfig) -> crate::Result<()> {
    let state = ServiceState::from_config(config)?;
    serve_internal(state, &config.server, None).await
}

/// Start the HTTP boundary and notify once the bind address is known.
pub async fn serve_with_ready_notifier(
    state: ServiceState,
    server: &ServerConfig,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> crate::Result<()> {
    serve_internal(state, server, Some(ready_notifier)).await
}

async fn serve_internal(
    state: ServiceState,
    server: &ServerConfig,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> crate::Result<()> {
    let bind_addr: SocketAddr = server
        .bind
        .parse()
        .map_err(|err| anyhow!("invalid server bind address {}: {}", server.bind, err))?;
    let router = router(Arc::new(state), server.max_body_bytes);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind listener {}", bind_addr))?;
    let local_addr = listener
        .local_addr()
        .context("failed to determine listener address")?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("xslmapper listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .await
        .context("http server terminated")
}

/// Routes plus the body limit, with 413 responses rewritten into the error envelope.
pub fn router(state: Arc<ServiceState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/xml-to-xml", post(handle_transform))
        .route("/api/health", get(handle_health))
        .layer(Extension(state))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(MapResponseLayer::new(|mut response: Response<Body>| {
            if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
                let body = json!(ErrorResponse::new(
                    StatusCode::PAYLOAD_TOO_LARGE.as_u16(),
                    "payload too large",
                    None,
                ))
                .to_string();
                *response.body_mut() = Body::from(body);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            response
        }))
}

async fn handle_health(Extension(state): Extension<Arc<ServiceState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "store": state.store_backend,
    }))
}

async fn handle_transform(
    Extension(state): Extension<Arc<ServiceState>>,
    body: Bytes,
) -> Result<Json<XmlToXmlMapperResponse>, MapperRejection> {
    let payload: XmlToXmlMapperRequest = serde_json::from_slice(&body)
        .map_err(|err| MapperRejection::bad_request("invalid request payload", err.to_string()))?;
    let request = state.transform_request(payload);

    let run_id = Uuid::new_v4();
    let span = info_span!("mapping", %run_id, template = %request.template);
    async move {
        let started = Instant::now();
        match state.pipeline.run(request).await {
            PipelineOutcome::Succeeded(result) => {
                info!(
                    bytes = result.bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    messages = result.messages.len(),
                    "mapping succeeded"
                );
                Ok(Json(XmlToXmlMapperResponse {
                    content: result.content(),
                }))
            }
            PipelineOutcome::Failed(err) => Err(MapperRejection::classified(err)),
        }
    }
    .instrument(span)
    .await
}

#[derive(Debug)]
struct MapperRejection {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl MapperRejection {
    fn bad_request(message: &str, detail: String) -> Self {
        warn!("rejected request: {}: {}", message, detail);
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            detail: Some(detail),
        }
    }

    fn classified(err: ClassifiedError) -> Self {
        let stage = err
            .stage
            .map(|stage| stage.to_string())
            .unwrap_or_default();
        let status = match err.status_class() {
            StatusClass::CallerFault => {
                warn!(kind = %err.kind, %stage, code = err.code(), "mapping rejected: {}", err.message);
                StatusCode::BAD_REQUEST
            }
            StatusClass::ServerFault => {
                error!(kind = %err.kind, %stage, code = err.code(), "mapping failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: format!("{}: {}", err.kind, err.message),
            detail: err.detail,
        }
    }
}

impl IntoResponse for MapperRejection {
    fn into_response(self) -> Response<Body> {
        let mut resp = Json(ErrorResponse::new(
            self.status.as_u16(),
            self.message,
            self.detail,
        ))
        .into_response();
        *resp.status_mut() = self.status;
        resp
    }
}
