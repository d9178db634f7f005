//! HTTP transport
//!
//! Serves `POST /submit` on top of hyper. The service object owns its
//! configuration; nothing is read from global state. Request handling is
//! stateless, so connections are served concurrently without coordination.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use hyper::body::HttpBody;
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::IntegrityError;
use crate::pipeline::IntegrityAnalyzer;
use crate::types::Submission;

/// Scoring endpoint
pub const SUBMIT_PATH: &str = "/submit";

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const DEFAULT_ALLOWED_HEADERS: &str = "content-type";

/// Request body could not be read
enum BodyError {
    TooLarge,
    Read(hyper::Error),
}

/// The scoring HTTP service
#[derive(Debug, Clone)]
pub struct IntegrityService {
    config: Arc<ServiceConfig>,
    analyzer: IntegrityAnalyzer,
}

impl IntegrityService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            analyzer: IntegrityAnalyzer::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle one request. Never fails; errors become JSON error responses.
    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            %request_id,
            method = %req.method(),
            path = %req.uri().path()
        );

        async move {
            let origin = header_string(req.headers(), header::ORIGIN);
            let requested_headers =
                header_string(req.headers(), header::ACCESS_CONTROL_REQUEST_HEADERS);

            let mut response = self.route(req).await;
            self.apply_cors(
                origin.as_deref(),
                requested_headers.as_deref(),
                response.headers_mut(),
            );

            info!(status = response.status().as_u16(), "request completed");
            response
        }
        .instrument(span)
        .await
    }

    async fn route(&self, req: Request<Body>) -> Response<Body> {
        match (req.method(), req.uri().path()) {
            (&Method::OPTIONS, _) => empty_response(StatusCode::NO_CONTENT),
            (&Method::POST, SUBMIT_PATH) => self.submit(req).await,
            (_, SUBMIT_PATH) => error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
            _ => error_response(StatusCode::NOT_FOUND, "Not Found"),
        }
    }

    async fn submit(&self, req: Request<Body>) -> Response<Body> {
        let body = match read_body(req.into_body(), self.config.max_body_bytes).await {
            Ok(body) => body,
            Err(BodyError::TooLarge) => {
                warn!(limit = self.config.max_body_bytes, "request body too large");
                return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(BodyError::Read(e)) => {
                warn!(error = %e, "failed to read request body");
                return error_response(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };

        let submission: Submission = match serde_json::from_slice(&body) {
            Ok(submission) => submission,
            Err(e) => {
                warn!(error = %e, "rejected malformed submission");
                return error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string());
            }
        };

        match self.analyzer.analyze(&submission) {
            Ok(report) => json_response(StatusCode::OK, &report),
            Err(IntegrityError::Validation(e)) => {
                warn!(error = %e, "rejected invalid submission");
                error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
            }
            Err(e) => {
                warn!(error = %e, "failed to score submission");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }

    fn apply_cors(
        &self,
        origin: Option<&str>,
        requested_headers: Option<&str>,
        headers: &mut HeaderMap,
    ) {
        let Some(allow_origin) = self.config.cors_origin(origin) else {
            return;
        };
        let Ok(allow_origin) = HeaderValue::from_str(&allow_origin) else {
            return;
        };

        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        let allow_headers = requested_headers
            .and_then(|h| HeaderValue::from_str(h).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS));
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        if origin.is_some() {
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// Run the service until Ctrl-C
pub async fn serve(config: ServiceConfig) -> Result<(), IntegrityError> {
    serve_with_shutdown(config, shutdown_signal()).await
}

/// Run the service until `shutdown` resolves, then drain open connections
pub async fn serve_with_shutdown<F>(config: ServiceConfig, shutdown: F) -> Result<(), IntegrityError>
where
    F: Future<Output = ()>,
{
    let service = IntegrityService::new(config);
    let addr = service.config().bind_addr;

    let make_svc = make_service_fn(move |_conn| {
        let service = service.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let service = service.clone();
                async move { Ok::<_, Infallible>(service.handle(req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|e| IntegrityError::ServerError(format!("Failed to bind {}: {}", addr, e)))?
        .serve(make_svc);

    info!(%addr, "listening");

    server
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| IntegrityError::ServerError(e.to_string()))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

async fn read_body(mut body: Body, limit: usize) -> Result<Vec<u8>, BodyError> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(BodyError::Read)?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            warn!(error = %e, "failed to encode response");
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_response(status: StatusCode, detail: &str) -> Response<Body> {
    json_response(status, &json!({ "detail": detail }))
}
