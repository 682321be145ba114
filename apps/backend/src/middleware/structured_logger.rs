use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use super::request_trace::TraceId;
use crate::extractors::device_token::DEVICE_TOKEN_HEADER;

/// One `request_completed` event per request.
///
/// 5xx log at error and 4xx at warn. Successful health probes drop to debug so
/// load balancer polling does not drown the access log.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// Request facts captured before the request is handed on.
struct AccessLine {
    method: String,
    path: String,
    client: String,
    trace_id: String,
    /// Which identity headers came in; never their values
    bearer: bool,
    device: bool,
}

impl AccessLine {
    fn capture(req: &ServiceRequest) -> Self {
        let headers = req.headers();
        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            client: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("-")
                .to_string(),
            trace_id: req
                .extensions()
                .get::<TraceId>()
                .map(|t| t.0.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            bearer: headers.contains_key(actix_web::http::header::AUTHORIZATION),
            device: headers.contains_key(DEVICE_TOKEN_HEADER),
        }
    }

    fn is_health_probe(&self) -> bool {
        self.path == "/health"
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let line = AccessLine::capture(&req);

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            let status_code = status.as_u16();
            let duration_us = start.elapsed().as_micros() as u64;
            let AccessLine {
                ref method,
                ref path,
                ref client,
                ref trace_id,
                bearer,
                device,
            } = line;

            macro_rules! access {
                ($level:ident) => {
                    $level!(
                        http.method = %method,
                        url.path = %path,
                        http.status_code = status_code,
                        client.address = %client,
                        auth.bearer = bearer,
                        auth.device = device,
                        duration_us,
                        trace_id = %trace_id,
                        message = "request_completed"
                    )
                };
            }

            if status.is_server_error() {
                access!(error);
            } else if status.is_client_error() {
                access!(warn);
            } else if line.is_health_probe() {
                access!(debug);
            } else {
                access!(info);
            }

            result
        })
    }
}
