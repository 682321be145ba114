//! Bearer-token middleware for scopes where every route needs a signed-in user.
//!
//! On success the verified `BackendClaims` are stored in request extensions; on
//! failure the request is answered with a problem+json 401 without reaching the
//! handler.

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::claims::BackendClaims;
use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::extractors::bearer::parse_bearer;
use crate::logging::security;
use crate::state::app_state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: Rc<S>,
}

fn claims_for(req: &ServiceRequest) -> Result<BackendClaims, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available"))?;

    let token = parse_bearer(req.headers())?.ok_or_else(AppError::unauthorized_missing_bearer)?;
    let claims = verify_access_token(&token, &state.security).inspect_err(|e| {
        security::token_rejected(e.code().as_str());
    })?;
    Ok(claims.into())
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        // Verification runs inside the request future so logs and the problem
        // body carry the task-local trace id.
        Box::pin(async move {
            match claims_for(&req) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}
