use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use super::current_user::{request_claims, resolve, CurrentUser};
use crate::error::AppError;

/// Optional authentication for public endpoints.
///
/// No `Authorization` header yields `MaybeUser(None)`. A header that is present
/// but invalid or expired is still rejected, so clients notice stale sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            match request_claims(&req)? {
                Some(claims) => Ok(MaybeUser(Some(resolve(&req, claims).await?))),
                None => Ok(MaybeUser(None)),
            }
        })
    }
}
