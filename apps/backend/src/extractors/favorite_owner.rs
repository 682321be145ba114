use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use super::device_token::parse_device_token;
use super::maybe_user::MaybeUser;
use crate::domain::owner::OwnerKey;
use crate::error::AppError;

/// Whoever owns the favorites list for this request: the signed-in user if a
/// bearer is present, otherwise the device token, otherwise 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteOwner(pub OwnerKey);

impl FromRequest for FavoriteOwner {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let mut payload = payload.take();

        Box::pin(async move {
            if let MaybeUser(Some(user)) = MaybeUser::from_request(&req, &mut payload).await? {
                return Ok(FavoriteOwner(OwnerKey::User(user.id)));
            }

            parse_device_token(req.headers())?
                .map(|token| FavoriteOwner(OwnerKey::Device(token)))
                .ok_or_else(AppError::unauthorized_no_owner)
        })
    }
}
