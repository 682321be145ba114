pub mod ad_id;
pub mod bearer;
pub mod current_user;
pub mod device_token;
pub mod favorite_owner;
pub mod maybe_user;
pub mod validated_json;

pub use ad_id::AdId;
pub use current_user::CurrentUser;
pub use device_token::{DeviceToken, MaybeDeviceToken};
pub use favorite_owner::FavoriteOwner;
pub use maybe_user::MaybeUser;
pub use validated_json::ValidatedJson;
