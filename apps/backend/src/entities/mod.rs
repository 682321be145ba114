pub mod ad_views;
pub mod ads;
pub mod favorites;
pub mod seller_ratings;
pub mod user_credentials;
pub mod users;

pub use ad_views::Entity as AdViews;
pub use ads::Entity as Ads;
pub use ads::Model as Ad;
pub use favorites::Entity as Favorites;
pub use favorites::Model as Favorite;
pub use seller_ratings::Entity as SellerRatings;
pub use user_credentials::Entity as UserCredentials;
pub use user_credentials::Model as UserCredential;
pub use users::Entity as Users;
pub use users::Model as User;
