//! Static reference data compiled into the binary: the city directory and the
//! category tree. Nothing here touches the database.

pub mod categories;
pub mod cities;
pub mod geo;
pub mod slug;

pub use categories::Category;
pub use cities::{City, CityDirectory, NearestCity};
pub use geo::{haversine_km, GeoPoint};
pub use slug::{is_valid_label, slugify};
