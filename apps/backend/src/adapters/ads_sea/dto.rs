//! DTOs for the ads_sea adapter.

/// Column values for a new or fully rewritten ad. `photos_json` is a JSON array.
#[derive(Debug, Clone)]
pub struct AdWrite {
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub currency: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub city_label: String,
    pub photos_json: String,
    pub search_text: String,
}

/// Filter and page for the public listing. Only ACTIVE ads are ever listed.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub city_label: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Folded search needle, matched as a substring of `search_text`
    pub needle: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub seller_id: Option<i64>,
    pub with_photos: bool,
    pub sort: ListingSort,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Popular,
}
