//! Listing filters and offset pagination.

use serde::{Deserialize, Serialize};

use super::ad_rules::fold_text;
use crate::catalog::categories::{self, Category};
use crate::catalog::cities::CityDirectory;
use crate::errors::domain::{DomainError, ValidationKind};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 50;
pub const MAX_QUERY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Most viewed first
    Popular,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "newest" => Some(Self::Newest),
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }
}

/// Query string of `GET /api/ads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub city: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub q: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub seller_id: Option<i64>,
    pub with_photos: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Missing values take defaults; `per_page` above the maximum is clamped.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Result<Self, DomainError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page == 0 || per_page == 0 {
            return Err(DomainError::validation(
                ValidationKind::Pagination,
                "page and per_page must be at least 1",
            ));
        }
        Ok(Self {
            page,
            per_page: per_page.min(MAX_PER_PAGE),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// One extra row tells us whether another page exists.
    pub fn fetch_limit(&self) -> u64 {
        u64::from(self.per_page) + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    pub city: Option<String>,
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    /// Already folded with `fold_text`
    pub q: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub seller_id: Option<i64>,
    pub with_photos: bool,
    pub sort: SortOrder,
    pub page: PageRequest,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ListingFilter {
    pub fn from_params(params: ListingParams, cities: &CityDirectory) -> Result<Self, DomainError> {
        let city = non_blank(params.city);
        if let Some(label) = &city {
            if !cities.contains(label) {
                return Err(DomainError::validation(
                    ValidationKind::City,
                    format!("Unknown city '{label}'"),
                ));
            }
        }

        let subcategory = non_blank(params.subcategory);
        let category = match non_blank(params.category) {
            Some(slug) => Some(categories::validate(&slug, subcategory.as_deref())?),
            None if subcategory.is_some() => {
                return Err(DomainError::validation(
                    ValidationKind::Subcategory,
                    "subcategory requires category",
                ))
            }
            None => None,
        };

        let q = non_blank(params.q).map(|raw| fold_text(&raw));
        if let Some(q) = &q {
            if q.chars().count() > MAX_QUERY_CHARS {
                return Err(DomainError::validation_other(format!(
                    "Search query must be at most {MAX_QUERY_CHARS} characters"
                )));
            }
        }

        for bound in [params.price_min, params.price_max].into_iter().flatten() {
            if bound < 0 {
                return Err(DomainError::validation(
                    ValidationKind::PriceRange,
                    "Price bounds must be non-negative",
                ));
            }
        }
        if let (Some(min), Some(max)) = (params.price_min, params.price_max) {
            if min > max {
                return Err(DomainError::validation(
                    ValidationKind::PriceRange,
                    format!("price_min ({min}) is greater than price_max ({max})"),
                ));
            }
        }

        let sort = match non_blank(params.sort) {
            Some(raw) => SortOrder::parse(&raw).ok_or_else(|| {
                DomainError::validation_other(format!("Unknown sort '{raw}'"))
            })?,
            None => SortOrder::default(),
        };

        Ok(Self {
            city,
            category,
            subcategory,
            q,
            price_min: params.price_min,
            price_max: params.price_max,
            seller_id: params.seller_id,
            with_photos: params.with_photos.unwrap_or(false),
            sort,
            page: PageRequest::new(params.page, params.per_page)?,
        })
    }
}

/// One page of results for infinite scroll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build from up to `fetch_limit()` rows.
    pub fn from_probe(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let has_more = rows.len() > request.per_page as usize;
        rows.truncate(request.per_page as usize);
        Self {
            items: rows,
            page: request.page,
            per_page: request.per_page,
            has_more,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            has_more: self.has_more,
        }
    }
}
