//! Validation and normalization for ad content.

use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::catalog::categories::{self, Category};
use crate::catalog::cities::CityDirectory;
use crate::errors::domain::{DomainError, ValidationKind};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const PRICE_MAX: i64 = 1_000_000_000_000;
pub const DEFAULT_CURRENCY: &str = "USD";
pub const MAX_PHOTOS: usize = 10;
pub const PHOTO_URL_MAX_LEN: usize = 2048;

/// Ad fields as submitted, before any checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAd {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub city_label: String,
    pub photos: Option<Vec<String>>,
}

/// Partial update. `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Option<i64>>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<Option<String>>,
    pub city_label: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl AdPatch {
    pub fn is_empty(&self) -> bool {
        *self == AdPatch::default()
    }
}

/// A fully validated ad, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub currency: String,
    pub category: Category,
    pub subcategory: Option<String>,
    pub city_label: String,
    pub photos: Vec<String>,
}

impl AdDraft {
    pub fn validate(raw: RawAd, cities: &CityDirectory) -> Result<Self, DomainError> {
        let title = normalize_title(&raw.title)?;
        let description = validate_description(raw.description.as_deref().unwrap_or(""))?;
        let price = validate_price(raw.price)?;
        let currency = normalize_currency(raw.currency.as_deref())?;
        let subcategory = raw
            .subcategory
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let category = categories::validate(raw.category.trim(), subcategory.as_deref())?;
        let city_label = validate_city(&raw.city_label, cities)?;
        let photos = normalize_photos(raw.photos.unwrap_or_default())?;

        Ok(Self {
            title,
            description,
            price,
            currency,
            category,
            subcategory,
            city_label,
            photos,
        })
    }

    /// Merge `patch` over the current values and re-validate the whole ad, so a
    /// category change is checked against the resulting subcategory.
    pub fn apply_patch(
        current: RawAd,
        patch: AdPatch,
        cities: &CityDirectory,
    ) -> Result<Self, DomainError> {
        let merged = RawAd {
            title: patch.title.unwrap_or(current.title),
            description: patch.description.or(current.description),
            price: patch.price.unwrap_or(current.price),
            currency: patch.currency.or(current.currency),
            category: patch.category.unwrap_or(current.category),
            subcategory: patch.subcategory.unwrap_or(current.subcategory),
            city_label: patch.city_label.unwrap_or(current.city_label),
            photos: patch.photos.or(current.photos),
        };
        Self::validate(merged, cities)
    }

    pub fn search_text(&self) -> String {
        search_text(&self.title, &self.description)
    }
}

pub fn normalize_title(raw: &str) -> Result<String, DomainError> {
    let title = raw.trim();
    let len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(
            ValidationKind::Title,
            format!("Title must be {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS} characters, got {len}"),
        ));
    }
    Ok(title.to_string())
}

pub fn validate_description(raw: &str) -> Result<String, DomainError> {
    let len = raw.chars().count();
    if len > DESCRIPTION_MAX_CHARS {
        return Err(DomainError::validation(
            ValidationKind::Description,
            format!("Description must be at most {DESCRIPTION_MAX_CHARS} characters, got {len}"),
        ));
    }
    Ok(raw.to_string())
}

/// `None` means "price on request".
pub fn validate_price(price: Option<i64>) -> Result<Option<i64>, DomainError> {
    match price {
        Some(p) if !(0..=PRICE_MAX).contains(&p) => Err(DomainError::validation(
            ValidationKind::Price,
            format!("Price must be between 0 and {PRICE_MAX}"),
        )),
        other => Ok(other),
    }
}

pub fn normalize_currency(raw: Option<&str>) -> Result<String, DomainError> {
    let Some(code) = raw.map(str::trim) else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code.to_string())
    } else {
        Err(DomainError::validation(
            ValidationKind::Currency,
            format!("Currency must be a 3-letter uppercase code, got '{code}'"),
        ))
    }
}

pub fn validate_city(label: &str, cities: &CityDirectory) -> Result<String, DomainError> {
    let label = label.trim();
    if cities.contains(label) {
        Ok(label.to_string())
    } else {
        Err(DomainError::validation(
            ValidationKind::City,
            format!("Unknown city '{label}'"),
        ))
    }
}

/// Drop duplicates (first occurrence wins), then check count and shape.
pub fn normalize_photos(urls: Vec<String>) -> Result<Vec<String>, DomainError> {
    let mut seen = HashSet::with_capacity(urls.len());
    let mut photos = Vec::with_capacity(urls.len());

    for url in urls {
        let url = url.trim().to_string();
        if !is_acceptable_photo_url(&url) {
            return Err(DomainError::validation(
                ValidationKind::Photos,
                format!("Photo URLs must be https and at most {PHOTO_URL_MAX_LEN} characters"),
            ));
        }
        if seen.insert(url.clone()) {
            photos.push(url);
        }
    }

    if photos.len() > MAX_PHOTOS {
        return Err(DomainError::validation(
            ValidationKind::Photos,
            format!("At most {MAX_PHOTOS} photos, got {}", photos.len()),
        ));
    }
    Ok(photos)
}

fn is_acceptable_photo_url(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("https://") else {
        return false;
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    url.len() <= PHOTO_URL_MAX_LEN
        && !host.is_empty()
        && !url.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Case- and accent-folded text: lowercased, combining marks removed, result in NFKC.
pub fn fold_text(raw: &str) -> String {
    let stripped: String = raw
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    stripped.nfkc().collect()
}

pub fn search_text(title: &str, description: &str) -> String {
    fold_text(&format!("{title}\n{description}"))
}
