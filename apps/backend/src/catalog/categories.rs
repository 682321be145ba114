use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Top-level ad category. Slugs are the wire and storage form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Goods,
    Services,
    RealEstate,
    Autos,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Goods,
        Category::Services,
        Category::RealEstate,
        Category::Autos,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Goods => "goods",
            Category::Services => "services",
            Category::RealEstate => "real_estate",
            Category::Autos => "autos",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.slug() == slug)
    }

    pub fn subcategories(self) -> &'static [&'static str] {
        match self {
            Category::Goods => &["electronics", "clothing", "home", "kids", "hobby"],
            Category::Services => &["repair", "cleaning", "tutoring", "beauty", "moving"],
            Category::RealEstate => &["apartments", "houses", "rooms", "commercial", "land"],
            Category::Autos => &["cars", "motorcycles", "trucks", "parts"],
        }
    }

    pub fn has_subcategory(self, sub: &str) -> bool {
        self.subcategories().contains(&sub)
    }
}

/// Check a category slug and optional subcategory slug; returns the parsed category.
pub fn validate(category: &str, subcategory: Option<&str>) -> Result<Category, DomainError> {
    let parsed = Category::from_slug(category).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::Category,
            format!("Unknown category '{category}'"),
        )
    })?;

    if let Some(sub) = subcategory {
        if !parsed.has_subcategory(sub) {
            return Err(DomainError::validation(
                ValidationKind::Subcategory,
                format!("'{sub}' is not a subcategory of '{category}'"),
            ));
        }
    }

    Ok(parsed)
}
