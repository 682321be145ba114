//! Ad repository: decodes stored rows into `Ad` and encodes validated drafts.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::ads_sea::{self, AdWrite, ListingQuery, ListingSort};
pub use crate::entities::ads::AdStatus;
use crate::domain::ad_rules::AdDraft;
use crate::domain::listing::{ListingFilter, Page, SortOrder};
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Ad {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub currency: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub city_label: String,
    pub photos: Vec<String>,
    pub status: AdStatus,
    pub views_count: i64,
    pub contact_reveals: i64,
    pub lock_version: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Ad {
    pub fn is_active(&self) -> bool {
        self.status == AdStatus::Active
    }
}

impl TryFrom<crate::entities::ads::Model> for Ad {
    type Error = DomainError;

    fn try_from(model: crate::entities::ads::Model) -> Result<Self, Self::Error> {
        let photos: Vec<String> = serde_json::from_str(&model.photos).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("ad {} has undecodable photos: {e}", model.id),
            )
        })?;

        Ok(Self {
            id: model.id,
            seller_id: model.seller_id,
            title: model.title,
            description: model.description,
            price: model.price,
            currency: model.currency,
            category: model.category,
            subcategory: model.subcategory,
            city_label: model.city_label,
            photos,
            status: model.status,
            views_count: model.views_count,
            contact_reveals: model.contact_reveals,
            lock_version: model.lock_version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn write_of(draft: &AdDraft) -> Result<AdWrite, DomainError> {
    let photos_json = serde_json::to_string(&draft.photos).map_err(|e| {
        DomainError::infra(InfraErrorKind::Other("Encode".into()), e.to_string())
    })?;

    Ok(AdWrite {
        title: draft.title.clone(),
        description: draft.description.clone(),
        price: draft.price,
        currency: draft.currency.clone(),
        category: draft.category.slug().to_string(),
        subcategory: draft.subcategory.clone(),
        city_label: draft.city_label.clone(),
        photos_json,
        search_text: draft.search_text(),
    })
}

pub(crate) fn decode_all(models: Vec<crate::entities::ads::Model>) -> Result<Vec<Ad>, DomainError> {
    models.into_iter().map(Ad::try_from).collect()
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
    draft: &AdDraft,
) -> Result<Ad, DomainError> {
    let model = ads_sea::create(conn, seller_id, write_of(draft)?).await?;
    Ad::try_from(model)
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<Option<Ad>, DomainError> {
    ads_sea::find_by_id(conn, ad_id)
        .await?
        .map(Ad::try_from)
        .transpose()
}

pub async fn update_content<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    expected_version: i32,
    draft: &AdDraft,
) -> Result<Ad, DomainError> {
    let model = ads_sea::update_content(conn, ad_id, expected_version, write_of(draft)?).await?;
    Ad::try_from(model)
}

pub async fn set_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    status: AdStatus,
) -> Result<bool, DomainError> {
    Ok(ads_sea::set_status(conn, ad_id, status).await?)
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<bool, DomainError> {
    Ok(ads_sea::delete(conn, ad_id).await?)
}

pub async fn increment_contact_reveals<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<(), DomainError> {
    Ok(ads_sea::increment_contact_reveals(conn, ad_id).await?)
}

pub async fn count_active_by_seller<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
) -> Result<u64, DomainError> {
    Ok(ads_sea::count_active_by_seller(conn, seller_id).await?)
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &ListingFilter,
) -> Result<Page<Ad>, DomainError> {
    let query = ListingQuery {
        city_label: filter.city.clone(),
        category: filter.category.map(|c| c.slug().to_string()),
        subcategory: filter.subcategory.clone(),
        needle: filter.q.clone(),
        price_min: filter.price_min,
        price_max: filter.price_max,
        seller_id: filter.seller_id,
        with_photos: filter.with_photos,
        sort: match filter.sort {
            SortOrder::Newest => ListingSort::Newest,
            SortOrder::PriceAsc => ListingSort::PriceAsc,
            SortOrder::PriceDesc => ListingSort::PriceDesc,
            SortOrder::Popular => ListingSort::Popular,
        },
        offset: filter.page.offset(),
        limit: filter.page.fetch_limit(),
    };

    let rows = decode_all(ads_sea::list_active(conn, query).await?)?;
    Ok(Page::from_probe(rows, &filter.page))
}
