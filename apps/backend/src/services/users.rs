use sea_orm::ConnectionTrait;
use tracing::{debug, info, warn};

use crate::adapters::users_sea::ProfileUpdate;
use crate::catalog::cities::CityDirectory;
use crate::domain::profile_rules::{derive_display_name, validate_display_name, validate_phone};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::logging::pii::Redacted;
use crate::logging::security;
use crate::repos::users::{self, User};

const EMAIL_MAX_LEN: usize = 254;
const PROVIDER_SUB_MAX_LEN: usize = 255;

/// Shows only the first 4 characters of a provider subject.
fn redact_sub(sub: &str) -> String {
    let head: String = sub.chars().take(4).collect();
    if head.len() == sub.len() {
        "*".repeat(sub.chars().count())
    } else {
        format!("{head}***")
    }
}

fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = email.len() <= EMAIL_MAX_LEN
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.contains('@'));
    if !valid {
        return Err(DomainError::validation(ValidationKind::Email, "A valid email address is required"));
    }
    Ok(email)
}

fn validate_provider_sub(raw: &str) -> Result<&str, DomainError> {
    let sub = raw.trim();
    if sub.is_empty() || sub.len() > PROVIDER_SUB_MAX_LEN {
        return Err(DomainError::validation(
            ValidationKind::ProviderSub,
            "provider_sub must be a non-empty identifier",
        ));
    }
    Ok(sub)
}

/// Find or create the account for an identity-provider login.
///
/// Idempotent per email. An email already linked to another provider subject
/// is a conflict; an unlinked email gets linked on this login.
pub async fn ensure_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
    name: Option<&str>,
    provider_sub: &str,
) -> Result<(User, String), AppError> {
    let email = normalize_email(email)?;
    let provider_sub = validate_provider_sub(provider_sub)?;

    if let Some(credential) = users::find_credentials_by_email(conn, &email).await? {
        if let Some(existing) = credential.provider_sub.as_deref() {
            if existing != provider_sub {
                warn!(
                    user_id = credential.user_id,
                    email = %Redacted(&email),
                    incoming_sub = %redact_sub(provider_sub),
                    existing_sub = %redact_sub(existing),
                    "Provider subject mismatch"
                );
                security::login_failed("provider_sub_mismatch", Some(&email));
                return Err(DomainError::conflict(
                    ConflictKind::ProviderSubMismatch,
                    "This email is already linked to a different account at the identity provider",
                )
                .into());
            }
        }

        let link = credential.provider_sub.is_none().then_some(provider_sub);
        if link.is_some() {
            info!(user_id = credential.user_id, email = %Redacted(&email), "Linking provider subject on login");
        }
        users::record_login(conn, credential.id, link).await?;

        let user = users::find_user_by_id(conn, credential.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "User not found"))?;

        debug!(user_id = user.id, email = %Redacted(&email), "Repeat login");
        return Ok((user, email));
    }

    if users::find_user_by_sub(conn, provider_sub).await?.is_some() {
        security::login_failed("provider_sub_taken", Some(&email));
        return Err(DomainError::conflict(
            ConflictKind::ProviderSubMismatch,
            "This identity-provider account is already linked to a different email",
        )
        .into());
    }

    let display_name = derive_display_name(name, &email);
    let user = users::create_user(conn, provider_sub, &display_name).await?;
    users::create_credentials(conn, user.id, &email, Some(provider_sub)).await?;

    info!(
        user_id = user.id,
        email = %Redacted(&email),
        provider_sub = %redact_sub(provider_sub),
        "First login, user created"
    );

    Ok((user, email))
}

/// Changes to the caller's own profile. Outer `None` keeps a field, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub city_label: Option<Option<String>>,
}

pub async fn get_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<(User, Option<String>), AppError> {
    let user = users::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::User, "User not found"))?;
    let email = users::find_credentials_by_user_id(conn, user_id)
        .await?
        .map(|c| c.email);
    Ok((user, email))
}

pub async fn update_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    patch: ProfilePatch,
    cities: &CityDirectory,
) -> Result<User, AppError> {
    let display_name = patch
        .display_name
        .as_deref()
        .map(validate_display_name)
        .transpose()?;

    let phone = match patch.phone {
        Some(Some(raw)) => Some(Some(validate_phone(&raw)?)),
        other => other,
    };

    let city_label = match patch.city_label {
        Some(Some(label)) => {
            let label = label.trim().to_string();
            if !cities.contains(&label) {
                return Err(DomainError::validation(
                    ValidationKind::City,
                    format!("Unknown city '{label}'"),
                )
                .into());
            }
            Some(Some(label))
        }
        other => other,
    };

    let update = ProfileUpdate {
        display_name,
        phone,
        city_label,
    };
    Ok(users::update_profile(conn, user_id, update).await?)
}
